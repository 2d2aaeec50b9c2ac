//! Construction options and their validation
//!
//! [`StatsConfig`] is the caller-facing option set. [`StatsConfig::resolve`]
//! checks every option against its constraint and produces an immutable
//! [`Config`], which is what a [`Stats`](crate::Stats) instance holds.
//!
//! ```
//! use faststats::config::{Bucketing, StatsConfig};
//!
//! let config = StatsConfig::new()
//!     .store_data(false)
//!     .buckets([1.0, 2.0, 5.0])
//!     .bucket_extension_interval(5.0)
//!     .resolve()
//!     .unwrap();
//!
//! assert!(!config.store_data());
//! assert!(matches!(config.bucketing(), Bucketing::Edges { .. }));
//! ```

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Rejected construction option
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `bucket_precision` must be finite and positive
    InvalidBucketPrecision(f64),
    /// `bucket_extension_interval` must be finite and positive
    InvalidExtensionInterval(f64),
    /// `buckets` must hold at least one edge
    EmptyBuckets,
    /// Every edge must be finite
    NonFiniteBucketEdge { index: usize, value: f64 },
    /// Edges must be strictly ascending; `index` is the first offending edge
    UnsortedBuckets { index: usize },
    /// `bucket_precision` and `buckets` are mutually exclusive
    ConflictingBucketing,
    /// `bucket_extension_interval` only applies to explicit `buckets`
    ExtensionWithoutBuckets,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidBucketPrecision(p) => {
                write!(f, "bucket_precision must be finite and positive, got {}", p)
            }
            ConfigError::InvalidExtensionInterval(i) => {
                write!(f, "bucket_extension_interval must be finite and positive, got {}", i)
            }
            ConfigError::EmptyBuckets => write!(f, "buckets must not be empty"),
            ConfigError::NonFiniteBucketEdge { index, value } => {
                write!(f, "bucket edge {} is not finite: {}", index, value)
            }
            ConfigError::UnsortedBuckets { index } => {
                write!(f, "bucket edges must be strictly ascending (edge {})", index)
            }
            ConfigError::ConflictingBucketing => {
                write!(f, "bucket_precision and buckets cannot both be set")
            }
            ConfigError::ExtensionWithoutBuckets => {
                write!(f, "bucket_extension_interval requires buckets")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Caller-facing construction options
///
/// Defaults retain raw values and configure no histogram.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatsConfig {
    /// Keep every raw value (exact quantiles, removal support)
    pub store_data: bool,
    /// Fixed bucket width
    pub bucket_precision: Option<f64>,
    /// Explicit ascending bucket upper edges
    pub buckets: Option<Vec<f64>>,
    /// Spacing of edges synthesized past the last configured edge
    pub bucket_extension_interval: Option<f64>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            store_data: true,
            bucket_precision: None,
            buckets: None,
            bucket_extension_interval: None,
        }
    }
}

impl StatsConfig {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set raw value retention
    pub fn store_data(mut self, store: bool) -> Self {
        self.store_data = store;
        self
    }

    /// Use fixed-width buckets of the given width
    pub fn bucket_precision(mut self, precision: f64) -> Self {
        self.bucket_precision = Some(precision);
        self
    }

    /// Use explicit bucket upper edges
    pub fn buckets<I: IntoIterator<Item = f64>>(mut self, edges: I) -> Self {
        self.buckets = Some(edges.into_iter().collect());
        self
    }

    /// Extend explicit edges on demand at this spacing
    ///
    /// Edges are materialized one interval at a time up to the largest value
    /// seen, so memory grows with `(max - last_edge) / interval`: a single
    /// `1e12` with an interval of `1.0` asks for about 10^12 edges. Pick an
    /// interval on the scale of the data. Non-finite values never extend.
    pub fn bucket_extension_interval(mut self, interval: f64) -> Self {
        self.bucket_extension_interval = Some(interval);
        self
    }

    /// Validate every option and build the immutable configuration
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let bucketing = match (self.bucket_precision, &self.buckets) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingBucketing),
            (Some(precision), None) => {
                if self.bucket_extension_interval.is_some() {
                    return Err(ConfigError::ExtensionWithoutBuckets);
                }
                if !(precision.is_finite() && precision > 0.0) {
                    return Err(ConfigError::InvalidBucketPrecision(precision));
                }
                Bucketing::Fixed { precision }
            }
            (None, Some(edges)) => {
                validate_edges(edges)?;
                let extension = match self.bucket_extension_interval {
                    Some(i) if !(i.is_finite() && i > 0.0) => {
                        return Err(ConfigError::InvalidExtensionInterval(i))
                    }
                    other => other,
                };
                Bucketing::Edges {
                    edges: edges.clone(),
                    extension,
                }
            }
            (None, None) => {
                if self.bucket_extension_interval.is_some() {
                    return Err(ConfigError::ExtensionWithoutBuckets);
                }
                Bucketing::None
            }
        };

        Ok(Config {
            store_data: self.store_data,
            bucketing,
        })
    }
}

fn validate_edges(edges: &[f64]) -> Result<(), ConfigError> {
    if edges.is_empty() {
        return Err(ConfigError::EmptyBuckets);
    }
    for (index, &value) in edges.iter().enumerate() {
        if !value.is_finite() {
            return Err(ConfigError::NonFiniteBucketEdge { index, value });
        }
        if index > 0 && value <= edges[index - 1] {
            return Err(ConfigError::UnsortedBuckets { index });
        }
    }
    Ok(())
}

/// Histogram mode selected at construction
#[derive(Debug, Clone, PartialEq)]
pub enum Bucketing {
    /// No histogram
    None,
    /// Bucket `i` covers `[i * precision, (i + 1) * precision)`
    Fixed { precision: f64 },
    /// Bucket `i` ends at `edges[i]`; values past the last edge either
    /// extend the edges by `extension` or share one open-ended bucket
    Edges {
        edges: Vec<f64>,
        extension: Option<f64>,
    },
}

/// Validated, immutable configuration of a [`Stats`](crate::Stats) instance
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "StatsConfig", into = "StatsConfig")
)]
pub struct Config {
    store_data: bool,
    bucketing: Bucketing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_data: true,
            bucketing: Bucketing::None,
        }
    }
}

impl Config {
    /// Whether raw values are retained
    pub fn store_data(&self) -> bool {
        self.store_data
    }

    /// Histogram mode
    pub fn bucketing(&self) -> &Bucketing {
        &self.bucketing
    }

    /// Whether any histogram mode is configured
    pub fn has_histogram(&self) -> bool {
        !matches!(self.bucketing, Bucketing::None)
    }

    /// Options that resolve back to this configuration
    pub fn to_options(&self) -> StatsConfig {
        let mut options = StatsConfig::new().store_data(self.store_data);
        match &self.bucketing {
            Bucketing::None => {}
            Bucketing::Fixed { precision } => options.bucket_precision = Some(*precision),
            Bucketing::Edges { edges, extension } => {
                options.buckets = Some(edges.clone());
                options.bucket_extension_interval = *extension;
            }
        }
        options
    }
}

impl TryFrom<StatsConfig> for Config {
    type Error = ConfigError;

    fn try_from(options: StatsConfig) -> Result<Self, Self::Error> {
        options.resolve()
    }
}

impl From<Config> for StatsConfig {
    fn from(config: Config) -> Self {
        config.to_options()
    }
}
