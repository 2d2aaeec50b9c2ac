//! Core traits and error types
//!
//! [`Stats`](crate::Stats) implements the base [`Sketch`] trait for
//! accumulate/merge/clear plumbing and [`QuantileSummary`] for rank queries.

use core::fmt::Debug;

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::config::ConfigError;

/// Error during merge of two summaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Summaries have incompatible configurations
    IncompatibleConfig {
        expected: String,
        found: String,
    },
}

impl core::fmt::Display for MergeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MergeError::IncompatibleConfig { expected, found } => {
                write!(f, "incompatible config: expected {}, found {}", expected, found)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MergeError {}

/// Error returned by [`Stats`](crate::Stats) operations
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Construction options failed validation
    Config(ConfigError),
    /// The operation needs a capability this instance was not configured with
    Unsupported {
        operation: &'static str,
        reason: &'static str,
    },
}

impl core::fmt::Display for StatsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StatsError::Config(e) => write!(f, "invalid configuration: {}", e),
            StatsError::Unsupported { operation, reason } => {
                write!(f, "{} is not supported: {}", operation, reason)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatsError::Config(e) => Some(e),
            StatsError::Unsupported { .. } => None,
        }
    }
}

impl From<ConfigError> for StatsError {
    fn from(e: ConfigError) -> Self {
        StatsError::Config(e)
    }
}

/// Error bounds for an estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBounds {
    /// Lower bound of the estimate
    pub lower: f64,
    /// Point estimate
    pub estimate: f64,
    /// Upper bound of the estimate
    pub upper: f64,
    /// Confidence level (e.g., 0.95 for 95%)
    pub confidence: f64,
}

impl ErrorBounds {
    /// Create new error bounds
    pub fn new(lower: f64, estimate: f64, upper: f64, confidence: f64) -> Self {
        Self {
            lower,
            estimate,
            upper,
            confidence,
        }
    }

    /// Symmetric bounds `estimate ± half_width`
    pub fn symmetric(estimate: f64, half_width: f64, confidence: f64) -> Self {
        Self::new(estimate - half_width, estimate, estimate + half_width, confidence)
    }

    /// Check if a value falls within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Width of the confidence interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Core trait for streaming summaries
pub trait Sketch: Clone + Debug {
    /// The type of item this summary processes
    type Item: ?Sized;

    /// Add an item
    fn update(&mut self, item: &Self::Item);

    /// Merge another summary into this one
    ///
    /// Returns an error if the two are incompatible
    fn merge(&mut self, other: &Self) -> Result<(), MergeError>;

    /// Reset to empty state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items currently held
    fn count(&self) -> u64;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Percentile queries over a summary
///
/// Percentiles are expressed on the 0-100 scale. Empty summaries answer NaN.
pub trait QuantileSummary: Sketch {
    /// Value at percentile `p`; `p <= 0` gives the minimum, `p >= 100` the maximum
    fn percentile(&self, p: f64) -> f64;

    /// Smallest value held
    fn min(&self) -> Option<f64>;

    /// Largest value held
    fn max(&self) -> Option<f64>;

    /// 50th percentile
    fn median(&self) -> f64 {
        self.percentile(50.0)
    }

    /// Several percentiles at once
    fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.percentile(p)).collect()
    }
}
