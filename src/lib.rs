//! # faststats
//!
//! Streaming descriptive statistics for Rust.
//!
//! A [`Stats`] instance ingests numbers at either end of a sequence, removes
//! them from either end, and answers summary queries at any time:
//!
//! - **Central tendency**: arithmetic and geometric mean, median
//! - **Dispersion**: population and geometric standard deviation, margin of error
//! - **Quantiles**: exact from retained values, or estimated from a histogram
//! - **Distribution**: fixed-width or explicit-edge buckets, with edges that
//!   grow on demand
//! - **Filtering**: band-pass and IQR inlier selection
//!
//! Means and deviations come from running sums, so they cost O(1) no matter
//! how many values were seen. Raw values are retained by default; turning
//! that off bounds memory by the number of occupied buckets at the cost of
//! approximate percentiles.
//!
//! ## Quick Start
//!
//! ```rust
//! use faststats::prelude::*;
//!
//! let mut stats = Stats::new();
//! stats.push_all([1.0, 2.0, 3.0, 10.0, 8.0, 4.0]);
//!
//! println!("mean {:.2} ± {:.2}", stats.amean(), stats.moe());
//! println!("p95 {}", stats.percentile(95.0));
//!
//! let inliers = stats.iqr();
//! assert_eq!(inliers.len(), 6);
//! ```
//!
//! ## Bounded Memory
//!
//! ```rust
//! use faststats::prelude::*;
//!
//! let config = StatsConfig::new()
//!     .store_data(false)
//!     .bucket_precision(10.0);
//! let mut latencies = Stats::with_config(&config).unwrap();
//!
//! for ms in [3.0, 12.0, 15.0, 41.0, 7.0] {
//!     latencies.push(ms);
//! }
//!
//! for bucket in latencies.distribution().unwrap() {
//!     println!("[{}, {}): {}", bucket.low, bucket.high, bucket.count);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support; without it the crate is
//!   `no_std` + `alloc` and uses `libm` for math
//! - `serde`: Enable serialization
//!
//! ## Logging
//!
//! The crate emits a few `debug`/`trace` records through the [`log`] facade
//! (edge extension, dropped NaN input, snapshot rebuilds). Install any
//! `log` backend to see them.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod config;
pub mod filter;
pub mod histogram;
pub(crate) mod math;
pub mod quantiles;
pub mod statistics;
pub mod stats;
pub mod traits;
pub mod window;

pub mod prelude {
    pub use crate::traits::*;

    pub use crate::config::{Config, StatsConfig};
    pub use crate::filter::Interval;
    pub use crate::histogram::Bucket;
    pub use crate::stats::Stats;
}

pub use config::{Config, ConfigError, StatsConfig};
pub use filter::Interval;
pub use histogram::Bucket;
pub use stats::Stats;
pub use traits::StatsError;
