//! Bucketed histograms
//!
//! [`HistogramIndex`] maps values to buckets under a fixed-width or an
//! explicit-edge layout and keeps sparse per-bucket counts. Explicit edges
//! can grow on demand so the histogram covers an unbounded range.
//!
//! # Example
//!
//! ```
//! use faststats::config::Bucketing;
//! use faststats::histogram::HistogramIndex;
//!
//! let mut h = HistogramIndex::from_bucketing(&Bucketing::Fixed { precision: 10.0 }).unwrap();
//!
//! for value in [1.0, 4.0, 12.0, 35.0] {
//!     h.insert(value);
//! }
//!
//! for bucket in h.distribution(1.0, 35.0) {
//!     println!("[{}, {}): {}", bucket.low, bucket.high, bucket.count);
//! }
//! ```

mod index;

pub use index::{interpolate, Bucket, HistogramIndex};
