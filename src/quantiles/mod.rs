//! Percentile estimation
//!
//! Exact percentiles come from a sorted snapshot of retained values;
//! approximate ones from histogram bucket counts. Both follow the same
//! [`RankPlan`] so the two paths agree on which ranks a query reads.
//!
//! # Example
//!
//! ```
//! use faststats::quantiles::exact_percentile;
//!
//! let sorted = [1.0, 2.0, 3.0, 4.0, 8.0, 10.0];
//! assert_eq!(exact_percentile(&sorted, 50.0), 3.5);
//! assert_eq!(exact_percentile(&sorted, 95.0), 10.0);
//! ```

mod estimator;

pub use estimator::{approximate_percentile, exact_percentile, value_at_rank, RankPlan};
