//! Running moments for streaming data
//!
//! [`Moments`] keeps the sums behind arithmetic and geometric means and
//! deviations, updated in O(1) per insertion or removal.
//!
//! # Example
//!
//! ```
//! use faststats::statistics::Moments;
//!
//! let mut m = Moments::new();
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     m.add(value);
//! }
//!
//! println!("Mean: {}", m.amean());
//! println!("Stddev: {}", m.stddev());
//! println!("Range: {:?}", m.range());
//! ```

mod moments;

pub use moments::Moments;
