//! Running sums for arithmetic and geometric moments
//!
//! Keeps count, sum, sum of squares, sum of logs and sum of squared logs so
//! that means and deviations are O(1) per query, plus the current extrema.
//! Values can be removed again, which is what lets [`Stats`](crate::Stats)
//! behave as a deque.
//!
//! # Numerical limitations
//!
//! Standard deviation uses the two-moment form
//! `sqrt(n * Σx² - (Σx)²) / n`. It updates in O(1) under both insertion and
//! removal but suffers catastrophic cancellation when values are large
//! relative to their spread, and `Σx²` overflows to infinity for values
//! beyond roughly `1e154`. Removal subtracts from the sums, so a long
//! push/pop history also accumulates rounding error. Negative residues
//! under the root are clamped to zero.

use crate::math;

/// Running moment accumulator
///
/// # Example
///
/// ```
/// use faststats::statistics::Moments;
///
/// let mut m = Moments::new();
/// for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     m.add(v);
/// }
///
/// assert!((m.amean() - 5.0).abs() < 1e-12);
/// assert!((m.stddev() - 2.0).abs() < 1e-12);
/// assert_eq!(m.min(), Some(2.0));
/// assert_eq!(m.max(), Some(9.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Moments {
    /// Number of values held
    count: u64,
    /// Σx
    sum: f64,
    /// Σx²
    sum_of_squares: f64,
    /// Σln(x)
    sum_of_logs: f64,
    /// Σln(x)²
    sum_of_squared_logs: f64,
    /// Minimum value, +inf when empty
    min: f64,
    /// Maximum value, -inf when empty
    max: f64,
}

impl Default for Moments {
    fn default() -> Self {
        Self::new()
    }
}

impl Moments {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_of_squares: 0.0,
            sum_of_logs: 0.0,
            sum_of_squared_logs: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add a value
    ///
    /// Non-positive values make the log sums `-inf` or NaN, which then
    /// propagates into [`gmean`](Self::gmean) and [`gstddev`](Self::gstddev).
    pub fn add(&mut self, value: f64) {
        let ln = math::ln(value);

        self.count += 1;
        self.sum += value;
        self.sum_of_squares += value * value;
        self.sum_of_logs += ln;
        self.sum_of_squared_logs += ln * ln;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Remove a value previously added
    ///
    /// `remaining` must yield every value still held after the removal. It
    /// is only consumed when `value` was one of the current extrema.
    pub fn remove<I>(&mut self, value: f64, remaining: I)
    where
        I: IntoIterator<Item = f64>,
    {
        if self.count <= 1 {
            *self = Self::new();
            return;
        }

        let ln = math::ln(value);

        self.count -= 1;
        self.sum -= value;
        self.sum_of_squares -= value * value;
        self.sum_of_logs -= ln;
        self.sum_of_squared_logs -= ln * ln;

        if value <= self.min || value >= self.max {
            self.rescan(remaining);
        }
    }

    fn rescan<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (if v < lo { v } else { lo }, if v > hi { v } else { hi })
            });
        self.min = min;
        self.max = max;
    }

    /// Number of values held
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Σx
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Σx²
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Σln(x)
    pub fn sum_of_logs(&self) -> f64 {
        self.sum_of_logs
    }

    /// Σln(x)²
    pub fn sum_of_squared_logs(&self) -> f64 {
        self.sum_of_squared_logs
    }

    /// Product of all values, `exp(Σln(x))`
    ///
    /// An empty accumulator yields the empty product, 1.
    pub fn product_of_all(&self) -> f64 {
        math::exp(self.sum_of_logs)
    }

    /// Arithmetic mean
    pub fn amean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Geometric mean
    pub fn gmean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        math::exp(self.sum_of_logs / self.count as f64)
    }

    /// Population standard deviation
    pub fn stddev(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        two_moment_deviation(self.count as f64, self.sum, self.sum_of_squares)
    }

    /// Geometric standard deviation
    pub fn gstddev(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        math::exp(two_moment_deviation(
            self.count as f64,
            self.sum_of_logs,
            self.sum_of_squared_logs,
        ))
    }

    /// Margin of error for the mean at 95% confidence, given a stddev
    pub fn moe_from(&self, stddev: f64) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        1.96 * stddev / math::sqrt(self.count as f64)
    }

    /// Margin of error for the mean at 95% confidence
    pub fn moe(&self) -> f64 {
        self.moe_from(self.stddev())
    }

    /// Get the minimum value
    pub fn min(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    /// Get the maximum value
    pub fn max(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    /// `[min, max]`, or `[NaN, NaN]` when empty
    pub fn range(&self) -> [f64; 2] {
        if self.count == 0 {
            [f64::NAN, f64::NAN]
        } else {
            [self.min, self.max]
        }
    }

    /// Replace the four sums with another accumulator's
    pub(crate) fn copy_sums_from(&mut self, other: &Self) {
        self.sum = other.sum;
        self.sum_of_squares = other.sum_of_squares;
        self.sum_of_logs = other.sum_of_logs;
        self.sum_of_squared_logs = other.sum_of_squared_logs;
    }

    /// Replace the extrema with another accumulator's
    pub(crate) fn copy_extrema_from(&mut self, other: &Self) {
        self.min = other.min;
        self.max = other.max;
    }

    /// Restrict the extrema to `[low, high]`
    pub(crate) fn clamp_extrema(&mut self, low: f64, high: f64) {
        if self.count == 0 {
            return;
        }
        if self.min < low {
            self.min = low;
        }
        if self.max > high {
            self.max = high;
        }
    }

    /// Fold another accumulator into this one
    pub fn merge_moments(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        self.count += other.count;
        self.sum += other.sum;
        self.sum_of_squares += other.sum_of_squares;
        self.sum_of_logs += other.sum_of_logs;
        self.sum_of_squared_logs += other.sum_of_squared_logs;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// `sqrt(n * Σx² - (Σx)²) / n`, with a negative residue clamped to zero.
///
/// NaN residues pass through untouched.
fn two_moment_deviation(n: f64, sum: f64, sum_of_squares: f64) -> f64 {
    let residue = n * sum_of_squares - sum * sum;
    let residue = if residue < 0.0 { 0.0 } else { residue };
    math::sqrt(residue) / n
}
