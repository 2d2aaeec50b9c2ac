//! Percentile estimation from sorted values or bucket counts
//!
//! Both paths share one rank rule. Percentiles 25, 50 and 75 average the
//! values at ranks `floor((n-1)p/100)` and `ceil((n-1)p/100)`; any other
//! percentile reads the single rank `floor(n*p/100)`. Out-of-range
//! percentiles clamp to the extrema and a NaN percentile yields NaN.
//!
//! The approximate path assumes values are spread uniformly across each
//! bucket's effective range: rank `r`, landing at position `k` of a bucket
//! holding `c` values, maps to `low + (high - low) * k / c`.

use crate::histogram::{interpolate, HistogramIndex};
use crate::math;

/// Which ranks answer a percentile query over `n` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankPlan {
    /// `p <= 0`
    Min,
    /// `p >= 100`
    Max,
    /// One zero-based rank
    Single(usize),
    /// Average of two zero-based ranks
    Midpoint(usize, usize),
}

impl RankPlan {
    /// Plan the ranks for percentile `p` over `n > 0` values; `p` must not be NaN
    pub fn new(p: f64, n: usize) -> Self {
        if p <= 0.0 {
            return RankPlan::Min;
        }
        if p >= 100.0 {
            return RankPlan::Max;
        }
        let last = n.saturating_sub(1);
        if p == 25.0 || p == 50.0 || p == 75.0 {
            let pos = last as f64 * p / 100.0;
            let lo = (math::floor(pos) as usize).min(last);
            let hi = (math::ceil(pos) as usize).min(last);
            RankPlan::Midpoint(lo, hi)
        } else {
            let rank = math::floor(n as f64 * p / 100.0) as usize;
            RankPlan::Single(rank.min(last))
        }
    }

    /// Resolve the plan with a rank lookup
    pub fn evaluate<F>(self, min: f64, max: f64, mut value_at: F) -> f64
    where
        F: FnMut(usize) -> f64,
    {
        match self {
            RankPlan::Min => min,
            RankPlan::Max => max,
            RankPlan::Single(r) => value_at(r),
            RankPlan::Midpoint(lo, hi) => (value_at(lo) + value_at(hi)) / 2.0,
        }
    }
}

/// Exact percentile over ascending `sorted` values; NaN when empty
pub fn exact_percentile(sorted: &[f64], p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return f64::NAN;
    };
    RankPlan::new(p, sorted.len()).evaluate(min, max, |r| sorted[r])
}

/// Approximate percentile from bucket counts
///
/// `min` and `max` are the true extrema of the counted values; they close
/// open-ended buckets and answer the clamped extremes. NaN when empty.
pub fn approximate_percentile(histogram: &HistogramIndex, min: f64, max: f64, p: f64) -> f64 {
    let total = histogram.total();
    if total == 0 || p.is_nan() {
        return f64::NAN;
    }
    RankPlan::new(p, total as usize).evaluate(min, max, |r| {
        value_at_rank(histogram, min, max, r as u64)
    })
}

/// Value at zero-based `rank` under the uniform-within-bucket assumption
pub fn value_at_rank(histogram: &HistogramIndex, min: f64, max: f64, rank: u64) -> f64 {
    let mut remaining = rank;
    for (index, count) in histogram.occupied() {
        if remaining < count {
            let (low, high) = histogram.effective_range(index, min, max);
            return interpolate(low, high, remaining as f64 / count as f64);
        }
        remaining -= count;
    }
    max
}
