//! Streaming descriptive statistics over a deque of values
//!
//! [`Stats`] accepts values at either end and removes them from either end.
//! Every mutation updates the running [`Moments`], the optional
//! [`HistogramIndex`] and the optional [`DataWindow`], then bumps a
//! generation counter that invalidates derived caches.
//!
//! Whether answers are exact depends on configuration:
//!
//! - with `store_data` (the default) percentiles and filters work on the
//!   retained values;
//! - with a histogram and no retained data they are estimated from bucket
//!   counts;
//! - with neither, percentiles are NaN and filters yield empty results.
//!
//! # Thread Safety
//!
//! `Stats` is `Send` but **not `Sync`**: queries on `&self` fill caches
//! through `Cell`/`RefCell`. Wrap it in `Arc<Mutex<_>>` for shared access.

use core::cell::Cell;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::config::{Config, StatsConfig};
use crate::filter::{self, Band, Interval};
use crate::histogram::{Bucket, HistogramIndex};
use crate::quantiles::{approximate_percentile, exact_percentile};
use crate::statistics::Moments;
use crate::traits::{ErrorBounds, MergeError, QuantileSummary, Sketch, StatsError};
use crate::window::DataWindow;

macro_rules! fmt {
    ($($arg:tt)*) => {{
        #[cfg(feature = "std")]
        { format!($($arg)*) }
        #[cfg(not(feature = "std"))]
        { alloc::format!($($arg)*) }
    }};
}

const NOT_RETAINED: &str = "raw values are not retained (store_data = false)";

/// Streaming summary of a numeric sequence
///
/// # Example
///
/// ```
/// use faststats::Stats;
///
/// let mut stats = Stats::new();
/// stats.push_all([1.0, 2.0, 3.0, 10.0, 8.0, 4.0, 3.0]);
///
/// assert_eq!(stats.pop().unwrap(), Some(3.0));
/// assert_eq!(format!("{:.2}", stats.amean()), "4.67");
/// assert_eq!(format!("{:.2}", stats.median()), "3.50");
/// assert_eq!(stats.range(), [1.0, 10.0]);
/// ```
///
/// Histogram-only operation keeps memory bounded by the number of buckets:
///
/// ```
/// use faststats::{Stats, StatsConfig};
///
/// let config = StatsConfig::new()
///     .store_data(false)
///     .buckets([1.0, 2.0, 3.0, 5.0, 8.0, 13.0]);
/// let mut stats = Stats::with_config(&config).unwrap();
/// stats.push_all((0..20).map(f64::from));
///
/// assert_eq!(stats.median(), 8.0 + 5.0 * 1.5 / 5.0);
/// assert!(stats.pop().is_err());
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    config: Config,
    moments: Moments,
    /// Present iff `config.store_data()`
    data: Option<DataWindow>,
    /// Present iff a histogram mode is configured
    histogram: Option<HistogramIndex>,
    /// Bumped on every mutation
    #[cfg_attr(feature = "serde", serde(skip))]
    generation: u64,
    /// `(generation, stddev)`
    #[cfg_attr(feature = "serde", serde(skip))]
    stddev_cache: Cell<Option<(u64, f64)>>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    /// Empty instance that retains values and keeps no histogram
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Empty instance for an already validated configuration
    pub fn from_config(config: Config) -> Self {
        let data = config.store_data().then(DataWindow::new);
        let histogram = HistogramIndex::from_bucketing(config.bucketing());
        Self {
            config,
            moments: Moments::new(),
            data,
            histogram,
            generation: 0,
            stddev_cache: Cell::new(None),
        }
    }

    /// Validate `options` and build an empty instance
    pub fn with_config(options: &StatsConfig) -> Result<Self, StatsError> {
        Ok(Self::from_config(options.resolve()?))
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn insert(&mut self, value: f64, front: bool) {
        if value.is_nan() {
            log::debug!("ignoring NaN input");
            return;
        }

        self.moments.add(value);
        if let Some(histogram) = &mut self.histogram {
            histogram.insert(value);
        }
        if let Some(data) = &mut self.data {
            if front {
                data.push_front(value);
            } else {
                data.push_back(value);
            }
        }
        self.touch();
    }

    /// Append a value; NaN is ignored
    pub fn push(&mut self, value: f64) -> &mut Self {
        self.insert(value, false);
        self
    }

    /// Append values in order
    pub fn push_all<I: IntoIterator<Item = f64>>(&mut self, values: I) -> &mut Self {
        for value in values {
            self.insert(value, false);
        }
        self
    }

    /// Prepend a value; NaN is ignored
    pub fn unshift(&mut self, value: f64) -> &mut Self {
        self.insert(value, true);
        self
    }

    /// Prepend values as a block, keeping their order at the front
    pub fn unshift_all<I: IntoIterator<Item = f64>>(&mut self, values: I) -> &mut Self {
        let values: Vec<f64> = values.into_iter().collect();
        for &value in values.iter().rev() {
            self.insert(value, true);
        }
        self
    }

    /// Remove and return the last value
    ///
    /// `Ok(None)` when empty. Fails when raw values are not retained, since
    /// the boundary value is unknown.
    pub fn pop(&mut self) -> Result<Option<f64>, StatsError> {
        self.remove_end(false)
    }

    /// Remove and return the first value
    pub fn shift(&mut self) -> Result<Option<f64>, StatsError> {
        self.remove_end(true)
    }

    fn remove_end(&mut self, front: bool) -> Result<Option<f64>, StatsError> {
        let operation = if front { "shift" } else { "pop" };
        let data = self.data.as_mut().ok_or(StatsError::Unsupported {
            operation,
            reason: NOT_RETAINED,
        })?;

        let removed = if front {
            data.pop_front()
        } else {
            data.pop_back()
        };
        let Some(value) = removed else {
            return Ok(None);
        };

        self.moments.remove(value, data.iter());
        if let Some(histogram) = &mut self.histogram {
            histogram.remove(value);
        }
        self.touch();
        Ok(Some(value))
    }

    /// Drop every value; configuration and extended bucket edges stay
    pub fn reset(&mut self) {
        self.moments = Moments::new();
        if let Some(data) = &mut self.data {
            data.clear();
        }
        if let Some(histogram) = &mut self.histogram {
            histogram.clear();
        }
        self.touch();
    }

    /// Number of values held
    pub fn len(&self) -> u64 {
        self.moments.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Configuration this instance was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Raw running sums
    pub fn moments(&self) -> &Moments {
        &self.moments
    }

    /// Bucket counts, if a histogram is configured
    pub fn histogram(&self) -> Option<&HistogramIndex> {
        self.histogram.as_ref()
    }

    /// Retained values in insertion order; empty when not retained
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().flat_map(|d| d.iter())
    }

    /// Whether values or bucket counts are kept beyond the running sums
    fn retains_values(&self) -> bool {
        self.data.is_some() || self.histogram.is_some()
    }

    /// Σx
    pub fn sum(&self) -> f64 {
        self.moments.sum()
    }

    /// Product of all values, `exp(Σln x)`
    pub fn product_of_all(&self) -> f64 {
        self.moments.product_of_all()
    }

    /// Arithmetic mean
    pub fn amean(&self) -> f64 {
        self.moments.amean()
    }

    /// Geometric mean; NaN once any non-positive value was added
    pub fn gmean(&self) -> f64 {
        self.moments.gmean()
    }

    /// Population standard deviation, cached until the next mutation
    ///
    /// See [`Moments`] for the numerical limits of the formula.
    pub fn stddev(&self) -> f64 {
        if let Some((generation, value)) = self.stddev_cache.get() {
            if generation == self.generation {
                return value;
            }
        }
        let value = self.moments.stddev();
        self.stddev_cache.set(Some((self.generation, value)));
        value
    }

    /// Geometric standard deviation
    pub fn gstddev(&self) -> f64 {
        self.moments.gstddev()
    }

    /// 95% margin of error of the mean
    pub fn moe(&self) -> f64 {
        self.moments.moe_from(self.stddev())
    }

    /// `amean ± moe` at 95% confidence
    pub fn confidence_interval(&self) -> ErrorBounds {
        ErrorBounds::symmetric(self.amean(), self.moe(), 0.95)
    }

    /// Smallest value held
    pub fn min(&self) -> Option<f64> {
        self.moments.min()
    }

    /// Largest value held
    pub fn max(&self) -> Option<f64> {
        self.moments.max()
    }

    /// `[min, max]`, `[NaN, NaN]` when empty
    pub fn range(&self) -> [f64; 2] {
        self.moments.range()
    }

    /// Value at percentile `p` (0-100)
    ///
    /// Exact when values are retained, estimated from buckets otherwise, NaN
    /// when neither is available or the instance is empty.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.moments.is_empty() {
            return f64::NAN;
        }
        if let Some(data) = &self.data {
            return exact_percentile(&data.sorted(), p);
        }
        if let Some(histogram) = &self.histogram {
            let [min, max] = self.moments.range();
            return approximate_percentile(histogram, min, max, p);
        }
        f64::NAN
    }

    /// 50th percentile
    pub fn median(&self) -> f64 {
        self.percentile(50.0)
    }

    /// Occupied buckets in ascending order
    pub fn distribution(&self) -> Result<Vec<Bucket>, StatsError> {
        let histogram = self.histogram.as_ref().ok_or(StatsError::Unsupported {
            operation: "distribution",
            reason: "no histogram is configured (set bucket_precision or buckets)",
        })?;
        let [min, max] = self.moments.range();
        Ok(histogram.distribution(min, max))
    }

    /// New instance with the same configuration holding only values in the band
    pub fn band_pass(&self, low: f64, high: f64, interval: Interval) -> Stats {
        self.band_pass_into(Band::new(low, high, interval), self.config.clone())
    }

    /// [`band_pass`](Self::band_pass) into an instance built from `options`
    pub fn band_pass_with(
        &self,
        low: f64,
        high: f64,
        interval: Interval,
        options: &StatsConfig,
    ) -> Result<Stats, StatsError> {
        let config = options.resolve()?;
        Ok(self.band_pass_into(Band::new(low, high, interval), config))
    }

    fn band_pass_into(&self, band: Band, config: Config) -> Stats {
        let mut out = Stats::from_config(config);
        if self.is_empty() {
            return out;
        }

        if let Some(data) = &self.data {
            let sorted = data.sorted();
            for &value in sorted.iter().filter(|&&v| band.contains(v)) {
                out.push(value);
            }
        } else if let Some(histogram) = &self.histogram {
            let [min, max] = self.moments.range();
            for value in filter::reconstruct(histogram, min, max, band) {
                out.push(value);
            }
            out.moments.clamp_extrema(band.low, band.high);
            out.touch();
        }
        out
    }

    /// Values inside the 1.5×IQR fences around the quartiles
    pub fn iqr(&self) -> Stats {
        let q1 = self.percentile(25.0);
        let q3 = self.percentile(75.0);
        let fence = 1.5 * (q3 - q1);
        self.band_pass(q1 - fence, q3 + fence, Interval::Open)
    }

    /// Independent instance with the same values and running sums
    ///
    /// Without retained data the copy is rebuilt from bucket counts, so its
    /// percentiles are approximate; its sums and extrema are the source's.
    pub fn copy(&self) -> Stats {
        self.copy_into(self.config.clone())
    }

    /// [`copy`](Self::copy) into an instance built from `options`
    pub fn copy_with(&self, options: &StatsConfig) -> Result<Stats, StatsError> {
        Ok(self.copy_into(options.resolve()?))
    }

    fn copy_into(&self, config: Config) -> Stats {
        let [min, max] = self.moments.range();
        let mut out = self.band_pass_into(Band::closed(min, max), config);

        if !out.retains_values() {
            out.moments = self.moments.clone();
        } else if out.moments.len() == self.moments.len() {
            out.moments.copy_sums_from(&self.moments);
            out.moments.copy_extrema_from(&self.moments);
        } else {
            log::debug!(
                "copy rebuilt {} of {} values; keeping rebuilt sums",
                out.moments.len(),
                self.moments.len()
            );
        }
        out.touch();
        out
    }
}

impl FromIterator<f64> for Stats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Stats::new();
        stats.push_all(iter);
        stats
    }
}

impl Extend<f64> for Stats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        self.push_all(iter);
    }
}

impl Sketch for Stats {
    type Item = f64;

    fn update(&mut self, item: &f64) {
        self.push(*item);
    }

    /// Append `other`'s values after this instance's
    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.config != other.config {
            return Err(MergeError::IncompatibleConfig {
                expected: fmt!("{:?}", self.config),
                found: fmt!("{:?}", other.config),
            });
        }

        if let (Some(ours), Some(theirs)) = (&mut self.histogram, &other.histogram) {
            ours.merge_counts(theirs)?;
        }
        if let (Some(ours), Some(theirs)) = (&mut self.data, &other.data) {
            for value in theirs.iter() {
                ours.push_back(value);
            }
        }
        self.moments.merge_moments(&other.moments);
        self.touch();
        Ok(())
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>()
            + self.data.as_ref().map_or(0, |d| d.size_bytes())
            + self.histogram.as_ref().map_or(0, |h| h.size_bytes())
    }

    fn count(&self) -> u64 {
        self.moments.len()
    }
}

impl QuantileSummary for Stats {
    fn percentile(&self, p: f64) -> f64 {
        Stats::percentile(self, p)
    }

    fn min(&self) -> Option<f64> {
        Stats::min(self)
    }

    fn max(&self) -> Option<f64> {
        Stats::max(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [f64; 7] = [1.0, 2.0, 3.0, 10.0, 8.0, 4.0, 3.0];

    fn popped() -> Stats {
        let mut s = Stats::new();
        s.push_all(VALUES);
        assert_eq!(s.pop().unwrap(), Some(3.0));
        s
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.005
    }

    #[test]
    fn test_reference_summary() {
        let s = popped();
        assert_eq!(s.len(), 6);
        assert!(approx(s.amean(), 4.67));
        assert!(approx(s.gmean(), 3.53));
        assert!(approx(s.median(), 3.50));
        assert!(approx(s.percentile(95.0), 10.0));
        assert!(approx(s.percentile(25.0), 2.50));
        assert!(approx(s.stddev(), 3.25));
        assert!(approx(s.gstddev(), 2.20));
        assert!(approx(s.moe(), 2.60));
        assert_eq!(s.range(), [1.0, 10.0]);
        assert_eq!(s.sum(), 28.0);
        assert!((s.product_of_all() - 1920.0).abs() < 1e-6);
    }

    #[test]
    fn test_push_unshift_agree() {
        let mut a = Stats::new();
        a.push_all(VALUES);

        let mut b = Stats::new();
        b.unshift_all([1.0, 2.0, 3.0, 10.0, 8.0, 4.0]);
        b.push(3.0);

        assert_eq!(b.values().collect::<Vec<_>>(), VALUES.to_vec());
        assert_eq!(a.amean(), b.amean());
        assert_eq!(a.stddev(), b.stddev());
    }

    #[test]
    fn test_shift_and_pop_ends() {
        let mut s: Stats = VALUES.into_iter().collect();
        assert_eq!(s.shift().unwrap(), Some(1.0));
        assert_eq!(s.pop().unwrap(), Some(3.0));
        assert_eq!(s.len(), 5);
        assert_eq!(s.range(), [2.0, 10.0]);
        assert!(s.amean() > popped().amean());
    }

    #[test]
    fn test_pop_empty() {
        let mut s = Stats::new();
        assert_eq!(s.pop().unwrap(), None);
        assert_eq!(s.shift().unwrap(), None);
    }

    #[test]
    fn test_pop_without_data_is_unsupported() {
        let mut s = Stats::with_config(&StatsConfig::new().store_data(false)).unwrap();
        s.push(1.0);
        assert!(matches!(
            s.pop(),
            Err(StatsError::Unsupported { operation: "pop", .. })
        ));
        assert!(matches!(
            s.shift(),
            Err(StatsError::Unsupported { operation: "shift", .. })
        ));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_stddev_cache_invalidated() {
        let mut s = Stats::new();
        s.push_all([1.0, 1.0]);
        assert_eq!(s.stddev(), 0.0);
        s.push(4.0);
        assert!(s.stddev() > 0.0);
        s.pop().unwrap();
        assert_eq!(s.stddev(), 0.0);
    }

    #[test]
    fn test_empty_statistics_are_nan() {
        let s = Stats::new();
        assert!(s.amean().is_nan());
        assert!(s.gmean().is_nan());
        assert!(s.stddev().is_nan());
        assert!(s.gstddev().is_nan());
        assert!(s.moe().is_nan());
        assert!(s.percentile(50.0).is_nan());
        assert!(s.median().is_nan());
        let [lo, hi] = s.range();
        assert!(lo.is_nan() && hi.is_nan());
    }

    #[test]
    fn test_nan_input_ignored() {
        let mut s = Stats::new();
        s.push(1.0).push(f64::NAN).unshift(f64::NAN).push(3.0);
        assert_eq!(s.len(), 2);
        assert_eq!(s.amean(), 2.0);
    }

    #[test]
    fn test_percentile_extremes() {
        let s = popped();
        assert_eq!(s.percentile(0.0), 1.0);
        assert_eq!(s.percentile(-10.0), 1.0);
        assert_eq!(s.percentile(100.0), 10.0);
        assert_eq!(s.percentile(50.0), s.median());
    }

    #[test]
    fn test_percentile_without_data_or_histogram_is_nan() {
        let mut s = Stats::with_config(&StatsConfig::new().store_data(false)).unwrap();
        s.push_all([1.0, 2.0, 3.0]);
        assert!(s.median().is_nan());
        assert_eq!(s.amean(), 2.0);
    }

    #[test]
    fn test_band_pass() {
        let s = popped();
        let open = s.band_pass(3.0, 8.0, Interval::Open);
        assert_eq!(open.range(), [4.0, 4.0]);
        assert_eq!(open.len(), 1);

        let closed = s.band_pass(3.0, 8.0, Interval::Closed);
        assert_eq!(closed.range(), [3.0, 8.0]);
        assert_eq!(closed.values().collect::<Vec<_>>(), vec![3.0, 4.0, 8.0]);
    }

    #[test]
    fn test_iqr_keeps_small_sample() {
        let s = popped().iqr();
        assert_eq!(s.range(), [1.0, 10.0]);
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn test_iqr_drops_outlier() {
        let mut s = Stats::new();
        s.push_all([10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 1000.0]);
        let inliers = s.iqr();
        assert_eq!(inliers.len(), 7);
        assert_eq!(inliers.max(), Some(16.0));
    }

    #[test]
    fn test_distribution_requires_histogram() {
        let s = popped();
        assert!(matches!(
            s.distribution(),
            Err(StatsError::Unsupported {
                operation: "distribution",
                ..
            })
        ));
    }

    #[test]
    fn test_copy_exact() {
        let s = popped();
        let c = s.copy();
        assert_eq!(c.len(), s.len());
        assert_eq!(c.amean(), s.amean());
        assert_eq!(c.range(), s.range());
        assert_eq!(c.median(), s.median());
    }

    #[test]
    fn test_copy_histogram_only() {
        let config = StatsConfig::new().store_data(false).bucket_precision(2.0);
        let mut s = Stats::with_config(&config).unwrap();
        s.push_all(VALUES);

        let c = s.copy();
        let (h, ch) = (s.histogram().unwrap(), c.histogram().unwrap());
        assert_eq!(c.len(), s.len());
        assert_eq!(c.amean(), s.amean());
        assert_eq!(c.stddev(), s.stddev());
        assert_eq!(ch.slot_count(), h.slot_count());
        assert_eq!(c.range(), s.range());
    }

    #[test]
    fn test_copy_with_other_config() {
        let s = popped();
        let c = s.copy_with(&StatsConfig::new().bucket_precision(5.0)).unwrap();
        assert_eq!(c.len(), 6);
        assert_eq!(c.amean(), s.amean());
        assert_eq!(c.histogram().map(|h| h.total()), Some(6));

        assert!(s.copy_with(&StatsConfig::new().bucket_precision(-1.0)).is_err());
    }

    #[test]
    fn test_copy_summary_only() {
        let mut s = Stats::with_config(&StatsConfig::new().store_data(false)).unwrap();
        s.push_all(VALUES);
        let c = s.copy();
        assert_eq!(c.len(), 7);
        assert_eq!(c.moments(), s.moments());
    }

    #[test]
    fn test_reset() {
        let mut s = Stats::with_config(&StatsConfig::new().bucket_precision(1.0)).unwrap();
        s.push_all(VALUES);
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.values().count(), 0);
        assert!(s.distribution().unwrap().is_empty());
        assert!(s.amean().is_nan());
    }

    #[test]
    fn test_merge() {
        let mut a: Stats = [1.0, 2.0, 3.0].into_iter().collect();
        let b: Stats = [10.0, 8.0, 4.0].into_iter().collect();
        a.merge(&b).unwrap();
        assert_eq!(a.len(), 6);
        assert_eq!(a.median(), 3.5);
        assert_eq!(a.values().last(), Some(4.0));

        let c = Stats::with_config(&StatsConfig::new().bucket_precision(1.0)).unwrap();
        assert!(a.merge(&c).is_err());
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_confidence_interval() {
        let s = popped();
        let ci = s.confidence_interval();
        assert_eq!(ci.estimate, s.amean());
        assert!((ci.width() - 2.0 * s.moe()).abs() < 1e-12);
        assert!(ci.contains(4.0));
    }
}
