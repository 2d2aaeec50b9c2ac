//! Interval filtering
//!
//! A [`Band`] selects values between two bounds, open or closed. Retained
//! values are tested one by one; when only bucket counts exist,
//! [`reconstruct`] rebuilds representative values for every bucket whose
//! effective range meets the band, spreading each bucket's count evenly
//! across its range.

use crate::histogram::{interpolate, HistogramIndex};

/// Whether band bounds are included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interval {
    /// `low < v < high`
    Open,
    /// `low <= v <= high`
    #[default]
    Closed,
}

/// Value interval used by band-pass filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
    pub interval: Interval,
}

impl Band {
    pub fn new(low: f64, high: f64, interval: Interval) -> Self {
        Self {
            low,
            high,
            interval,
        }
    }

    pub fn open(low: f64, high: f64) -> Self {
        Self::new(low, high, Interval::Open)
    }

    pub fn closed(low: f64, high: f64) -> Self {
        Self::new(low, high, Interval::Closed)
    }

    /// Check if `value` passes the band
    pub fn contains(&self, value: f64) -> bool {
        match self.interval {
            Interval::Open => self.low < value && value < self.high,
            Interval::Closed => self.low <= value && value <= self.high,
        }
    }

    /// Check if the range `[low, high]` shares any point with the band
    pub fn overlaps(&self, low: f64, high: f64) -> bool {
        match self.interval {
            Interval::Open => low < self.high && high > self.low,
            Interval::Closed => low <= self.high && high >= self.low,
        }
    }
}

/// Representative values for the buckets overlapping `band`
///
/// A bucket of `count` values over `[low, high)` contributes
/// `low + (high - low) * j / count` for `j` in `0..count`, the same
/// placement percentile estimation assumes. `min`/`max` close open-ended
/// buckets; one closed at an infinity places all its values at the finite end.
pub fn reconstruct(
    histogram: &HistogramIndex,
    min: f64,
    max: f64,
    band: Band,
) -> impl Iterator<Item = f64> + '_ {
    histogram
        .occupied()
        .filter_map(move |(index, count)| {
            let (low, high) = histogram.effective_range(index, min, max);
            band.overlaps(low, high).then_some((low, high, count))
        })
        .flat_map(|(low, high, count)| {
            (0..count).map(move |j| interpolate(low, high, j as f64 / count as f64))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bucketing;

    #[test]
    fn test_contains() {
        let open = Band::open(3.0, 8.0);
        let closed = Band::closed(3.0, 8.0);
        assert!(!open.contains(3.0));
        assert!(open.contains(4.0));
        assert!(!open.contains(8.0));
        assert!(closed.contains(3.0));
        assert!(closed.contains(8.0));
        assert!(!closed.contains(8.5));
    }

    #[test]
    fn test_overlaps() {
        let open = Band::open(2.0, 4.0);
        assert!(!open.overlaps(0.0, 2.0));
        assert!(open.overlaps(1.0, 3.0));
        assert!(!open.overlaps(4.0, 6.0));
        assert!(Band::closed(2.0, 4.0).overlaps(4.0, 6.0));
    }

    #[test]
    fn test_reconstruct_spreads_counts() {
        let mut h = HistogramIndex::from_bucketing(&Bucketing::Fixed { precision: 2.0 }).unwrap();
        for v in [1.0, 2.0, 3.0, 10.0, 8.0, 4.0, 3.0] {
            h.insert(v);
        }
        let values: Vec<f64> = reconstruct(&h, 1.0, 10.0, Band::closed(1.0, 10.0)).collect();
        // bucket [2,4) holds 2, 3, 3
        assert_eq!(
            values,
            vec![0.0, 2.0, 2.0 + 2.0 / 3.0, 2.0 + 4.0 / 3.0, 4.0, 8.0, 10.0]
        );
    }

    #[test]
    fn test_reconstruct_infinite_range_keeps_every_value() {
        let mut h = HistogramIndex::from_bucketing(&Bucketing::Edges {
            edges: vec![1.0, 2.0],
            extension: None,
        })
        .unwrap();
        for v in [0.5, 3.0, f64::INFINITY] {
            h.insert(v);
        }
        let band = Band::closed(0.5, f64::INFINITY);
        let values: Vec<f64> = reconstruct(&h, 0.5, f64::INFINITY, band).collect();
        assert_eq!(values, vec![0.5, 2.0, 2.0]);
    }

    #[test]
    fn test_reconstruct_skips_disjoint_buckets() {
        let mut h = HistogramIndex::from_bucketing(&Bucketing::Fixed { precision: 10.0 }).unwrap();
        for v in [1.0, 15.0, 25.0, 35.0] {
            h.insert(v);
        }
        let values: Vec<f64> = reconstruct(&h, 1.0, 35.0, Band::open(12.0, 28.0)).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }
}
