//! Bucket indexing and sparse bucket counts
//!
//! Values map to integer bucket indexes under one of two layouts:
//!
//! - fixed width: index `floor(v / precision)`, bucket `i` covers
//!   `[i * precision, (i + 1) * precision)`;
//! - explicit edges: index of the first edge strictly greater than `v`.
//!   Values at or past the last edge either grow the edge list by a fixed
//!   interval or, without one, share a single open-ended overflow bucket.
//!
//! Only occupied buckets are stored.
//!
//! Two sentinel indexes hold values no regular bucket can: fixed-width
//! quotients at or beyond `±2^53` (infinities included) land in
//! [`HistogramIndex::UNDERFLOW`] / [`HistogramIndex::OVERFLOW`], and an
//! extending edge layout keeps `+inf` in [`HistogramIndex::OVERFLOW`] so that
//! later extensions never move it.

use crate::config::Bucketing;
use crate::traits::MergeError;
use crate::math;

#[cfg(feature = "std")]
use std::{collections::BTreeMap, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, vec::Vec};

/// Largest fixed-width quotient magnitude kept in a regular bucket (2^53)
const INDEX_LIMIT: f64 = 9_007_199_254_740_992.0;

macro_rules! fmt {
    ($($arg:tt)*) => {{
        #[cfg(feature = "std")]
        { format!($($arg)*) }
        #[cfg(not(feature = "std"))]
        { alloc::format!($($arg)*) }
    }};
}

/// One occupied bucket of a distribution
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bucket {
    /// Bucket index, or one of the [`HistogramIndex`] sentinels
    pub index: i64,
    /// Midpoint of the effective range
    pub value: f64,
    /// Lower end of the effective range
    pub low: f64,
    /// Upper end of the effective range
    pub high: f64,
    /// Number of values in the bucket
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Layout {
    Fixed {
        precision: f64,
    },
    Edges {
        /// Configured edges followed by every extension made so far
        edges: Vec<f64>,
        extension: Option<f64>,
    },
}

/// Sparse histogram over a fixed-width or explicit-edge layout
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramIndex {
    layout: Layout,
    /// Occupied bucket index -> count; never holds a zero count
    counts: BTreeMap<i64, u64>,
}

impl HistogramIndex {
    /// Bucket for values past every regular bucket
    pub const OVERFLOW: i64 = i64::MAX;
    /// Bucket for fixed-width values below every regular bucket
    pub const UNDERFLOW: i64 = i64::MIN;

    /// Check if `index` is one of the sentinel buckets
    pub fn is_sentinel(index: i64) -> bool {
        index == Self::OVERFLOW || index == Self::UNDERFLOW
    }

    /// Build an empty index for a histogram mode, `None` for [`Bucketing::None`]
    pub fn from_bucketing(bucketing: &Bucketing) -> Option<Self> {
        let layout = match bucketing {
            Bucketing::None => return None,
            Bucketing::Fixed { precision } => Layout::Fixed {
                precision: *precision,
            },
            Bucketing::Edges { edges, extension } => Layout::Edges {
                edges: edges.clone(),
                extension: *extension,
            },
        };
        Some(Self {
            layout,
            counts: BTreeMap::new(),
        })
    }

    /// Bucket index for `value`, growing the edge list when the layout allows it
    pub fn locate_or_extend(&mut self, value: f64) -> i64 {
        if let Layout::Edges {
            edges,
            extension: Some(interval),
        } = &mut self.layout
        {
            extend_past(edges, *interval, value);
        }
        self.locate(value)
    }

    /// Bucket index for `value` using the edges materialized so far
    pub fn locate(&self, value: f64) -> i64 {
        match &self.layout {
            Layout::Fixed { precision } => {
                let quotient = math::floor(value / precision);
                if quotient.is_nan() || quotient >= INDEX_LIMIT {
                    Self::OVERFLOW
                } else if quotient < -INDEX_LIMIT {
                    Self::UNDERFLOW
                } else {
                    quotient as i64
                }
            }
            Layout::Edges { edges, extension } => {
                let index = edges.partition_point(|&e| e <= value);
                if index == edges.len() && extension.is_some() {
                    Self::OVERFLOW
                } else {
                    index as i64
                }
            }
        }
    }

    /// Count `value` in its bucket
    pub fn insert(&mut self, value: f64) {
        let index = self.locate_or_extend(value);
        *self.counts.entry(index).or_insert(0) += 1;
    }

    /// Uncount `value`; the bucket entry disappears when it reaches zero
    pub fn remove(&mut self, value: f64) {
        let index = self.locate(value);
        if let Some(count) = self.counts.get_mut(&index) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&index);
            }
        }
    }

    /// Drop all counts; extended edges stay
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Total number of values counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Check if no value is counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count in bucket `index`
    pub fn count_at(&self, index: i64) -> u64 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    /// Occupied buckets as `(index, count)` in ascending order
    pub fn occupied(&self) -> impl DoubleEndedIterator<Item = (i64, u64)> + '_ {
        self.counts.iter().map(|(&i, &c)| (i, c))
    }

    /// Number of occupied buckets
    pub fn occupied_len(&self) -> usize {
        self.counts.len()
    }

    /// Slots from the lowest to the highest occupied index, gaps included
    ///
    /// Each occupied sentinel bucket adds one slot.
    pub fn slot_count(&self) -> usize {
        let sentinels = self.counts.keys().filter(|&&i| Self::is_sentinel(i)).count();
        let mut regular = self.counts.keys().copied().filter(|&i| !Self::is_sentinel(i));
        let span = match regular.next() {
            Some(lo) => {
                let hi = regular.next_back().unwrap_or(lo);
                usize::try_from(hi.abs_diff(lo))
                    .unwrap_or(usize::MAX)
                    .saturating_add(1)
            }
            None => 0,
        };
        span.saturating_add(sentinels)
    }

    /// Current edge list in edge mode, extensions included
    pub fn edges(&self) -> Option<&[f64]> {
        match &self.layout {
            Layout::Fixed { .. } => None,
            Layout::Edges { edges, .. } => Some(edges),
        }
    }

    /// Nominal `(low, high)` of bucket `index`; `None` marks an open end
    pub fn nominal_range(&self, index: i64) -> (Option<f64>, Option<f64>) {
        match &self.layout {
            Layout::Fixed { precision } => match index {
                Self::OVERFLOW => (Some(INDEX_LIMIT * precision), None),
                Self::UNDERFLOW => (None, Some(-INDEX_LIMIT * precision)),
                _ => (
                    Some(index as f64 * precision),
                    Some((index as f64 + 1.0) * precision),
                ),
            },
            Layout::Edges { edges, .. } => {
                if index == Self::OVERFLOW {
                    return (edges.last().copied(), None);
                }
                let low = if index <= 0 {
                    None
                } else {
                    edges.get(index as usize - 1).copied()
                };
                let high = usize::try_from(index)
                    .ok()
                    .and_then(|i| edges.get(i).copied());
                (low, high)
            }
        }
    }

    /// Range of bucket `index` with open ends closed at `min` / `max`
    pub fn effective_range(&self, index: i64, min: f64, max: f64) -> (f64, f64) {
        let (low, high) = self.nominal_range(index);
        (low.unwrap_or(min), high.unwrap_or(max))
    }

    /// Occupied buckets with their effective ranges and midpoints
    pub fn distribution(&self, min: f64, max: f64) -> Vec<Bucket> {
        self.occupied()
            .map(|(index, count)| {
                let (low, high) = self.effective_range(index, min, max);
                Bucket {
                    index,
                    value: (low + high) / 2.0,
                    low,
                    high,
                    count,
                }
            })
            .collect()
    }

    /// Add another index's counts into this one
    ///
    /// Both sides must share a layout (edge lists may differ only by
    /// extension).
    pub fn merge_counts(&mut self, other: &Self) -> Result<(), MergeError> {
        let compatible = match (&self.layout, &other.layout) {
            (Layout::Fixed { precision: a }, Layout::Fixed { precision: b }) => a == b,
            (
                Layout::Edges {
                    edges: ours,
                    extension: ext_a,
                },
                Layout::Edges {
                    edges: theirs,
                    extension: ext_b,
                },
            ) => ext_a == ext_b && shares_prefix(ours, theirs),
            _ => false,
        };
        if !compatible {
            return Err(MergeError::IncompatibleConfig {
                expected: fmt!("{:?}", self.layout),
                found: fmt!("{:?}", other.layout),
            });
        }

        if let (
            Layout::Edges {
                edges: ours,
                extension: Some(interval),
            },
            Some(theirs),
        ) = (&mut self.layout, other.edges())
        {
            let interval = *interval;
            while ours.len() < theirs.len() {
                if !push_extension(ours, interval) {
                    break;
                }
            }
        }

        for (&index, &count) in &other.counts {
            *self.counts.entry(index).or_insert(0) += count;
        }
        Ok(())
    }

    /// Approximate heap plus inline size in bytes
    pub fn size_bytes(&self) -> usize {
        let edges = match &self.layout {
            Layout::Fixed { .. } => 0,
            Layout::Edges { edges, .. } => edges.capacity() * core::mem::size_of::<f64>(),
        };
        core::mem::size_of::<Self>()
            + self.counts.len() * (core::mem::size_of::<i64>() + core::mem::size_of::<u64>())
            + edges
    }
}

/// Point `fraction` of the way across `[low, high]`
///
/// A range with an infinite end collapses onto its finite end.
pub fn interpolate(low: f64, high: f64, fraction: f64) -> f64 {
    let width = high - low;
    if width.is_finite() {
        low + width * fraction
    } else if low.is_finite() {
        low
    } else if high.is_finite() {
        high
    } else {
        low
    }
}

/// Grow `edges` by `interval` until the last edge exceeds `value`.
///
/// Non-finite values are left to the overflow bucket.
fn extend_past(edges: &mut Vec<f64>, interval: f64, value: f64) {
    if !value.is_finite() {
        return;
    }
    let before = edges.len();
    while edges.last().map_or(false, |&last| value >= last) {
        if !push_extension(edges, interval) {
            break;
        }
    }
    if edges.len() > before {
        log::debug!(
            "extended bucket edges from {} to {} to cover {}",
            before,
            edges.len(),
            value
        );
    }
}

/// Append `last + interval`; false when the addition no longer moves the edge.
fn push_extension(edges: &mut Vec<f64>, interval: f64) -> bool {
    let Some(&last) = edges.last() else {
        return false;
    };
    let next = last + interval;
    if next <= last {
        return false;
    }
    edges.push(next);
    true
}

fn shares_prefix(a: &[f64], b: &[f64]) -> bool {
    let n = a.len().min(b.len());
    a[..n] == b[..n]
}
