//! Retained raw values
//!
//! [`DataWindow`] keeps values in insertion order as a deque and lazily
//! builds an ascending sorted snapshot for exact rank queries.
//!
//! # Thread Safety
//!
//! The snapshot sits behind a `RefCell` so that `&self` queries can build
//! it. `DataWindow` is therefore `Send` but **not `Sync`**.

use core::cell::{Ref, RefCell};

#[cfg(feature = "std")]
use std::{collections::VecDeque, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};

/// Sorted copy of the window, valid only for the generation it was built at
#[derive(Clone, Debug, Default)]
struct SortedSnapshot {
    generation: u64,
    values: Option<Vec<f64>>,
}

/// Insertion-ordered values with a lazily sorted view
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataWindow {
    values: VecDeque<f64>,
    /// Bumped on every mutation
    #[cfg_attr(feature = "serde", serde(skip))]
    generation: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    sorted: RefCell<SortedSnapshot>,
}

impl PartialEq for DataWindow {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl DataWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Append at the back
    pub fn push_back(&mut self, value: f64) {
        self.values.push_back(value);
        self.touch();
    }

    /// Prepend at the front
    pub fn push_front(&mut self, value: f64) {
        self.values.push_front(value);
        self.touch();
    }

    /// Remove from the back
    pub fn pop_back(&mut self) -> Option<f64> {
        let value = self.values.pop_back();
        if value.is_some() {
            self.touch();
        }
        value
    }

    /// Remove from the front
    pub fn pop_front(&mut self) -> Option<f64> {
        let value = self.values.pop_front();
        if value.is_some() {
            self.touch();
        }
        value
    }

    /// Drop every value
    pub fn clear(&mut self) {
        self.values.clear();
        self.sorted.get_mut().values = None;
        self.touch();
    }

    /// Number of values held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.values.iter().copied()
    }

    /// Values in ascending order, sorting first if the snapshot is stale
    pub fn sorted(&self) -> Ref<'_, [f64]> {
        let stale = {
            let snapshot = self.sorted.borrow();
            snapshot.generation != self.generation || snapshot.values.is_none()
        };
        if stale {
            let mut snapshot = self.sorted.borrow_mut();
            let mut values: Vec<f64> = self.values.iter().copied().collect();
            values.sort_by(|a, b| a.total_cmp(b));
            log::trace!("rebuilt sorted snapshot of {} values", values.len());
            snapshot.values = Some(values);
            snapshot.generation = self.generation;
        }
        Ref::map(self.sorted.borrow(), |s| s.values.as_deref().unwrap_or(&[]))
    }

    /// Approximate heap plus inline size in bytes
    pub fn size_bytes(&self) -> usize {
        let snapshot = self
            .sorted
            .borrow()
            .values
            .as_ref()
            .map_or(0, |v| v.capacity());
        core::mem::size_of::<Self>()
            + (self.values.capacity() + snapshot) * core::mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deque_order() {
        let mut w = DataWindow::new();
        w.push_back(2.0);
        w.push_back(3.0);
        w.push_front(1.0);
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(w.pop_front(), Some(1.0));
        assert_eq!(w.pop_back(), Some(3.0));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_pop_empty() {
        let mut w = DataWindow::new();
        assert_eq!(w.pop_back(), None);
        assert_eq!(w.pop_front(), None);
    }

    #[test]
    fn test_sorted_snapshot() {
        let mut w = DataWindow::new();
        for v in [3.0, 1.0, 2.0] {
            w.push_back(v);
        }
        assert_eq!(&*w.sorted(), &[1.0, 2.0, 3.0]);
        // insertion order untouched
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_snapshot_invalidated_by_mutation() {
        let mut w = DataWindow::new();
        w.push_back(5.0);
        w.push_back(1.0);
        assert_eq!(&*w.sorted(), &[1.0, 5.0]);

        w.push_front(3.0);
        assert_eq!(&*w.sorted(), &[1.0, 3.0, 5.0]);

        w.pop_back();
        assert_eq!(&*w.sorted(), &[3.0, 5.0]);

        w.clear();
        assert!(w.sorted().is_empty());
    }

    #[test]
    fn test_sorted_handles_negative_zero_and_infinities() {
        let mut w = DataWindow::new();
        for v in [f64::INFINITY, 0.0, -1.0, f64::NEG_INFINITY] {
            w.push_back(v);
        }
        assert_eq!(
            &*w.sorted(),
            &[f64::NEG_INFINITY, -1.0, 0.0, f64::INFINITY]
        );
    }
}
