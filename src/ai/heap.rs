//! Array-backed binary min-heap
//!
//! Backs the A* frontier. Items are popped in ascending priority order;
//! equal priorities pop in insertion order so searches are reproducible.

use std::fmt;

/// Error returned when popping from an empty heap or queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyHeapError;

impl fmt::Display for EmptyHeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pop from an empty heap")
    }
}

impl std::error::Error for EmptyHeapError {}

/// A heap slot: priority, insertion sequence, item
#[derive(Debug, Clone)]
struct Entry<T, P> {
    priority: P,
    seq: u64,
    item: T,
}

impl<T, P: PartialOrd> Entry<T, P> {
    /// Strict ordering used for sifting (priority first, then FIFO)
    fn precedes(&self, other: &Self) -> bool {
        match self.priority.partial_cmp(&other.priority) {
            Some(std::cmp::Ordering::Less) => true,
            Some(std::cmp::Ordering::Greater) => false,
            _ => self.seq < other.seq,
        }
    }
}

/// Binary min-heap keyed by a caller-supplied priority.
#[derive(Debug, Clone)]
pub(crate) struct MinHeap<T, P = u32> {
    entries: Vec<Entry<T, P>>,
    next_seq: u64,
}

impl<T, P: PartialOrd + Copy> MinHeap<T, P> {
    /// Create an empty heap with room for `capacity` items
    #[must_use]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// Insert an item with the given priority
    pub(crate) fn push(&mut self, item: T, priority: P) {
        self.entries.push(Entry {
            priority,
            seq: self.next_seq,
            item,
        });
        self.next_seq += 1;
        self.sift_up(self.entries.len() - 1);
    }

    /// Remove and return the lowest-priority item.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyHeapError`] if the heap holds no items.
    pub(crate) fn pop(&mut self) -> Result<T, EmptyHeapError> {
        self.pop_with_priority().map(|(item, _)| item)
    }

    /// Remove and return the lowest-priority item together with its priority.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyHeapError`] if the heap holds no items.
    pub(crate) fn pop_with_priority(&mut self) -> Result<(T, P), EmptyHeapError> {
        if self.entries.is_empty() {
            return Err(EmptyHeapError);
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let root = self.entries.pop().ok_or(EmptyHeapError)?;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Ok((root.item, root.priority))
    }

    /// Number of items in the heap
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the heap is empty
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].precedes(&self.entries[parent]) {
                self.entries.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.entries[left].precedes(&self.entries[smallest]) {
                smallest = left;
            }
            if right < len && self.entries[right].precedes(&self.entries[smallest]) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.entries.swap(index, smallest);
            index = smallest;
        }
    }
}
