//! Frontier priority queue for A*

use super::heap::{EmptyHeapError, MinHeap};

/// Priority queue of nodes keyed by their estimated total cost.
///
/// The same node may be inserted several times with different costs. Stale
/// entries stay in the queue; the search ignores them by comparing against
/// its own best-known cost table.
#[derive(Debug, Clone)]
pub(crate) struct PriorityQueue<T> {
    nodes: MinHeap<T, u32>,
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue
    pub(crate) fn new() -> Self {
        Self {
            nodes: MinHeap::with_capacity(64),
        }
    }

    /// Insert a node with the cost to reach it
    pub(crate) fn insert(&mut self, node: T, cost: u32) {
        self.nodes.push(node, cost);
    }

    /// Remove and return the cheapest node
    pub(crate) fn retrieve(&mut self) -> Result<T, EmptyHeapError> {
        self.nodes.pop()
    }

    /// Whether no nodes remain
    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of queued entries, stale duplicates included
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
