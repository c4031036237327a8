//! Adaptable priority queue.
//!
//! A binary min-heap whose elements can be re-keyed or removed in O(log n) through the
//! [`Locator`] returned when they were added. The queue keeps one slot record per live
//! element holding the element's current position in the heap array, and every swap
//! rewrites the slot records of both elements it moves, so a locator never needs a search.
//!
//! # Example
//!
//! ```rust
//! use routemap::apq::AdaptablePriorityQueue;
//!
//! let mut open = AdaptablePriorityQueue::new();
//! let a = open.add(10, "a");
//! open.add(20, "b");
//! let c = open.add(30, "c");
//!
//! open.update_key(c, 1).unwrap();
//! assert_eq!(open.min().unwrap(), (&1, &"c"));
//! assert_eq!(open.remove(a).unwrap(), (10, "a"));
//! assert_eq!(open.len(), 2);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to one element of an [`AdaptablePriorityQueue`].
///
/// A locator stays valid until its element leaves the queue through `remove_min` or
/// `remove`. After that every operation given the locator fails with
/// [`Error::InvalidLocator`], even once the queue has reused the element's slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locator {
    queue: u64,
    slot: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    slot: usize,
}

#[derive(Debug)]
struct Slot {
    /// Position of the element in `heap`, `None` once it has been removed.
    index: Option<usize>,
    generation: u64,
}

/// Min-ordered binary heap over `(key, value)` pairs with locator-based updates.
#[derive(Debug)]
pub struct AdaptablePriorityQueue<K, V> {
    id: u64,
    heap: Vec<Node<K, V>>,
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl<K: Ord, V> AdaptablePriorityQueue<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed),
            heap: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Inserts `value` with priority `key` and returns its locator. O(log n).
    pub fn add(&mut self, key: K, value: V) -> Locator {
        let index = self.heap.len();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot].index = Some(index);
                slot
            }
            None => {
                self.slots.push(Slot {
                    index: Some(index),
                    generation: 0,
                });
                self.slots.len() - 1
            }
        };
        self.heap.push(Node { key, value, slot });
        self.bubble_up(index);
        Locator {
            queue: self.id,
            slot,
            generation: self.slots[slot].generation,
        }
    }

    /// Returns the minimum element without removing it.
    pub fn min(&self) -> Result<(&K, &V)> {
        self.heap
            .first()
            .map(|node| (&node.key, &node.value))
            .ok_or(Error::EmptyQueue)
    }

    /// Removes and returns the minimum element. O(log n).
    pub fn remove_min(&mut self) -> Result<(K, V)> {
        self.take(0).ok_or(Error::EmptyQueue)
    }

    /// Replaces the key of a live element and moves it up or down to restore heap order.
    pub fn update_key(&mut self, locator: Locator, key: K) -> Result<()> {
        let index = self.position(locator)?;
        self.heap[index].key = key;
        self.restore(index);
        Ok(())
    }

    pub fn get_key(&self, locator: Locator) -> Result<&K> {
        if self.heap.is_empty() {
            return Err(Error::EmptyQueue);
        }
        let index = self.position(locator)?;
        Ok(&self.heap[index].key)
    }

    pub fn get_value(&self, locator: Locator) -> Result<&V> {
        let index = self.position(locator)?;
        Ok(&self.heap[index].value)
    }

    /// Removes an arbitrary live element and returns its `(key, value)` pair. O(log n).
    pub fn remove(&mut self, locator: Locator) -> Result<(K, V)> {
        let index = self.position(locator)?;
        self.take(index).ok_or(Error::InvalidLocator)
    }

    pub fn contains(&self, locator: Locator) -> bool {
        self.position(locator).is_ok()
    }

    /// Heap position recorded for `locator`, checked against the element stored there.
    fn position(&self, locator: Locator) -> Result<usize> {
        if locator.queue != self.id {
            return Err(Error::InvalidLocator);
        }
        let slot = self.slots.get(locator.slot).ok_or(Error::InvalidLocator)?;
        if slot.generation != locator.generation {
            return Err(Error::InvalidLocator);
        }
        let index = slot.index.ok_or(Error::InvalidLocator)?;
        match self.heap.get(index) {
            Some(node) if node.slot == locator.slot => Ok(index),
            _ => Err(Error::InvalidLocator),
        }
    }

    /// Moves the element at `index` to the end of the array, drops it and repairs the hole.
    fn take(&mut self, index: usize) -> Option<(K, V)> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(index, last);
        let node = self.heap.pop()?;
        self.release(node.slot);
        if index < last {
            self.restore(index);
        }
        Some((node.key, node.value))
    }

    fn release(&mut self, slot: usize) {
        let record = &mut self.slots[slot];
        record.index = None;
        record.generation = record.generation.wrapping_add(1);
        self.free.push(slot);
    }

    /// The only place elements change position; keeps both slot records in step.
    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.heap.swap(i, j);
        self.slots[self.heap[i].slot].index = Some(i);
        self.slots[self.heap[j].slot].index = Some(j);
    }

    fn restore(&mut self, index: usize) {
        if index > 0 && self.heap[index].key < self.heap[(index - 1) / 2].key {
            self.bubble_up(index);
        } else {
            self.bubble_down(index);
        }
    }

    fn bubble_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].key < self.heap[parent].key {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn bubble_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.heap[left].key < self.heap[smallest].key {
                smallest = left;
            }
            if right < len && self.heap[right].key < self.heap[smallest].key {
                smallest = right;
            }

            if smallest != index {
                self.swap(index, smallest);
                index = smallest;
            } else {
                break;
            }
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        for (index, node) in self.heap.iter().enumerate() {
            if index > 0 {
                assert!(self.heap[(index - 1) / 2].key <= node.key, "heap order broken at {index}");
            }
            assert_eq!(self.slots[node.slot].index, Some(index), "stale slot for {index}");
        }
        let live = self.slots.iter().filter(|slot| slot.index.is_some()).count();
        assert_eq!(live, self.heap.len());
    }
}

impl<K: Ord, V> Default for AdaptablePriorityQueue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
