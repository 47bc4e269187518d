/*
Array-backed binary min-heap used as the Dijkstra frontier.

Items are stored by value (snapshots), so the same node may sit in the heap several
times with different keys. The caller decides which copies are stale when they come out.

Capacity starts at START_CAPACITY and doubles whenever an insert finds the array full.
It never shrinks. Reservations are fallible, so running out of memory is reported as an
error instead of aborting.
*/

use tracing::trace;

use crate::error::{Error, Result};
use crate::graph::{Distance, NodeId};

pub const START_CAPACITY: usize = 16;

/// Anything that can be ordered by a distance key.
pub trait Keyed {
    fn key(&self) -> Distance;
}

/// Snapshot of a node and the distance it had when it was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub node: NodeId,
    pub distance: Distance,
}

impl QueueEntry {
    pub fn new(node: NodeId, distance: Distance) -> Self {
        Self { node, distance }
    }
}

impl Keyed for QueueEntry {
    fn key(&self) -> Distance {
        self.distance
    }
}

#[cfg(test)]
impl Keyed for Distance {
    fn key(&self) -> Distance {
        *self
    }
}

#[derive(Debug)]
pub struct PriorityQueue<T> {
    items: Vec<T>,
    capacity: usize,
}

#[inline(always)]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

impl<T: Keyed> PriorityQueue<T> {
    pub fn new() -> Result<Self> {
        Self::with_capacity(START_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|e| Error::allocation("priority queue", capacity, e))?;
        Ok(Self { items, capacity })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slots available before the next doubling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn grow(&mut self) -> Result<()> {
        let new_capacity = self.capacity * 2;
        self.items
            .try_reserve_exact(new_capacity - self.items.len())
            .map_err(|e| Error::allocation("priority queue", new_capacity, e))?;
        trace!(from = self.capacity, to = new_capacity, "priority queue grew");
        self.capacity = new_capacity;
        Ok(())
    }

    pub fn insert(&mut self, item: T) -> Result<()> {
        if self.items.len() == self.capacity {
            self.grow()?;
        }
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
        Ok(())
    }

    /// Removes and returns the item with the smallest key, or `None` when empty.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let min = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    pub fn peek_min(&self) -> Option<&T> {
        self.items.first()
    }

    /// Calls `visit(index, item)` for every item in array order. The order is the
    /// heap layout, not sorted order.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &T),
    {
        for (i, item) in self.items.iter().enumerate() {
            visit(i, item);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            if self.items[i].key() < self.items[p].key() {
                self.items.swap(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;

            if left < len && self.items[left].key() < self.items[smallest].key() {
                smallest = left;
            }
            // Strict comparison keeps the left child on ties.
            if right < len && self.items[right].key() < self.items[smallest].key() {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.items.swap(i, smallest);
            i = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_heap_property<T: Keyed>(queue: &PriorityQueue<T>) {
        let keys: Vec<Distance> = queue.iter().map(Keyed::key).collect();
        for i in 1..keys.len() {
            assert!(
                keys[parent(i)] <= keys[i],
                "parent {} at {} > child {} at {}",
                keys[parent(i)],
                parent(i),
                keys[i],
                i
            );
        }
    }

    fn drain(queue: &mut PriorityQueue<Distance>) -> Vec<Distance> {
        let mut out = Vec::new();
        while let Some(key) = queue.extract_min() {
            out.push(key);
        }
        out
    }

    #[test]
    fn it_works() {
        let mut queue = PriorityQueue::new().unwrap();
        queue.insert(QueueEntry::new(0, 10)).unwrap();
        queue.insert(QueueEntry::new(1, 3)).unwrap();
        queue.insert(QueueEntry::new(2, 7)).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek_min(), Some(&QueueEntry::new(1, 3)));
        assert_eq!(queue.extract_min(), Some(QueueEntry::new(1, 3)));
        assert_eq!(queue.extract_min(), Some(QueueEntry::new(2, 7)));
        assert_eq!(queue.extract_min(), Some(QueueEntry::new(0, 10)));
        assert_eq!(queue.extract_min(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue() {
        let mut queue: PriorityQueue<QueueEntry> = PriorityQueue::new().unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek_min(), None);
        assert_eq!(queue.extract_min(), None);
        assert_eq!(queue.capacity(), START_CAPACITY);
    }

    #[test]
    fn sorted_reverse_and_duplicate_input() {
        let inputs: Vec<Vec<Distance>> = vec![
            (0..50).collect(),
            (0..50).rev().collect(),
            vec![5; 40],
            vec![3, 1, 3, 1, 2, 2, 0, 3, 1, 0],
        ];
        for input in inputs {
            let mut queue = PriorityQueue::new().unwrap();
            for &key in &input {
                queue.insert(key).unwrap();
                assert_heap_property(&queue);
            }
            let mut expected = input.clone();
            expected.sort();
            assert_eq!(drain(&mut queue), expected);
        }
    }

    #[test]
    fn random_inserts_and_extracts_keep_heap_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue: PriorityQueue<Distance> = PriorityQueue::new().unwrap();
        let mut shadow: Vec<Distance> = Vec::new();
        for _ in 0..2_000 {
            if rng.gen_bool(0.6) || shadow.is_empty() {
                let key: Distance = rng.gen_range(0..100);
                queue.insert(key).unwrap();
                shadow.push(key);
            } else {
                shadow.sort_unstable_by(|a, b| b.cmp(a));
                assert_eq!(queue.extract_min(), shadow.pop());
            }
            assert_heap_property(&queue);
            assert_eq!(queue.len(), shadow.len());
        }
    }

    #[test]
    fn growth_keeps_everything() {
        let mut queue = PriorityQueue::new().unwrap();
        for key in (0..START_CAPACITY as Distance).rev() {
            queue.insert(key).unwrap();
        }
        assert_eq!(queue.capacity(), START_CAPACITY);

        queue.insert(1_000).unwrap();
        assert_eq!(queue.capacity(), 2 * START_CAPACITY);

        for key in 0..100 {
            queue.insert(key * 3).unwrap();
        }
        assert_eq!(queue.len(), START_CAPACITY + 101);
        assert_eq!(queue.capacity(), 8 * START_CAPACITY);
        assert_heap_property(&queue);

        let drained = drain(&mut queue);
        assert_eq!(drained.len(), START_CAPACITY + 101);
        assert!(drained.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(drained.last(), Some(&1_000));
        // Capacity never shrinks.
        assert_eq!(queue.capacity(), 8 * START_CAPACITY);
    }

    #[test]
    fn small_start_capacity_doubles() {
        let mut queue = PriorityQueue::with_capacity(0).unwrap();
        assert_eq!(queue.capacity(), 1);
        for key in [4, 2, 9] {
            queue.insert(key).unwrap();
        }
        assert_eq!(queue.capacity(), 4);
        assert_eq!(drain(&mut queue), vec![2, 4, 9]);
    }

    #[test]
    fn for_each_visits_heap_order() {
        let mut queue: PriorityQueue<Distance> = PriorityQueue::new().unwrap();
        for key in [5, 3, 8, 1] {
            queue.insert(key).unwrap();
        }
        let mut seen = Vec::new();
        queue.for_each(|i, key| seen.push((i, *key)));
        // 5 -> [5]; 3 -> [3, 5]; 8 -> [3, 5, 8]; 1 -> [1, 3, 8, 5]
        assert_eq!(seen, vec![(0, 1), (1, 3), (2, 8), (3, 5)]);
    }

    #[test]
    fn equal_keys_prefer_left_child() {
        let mut queue = PriorityQueue::new().unwrap();
        for (node, distance) in [(0, 0), (1, 2), (2, 2), (3, 9)] {
            queue.insert(QueueEntry::new(node, distance)).unwrap();
        }
        // Root removed, 3 moves to the top and sinks towards the left child.
        assert_eq!(queue.extract_min(), Some(QueueEntry::new(0, 0)));
        assert_eq!(queue.peek_min(), Some(&QueueEntry::new(1, 2)));
        let layout: Vec<_> = queue.iter().map(|e| e.node).collect();
        assert_eq!(layout, vec![1, 3, 2]);
    }
}
