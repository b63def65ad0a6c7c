/*
Binary min-heap over vertex ids with a position index, so a vertex already in the
heap can have its priority lowered in O(log N) without searching for it.

Every vertex is in the heap at most once. `position[v]` is the slot holding `v`, or
`None` when `v` is absent, and `position[heap[i].0] == Some(i)` for every slot.
*/

use crate::error::{Error, Result};
use crate::graph::VertexId;

#[derive(Clone, Debug)]
pub struct IndexedMinHeap<P> {
    heap: Vec<(VertexId, P)>,
    position: Vec<Option<usize>>,
}

impl<P: PartialOrd + Copy> IndexedMinHeap<P> {
    /// A heap for vertex ids `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            position: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.position.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.slot(vertex).is_some()
    }

    /// Current priority of `vertex`, if it is in the heap.
    pub fn priority(&self, vertex: VertexId) -> Option<P> {
        self.slot(vertex).map(|i| self.heap[i].1)
    }

    pub fn peek(&self) -> Option<(VertexId, P)> {
        self.heap.first().copied()
    }

    /// Empties the heap but keeps its allocation.
    pub fn clear(&mut self) {
        for &(v, _) in &self.heap {
            self.position[v] = None;
        }
        self.heap.clear();
    }

    pub fn insert(&mut self, vertex: VertexId, priority: P) -> Result<()> {
        let capacity = self.capacity();
        match self.position.get(vertex) {
            None => return Err(Error::IndexOutOfRange { index: vertex, capacity }),
            Some(Some(_)) => return Err(Error::AlreadyPresent(vertex)),
            Some(None) => {}
        }
        let i = self.heap.len();
        self.heap.push((vertex, priority));
        self.position[vertex] = Some(i);
        self.sift_up(i);
        Ok(())
    }

    /// Lowers the priority of `vertex`. Returns false, leaving the heap untouched,
    /// if the vertex is absent or `priority` is not strictly smaller.
    pub fn decrease_key(&mut self, vertex: VertexId, priority: P) -> bool {
        match self.slot(vertex) {
            Some(i) if priority < self.heap[i].1 => {
                self.heap[i].1 = priority;
                self.sift_up(i);
                true
            }
            _ => false,
        }
    }

    /// Inserts `vertex` if absent, otherwise lowers its priority.
    pub fn push_or_decrease(&mut self, vertex: VertexId, priority: P) -> Result<()> {
        if self.contains(vertex) {
            self.decrease_key(vertex, priority);
            Ok(())
        } else {
            self.insert(vertex, priority)
        }
    }

    pub fn extract_min(&mut self) -> Result<(VertexId, P)> {
        if self.heap.is_empty() {
            return Err(Error::EmptyHeap);
        }
        let min = self.heap.swap_remove(0);
        self.position[min.0] = None;
        if let Some(&(moved, _)) = self.heap.first() {
            self.position[moved] = Some(0);
            self.sift_down(0);
        }
        Ok(min)
    }

    /// Checks the heap order and the position index against each other.
    pub fn is_consistent(&self) -> bool {
        let ordered = (1..self.heap.len()).all(|i| !(self.heap[i].1 < self.heap[(i - 1) / 2].1));
        let indexed = self
            .heap
            .iter()
            .enumerate()
            .all(|(i, &(v, _))| self.position.get(v) == Some(&Some(i)));
        let present = self.position.iter().filter(|p| p.is_some()).count();
        ordered && indexed && present == self.heap.len()
    }

    fn slot(&self, vertex: VertexId) -> Option<usize> {
        self.position.get(vertex).copied().flatten()
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.position[self.heap[i].0] = Some(i);
        self.position[self.heap[j].0] = Some(j);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !(self.heap[i].1 < self.heap[parent].1) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let (left, right) = (2 * i + 1, 2 * i + 2);
            let mut smallest = i;
            if left < len && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < len && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_priority_order() {
        let mut heap = IndexedMinHeap::new(5);
        heap.insert(0, 10.0).unwrap();
        heap.insert(3, 5.0).unwrap();
        heap.insert(2, 7.5).unwrap();
        heap.insert(4, 8.0).unwrap();
        assert!(heap.is_consistent());
        assert_eq!(heap.len(), 4);

        let mut order = Vec::new();
        while !heap.is_empty() {
            order.push(heap.extract_min().unwrap().0);
            assert!(heap.is_consistent());
        }
        assert_eq!(order, vec![3, 2, 4, 0]);
    }

    #[test]
    fn decrease_key_moves_vertex_up() {
        let mut heap = IndexedMinHeap::new(5);
        heap.insert(0, 10.0).unwrap();
        heap.insert(3, 5.0).unwrap();
        heap.insert(4, 8.0).unwrap();

        assert!(heap.decrease_key(4, 2.5));
        assert!(heap.is_consistent());
        assert_eq!(heap.peek(), Some((4, 2.5)));

        // Not strictly smaller, or not present: no-op.
        assert!(!heap.decrease_key(4, 2.5));
        assert!(!heap.decrease_key(0, 11.0));
        assert!(!heap.decrease_key(1, 0.0));
        assert_eq!(heap.priority(0), Some(10.0));
    }

    #[test]
    fn rejects_duplicates_and_out_of_range() {
        let mut heap = IndexedMinHeap::new(2);
        heap.insert(1, 1.0).unwrap();
        assert!(matches!(heap.insert(1, 0.5), Err(Error::AlreadyPresent(1))));
        assert!(matches!(
            heap.insert(2, 0.5),
            Err(Error::IndexOutOfRange { index: 2, capacity: 2 })
        ));
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn extract_from_empty_heap_fails() {
        let mut heap: IndexedMinHeap<f64> = IndexedMinHeap::new(3);
        assert!(matches!(heap.extract_min(), Err(Error::EmptyHeap)));

        heap.insert(2, 1.0).unwrap();
        assert_eq!(heap.extract_min().unwrap(), (2, 1.0));
        assert!(!heap.contains(2));
        assert!(matches!(heap.extract_min(), Err(Error::EmptyHeap)));
        // An extracted vertex may come back.
        heap.insert(2, 3.0).unwrap();
        assert_eq!(heap.priority(2), Some(3.0));
    }

    #[test]
    fn push_or_decrease_keeps_single_entry() {
        let mut heap = IndexedMinHeap::new(4);
        heap.push_or_decrease(1, 9.0).unwrap();
        heap.push_or_decrease(1, 4.0).unwrap();
        heap.push_or_decrease(1, 6.0).unwrap();
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.priority(1), Some(4.0));
    }

    #[test]
    fn clear_resets_positions() {
        let mut heap = IndexedMinHeap::new(4);
        for v in 0..4 {
            heap.insert(v, v as f64).unwrap();
        }
        heap.clear();
        assert!(heap.is_empty());
        assert!(heap.is_consistent());
        heap.insert(3, 0.0).unwrap();
        assert_eq!(heap.peek(), Some((3, 0.0)));
    }
}
