//! Array-backed binary min-heap with an in-place "update top" operation.
//!
//! `std::collections::BinaryHeap` can only replace its top through
//! `peek_mut`, and it orders through `Ord`. The merge needs a caller-supplied
//! predicate and replaces the top on every step, so it uses this heap.

/// A binary min-heap ordered by a `less_than` predicate passed to every
/// mutating call.
#[derive(Debug, Clone)]
pub struct ArrayHeap<T> {
    items: Vec<T>,
}

impl<T> ArrayHeap<T> {
    /// Build a heap from unordered items in O(n).
    pub fn heapify<F>(items: Vec<T>, less_than: &F) -> Self
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut heap = ArrayHeap { items };
        let len = heap.items.len();
        for i in (0..len / 2).rev() {
            heap.sift_down(i, less_than);
        }
        heap
    }

    /// Number of items in the heap.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The least item.
    pub fn top(&self) -> Option<&T> {
        self.items.first()
    }

    /// Mutable access to the least item. Call [`ArrayHeap::update_top`] after
    /// changing its ordering key.
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.first_mut()
    }

    /// Restore heap order after the top item changed.
    pub fn update_top<F>(&mut self, less_than: &F)
    where
        F: Fn(&T, &T) -> bool,
    {
        if !self.items.is_empty() {
            self.sift_down(0, less_than);
        }
    }

    /// Remove and return the least item.
    pub fn pop<F>(&mut self, less_than: &F) -> Option<T>
    where
        F: Fn(&T, &T) -> bool,
    {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        self.update_top(less_than);
        Some(top)
    }

    /// Add an item.
    pub fn push<F>(&mut self, item: T, less_than: &F)
    where
        F: Fn(&T, &T) -> bool,
    {
        self.items.push(item);
        let mut child = self.items.len() - 1;
        while child > 0 {
            let parent = (child - 1) / 2;
            if !less_than(&self.items[child], &self.items[parent]) {
                break;
            }
            self.items.swap(child, parent);
            child = parent;
        }
    }

    /// Consume the heap, returning its items in heap (not sorted) order.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn sift_down<F>(&mut self, mut parent: usize, less_than: &F)
    where
        F: Fn(&T, &T) -> bool,
    {
        let len = self.items.len();
        loop {
            let left = 2 * parent + 1;
            if left >= len {
                return;
            }
            let right = left + 1;
            let mut least = left;
            if right < len && less_than(&self.items[right], &self.items[left]) {
                least = right;
            }
            if !less_than(&self.items[least], &self.items[parent]) {
                return;
            }
            self.items.swap(parent, least);
            parent = least;
        }
    }
}
