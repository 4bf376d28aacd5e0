//! An indexed binary min-heap. Every item may appear at most once; a position index makes
//! re-keying and arbitrary removal `O(log n)`.
use fxhash::FxHashMap;
use std::cmp::Ordering;
use std::hash::Hash;

#[derive(Clone, Debug)]
struct Entry<T, K> {
    item: T,
    key: K,
    sequence: u64,
}

impl<T, K: PartialOrd> Entry<T, K> {
    /// Smaller key first; equal (or incomparable) keys come out in insertion order.
    fn precedes(&self, other: &Self) -> bool {
        match self.key.partial_cmp(&other.key) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            _ => self.sequence < other.sequence,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PriorityQueue<T, K> {
    heap: Vec<Entry<T, K>>,
    positions: FxHashMap<T, usize>,
    sequence: u64,
}

impl<T, K> Default for PriorityQueue<T, K>
where
    T: Eq + Hash + Clone,
    K: PartialOrd + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> PriorityQueue<T, K>
where
    T: Eq + Hash + Clone,
    K: PartialOrd + Copy,
{
    pub fn new() -> Self {
        PriorityQueue {
            heap: Vec::new(),
            positions: FxHashMap::default(),
            sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    /// The key an item is currently queued under.
    pub fn key_of(&self, item: &T) -> Option<K> {
        self.positions.get(item).map(|&i| self.heap[i].key)
    }

    /// Inserts an item, or re-keys it if it is already queued.
    pub fn enqueue(&mut self, item: T, key: K) {
        let sequence = self.sequence;
        self.sequence += 1;
        if let Some(&i) = self.positions.get(&item) {
            self.heap[i].key = key;
            self.heap[i].sequence = sequence;
            self.restore(i);
            return;
        }
        let i = self.heap.len();
        self.positions.insert(item.clone(), i);
        self.heap.push(Entry {
            item,
            key,
            sequence,
        });
        self.sift_up(i);
    }

    /// Removes and returns the item with the smallest key together with that key.
    pub fn pop(&mut self) -> Option<(T, K)> {
        if self.heap.is_empty() {
            return None;
        }
        let entry = self.take(0);
        Some((entry.item, entry.key))
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.pop().map(|(item, _)| item)
    }

    pub fn peek(&self) -> Option<(&T, K)> {
        self.heap.first().map(|e| (&e.item, e.key))
    }

    pub fn peek_key(&self) -> Option<K> {
        self.heap.first().map(|e| e.key)
    }

    /// Drops an item wherever it sits in the heap. Absent items are a no-op.
    pub fn remove(&mut self, item: &T) -> Option<K> {
        let i = *self.positions.get(item)?;
        Some(self.take(i).key)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.positions.clear();
        self.sequence = 0;
    }

    fn take(&mut self, i: usize) -> Entry<T, K> {
        let entry = self.heap.swap_remove(i);
        self.positions.remove(&entry.item);
        if i < self.heap.len() {
            if let Some(p) = self.positions.get_mut(&self.heap[i].item) {
                *p = i;
            }
            self.restore(i);
        }
        entry
    }

    fn restore(&mut self, i: usize) {
        if i > 0 && self.heap[i].precedes(&self.heap[(i - 1) / 2]) {
            self.sift_up(i);
        } else {
            self.sift_down(i);
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < n && self.heap[left].precedes(&self.heap[smallest]) {
                smallest = left;
            }
            if right < n && self.heap[right].precedes(&self.heap[smallest]) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        if let Some(p) = self.positions.get_mut(&self.heap[a].item) {
            *p = a;
        }
        if let Some(p) = self.positions.get_mut(&self.heap[b].item) {
            *p = b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut PriorityQueue<char, (f64, f64)>) -> Vec<char> {
        std::iter::from_fn(|| queue.dequeue()).collect()
    }

    #[test]
    fn orders_keys_lexicographically() {
        let mut queue = PriorityQueue::new();
        queue.enqueue('a', (2.0, 1.0));
        queue.enqueue('b', (1.0, 5.0));
        queue.enqueue('c', (1.0, 2.0));
        queue.enqueue('d', (f64::INFINITY, 0.0));
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.peek_key(), Some((1.0, 2.0)));
        assert_eq!(drain(&mut queue), vec!['c', 'b', 'a', 'd']);
        assert!(queue.is_empty());
        assert_eq!(queue.peek_key(), None);
    }

    #[test]
    fn equal_keys_come_out_in_insertion_order() {
        let mut queue = PriorityQueue::new();
        for c in ['x', 'y', 'z'] {
            queue.enqueue(c, (1.0, 1.0));
        }
        assert_eq!(drain(&mut queue), vec!['x', 'y', 'z']);
    }

    #[test]
    fn remove_and_rekey() {
        let mut queue = PriorityQueue::new();
        for (i, c) in ['a', 'b', 'c', 'd', 'e'].into_iter().enumerate() {
            queue.enqueue(c, (i as f64, 0.0));
        }
        assert_eq!(queue.remove(&'a'), Some((0.0, 0.0)));
        assert_eq!(queue.remove(&'a'), None);
        assert!(!queue.contains(&'a'));
        queue.enqueue('e', (-1.0, 0.0));
        assert_eq!(queue.key_of(&'e'), Some((-1.0, 0.0)));
        assert_eq!(queue.len(), 4);
        queue.enqueue('b', (10.0, 0.0));
        assert_eq!(queue.pop(), Some(('e', (-1.0, 0.0))));
        assert_eq!(drain(&mut queue), vec!['c', 'd', 'b']);
    }

    #[test]
    fn clear_empties_everything() {
        let mut queue = PriorityQueue::new();
        queue.enqueue(1, (1.0, 1.0));
        queue.enqueue(2, (0.5, 1.0));
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.contains(&2));
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn heap_stays_consistent_under_churn() {
        let mut queue = PriorityQueue::new();
        for i in 0..100u32 {
            queue.enqueue(i, ((i * 37 % 101) as f64, 0.0));
        }
        for i in (0..100u32).step_by(3) {
            queue.remove(&i);
        }
        for i in (1..100u32).step_by(7) {
            queue.enqueue(i, ((i % 13) as f64, 1.0));
        }
        let mut last = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        while let Some((_, key)) = queue.pop() {
            assert!(last <= key);
            last = key;
        }
    }
}
