use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::QueueError;
use crate::heap_primitives;
use crate::heap_primitives::BINARY;

type HeapIndex = usize;

#[inline(always)]
#[must_use]
fn up(i: HeapIndex) -> HeapIndex {
    heap_primitives::parent::<BINARY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: HeapIndex) -> HeapIndex {
    heap_primitives::first_child::<BINARY>(i)
}
#[inline(always)]
#[must_use]
fn down_right(i: HeapIndex) -> HeapIndex {
    heap_primitives::last_child::<BINARY>(i)
}

/// Decides which of two priorities goes first.
///
/// `Greater` means `a` should be dequeued before `b`.
pub trait PriorityOrder<P> {
    fn compare(&self, a: &P, b: &P) -> Ordering;
}

/// Dequeues the greatest priority first.
#[derive(Copy, Clone, Debug, Default)]
pub struct MaxFirst;
impl<P: Ord> PriorityOrder<P> for MaxFirst {
    #[inline(always)]
    fn compare(&self, a: &P, b: &P) -> Ordering {
        a.cmp(b)
    }
}

/// Dequeues the smallest priority first.
#[derive(Copy, Clone, Debug, Default)]
pub struct MinFirst;
impl<P: Ord> PriorityOrder<P> for MinFirst {
    #[inline(always)]
    fn compare(&self, a: &P, b: &P) -> Ordering {
        b.cmp(a)
    }
}

/// Orders priorities with a comparison function.
#[derive(Copy, Clone)]
pub struct ByComparer<F>(pub F);
impl<P, F> PriorityOrder<P> for ByComparer<F>
where
    F: Fn(&P, &P) -> Ordering,
{
    #[inline(always)]
    fn compare(&self, a: &P, b: &P) -> Ordering {
        (self.0)(a, b)
    }
}
impl<F> Debug for ByComparer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ByComparer")
    }
}

/// Binary max-heap of `(element, priority)` pairs with an element index.
///
/// The index maps every enqueued element to its heap slot, which allows
/// finding an element's priority in constant time and re-ranking it without a
/// linear search.
///
/// ```pseudocode
/// for (i, (e, _p)) in self.heap.enumerate():
///   assert_eq(self.index[e], i)
/// ```
///
/// All heap mutation goes through `_unsafe_swap`, which moves both the slots
/// and their index entries, so both structures never drift apart.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct KeyedPriorityQueue<E, P, O = MaxFirst>
where
    E: Clone + Eq + Hash,
    O: PriorityOrder<P>,
{
    heap: Vec<(E, P)>,
    index: FxHashMap<E, HeapIndex>,
    order: O,
}

impl<E, P, O> KeyedPriorityQueue<E, P, O>
where
    E: Clone + Eq + Hash,
    O: PriorityOrder<P> + Default,
{
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(O::default())
    }
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut queue = Self::new();
        queue.heap.reserve(capacity);
        queue.index.reserve(capacity);
        queue
    }
}

impl<E, P, O> KeyedPriorityQueue<E, P, O>
where
    E: Clone + Eq + Hash,
    O: PriorityOrder<P>,
{
    #[must_use]
    pub fn with_comparer(order: O) -> Self {
        Self {
            heap: vec![],
            index: FxHashMap::default(),
            order,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    #[inline(always)]
    pub fn contains(&self, element: &E) -> bool {
        self.index.contains_key(element)
    }
    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }
    /// Enqueued pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&E, &P)> {
        self.heap.iter().map(|(e, p)| (e, p))
    }

    /// Adds a new element.
    ///
    /// Elements can be enqueued only once. Use
    /// [`KeyedPriorityQueue::increase_priority`] to re-rank them.
    pub fn enqueue(&mut self, element: E, priority: P) -> Result<(), QueueError> {
        if self.index.contains_key(&element) {
            return Err(QueueError::DuplicateElement);
        }
        self.verify_heap();

        let heap_index = self.heap.len(); // Future heap_index
        self.index.insert(element.clone(), heap_index);
        self.heap.push((element, priority));
        self._unsafe_sift_up(heap_index);

        self.verify_heap();
        Ok(())
    }

    /// Removes the element that goes first.
    pub fn dequeue(&mut self) -> Result<(E, P), QueueError> {
        if self.heap.is_empty() {
            return Err(QueueError::Empty);
        }
        self.verify_heap();

        let last = self.heap.len() - 1;
        if last != 0 {
            self._unsafe_swap(0, last);
        }
        let (element, priority) = self.heap.pop().ok_or(QueueError::Empty)?;
        let removed = self.index.remove(&element);
        debug_assert_eq!(removed, Some(last), "Popped node is out of sync");
        if !self.heap.is_empty() {
            self._unsafe_sift_down(0);
        }

        self.verify_heap();
        Ok((element, priority))
    }

    /// The element that goes first and its priority.
    pub fn peek(&self) -> Result<(&E, &P), QueueError> {
        self.heap
            .first()
            .map(|(e, p)| (e, p))
            .ok_or(QueueError::Empty)
    }

    pub fn try_get_priority(&self, element: &E) -> Option<&P> {
        let heap_index = *self.index.get(element)?;
        Some(&self.heap[heap_index].1)
    }

    /// Moves an element closer to the top.
    ///
    /// The new priority must not go after the current one. Decreasing
    /// priorities is rejected instead of leaving the heap misordered.
    pub fn increase_priority(&mut self, element: &E, priority: P) -> Result<(), QueueError> {
        let heap_index = *self.index.get(element).ok_or(QueueError::NotFound)?;
        if self.order.compare(&priority, &self.heap[heap_index].1) == Ordering::Less {
            return Err(QueueError::PriorityDecrease);
        }
        self.verify_heap();

        self.heap[heap_index].1 = priority;
        self._unsafe_sift_up(heap_index);

        self.verify_heap();
        Ok(())
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        debug_assert!(self.invariants_hold(), "Heap invariants are broken");
    }

    /// Checks heap order and index consistency.
    #[cfg(any(test, feature = "verify"))]
    pub(crate) fn invariants_hold(&self) -> bool {
        if self.index.len() != self.heap.len() {
            return false;
        }
        // Every node,
        for (i, (e, p)) in self.heap.iter().enumerate() {
            // - Has the right index set.
            if self.index.get(e) != Some(&i) {
                return false;
            }
            // - Does not go before its parent node, if any.
            if i != 0 && self.order.compare(p, &self.heap[up(i)].1) == Ordering::Greater {
                return false;
            }
        }
        true
    }

    // Implementation details

    /// Whether slot `l` should go before slot `r`.
    #[inline(always)]
    fn _goes_before(&self, l: HeapIndex, r: HeapIndex) -> bool {
        self.order.compare(&self.heap[l].1, &self.heap[r].1) == Ordering::Greater
    }

    /// Raises a node
    /// Returns it's new index
    #[inline(always)]
    fn _unsafe_sift_up(&mut self, index: HeapIndex) -> HeapIndex {
        debug_assert!(
            index < self.heap.len(),
            "Node is way out of sync. Index out of bounds..."
        );

        let mut pos = index;
        while pos != 0 {
            let parent = up(pos);
            if !self._goes_before(pos, parent) {
                break;
            }
            self._unsafe_swap(parent, pos);
            pos = parent;
        }
        pos
    }

    /// Lowers a node
    /// Returns it's new index
    #[inline(always)]
    fn _unsafe_sift_down(&mut self, mut index: HeapIndex) -> HeapIndex {
        let len = self.heap.len();
        debug_assert!(
            index < len,
            "Node is way out of sync. Index out of bounds..."
        );

        loop {
            // Find the best child
            let left = down_left(index);
            if left >= len {
                break;
            }
            let right = down_right(index);
            let child = if right < len && self._goes_before(right, left) {
                right
            } else {
                left
            };

            if !self._goes_before(child, index) {
                break;
            }
            self._unsafe_swap(index, child);
            index = child;
        }
        index
    }

    /// Swaps two elements in the heap.
    ///
    /// For consistency in calling code `l < r` is checked.
    ///
    /// Keeps the index in sync for both slots.
    #[inline(always)]
    fn _unsafe_swap(&mut self, l: HeapIndex, r: HeapIndex) {
        debug_assert!(l < r, "Swap({l}, {r}) uses wrong argument order");

        let len = self.heap.len();
        debug_assert!(l < len, "Left  swap index {l} is OUT OF BOUNDS({len})");
        debug_assert!(r < len, "Right swap index {r} is OUT OF BOUNDS({len})");
        self.heap.swap(l, r);
        for i in [l, r] {
            match self.index.get_mut(&self.heap[i].0) {
                Some(heap_index) => *heap_index = i,
                None => unreachable!("Heap slot {i} holds an element missing from the index"),
            }
        }
    }
}

impl<E, P, O> Default for KeyedPriorityQueue<E, P, O>
where
    E: Clone + Eq + Hash,
    O: PriorityOrder<P> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn heap_works() {
        let mut heap = KeyedPriorityQueue::<&str, u32>::new();

        heap.enqueue("aoeu", 3).unwrap();
        assert_eq!(heap.peek(), Ok((&"aoeu", &3)));
        assert_eq!(heap.dequeue(), Ok(("aoeu", 3)));
        assert!(heap.is_empty());
    }

    #[test]
    fn heap_sorts() {
        let mut heap = KeyedPriorityQueue::<char, u32>::new();

        for (e, p) in [('c', 3), ('e', 5), ('f', 6), ('a', 1), ('d', 4), ('b', 2)] {
            heap.enqueue(e, p).unwrap();
            assert!(heap.invariants_hold());
        }

        for expected in ['f', 'e', 'd', 'c', 'b', 'a'] {
            assert_eq!(heap.dequeue().unwrap().0, expected);
            assert!(heap.invariants_hold());
        }
    }

    #[test]
    fn min_first_sorts_ascending() {
        let mut heap = KeyedPriorityQueue::<u8, u32, MinFirst>::new();
        for (e, p) in [(0u8, 30), (1, 10), (2, 20)] {
            heap.enqueue(e, p).unwrap();
        }
        assert_eq!(heap.dequeue(), Ok((1, 10)));
        assert_eq!(heap.dequeue(), Ok((2, 20)));
        assert_eq!(heap.dequeue(), Ok((0, 30)));
    }

    #[test]
    fn custom_comparer_is_used() {
        // Longest string first.
        let mut heap = KeyedPriorityQueue::with_comparer(ByComparer(|a: &String, b: &String| {
            a.len().cmp(&b.len())
        }));
        heap.enqueue(1u8, "ab".to_string()).unwrap();
        heap.enqueue(2u8, "abcd".to_string()).unwrap();
        heap.enqueue(3u8, "a".to_string()).unwrap();
        assert_eq!(heap.dequeue().unwrap().0, 2u8);

        heap.increase_priority(&3u8, "abc".to_string()).unwrap();
        assert_eq!(heap.dequeue().unwrap().0, 3u8);
        assert_eq!(
            heap.increase_priority(&1u8, String::new()),
            Err(QueueError::PriorityDecrease)
        );
    }

    #[test]
    fn misuse_is_rejected() {
        let mut heap = KeyedPriorityQueue::<u8, u32>::new();
        assert_eq!(heap.dequeue(), Err(QueueError::Empty));
        assert_eq!(heap.peek(), Err(QueueError::Empty));
        assert_eq!(heap.increase_priority(&1, 3), Err(QueueError::NotFound));

        heap.enqueue(1, 10).unwrap();
        assert_eq!(heap.enqueue(1, 20), Err(QueueError::DuplicateElement));
        assert_eq!(heap.increase_priority(&1, 9), Err(QueueError::PriorityDecrease));

        // Failed operations leave the queue untouched.
        assert_eq!(heap.try_get_priority(&1), Some(&10));
        assert_eq!(heap.len(), 1);
        assert!(heap.invariants_hold());
    }

    #[test]
    fn increasing_to_the_same_priority_is_allowed() {
        let mut heap = KeyedPriorityQueue::<u8, u32>::new();
        heap.enqueue(1, 10).unwrap();
        assert_eq!(heap.increase_priority(&1, 10), Ok(()));
    }

    #[test]
    fn increase_priority_reorders() {
        let mut heap = KeyedPriorityQueue::<u32, u32>::new();
        for e in 0..64u32 {
            heap.enqueue(e, e).unwrap();
        }
        heap.increase_priority(&7, 1_000).unwrap();
        assert!(heap.invariants_hold());
        assert_eq!(heap.peek(), Ok((&7, &1_000)));
        assert_eq!(heap.try_get_priority(&7), Some(&1_000));
        assert_eq!(heap.dequeue(), Ok((7, 1_000)));
        assert_eq!(heap.dequeue(), Ok((63, 63)));
        assert!(!heap.contains(&7));
    }

    /// Runs random operations against a naive model of the queue.
    fn check_against_model(seed: u64, operations: usize, elements: u32) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut heap = KeyedPriorityQueue::<u32, u32>::new();
        let mut model = FxHashMap::<u32, u32>::default();

        for _ in 0..operations {
            match rng.random_range(0..3u8) {
                0 => {
                    let e = rng.random_range(0..elements);
                    let p = rng.random_range(0..1_000u32);
                    let expected = if model.contains_key(&e) {
                        Err(QueueError::DuplicateElement)
                    } else {
                        model.insert(e, p);
                        Ok(())
                    };
                    assert_eq!(heap.enqueue(e, p), expected);
                }
                1 => match model.values().max().copied() {
                    Some(max) => {
                        let (e, p) = heap.dequeue().unwrap();
                        assert_eq!(p, max);
                        assert_eq!(model.remove(&e), Some(p));
                    }
                    None => assert_eq!(heap.dequeue(), Err(QueueError::Empty)),
                },
                _ => {
                    let e = rng.random_range(0..elements);
                    let delta = rng.random_range(0..500u32);
                    match model.get_mut(&e) {
                        Some(p) => {
                            *p += delta;
                            assert_eq!(heap.increase_priority(&e, *p), Ok(()));
                        }
                        None => {
                            assert_eq!(heap.increase_priority(&e, delta), Err(QueueError::NotFound));
                        }
                    }
                }
            }

            assert!(heap.invariants_hold());
            assert_eq!(heap.len(), model.len());
            for (e, p) in &model {
                assert_eq!(heap.try_get_priority(e), Some(p));
            }
        }

        // Draining gives a non-increasing sequence matching a sort of the model.
        let mut expected: Vec<u32> = model.values().copied().collect();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        let mut drained = vec![];
        while let Ok((_, p)) = heap.dequeue() {
            drained.push(p);
        }
        assert_eq!(drained, expected);
    }

    #[test]
    fn random_operations_small() {
        for seed in 0..50u64 {
            check_against_model(seed, 200, 8);
        }
    }

    #[test]
    fn random_operations_large() {
        for seed in 0..5u64 {
            check_against_model(seed, 5_000, 256);
        }
    }
}
