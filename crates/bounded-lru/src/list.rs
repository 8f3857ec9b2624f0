//! Recency list: a doubly-linked sequence with stable handles
//!
//! Links are indices into a slot arena rather than pointers, with a free
//! list recycling removed slots, so every operation is O(1) and safe Rust.

/// Sentinel for an absent link.
const NIL: usize = usize::MAX;

/// Stable handle to an element of an [`OrderedList`].
///
/// A handle is valid from the push that produced it until that element is
/// removed; the underlying slot may then be reused by a later push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

/// Mutable sequence with O(1) push at either end, O(1) remove-by-handle and
/// O(1) move-to-front.
#[derive(Debug)]
pub struct OrderedList<T> {
    slots: Vec<Slot<T>>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the first element, or `None` when empty.
    pub fn front(&self) -> Option<NodeId> {
        (self.head != NIL).then_some(NodeId(self.head))
    }

    /// Handle of the last element, or `None` when empty.
    pub fn back(&self) -> Option<NodeId> {
        (self.tail != NIL).then_some(NodeId(self.tail))
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.value.as_mut())
    }

    /// Inserts at the front; the returned handle is the new `front()`.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let idx = self.alloc(value);
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
        self.len += 1;
        NodeId(idx)
    }

    /// Inserts at the back; the returned handle is the new `back()`.
    pub fn push_back(&mut self, value: T) -> NodeId {
        let idx = self.alloc(value);
        self.slots[idx].next = NIL;
        self.slots[idx].prev = self.tail;
        if self.tail != NIL {
            self.slots[self.tail].next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
        self.len += 1;
        NodeId(idx)
    }

    /// Detaches the element at `id` and returns its value.
    ///
    /// Returns `None` for a handle whose element was already removed.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let idx = id.0;
        let occupied = self
            .slots
            .get(idx)
            .is_some_and(|slot| slot.value.is_some());
        if !occupied {
            return None;
        }
        self.unlink(idx);
        let value = self.slots[idx].value.take();
        // Recycle the slot through the free list.
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.free;
        self.free = idx;
        self.len -= 1;
        value
    }

    /// Moves the element at `id` to the front. No-op if `id` is stale or
    /// already the front.
    pub fn move_to_front(&mut self, id: NodeId) {
        let idx = id.0;
        if idx == self.head {
            return;
        }
        let occupied = self
            .slots
            .get(idx)
            .is_some_and(|slot| slot.value.is_some());
        if !occupied {
            return;
        }
        self.unlink(idx);
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        // The list still holds at least the old front here.
        self.slots[self.head].prev = idx;
        self.head = idx;
    }

    /// Iterates values front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    /// Detaches `idx` from the chain, patching neighbor links for all four
    /// positions: sole element, front, back, interior.
    fn unlink(&mut self, idx: usize) {
        let Slot { prev, next, .. } = self.slots[idx];
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
    }

    fn alloc(&mut self, value: T) -> usize {
        if self.free != NIL {
            let idx = self.free;
            self.free = self.slots[idx].next;
            self.slots[idx].value = Some(value);
            idx
        } else {
            self.slots.push(Slot {
                value: Some(value),
                prev: NIL,
                next: NIL,
            });
            self.slots.len() - 1
        }
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    next: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NIL {
            return None;
        }
        let slot = &self.list.slots[self.next];
        self.next = slot.next;
        slot.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Copy>(list: &OrderedList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_list() {
        let list: OrderedList<i32> = OrderedList::new();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert!(list.front().is_none());
        assert!(list.back().is_none());
    }

    #[test]
    fn test_push_and_remove_sequence() {
        let mut list = OrderedList::new();

        list.push_front(10); // [10]
        let middle = list.push_back(20); // [10, 20]
        list.push_back(30); // [10, 20, 30]
        assert_eq!(list.len(), 3);

        assert_eq!(list.remove(middle), Some(20)); // [10, 30]
        assert_eq!(list.len(), 2);

        for (i, v) in [40, 50, 60, 70, 80].into_iter().enumerate() {
            if i % 2 == 0 {
                list.push_front(v);
            } else {
                list.push_back(v);
            }
        } // [80, 60, 40, 10, 30, 50, 70]

        assert_eq!(list.len(), 7);
        assert_eq!(list.get(list.front().unwrap()), Some(&80));
        assert_eq!(list.get(list.back().unwrap()), Some(&70));

        list.move_to_front(list.front().unwrap()); // unchanged
        list.move_to_front(list.back().unwrap()); // [70, 80, 60, 40, 10, 30, 50]
        assert_eq!(collect(&list), vec![70, 80, 60, 40, 10, 30, 50]);
    }

    #[test]
    fn test_single_element_edges() {
        let mut list = OrderedList::new();

        let id = list.push_front(50);
        assert_eq!(list.front(), list.back());
        assert_eq!(list.remove(id), Some(50));
        assert_eq!(list.len(), 0);
        assert!(list.front().is_none());
        assert!(list.back().is_none());

        let id = list.push_back(60);
        assert_eq!(list.back(), list.front());
        let second = list.push_back(40);
        assert_eq!(list.remove(id), Some(60));
        assert_eq!(list.front(), Some(second));
        assert_eq!(list.back(), Some(second));
        assert_eq!(list.get(second), Some(&40));

        assert_eq!(list.remove(second), Some(40));
        assert_eq!(list.len(), 0);
        assert!(list.front().is_none());
        assert!(list.back().is_none());
    }

    #[test]
    fn test_stale_handle_is_noop() {
        let mut list = OrderedList::new();
        let id = list.push_front(1);
        assert_eq!(list.remove(id), Some(1));
        assert_eq!(list.remove(id), None);
        list.move_to_front(id);
        assert!(list.is_empty());
    }

    #[test]
    fn test_move_back_to_front() {
        let mut list = OrderedList::new();
        list.push_front(1); // [1]
        list.push_front(2); // [2, 1]
        assert_eq!(collect(&list), vec![2, 1]);

        list.move_to_front(list.back().unwrap()); // [1, 2]
        assert_eq!(collect(&list), vec![1, 2]);
        assert_eq!(list.get(list.back().unwrap()), Some(&2));
    }

    #[test]
    fn test_remove_last() {
        let mut list = OrderedList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3); // [3, 2, 1]

        assert_eq!(list.remove(list.back().unwrap()), Some(1)); // [3, 2]
        assert_eq!(collect(&list), vec![3, 2]);
        assert_eq!(list.get(list.front().unwrap()), Some(&3));
        assert_eq!(list.get(list.back().unwrap()), Some(&2));
    }

    #[test]
    fn test_remove_first() {
        let mut list = OrderedList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3); // [3, 2, 1]

        assert_eq!(list.remove(list.front().unwrap()), Some(3)); // [2, 1]
        assert_eq!(collect(&list), vec![2, 1]);
        assert_eq!(list.get(list.front().unwrap()), Some(&2));
        assert_eq!(list.get(list.back().unwrap()), Some(&1));
    }

    #[test]
    fn test_interior_remove_patches_links() {
        let mut list = OrderedList::new();
        let _a = list.push_back('a');
        let b = list.push_back('b');
        let _c = list.push_back('c'); // [a, b, c]

        assert_eq!(list.remove(b), Some('b'));
        assert_eq!(collect(&list), vec!['a', 'c']);

        // The freed slot is recycled by the next push.
        let d = list.push_back('d');
        assert_eq!(d, b);
        assert_eq!(collect(&list), vec!['a', 'c', 'd']);
    }
}
