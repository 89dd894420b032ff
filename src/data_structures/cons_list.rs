use std::rc::Rc;

/// A persistent singly-linked list.
///
/// Prepending shares the existing list as the tail, so sibling branches of a
/// backtracking search can each extend a common prefix without copying it or
/// undoing anything when they are done.
#[derive(Debug)]
pub struct ConsList<T> {
    head: Option<Rc<Cell<T>>>,
}

#[derive(Debug)]
struct Cell<T> {
    value: T,
    tail: Option<Rc<Cell<T>>>,
}

impl<T> ConsList<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self { head: None }
    }

    /// A new list with `value` in front of this one.
    #[must_use]
    pub fn prepend(&self, value: T) -> Self {
        Self {
            head: Some(Rc::new(Cell {
                value,
                tail: self.head.clone(),
            })),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.head.as_ref().map(|cell| &cell.value)
    }

    /// Values from the most recently prepended one.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl<T: PartialEq> ConsList<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }
}

impl<T> Clone for ConsList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Default for ConsList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Drop for ConsList<T> {
    /// Unlinks uniquely owned cells one at a time, so long lists don't
    /// overflow the stack through recursive drops.
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(cell) = next {
            match Rc::try_unwrap(cell) {
                Ok(mut cell) => next = cell.tail.take(),
                Err(_shared) => break,
            }
        }
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Cell<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let cell = self.next?;
        self.next = cell.tail.as_deref();
        Some(&cell.value)
    }
}
