//! LIFO stack with indexed access counted from the top.

use std::fmt;

/// A stack whose slots can be observed, replaced or removed at any depth.
///
/// Index `0` is always the top. Each slot owns its element, so for handle
/// types such as [`Claim`](crate::Claim) a slot holds exactly one claim and
/// every removal path (`pop`, `remove`, `clear`, drop) releases it.
///
/// # Examples
///
/// ```
/// use core_types::RandomAccessStack;
///
/// let mut stack = RandomAccessStack::new();
/// stack.push('a');
/// stack.push('b');
/// stack.push('c');
///
/// assert_eq!(stack.peek(0), Some(&'c'));
/// assert_eq!(stack.remove(1), Some('b'));
/// assert_eq!(stack.count(), 2);
/// assert_eq!(stack.top(), Some(&'c'));
/// ```
#[derive(Clone, PartialEq)]
pub struct RandomAccessStack<T> {
    items: Vec<T>,
}

impl<T> RandomAccessStack<T> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty stack with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of occupied slots
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Push a new top item
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Pop the top item
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Observe the top item
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    /// Observe the item `index` slots below the top
    pub fn peek(&self, index: usize) -> Option<&T> {
        self.slot(index).map(|i| &self.items[i])
    }

    /// Mutably observe the item `index` slots below the top
    pub fn peek_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slot(index).map(move |i| &mut self.items[i])
    }

    /// Remove the item `index` slots below the top
    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slot(index).map(|i| self.items.remove(i))
    }

    /// Insert an item so that it ends up `index` slots below the top.
    ///
    /// `index == count()` inserts at the bottom. Returns the item back when
    /// the index is out of range.
    pub fn insert(&mut self, index: usize, item: T) -> Result<(), T> {
        if index > self.items.len() {
            return Err(item);
        }
        let at = self.items.len() - index;
        self.items.insert(at, item);
        Ok(())
    }

    /// Replace the item `index` slots below the top, returning the old one
    pub fn set(&mut self, index: usize, item: T) -> Result<T, T> {
        match self.slot(index) {
            Some(i) => Ok(std::mem::replace(&mut self.items[i], item)),
            None => Err(item),
        }
    }

    /// Release every slot
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove every item, yielding them from top to bottom
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..).rev()
    }

    /// Iterate from top to bottom
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter().rev()
    }

    fn slot(&self, index: usize) -> Option<usize> {
        if index < self.items.len() {
            Some(self.items.len() - 1 - index)
        } else {
            None
        }
    }
}

impl<T> Default for RandomAccessStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RandomAccessStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
