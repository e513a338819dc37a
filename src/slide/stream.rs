use std::collections::VecDeque;

use super::SymbolRange;
use crate::error::{Error, Result};

/// Resident part of an unbounded symbol stream.
///
/// Items are pushed at the upper bound and popped at the lower bound; every
/// item keeps the absolute index it was pushed under.
#[derive(Debug, Clone, Default)]
pub struct Stream<T> {
    items: VecDeque<T>,
    lower: u64,
}

impl<T> Stream<T> {
    /// An empty stream starting at index zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            lower: 0,
        }
    }

    /// Index of the oldest resident item.
    #[must_use]
    pub const fn lower_bound(&self) -> u64 {
        self.lower
    }

    /// Index the next push will receive.
    #[must_use]
    pub fn upper_bound(&self) -> u64 {
        self.lower + self.items.len() as u64
    }

    /// Resident items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The resident index range.
    #[must_use]
    pub fn range(&self) -> SymbolRange {
        SymbolRange::new(self.lower, self.upper_bound())
    }

    /// True if `index` is resident.
    #[must_use]
    pub fn in_stream(&self, index: u64) -> bool {
        self.range().contains(index)
    }

    /// Moves the numbering origin. Only allowed while empty.
    pub fn set_lower_bound(&mut self, lower: u64) -> Result<()> {
        if !self.is_empty() {
            return Err(Error::invalid_state(
                "stream lower bound can only be set while the stream is empty",
            ));
        }
        self.lower = lower;
        Ok(())
    }

    /// Appends `item` and returns its index.
    pub fn push(&mut self, item: T) -> u64 {
        let index = self.upper_bound();
        self.items.push_back(item);
        index
    }

    /// Removes the oldest item.
    pub fn pop(&mut self) -> Option<(u64, T)> {
        let item = self.items.pop_front()?;
        let index = self.lower;
        self.lower += 1;
        Some((index, item))
    }

    /// Item at `index`, if resident.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&T> {
        let offset = index.checked_sub(self.lower)?;
        self.items.get(usize::try_from(offset).ok()?)
    }

    /// Mutable item at `index`, if resident.
    pub fn get_mut(&mut self, index: u64) -> Option<&mut T> {
        let offset = index.checked_sub(self.lower)?;
        self.items.get_mut(usize::try_from(offset).ok()?)
    }

    /// Resident items with their indices, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        (self.lower..).zip(self.items.iter())
    }

    /// Mutable resident items with their indices, oldest first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut T)> {
        (self.lower..).zip(self.items.iter_mut())
    }

    /// Drops every item and rewinds the origin to zero.
    pub fn clear(&mut self) {
        self.items.clear();
        self.lower = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_keeps_indices() {
        let mut stream = Stream::new();
        assert_eq!(stream.push('a'), 0);
        assert_eq!(stream.push('b'), 1);
        assert_eq!(stream.pop(), Some((0, 'a')));
        assert_eq!(stream.push('c'), 2);
        assert_eq!(stream.range(), SymbolRange::new(1, 3));
        assert_eq!(stream.get(2), Some(&'c'));
        assert_eq!(stream.get(0), None);
        assert!(stream.in_stream(1));
        let indices: Vec<u64> = stream.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn lower_bound_only_when_empty() {
        let mut stream = Stream::new();
        stream.set_lower_bound(100).expect("empty");
        assert_eq!(stream.push(()), 100);
        assert_eq!(
            stream.set_lower_bound(5).unwrap_err().kind(),
            crate::ErrorKind::InvalidState
        );
        stream.pop();
        stream.set_lower_bound(5).expect("empty again");
        assert_eq!(stream.upper_bound(), 5);
    }

    #[test]
    fn pop_empty_is_none() {
        let mut stream: Stream<u8> = Stream::new();
        assert!(stream.pop().is_none());
        assert_eq!(stream.lower_bound(), 0);
    }
}
