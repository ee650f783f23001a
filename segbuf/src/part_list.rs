use crate::iter::{PartIter, PartRevIter, SpanIter};
use crate::part::Part;

/// Result of looking up an absolute offset in a `PartList`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The part at this index contains the offset
    Inside(usize),
    /// No part contains the offset; a new part would be inserted at this index
    Gap(usize),
}

/// Offset-ordered, non-overlapping sequence of parts.
///
/// Gaps between parts are sparse: nothing backs them until `Buffer`
/// materializes them. Part cursors are plain indices used as search hints;
/// a stale hint costs a walk, never a wrong answer.
#[derive(Debug, Default)]
pub struct PartList {
    parts: Vec<Part>,
}

impl PartList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Part> {
        self.parts.get_mut(index)
    }

    /// Finds the part containing `offset`, walking from `hint`.
    ///
    /// Walks backward while the candidate starts after `offset`, then forward
    /// while it ends at or before `offset`. Without a hint, starts from a
    /// binary search.
    #[must_use]
    pub fn locate(&self, offset: i64, hint: Option<usize>) -> Location {
        if self.parts.is_empty() {
            return Location::Gap(0);
        }
        let mut i = match hint {
            Some(hint) => hint.min(self.parts.len() - 1),
            None => self.parts.partition_point(|part| part.end() <= offset),
        };
        while i > 0 && self.parts.get(i).is_some_and(|part| part.start() > offset) {
            i -= 1;
        }
        while self.parts.get(i).is_some_and(|part| part.end() <= offset) {
            i += 1;
        }
        match self.parts.get(i) {
            Some(part) if part.contains(offset) => Location::Inside(i),
            _ => Location::Gap(i),
        }
    }

    /// Revalidates a cached part cursor against `offset`.
    ///
    /// Keeps the cursor if its part still contains `offset`, otherwise relocates
    /// it. On a gap the cursor is cleared.
    pub fn ensure_valid(&self, cursor: &mut Option<usize>, offset: i64) -> Location {
        if let Some(index) = *cursor {
            if self.parts.get(index).is_some_and(|part| part.contains(offset)) {
                return Location::Inside(index);
            }
        }
        let location = self.locate(offset, *cursor);
        match location {
            Location::Inside(index) => {
                tracing::trace!(offset, index, "part cursor relocated");
                *cursor = Some(index);
            }
            Location::Gap(_) => *cursor = None,
        }
        location
    }

    /// Start of the part at `index`, if any. Used to size gaps.
    #[must_use]
    pub fn start_at(&self, index: usize) -> Option<i64> {
        self.parts.get(index).map(Part::start)
    }

    /// Inserts `part` at `index`.
    ///
    /// # Panics
    ///
    /// If the part would overlap a neighbour or break the ordering. This is
    /// structural corruption and is never recoverable.
    pub fn insert(&mut self, index: usize, part: Part) {
        if let Some(prev) = index.checked_sub(1).and_then(|i| self.parts.get(i)) {
            assert!(
                prev.end() <= part.start(),
                "Part list corrupted: part at {} overlaps predecessor ending at {}",
                part.start(),
                prev.end()
            );
        }
        if let Some(next) = self.parts.get(index) {
            assert!(
                part.end() <= next.start(),
                "Part list corrupted: part ending at {} overlaps successor at {}",
                part.end(),
                next.start()
            );
        }
        self.parts.insert(index, part);
    }

    /// Appends a part after the last one.
    ///
    /// # Panics
    ///
    /// See `insert`.
    pub fn append(&mut self, part: Part) {
        self.insert(self.parts.len(), part);
    }

    /// Removes every part that ends at or before `offset`.
    ///
    /// Returns the number of removed parts.
    pub fn remove_before(&mut self, offset: i64) -> usize {
        let count = self.parts.partition_point(|part| part.end() <= offset);
        self.parts.drain(..count);
        count
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }

    /// Total materialized bytes over all parts.
    #[must_use]
    pub fn materialized_bytes(&self) -> usize {
        self.parts.iter().map(Part::used).sum()
    }

    /// Total allocated bytes over all parts.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.parts.iter().map(Part::capacity).sum()
    }

    #[must_use]
    pub fn iter(&self) -> PartIter<'_> {
        self.into_iter()
    }

    #[must_use]
    pub fn iter_rev(&self) -> PartRevIter<'_> {
        PartRevIter::new(&self.parts)
    }

    /// Materialized, contiguous spans covering `[from, to)`.
    ///
    /// Iteration stops at the first byte that is not materialized.
    #[must_use]
    pub fn spans(&self, from: i64, to: i64) -> SpanIter<'_> {
        let index = match self.locate(from, None) {
            Location::Inside(index) | Location::Gap(index) => index,
        };
        SpanIter::new(&self.parts, index, from, to)
    }

    pub(crate) fn as_slice(&self) -> &[Part] {
        &self.parts
    }
}
