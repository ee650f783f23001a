use crate::part::Part;
use crate::part_list::PartList;

/// Forward iterator over the parts of a `PartList`
///
/// This iterator implements `Clone`.
#[derive(Clone, Debug)]
pub struct PartIter<'a> {
    parts: core::slice::Iter<'a, Part>,
}

impl<'a> Iterator for PartIter<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        self.parts.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.parts.size_hint()
    }
}

impl ExactSizeIterator for PartIter<'_> {}

impl<'a> IntoIterator for &'a PartList {
    type Item = &'a Part;
    type IntoIter = PartIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        PartIter {
            parts: self.as_slice().iter(),
        }
    }
}

/// Reverse iterator over the parts of a `PartList`
///
/// This iterator implements `Clone`.
#[derive(Clone, Debug)]
pub struct PartRevIter<'a> {
    parts: &'a [Part],
    current: usize,
}

impl<'a> PartRevIter<'a> {
    pub(crate) fn new(parts: &'a [Part]) -> Self {
        Self {
            parts,
            current: parts.len(),
        }
    }
}

impl<'a> Iterator for PartRevIter<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > 0 {
            self.current -= 1;
            self.parts.get(self.current)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.current, Some(self.current))
    }
}

impl ExactSizeIterator for PartRevIter<'_> {}

/// Iterator over materialized, contiguous byte spans of a range.
///
/// Yields `(absolute_offset, bytes)` pairs. Stops at the end of the range, at a
/// gap between parts, or at the unfilled tail of a part.
#[derive(Clone, Debug)]
pub struct SpanIter<'a> {
    parts: &'a [Part],
    index: usize,
    pos: i64,
    end: i64,
}

impl<'a> SpanIter<'a> {
    pub(crate) fn new(parts: &'a [Part], index: usize, from: i64, to: i64) -> Self {
        Self {
            parts,
            index,
            pos: from,
            end: to,
        }
    }

    /// Position just after the last yielded byte.
    #[must_use]
    pub fn position(&self) -> i64 {
        self.pos
    }
}

impl<'a> Iterator for SpanIter<'a> {
    type Item = (i64, &'a [u8]);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }
        let part = self.parts.get(self.index)?;
        if !part.contains(self.pos) || part.filled_end() <= self.pos {
            return None;
        }
        let span_end = part.filled_end().min(self.end);
        let len = (span_end - self.pos) as usize;
        let start = self.pos;
        let bytes = &part.filled_data(start)[..len];
        self.pos = span_end;
        if span_end == part.end() {
            self.index += 1;
        }
        Some((start, bytes))
    }
}
