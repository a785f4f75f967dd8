use std::ops::Range;

use serde::Serialize;

/// A half-open byte range `[start, start + length)` within a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    start: u32,
    length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub fn from_parts(start: usize, length: usize) -> Self {
        let start_u32 = u32::try_from(start).unwrap_or(u32::MAX);
        let length_u32 = u32::try_from(length).unwrap_or(u32::MAX.saturating_sub(start_u32));
        Span::new(start_u32, length_u32)
    }

    /// Construct a span from integer bounds expressed as byte offsets.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::from_parts(start, end.saturating_sub(start))
    }

    #[must_use]
    pub fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end(self) -> u32 {
        self.start.saturating_add(self.length)
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.end() as usize
    }

    #[must_use]
    pub fn length(self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn range(self) -> Range<usize> {
        self.start_usize()..self.end_usize()
    }

    /// Whether `offset` lies inside the span. The end offset is excluded.
    #[must_use]
    pub fn contains(self, offset: usize) -> bool {
        offset >= self.start_usize() && offset < self.end_usize()
    }

    /// Whether the span shares at least one byte with `[start, end)`.
    #[must_use]
    pub fn overlaps(self, start: usize, end: usize) -> bool {
        self.start_usize() < end && start < self.end_usize()
    }

    /// Move the span by a signed byte delta, clamping at zero.
    #[must_use]
    pub fn shifted(self, delta: isize) -> Self {
        let start = self.start_usize().saturating_add_signed(delta);
        Self::from_parts(start, self.length as usize)
    }

    #[must_use]
    pub fn with_end(self, end: usize) -> Self {
        Self::from_bounds(self.start_usize(), end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_range() {
        let span = Span::from_bounds(4, 9);
        assert_eq!(span.start(), 4);
        assert_eq!(span.length(), 5);
        assert_eq!(span.range(), 4..9);
        assert!(span.contains(4));
        assert!(!span.contains(9));
    }

    #[test]
    fn inverted_bounds_are_empty() {
        let span = Span::from_bounds(10, 3);
        assert!(span.is_empty());
        assert_eq!(span.start(), 10);
    }

    #[test]
    fn overlap_is_half_open() {
        let span = Span::from_bounds(2, 5);
        assert!(span.overlaps(0, 3));
        assert!(span.overlaps(4, 10));
        assert!(!span.overlaps(5, 10));
        assert!(!span.overlaps(0, 2));
    }

    #[test]
    fn shifting_clamps_at_zero() {
        let span = Span::from_bounds(3, 6);
        assert_eq!(span.shifted(4), Span::from_bounds(7, 10));
        assert_eq!(span.shifted(-10), Span::from_bounds(0, 3));
    }
}
