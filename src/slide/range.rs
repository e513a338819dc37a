use std::ops::Range;

/// A half-open range `[lower_bound, upper_bound)` of stream indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymbolRange {
    lower: u64,
    upper: u64,
}

impl SymbolRange {
    /// `[lower, upper)`; an inverted range is clamped to empty.
    #[must_use]
    pub const fn new(lower: u64, upper: u64) -> Self {
        Self {
            lower,
            upper: if upper < lower { lower } else { upper },
        }
    }

    /// `symbols` indices starting at `lower`.
    #[must_use]
    pub const fn from_count(lower: u64, symbols: usize) -> Self {
        Self::new(lower, lower + symbols as u64)
    }

    /// First index.
    #[must_use]
    pub const fn lower_bound(&self) -> u64 {
        self.lower
    }

    /// One past the last index.
    #[must_use]
    pub const fn upper_bound(&self) -> u64 {
        self.upper
    }

    /// Number of indices.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn symbols(&self) -> usize {
        (self.upper - self.lower) as usize
    }

    /// True if the range holds no index.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.upper == self.lower
    }

    /// True if `index` lies in the range.
    #[must_use]
    pub const fn contains(&self, index: u64) -> bool {
        self.lower <= index && index < self.upper
    }

    /// True if `other` lies entirely within this range.
    #[must_use]
    pub const fn contains_range(&self, other: &Self) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }

    /// Offset of `index` from the lower bound.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn offset(&self, index: u64) -> usize {
        (index - self.lower) as usize
    }

    /// The indices as a `Range`.
    #[must_use]
    pub const fn indices(&self) -> Range<u64> {
        self.lower..self.upper
    }
}

impl From<Range<u64>> for SymbolRange {
    fn from(range: Range<u64>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl std::fmt::Display for SymbolRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}
