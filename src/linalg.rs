//! Sparse coefficient rows over absolute column indices.
//!
//! Stream and perpetual decoders address columns by an unbounded `u64`
//! index, and their rows touch only a narrow band of columns. A
//! [`SparseRow`] keeps just the nonzero `(column, value)` terms, sorted by
//! column, so the lowest term is always the row's pivot candidate.

use crate::field::FiniteField;

// ============================================================================
// Sparse Row Representation
// ============================================================================

/// A sparse coefficient row. Terms are sorted by column and never zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseRow {
    terms: Vec<(u64, u16)>,
}

impl SparseRow {
    /// An all-zero row.
    #[must_use]
    pub const fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// A row with a single term.
    #[must_use]
    pub fn singleton(column: u64, value: u16) -> Self {
        if value == 0 {
            Self::new()
        } else {
            Self {
                terms: vec![(column, value)],
            }
        }
    }

    /// Builds a row from arbitrary terms; duplicates are summed and zeros
    /// dropped.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = (u64, u16)>,
    {
        let mut raw: Vec<(u64, u16)> = terms.into_iter().collect();
        raw.sort_by_key(|&(column, _)| column);
        let mut merged: Vec<(u64, u16)> = Vec::with_capacity(raw.len());
        for (column, value) in raw {
            match merged.last_mut() {
                Some(last) if last.0 == column => last.1 ^= value,
                _ => merged.push((column, value)),
            }
        }
        merged.retain(|&(_, value)| value != 0);
        Self { terms: merged }
    }

    /// Nonzero terms, sorted by column.
    #[must_use]
    pub fn terms(&self) -> &[(u64, u16)] {
        &self.terms
    }

    /// Number of nonzero terms.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.terms.len()
    }

    /// True if every coefficient is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Lowest nonzero term.
    #[must_use]
    pub fn lowest(&self) -> Option<(u64, u16)> {
        self.terms.first().copied()
    }

    /// Coefficient at `column`.
    #[must_use]
    pub fn get(&self, column: u64) -> u16 {
        self.terms
            .binary_search_by_key(&column, |&(c, _)| c)
            .map_or(0, |i| self.terms[i].1)
    }

    /// Multiplies every coefficient by nonzero `c`.
    pub fn scale(&mut self, field: FiniteField, c: u16) {
        debug_assert!(c != 0, "scaling by zero");
        for term in &mut self.terms {
            term.1 = field.multiply(term.1, c);
        }
    }

    /// `self += c * other`.
    pub fn add_scaled(&mut self, field: FiniteField, other: &Self, c: u16) {
        if c == 0 || other.is_zero() {
            return;
        }
        let mut merged = Vec::with_capacity(self.terms.len() + other.terms.len());
        let (mut i, mut j) = (0, 0);
        while i < self.terms.len() || j < other.terms.len() {
            let a = self.terms.get(i).copied();
            let b = other.terms.get(j).map(|&(col, v)| (col, field.multiply(v, c)));
            match (a, b) {
                (Some(a), Some(b)) if a.0 == b.0 => {
                    let v = a.1 ^ b.1;
                    if v != 0 {
                        merged.push((a.0, v));
                    }
                    i += 1;
                    j += 1;
                }
                (Some(a), Some(b)) if a.0 < b.0 => {
                    merged.push(a);
                    i += 1;
                }
                (Some(a), None) => {
                    merged.push(a);
                    i += 1;
                }
                (_, Some(b)) => {
                    merged.push(b);
                    j += 1;
                }
                (None, None) => break,
            }
        }
        self.terms = merged;
    }

    /// Removes the term at `column`, returning its coefficient.
    pub fn remove(&mut self, column: u64) -> u16 {
        match self.terms.binary_search_by_key(&column, |&(c, _)| c) {
            Ok(i) => self.terms.remove(i).1,
            Err(_) => 0,
        }
    }
}
