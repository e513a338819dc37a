//! Interleaving of data and outer symbols.

use crate::config::PerpetualConfig;
use crate::field::FiniteField;
use crate::util::DetRng;

/// Seed base of the outer coefficients; outer symbol `g` uses
/// `OUTER_SEED ^ g`.
const OUTER_SEED: u64 = 0x7065_7270_6574_7561;

/// What occupies an inner position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Data symbol with this block index.
    Data(usize),
    /// Outer symbol with this index.
    Outer(usize),
}

/// Maps inner positions to data and outer symbols.
///
/// Inner positions come in groups of `outer_interval + 1`: `outer_interval`
/// data symbols followed by one outer symbol. The last group gets its outer
/// symbol too when it is full; a partial last group has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    symbols: usize,
    outer_interval: usize,
    outer_symbols: usize,
    span: usize,
}

impl Layout {
    /// The layout of a validated configuration.
    #[must_use]
    pub const fn new(config: &PerpetualConfig) -> Self {
        let symbols = config.symbols();
        let outer_symbols = config.outer_symbols();
        let inner = symbols + outer_symbols;
        let span = config.outer_segments * config.width;
        Self {
            symbols,
            outer_interval: config.outer_interval,
            outer_symbols,
            span: if span < inner { span } else { inner.saturating_sub(1) },
        }
    }

    /// Data symbols.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.symbols
    }

    /// Outer symbols.
    #[must_use]
    pub const fn outer_symbols(&self) -> usize {
        self.outer_symbols
    }

    /// Data plus outer symbols.
    #[must_use]
    pub const fn inner_symbols(&self) -> usize {
        self.symbols + self.outer_symbols
    }

    /// Inner positions an outer symbol looks back over.
    #[must_use]
    pub const fn span(&self) -> usize {
        self.span
    }

    /// What sits at inner position `inner`.
    #[must_use]
    pub const fn position(&self, inner: usize) -> Position {
        if self.outer_interval == 0 {
            return Position::Data(inner);
        }
        let period = self.outer_interval + 1;
        let group = inner / period;
        let rest = inner % period;
        if rest == self.outer_interval {
            Position::Outer(group)
        } else {
            Position::Data(group * self.outer_interval + rest)
        }
    }

    /// Inner position of data symbol `index`.
    #[must_use]
    pub const fn data_position(&self, index: usize) -> usize {
        if self.outer_interval == 0 {
            return index;
        }
        (index / self.outer_interval) * (self.outer_interval + 1) + index % self.outer_interval
    }

    /// Inner position of outer symbol `index`.
    #[must_use]
    pub const fn outer_position(&self, index: usize) -> usize {
        index * (self.outer_interval + 1) + self.outer_interval
    }

    /// `(data index, coefficient)` pairs making up outer symbol `index`.
    ///
    /// The data symbols are those among the `span` inner positions before
    /// the outer symbol, wrapping around the start of the block.
    #[must_use]
    pub fn outer_terms(&self, field: FiniteField, index: usize) -> Vec<(usize, u16)> {
        let inner = self.inner_symbols();
        let at = self.outer_position(index);
        let mut rng = DetRng::new(OUTER_SEED ^ index as u64);
        (1..=self.span)
            .filter_map(|back| match self.position((at + inner - back) % inner) {
                Position::Data(d) => Some(d),
                Position::Outer(_) => None,
            })
            .map(|d| (d, field.random_nonzero(&mut rng)))
            .collect()
    }
}
