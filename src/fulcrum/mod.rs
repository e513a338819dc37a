//! Fulcrum codes.
//!
//! A fulcrum code wraps a binary inner code around a larger outer field.
//! The `symbols` data symbols are extended with `expansion` outer symbols,
//! each a fixed random combination of the data over the outer field. Coded
//! symbols carry *binary* coefficients over the `symbols + expansion` inner
//! symbols, which keeps encoding and recoding down to XORs.
//!
//! The decoder runs two block cores side by side. The inner binary core
//! tracks the inner rank, inner pivots and serves recoding. Every packet is
//! also mapped through the outer expansion matrix `[I; E]` to coefficients
//! over the data symbols and fed to an outer-field core, which delivers the
//! data. Any `symbols` packets that are independent over the outer field
//! finish decoding, no later than the inner code reaching full rank.

mod decoder;
mod encoder;
mod generator;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use generator::RandomUniform;

use crate::field::FiniteField;
use crate::storage::SymbolStorage;
use crate::util::DetRng;

/// Seed of the expansion matrix; encoder and decoder must agree on it.
const EXPANSION_SEED: u64 = 0x6675_6c63_7275_6d00;

/// The outer expansion matrix `E` (`expansion x symbols`, nonzero entries).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Expansion {
    field: FiniteField,
    symbols: usize,
    expansion: usize,
    coefficients: Vec<u16>,
}

impl Expansion {
    fn new(field: FiniteField, symbols: usize, expansion: usize) -> Self {
        let mut rng = DetRng::new(EXPANSION_SEED);
        let coefficients = (0..symbols * expansion)
            .map(|_| field.random_nonzero(&mut rng))
            .collect();
        Self {
            field,
            symbols,
            expansion,
            coefficients,
        }
    }

    fn coefficient(&self, row: usize, column: usize) -> u16 {
        self.coefficients[row * self.symbols + column]
    }

    /// Maps binary coefficients over the inner symbols to outer-field
    /// coefficients over the data symbols.
    fn map_to_outer(&self, inner: &[u8], outer: &mut [u8]) {
        let binary = FiniteField::Binary;
        for column in 0..self.symbols {
            let mut value = binary.get_value(inner, column);
            for row in 0..self.expansion {
                if binary.get_value(inner, self.symbols + row) != 0 {
                    value ^= self.coefficient(row, column);
                }
            }
            self.field.set_value(outer, column, value);
        }
    }

    /// Computes expansion symbol `row` from the data symbols.
    fn encode_expansion(&self, row: usize, data: &SymbolStorage, out: &mut [u8]) {
        out.fill(0);
        for column in 0..self.symbols {
            self.field
                .vector_multiply_add(out, data.symbol(column), self.coefficient(row, column));
        }
    }
}
