//! Reed-Solomon style repair coefficients from a Cauchy matrix.
//!
//! Repair row `i` over source column `j` is
//!
//! ```text
//! a[i][j] = (y_j + x_0) / (x_i + y_j),   y_j = j,   x_i = symbols + i
//! ```
//!
//! The `x` and `y` values are distinct field elements, so every square
//! submatrix of the Cauchy matrix is invertible. Scaling column `j` by
//! `y_j + x_0` keeps that property and makes the first repair row all ones,
//! so repair symbol 0 is the plain sum of the block. Any `symbols` of the
//! systematic and repair symbols together recover the block.
//!
//! The row for a repair index is a pure function of `(field, symbols,
//! index)`; a receiver regenerates it from the index alone.

use super::{ensure_configured, ensure_symbols};
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};

/// Index-addressable Cauchy repair coefficients.
#[derive(Debug)]
pub struct RsCauchy {
    field: FiniteField,
    symbols: usize,
    repair_symbols: usize,
    next_index: usize,
    log: Log,
}

impl RsCauchy {
    /// An unconfigured generator over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            symbols: 0,
            repair_symbols: 0,
            next_index: 0,
            log: Log::new(),
        }
    }

    /// Sets the number of source symbols. The field must have more elements
    /// than `symbols`; the remaining elements are the repair budget.
    pub fn configure(&mut self, symbols: usize) -> Result<()> {
        ensure_symbols(symbols)?;
        if self.field == FiniteField::Binary {
            return Err(Error::invalid_argument(
                "Cauchy coefficients need a field larger than binary",
            ));
        }
        let order = self.field.order() as usize;
        if symbols >= order {
            return Err(Error::invalid_argument(format!(
                "{symbols} symbols leave no repair symbols in {}",
                self.field
            )));
        }
        self.symbols = symbols;
        self.repair_symbols = order - symbols;
        self.next_index = 0;
        Ok(())
    }

    /// Restarts the repair index sequence at zero.
    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// Source symbols.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.symbols
    }

    /// Distinct repair symbols available.
    #[must_use]
    pub const fn repair_symbols(&self) -> usize {
        self.repair_symbols
    }

    /// Repair symbols not yet handed out by [`generate`](Self::generate).
    #[must_use]
    pub const fn remaining_repair_symbols(&self) -> usize {
        self.repair_symbols - self.next_index
    }

    /// Bytes written by each `generate*` call.
    #[must_use]
    pub const fn max_coefficients_bytes(&self) -> usize {
        self.field.coefficients_bytes(self.symbols)
    }

    /// Writes the next repair row and returns its index.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        ensure_configured(self.symbols)?;
        if self.remaining_repair_symbols() == 0 {
            return Err(Error::invalid_state("no repair symbols left"));
        }
        let index = self.next_index;
        self.generate_specific(out, index)?;
        self.next_index += 1;
        Ok(index)
    }

    /// Writes repair row `index`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn generate_specific(&mut self, out: &mut [u8], index: usize) -> Result<()> {
        ensure_configured(self.symbols)?;
        if index >= self.repair_symbols {
            return Err(Error::out_of_range(index, self.repair_symbols));
        }
        let bytes = self.max_coefficients_bytes();
        ensure_len(out.len(), bytes)?;

        let field = self.field;
        let x0 = self.symbols as u16;
        let xi = (self.symbols + index) as u16;
        let out = &mut out[..bytes];
        out.fill(0);
        for j in 0..self.symbols {
            let yj = j as u16;
            let value = field.divide(field.add(yj, x0), field.add(xi, yj));
            field.set_value(out, j, value);
        }
        self.log.write("generator", || format!("repair {index}"));
        Ok(())
    }
}

impl_log_accessors!(RsCauchy);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Decoder;

    #[test]
    fn repair_budget() {
        let mut g = RsCauchy::new(FiniteField::Binary8);
        g.configure(200).expect("configure");
        assert_eq!(g.repair_symbols(), 56);
        assert_eq!(g.remaining_repair_symbols(), 56);
        let mut out = vec![0u8; 200];
        assert_eq!(g.generate(&mut out).expect("generate"), 0);
        assert_eq!(g.generate(&mut out).expect("generate"), 1);
        assert_eq!(g.remaining_repair_symbols(), 54);
        g.reset();
        assert_eq!(g.remaining_repair_symbols(), 56);
    }

    #[test]
    fn rejects_binary_and_oversized_blocks() {
        assert!(RsCauchy::new(FiniteField::Binary).configure(1).is_err());
        assert!(RsCauchy::new(FiniteField::Binary4).configure(16).is_err());
        assert!(RsCauchy::new(FiniteField::Binary4).configure(15).is_ok());
    }

    #[test]
    fn first_row_is_all_ones() {
        let mut g = RsCauchy::new(FiniteField::Binary16);
        g.configure(5).expect("configure");
        let mut out = vec![0u8; 10];
        g.generate_specific(&mut out, 0).expect("generate");
        for j in 0..5 {
            assert_eq!(FiniteField::Binary16.get_value(&out, j), 1);
        }
        assert_eq!(
            g.generate_specific(&mut out, g.repair_symbols())
                .unwrap_err()
                .kind(),
            crate::ErrorKind::OutOfRange
        );
    }

    #[test]
    fn any_repair_rows_fill_erasures() {
        // Lose symbols 0, 2 and 3 of 6; three arbitrary repair rows recover them.
        let field = FiniteField::Binary4;
        let symbols = 6;
        let data: Vec<u8> = (0..symbols as u8).map(|i| i * 17 + 3).collect();
        let mut g = RsCauchy::new(field);
        g.configure(symbols).expect("configure");

        let mut d = Decoder::new(field);
        d.configure(symbols, 1).expect("configure");
        for i in [1, 4, 5] {
            d.decode_systematic_symbol(&data[i..=i], i).expect("decode");
        }
        for index in [2, 7, 9] {
            let mut coefficients = vec![0u8; g.max_coefficients_bytes()];
            g.generate_specific(&mut coefficients, index).expect("generate");
            let mut payload = [0u8; 1];
            for (j, byte) in data.iter().enumerate() {
                let c = field.get_value(&coefficients, j);
                field.vector_multiply_add(&mut payload, &[*byte], c);
            }
            d.decode_symbol(&payload, &coefficients).expect("decode");
        }
        assert!(d.is_complete());
        assert_eq!(d.symbols_storage(), &data[..]);
    }
}
