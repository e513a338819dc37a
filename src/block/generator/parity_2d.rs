//! Two-dimensional parity over a binary grid.
//!
//! The block is laid out as `rows x columns` symbols, symbol `r * columns +
//! c` at row `r`, column `c`. The generator walks a fixed sequence of
//! positions:
//!
//! ```text
//! row 0:  s0 s1 .. s(C-1) [P_row0]
//! row 1:  sC .. s(2C-1)   [P_row1]
//! ...
//! [P_col0 .. P_col(C-1)]
//! ```
//!
//! Systematic positions carry source symbols; the bracketed positions are
//! repair positions and only exist when the matching redundancy is enabled.
//! `generate` and `generate_specific` write the parity coefficients of a
//! repair position.

use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};

/// What a position in the sequence carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityStep {
    /// Source symbol at this block index.
    Systematic(usize),
    /// Parity over one grid row.
    RowParity(usize),
    /// Parity over one grid column.
    ColumnParity(usize),
}

/// Binary row/column parity generator.
#[derive(Debug)]
pub struct Parity2D {
    rows: usize,
    columns: usize,
    row_redundancy: bool,
    column_redundancy: bool,
    position: usize,
    log: Log,
}

impl Default for Parity2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Parity2D {
    /// An unconfigured generator with both redundancies enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: 0,
            columns: 0,
            row_redundancy: true,
            column_redundancy: true,
            position: 0,
            log: Log::new(),
        }
    }

    /// Sets the grid shape and rewinds to the first position.
    pub fn configure(&mut self, rows: usize, columns: usize) -> Result<()> {
        if rows == 0 || columns == 0 {
            return Err(Error::invalid_argument("rows and columns must be > 0"));
        }
        self.rows = rows;
        self.columns = columns;
        self.position = 0;
        Ok(())
    }

    /// Rewinds to the first position.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Always [`FiniteField::Binary`].
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        FiniteField::Binary
    }

    /// Grid rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Source symbols, `rows * columns`.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.rows * self.columns
    }

    /// Bytes written by each `generate*` call.
    #[must_use]
    pub const fn max_coefficients_bytes(&self) -> usize {
        FiniteField::Binary.coefficients_bytes(self.symbols())
    }

    /// Enables or disables row parities. Rewinds the sequence.
    pub fn set_row_redundancy_enabled(&mut self, enabled: bool) {
        self.row_redundancy = enabled;
        self.position = 0;
    }

    /// True if row parities are part of the sequence.
    #[must_use]
    pub const fn row_redundancy_enabled(&self) -> bool {
        self.row_redundancy
    }

    /// Enables or disables column parities. Rewinds the sequence.
    pub fn set_column_redundancy_enabled(&mut self, enabled: bool) {
        self.column_redundancy = enabled;
        self.position = 0;
    }

    /// True if column parities are part of the sequence.
    #[must_use]
    pub const fn column_redundancy_enabled(&self) -> bool {
        self.column_redundancy
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Length of the whole position sequence.
    #[must_use]
    pub const fn positions(&self) -> usize {
        self.rows * self.row_stride()
            + if self.column_redundancy {
                self.columns
            } else {
                0
            }
    }

    const fn row_stride(&self) -> usize {
        self.columns + if self.row_redundancy { 1 } else { 0 }
    }

    /// What position `position` carries.
    pub fn step(&self, position: usize) -> Result<ParityStep> {
        if position >= self.positions() {
            return Err(Error::out_of_range(position, self.positions()));
        }
        let grid = self.rows * self.row_stride();
        if position >= grid {
            return Ok(ParityStep::ColumnParity(position - grid));
        }
        let (row, column) = (position / self.row_stride(), position % self.row_stride());
        if column == self.columns {
            Ok(ParityStep::RowParity(row))
        } else {
            Ok(ParityStep::Systematic(row * self.columns + column))
        }
    }

    /// True while the sequence has positions left.
    #[must_use]
    pub const fn can_advance(&self) -> bool {
        self.position < self.positions()
    }

    /// Moves to the next position.
    pub fn advance(&mut self) -> Result<()> {
        if !self.can_advance() {
            return Err(Error::invalid_state("parity sequence exhausted"));
        }
        self.position += 1;
        Ok(())
    }

    /// Source symbol index if the current position is systematic.
    #[must_use]
    pub fn systematic_index(&self) -> Option<usize> {
        match self.step(self.position) {
            Ok(ParityStep::Systematic(index)) => Some(index),
            _ => None,
        }
    }

    /// True if the current position is a repair position.
    #[must_use]
    pub fn can_generate(&self) -> bool {
        matches!(
            self.step(self.position),
            Ok(ParityStep::RowParity(_) | ParityStep::ColumnParity(_))
        )
    }

    /// Writes the coefficients of the current repair position and returns
    /// the position.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        if !self.can_generate() {
            return Err(Error::invalid_state(format!(
                "position {} is not a repair position",
                self.position
            )));
        }
        let position = self.position;
        self.generate_specific(out, position)?;
        Ok(position)
    }

    /// Writes the coefficients of repair position `position`.
    pub fn generate_specific(&mut self, out: &mut [u8], position: usize) -> Result<()> {
        let step = self.step(position)?;
        let bytes = self.max_coefficients_bytes();
        ensure_len(out.len(), bytes)?;
        let out = &mut out[..bytes];
        out.fill(0);
        let field = FiniteField::Binary;
        match step {
            ParityStep::Systematic(index) => {
                return Err(Error::invalid_argument(format!(
                    "position {position} carries systematic symbol {index}"
                )));
            }
            ParityStep::RowParity(row) => {
                for column in 0..self.columns {
                    field.set_value(out, row * self.columns + column, 1);
                }
            }
            ParityStep::ColumnParity(column) => {
                for row in 0..self.rows {
                    field.set_value(out, row * self.columns + column, 1);
                }
            }
        }
        self.log
            .write("generator", || format!("{step:?} at {position}"));
        Ok(())
    }
}

impl_log_accessors!(Parity2D);
