//! Density-limited coefficients.
//!
//! A sparse coefficient vector makes encoding and decoding cheaper at the
//! cost of more linearly dependent symbols. `density` picks how many
//! positions are nonzero: `max(1, round(k * density))` distinct positions out
//! of the `k` in scope, each with a uniform nonzero value.

use super::{ensure_configured, ensure_symbols, DEFAULT_SEED};
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::util::DetRng;

/// Sparse coefficients with a tunable density.
#[derive(Debug)]
pub struct Tunable {
    field: FiniteField,
    symbols: usize,
    seed: u64,
    rng: DetRng,
    log: Log,
}

impl Tunable {
    /// An unconfigured generator over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            symbols: 0,
            seed: DEFAULT_SEED,
            rng: DetRng::new(DEFAULT_SEED),
            log: Log::new(),
        }
    }

    /// Sets the number of symbols and rewinds to the current seed.
    pub fn configure(&mut self, symbols: usize) -> Result<()> {
        ensure_symbols(symbols)?;
        self.symbols = symbols;
        self.reset();
        Ok(())
    }

    /// Rewinds to the current seed.
    pub fn reset(&mut self) {
        self.rng.reseed(self.seed);
    }

    /// Reseeds.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng.reseed(seed);
    }

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// Symbols covered by each vector.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.symbols
    }

    /// Bytes written by each `generate*` call.
    #[must_use]
    pub const fn max_coefficients_bytes(&self) -> usize {
        self.field.coefficients_bytes(self.symbols)
    }

    /// Number of nonzero coefficients among `count` positions.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn nonzeros(count: usize, density: f64) -> usize {
        if count == 0 {
            return 0;
        }
        ((count as f64 * density).round() as usize).clamp(1, count)
    }

    /// Sparse coefficients over every symbol.
    pub fn generate(&mut self, out: &mut [u8], density: f64) -> Result<()> {
        self.generate_partial(out, self.symbols, density)
    }

    /// Sparse coefficients over the first `count` symbols, zero after.
    pub fn generate_partial(&mut self, out: &mut [u8], count: usize, density: f64) -> Result<()> {
        ensure_configured(self.symbols)?;
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::invalid_argument(format!(
                "density {density} not in [0, 1]"
            )));
        }
        if count > self.symbols {
            return Err(Error::invalid_argument(format!(
                "partial count {count} exceeds {} symbols",
                self.symbols
            )));
        }
        let bytes = self.max_coefficients_bytes();
        ensure_len(out.len(), bytes)?;

        let out = &mut out[..bytes];
        out.fill(0);
        let nonzeros = Self::nonzeros(count, density);
        for position in self.rng.sample_distinct(count, nonzeros) {
            let value = self.field.random_nonzero(&mut self.rng);
            self.field.set_value(out, position, value);
        }
        self.log
            .write("generator", || format!("{nonzeros} of {count} nonzero"));
        Ok(())
    }
}

impl_log_accessors!(Tunable);
