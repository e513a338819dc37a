use super::{ensure_configured, ensure_symbols, DEFAULT_SEED};
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::state::CodingState;
use crate::util::DetRng;

/// Dense uniform coefficients.
#[derive(Debug)]
pub struct RandomUniform {
    field: FiniteField,
    symbols: usize,
    seed: u64,
    rng: DetRng,
    log: Log,
}

impl RandomUniform {
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

    /// Reseeds; the following output depends only on `seed` and the calls
    /// that follow.
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

    /// Fills `out` with uniform coefficients for every symbol.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<()> {
        self.fill(out)?;
        self.log.write("generator", || "dense".to_string());
        Ok(())
    }

    /// Uniform coefficients for the first `count` symbols, zero after.
    pub fn generate_partial(&mut self, out: &mut [u8], count: usize) -> Result<()> {
        if count > self.symbols {
            return Err(Error::invalid_argument(format!(
                "partial count {count} exceeds {} symbols",
                self.symbols
            )));
        }
        self.fill(out)?;
        for i in count..self.symbols {
            self.field.set_value(out, i, 0);
        }
        self.log.write("generator", || format!("partial {count}"));
        Ok(())
    }

    /// Uniform coefficients restricted to the pivots of `state`.
    pub fn generate_recode<S>(&mut self, out: &mut [u8], state: &S) -> Result<()>
    where
        S: CodingState<Index = usize>,
    {
        if state.symbols() != self.symbols {
            return Err(Error::invalid_argument(format!(
                "decoder has {} symbols, generator {}",
                state.symbols(),
                self.symbols
            )));
        }
        self.fill(out)?;
        for i in 0..self.symbols {
            if !state.is_symbol_pivot(i) {
                self.field.set_value(out, i, 0);
            }
        }
        self.log
            .write("generator", || format!("recode rank {}", state.rank()));
        Ok(())
    }

    fn fill(&mut self, out: &mut [u8]) -> Result<()> {
        ensure_configured(self.symbols)?;
        let bytes = self.max_coefficients_bytes();
        ensure_len(out.len(), bytes)?;
        let out = &mut out[..bytes];
        self.rng.fill_bytes(out);
        self.field.clear_padding(out, self.symbols);
        Ok(())
    }
}

impl_log_accessors!(RandomUniform);
