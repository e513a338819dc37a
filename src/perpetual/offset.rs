//! Perpetual offset generator.

use crate::block::generator::DEFAULT_SEED;
use crate::error::{Error, Result};
use crate::log::{impl_log_accessors, Log};
use crate::util::DetRng;

/// Uniform offsets over `[0, symbols)`.
///
/// Configure it with the coder's `inner_symbols()`.
#[derive(Debug)]
pub struct RandomUniform {
    symbols: usize,
    seed: u64,
    rng: DetRng,
    log: Log,
}

impl Default for RandomUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomUniform {
    /// An unconfigured generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbols: 0,
            seed: DEFAULT_SEED,
            rng: DetRng::new(DEFAULT_SEED),
            log: Log::new(),
        }
    }

    /// Sets the offset range and rewinds to the current seed.
    pub fn configure(&mut self, symbols: usize) -> Result<()> {
        if symbols == 0 {
            return Err(Error::invalid_argument("symbols must be > 0"));
        }
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

    /// Offsets are drawn below this.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.symbols
    }

    /// Next offset.
    pub fn offset(&mut self) -> Result<usize> {
        if self.symbols == 0 {
            return Err(Error::invalid_state("offset generator not configured"));
        }
        let offset = self.rng.next_usize(self.symbols);
        self.log.write("offset", || format!("offset {offset}"));
        Ok(offset)
    }
}

impl_log_accessors!(RandomUniform);
