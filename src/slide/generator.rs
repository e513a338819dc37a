use super::SymbolRange;
use crate::block::generator::DEFAULT_SEED;
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::util::DetRng;

/// Uniform coefficients for one window at a time.
///
/// The vector length follows the window passed to each call, so the
/// generator needs no configuration beyond its field and seed.
#[derive(Debug)]
pub struct RandomUniform {
    field: FiniteField,
    seed: u64,
    rng: DetRng,
    log: Log,
}

impl RandomUniform {
    /// A generator over `field` with the default seed.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            seed: DEFAULT_SEED,
            rng: DetRng::new(DEFAULT_SEED),
            log: Log::new(),
        }
    }

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// Reseeds.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng.reseed(seed);
    }

    /// Rewinds to the current seed.
    pub fn reset(&mut self) {
        self.rng.reseed(self.seed);
    }

    /// Bytes written for `window`.
    #[must_use]
    pub const fn coefficients_bytes(&self, window: SymbolRange) -> usize {
        self.field.coefficients_bytes(window.symbols())
    }

    /// Fills `out` with one uniform coefficient per window symbol.
    pub fn generate(&mut self, out: &mut [u8], window: SymbolRange) -> Result<()> {
        if window.is_empty() {
            return Err(Error::invalid_argument("window must not be empty"));
        }
        let bytes = self.coefficients_bytes(window);
        ensure_len(out.len(), bytes)?;
        let out = &mut out[..bytes];
        self.rng.fill_bytes(out);
        self.field.clear_padding(out, window.symbols());
        self.log
            .write("generator", || format!("window {window}"));
        Ok(())
    }
}

impl_log_accessors!(RandomUniform);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sized_by_window() {
        let mut g = RandomUniform::new(FiniteField::Binary);
        let window = SymbolRange::new(100, 111);
        assert_eq!(g.coefficients_bytes(window), 2);
        let mut out = [0xFFu8; 3];
        g.generate(&mut out, window).expect("generate");
        assert_eq!(out[1] & !0b0111, 0);
        assert_eq!(out[2], 0xFF);
        assert!(g.generate(&mut out, SymbolRange::new(4, 4)).is_err());
    }

    #[test]
    fn seeds_repeat() {
        let mut a = RandomUniform::new(FiniteField::Binary8);
        let mut b = RandomUniform::new(FiniteField::Binary8);
        a.set_seed(3);
        b.set_seed(3);
        let window = SymbolRange::new(0, 16);
        let (mut x, mut y) = ([0u8; 16], [0u8; 16]);
        a.generate(&mut x, window).expect("generate");
        b.generate(&mut y, window).expect("generate");
        assert_eq!(x, y);
        a.reset();
        a.generate(&mut y, window).expect("generate");
        assert_eq!(x, y);
    }
}
