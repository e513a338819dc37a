use super::Decoder;
use crate::block;
use crate::error::{Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};

/// Uniform binary coefficients over the inner (data plus expansion)
/// symbols.
#[derive(Debug)]
pub struct RandomUniform {
    inner: block::RandomUniform,
    symbols: usize,
    expansion: usize,
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
            inner: block::RandomUniform::new(FiniteField::Binary),
            symbols: 0,
            expansion: 0,
            log: Log::new(),
        }
    }

    /// Sets the geometry and rewinds to the current seed.
    pub fn configure(&mut self, symbols: usize, expansion: usize) -> Result<()> {
        if symbols == 0 || expansion == 0 {
            return Err(Error::invalid_argument(
                "symbols and expansion must be > 0",
            ));
        }
        self.inner.configure(symbols + expansion)?;
        self.symbols = symbols;
        self.expansion = expansion;
        Ok(())
    }

    /// Rewinds to the current seed.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Reseeds.
    pub fn set_seed(&mut self, seed: u64) {
        self.inner.set_seed(seed);
    }

    /// Data symbols.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.symbols
    }

    /// Expansion symbols.
    #[must_use]
    pub const fn expansion(&self) -> usize {
        self.expansion
    }

    /// Symbols covered by each vector.
    #[must_use]
    pub const fn inner_symbols(&self) -> usize {
        self.symbols + self.expansion
    }

    /// Bytes written by each `generate*` call.
    #[must_use]
    pub const fn max_coefficients_bytes(&self) -> usize {
        self.inner.max_coefficients_bytes()
    }

    /// Uniform binary coefficients over every inner symbol.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<()> {
        self.inner.generate(out)?;
        self.log.write("generator", || "dense".to_string());
        Ok(())
    }

    /// Uniform over the first `count` inner symbols, zero after.
    pub fn generate_partial(&mut self, out: &mut [u8], count: usize) -> Result<()> {
        self.inner.generate_partial(out, count)?;
        self.log.write("generator", || format!("partial {count}"));
        Ok(())
    }

    /// Uniform over the inner pivots of `decoder`.
    pub fn generate_recode(&mut self, out: &mut [u8], decoder: &Decoder) -> Result<()> {
        if decoder.symbols() != self.symbols || decoder.expansion() != self.expansion {
            return Err(Error::invalid_argument(
                "decoder geometry differs from generator",
            ));
        }
        self.inner.generate_recode(out, decoder.inner_decoder())?;
        self.log.write("generator", || {
            format!("recode inner rank {}", decoder.inner_rank())
        });
        Ok(())
    }
}

impl_log_accessors!(RandomUniform);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_inner_symbols() {
        let mut g = RandomUniform::new();
        g.configure(10, 3).expect("configure");
        assert_eq!(g.inner_symbols(), 13);
        assert_eq!(g.max_coefficients_bytes(), 2);
        let mut out = [0u8; 2];
        g.generate_partial(&mut out, 4).expect("generate");
        assert_eq!(out[0] & 0xF0, 0);
        assert_eq!(out[1], 0);
        assert!(g.generate_partial(&mut out, 14).is_err());
    }

    #[test]
    fn recode_respects_inner_pivots() {
        let mut d = Decoder::new(FiniteField::Binary8);
        d.configure(4, 1, 2).expect("configure");
        d.decode_systematic_symbol(&[1], 1).expect("decode");
        let mut g = RandomUniform::new();
        g.configure(4, 2).expect("configure");
        let mut out = [0u8; 1];
        for _ in 0..16 {
            g.generate_recode(&mut out, &d).expect("generate");
            assert_eq!(out[0] & !0b10, 0);
        }
        let mut other = RandomUniform::new();
        other.configure(4, 3).expect("configure");
        assert!(other.generate_recode(&mut out, &d).is_err());
    }
}
