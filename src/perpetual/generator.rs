//! Perpetual coefficient generator.

use crate::block::generator::DEFAULT_SEED;
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::util::DetRng;

/// Uniform coefficients over `width` consecutive symbols.
///
/// The first coefficient is always nonzero, so every coded symbol has its
/// pivot candidate at its offset.
#[derive(Debug)]
pub struct RandomUniform {
    field: FiniteField,
    width: usize,
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
            width: 0,
            seed: DEFAULT_SEED,
            rng: DetRng::new(DEFAULT_SEED),
            log: Log::new(),
        }
    }

    /// Sets the width and rewinds to the current seed.
    pub fn configure(&mut self, width: usize) -> Result<()> {
        if width == 0 {
            return Err(Error::invalid_argument("width must be > 0"));
        }
        self.width = width;
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

    /// Coefficients per vector.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Bytes written by each `generate*` call.
    #[must_use]
    pub const fn coefficients_bytes(&self) -> usize {
        self.field.coefficients_bytes(self.width)
    }

    /// Next vector from the running sequence.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<()> {
        self.check(out)?;
        fill(self.field, self.width, &mut self.rng, out);
        self.log.write("generator", || "generated".to_string());
        Ok(())
    }

    /// The vector belonging to `seed`, independent of the running sequence.
    /// A receiver that knows a packet's seed regenerates its coefficients
    /// with this.
    pub fn generate_seeded(&mut self, out: &mut [u8], seed: u64) -> Result<()> {
        self.check(out)?;
        let mut rng = DetRng::new(seed);
        fill(self.field, self.width, &mut rng, out);
        self.log.write("generator", || format!("seeded {seed}"));
        Ok(())
    }

    fn check(&self, out: &[u8]) -> Result<()> {
        if self.width == 0 {
            return Err(Error::invalid_state("generator not configured"));
        }
        ensure_len(out.len(), self.coefficients_bytes())
    }
}

fn fill(field: FiniteField, width: usize, rng: &mut DetRng, out: &mut [u8]) {
    let out = &mut out[..field.coefficients_bytes(width)];
    rng.fill_bytes(out);
    field.clear_padding(out, width);
    field.set_value(out, 0, field.random_nonzero(rng));
}

impl_log_accessors!(RandomUniform);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_coefficient_nonzero() {
        for field in FiniteField::ALL {
            let mut g = RandomUniform::new(field);
            g.configure(8).expect("configure");
            let mut out = vec![0u8; g.coefficients_bytes()];
            for _ in 0..64 {
                g.generate(&mut out).expect("generate");
                assert_ne!(field.get_value(&out, 0), 0);
            }
        }
    }

    #[test]
    fn seeded_vectors_are_reproducible() {
        let mut a = RandomUniform::new(FiniteField::Binary8);
        let mut b = RandomUniform::new(FiniteField::Binary8);
        a.configure(16).expect("configure");
        b.configure(16).expect("configure");
        let (mut x, mut y) = ([0u8; 16], [0u8; 16]);
        // running state does not leak into seeded output
        a.generate(&mut x).expect("generate");
        a.generate_seeded(&mut x, 42).expect("generate");
        b.generate_seeded(&mut y, 42).expect("generate");
        assert_eq!(x, y);
        b.generate_seeded(&mut y, 43).expect("generate");
        assert_ne!(x, y);
    }

    #[test]
    fn needs_configuration_and_room() {
        let mut g = RandomUniform::new(FiniteField::Binary16);
        let mut out = [0u8; 4];
        assert!(g.generate(&mut out).is_err());
        g.configure(3).expect("configure");
        assert!(g.generate(&mut out).is_err());
        assert!(g.configure(0).is_err());
    }
}
