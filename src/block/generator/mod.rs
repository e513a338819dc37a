//! Coefficient generators for block codes.
//!
//! | Generator | Coefficients |
//! |---|---|
//! | [`RandomUniform`] | every element uniform over the field |
//! | [`Tunable`] | a chosen fraction of nonzero elements |
//! | [`RsCauchy`] | rows of a normalised Cauchy matrix, addressed by repair index |
//! | [`Parity2D`] | row and column parities of a binary grid, addressed by position |
//!
//! The seeded generators are reproducible: the same seed and the same call
//! sequence give byte-identical coefficients. `RsCauchy` and `Parity2D` need
//! no seed since their output is a pure function of the index they return.

mod parity_2d;
mod random_uniform;
mod rs_cauchy;
mod tunable;

pub use parity_2d::{Parity2D, ParityStep};
pub use random_uniform::RandomUniform;
pub use rs_cauchy::RsCauchy;
pub use tunable::Tunable;

use crate::error::{Error, Result};

/// Seed used until `set_seed` is called.
pub const DEFAULT_SEED: u64 = 0;

pub(crate) fn ensure_symbols(symbols: usize) -> Result<()> {
    if symbols == 0 {
        return Err(Error::invalid_argument("symbols must be > 0"));
    }
    Ok(())
}

pub(crate) fn ensure_configured(symbols: usize) -> Result<()> {
    if symbols == 0 {
        return Err(Error::invalid_state("generator not configured"));
    }
    Ok(())
}
