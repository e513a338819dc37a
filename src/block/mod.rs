//! Block codes.
//!
//! A block is `symbols` source symbols of `symbol_bytes` bytes each. The
//! [`Encoder`] emits systematic or coded symbols; the [`Decoder`] absorbs
//! them with incremental Gauss-Jordan elimination and can recode from a
//! partially decoded state. Coefficients come from the generators in
//! [`generator`].

mod decoder;
mod encoder;
pub mod generator;

pub use decoder::{DecodedCallback, Decoder};
pub use encoder::Encoder;
pub use generator::{Parity2D, ParityStep, RandomUniform, RsCauchy, Tunable};
