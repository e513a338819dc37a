//! Rlnc: incremental random linear network coding.
//!
//! # Overview
//!
//! Source data is split into symbols. An encoder emits linear combinations
//! of those symbols over a small binary extension field together with the
//! coefficient vector that produced them. A decoder absorbs coded symbols
//! one at a time with incremental Gaussian elimination and recovers the data
//! once it holds as many independent combinations as there are symbols. An
//! intermediate node can recode from a partially decoded state without ever
//! seeing the source data.
//!
//! # Code Families
//!
//! - **Block** ([`block`]): a fixed block of `symbols` symbols, dense
//!   coefficients, full Gauss-Jordan decoding and recoding.
//! - **Sliding window** ([`slide`]): an unbounded stream of symbols; each
//!   coded symbol covers an explicit window of the resident range.
//! - **Fulcrum** ([`fulcrum`]): binary inner coefficients over data plus
//!   outer expansion symbols, decoded over the outer field.
//! - **Perpetual** ([`perpetual`]): each coded symbol touches `width`
//!   consecutive symbols; the decoder can be checkpointed.
//!
//! # Module Structure
//!
//! - [`field`]: the [`FiniteField`] tag and its element and vector arithmetic
//! - [`state`]: the [`CodingState`] view every decoder implements
//! - [`storage`]: the symbol byte arena
//! - [`linalg`]: sparse rows over absolute column indices
//! - [`config`]: serde-loadable coder configuration
//! - [`error`]: error types
//! - [`log`]: the attachable `(zone, message)` log sink
//! - [`util`]: the deterministic PRNG behind every generator
//!
//! # Example
//!
//! ```
//! use rlnc::block::{Decoder, Encoder, RandomUniform};
//! use rlnc::FiniteField;
//!
//! let field = FiniteField::Binary8;
//! let data: Vec<u8> = (0..64).collect();
//!
//! let mut encoder = Encoder::new(field);
//! encoder.configure(8, 8)?;
//! encoder.set_symbols_storage(&data)?;
//!
//! let mut decoder = Decoder::new(field);
//! decoder.configure(8, 8)?;
//!
//! let mut generator = RandomUniform::new(field);
//! generator.configure(8)?;
//!
//! let mut symbol = vec![0; encoder.symbol_bytes()];
//! let mut coefficients = vec![0; generator.max_coefficients_bytes()];
//! while !decoder.is_complete() {
//!     generator.generate(&mut coefficients)?;
//!     encoder.encode_symbol(&mut symbol, &coefficients)?;
//!     decoder.decode_symbol(&symbol, &coefficients)?;
//! }
//! assert_eq!(decoder.symbols_storage(), &data[..]);
//! # Ok::<(), rlnc::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]

pub mod block;
pub mod config;
pub mod error;
pub mod field;
pub mod fulcrum;
pub mod linalg;
pub mod log;
pub mod perpetual;
pub mod slide;
pub mod state;
pub mod storage;
pub mod tracing_compat;
pub mod util;

// Re-exports for convenient access to core types
pub use config::{BlockConfig, FulcrumConfig, PerpetualConfig, SlideConfig};
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use field::FiniteField;
pub use state::{CodingState, SymbolStatus};
pub use util::DetRng;
