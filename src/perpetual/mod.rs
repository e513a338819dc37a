//! Perpetual codes.
//!
//! A perpetual coded symbol combines only `width` consecutive inner symbols,
//! starting at an `offset` and wrapping around the end of the block. Encode
//! and decode cost per symbol is therefore `O(width)` rather than
//! `O(symbols)`.
//!
//! # Inner layout
//!
//! The data symbols are interleaved with outer symbols (see [`Layout`]):
//! after every `outer_interval` data symbols comes one outer symbol, a fixed
//! random combination of the data within the preceding
//! `outer_segments * width` inner positions. Coded symbols are formed over
//! this inner sequence.
//!
//! # Decoding
//!
//! The decoder only eliminates forward, so every held row keeps its pivot as
//! its lowest column and stays narrow. Once the rank reaches
//! `mapping_threshold * inner_symbols` the outer constraints are inserted as
//! zero-payload rows, which usually closes the last few pivots without
//! waiting for more packets. Back-substitution runs once, when the rank is
//! full.
//!
//! The decoder state can be checkpointed with
//! [`Decoder::save_state`] and resumed with [`Decoder::restore_state`].

mod decoder;
mod encoder;
pub mod generator;
mod layout;
pub mod offset;
mod width;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use layout::{Layout, Position};
pub use width::Width;
