//! Sliding-window codes.
//!
//! Symbols form an unbounded stream. Only the resident range
//! `[stream_lower_bound, stream_upper_bound)` is held; the sender pushes new
//! symbols at the upper end and pops acknowledged ones at the lower end.
//! Each coded symbol covers an explicit window inside the resident range,
//! and its coefficient vector has one element per window symbol.
//!
//! The decoder keeps one sparse row per pivot column over absolute stream
//! indices, in reduced row-echelon form. A row never references a column
//! below its pivot, so popping the oldest symbol only ever drops that
//! symbol's own row.

mod decoder;
mod encoder;
mod generator;
mod range;
mod rate_controller;
mod stream;

pub use decoder::{Decoder, StreamDecodedCallback};
pub use encoder::Encoder;
pub use generator::RandomUniform;
pub use range::SymbolRange;
pub use rate_controller::RateController;
pub use stream::Stream;

use crate::error::{Error, Result};

/// Fails with `WindowOutOfBounds` unless `window` is a non-empty subrange
/// of `stream`.
fn check_window(stream: SymbolRange, window: SymbolRange) -> Result<()> {
    if window.is_empty() || !stream.contains_range(&window) {
        return Err(Error::WindowOutOfBounds {
            lower: window.lower_bound(),
            upper: window.upper_bound(),
            stream_lower: stream.lower_bound(),
            stream_upper: stream.upper_bound(),
        });
    }
    Ok(())
}

/// Fails with `OutOfRange` unless `index` is resident.
fn check_in_stream(stream: SymbolRange, index: u64) -> Result<()> {
    if !stream.contains(index) {
        return Err(Error::OutOfRange {
            index,
            lower: stream.lower_bound(),
            upper: stream.upper_bound(),
        });
    }
    Ok(())
}
