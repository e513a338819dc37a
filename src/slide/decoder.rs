//! Sliding-window decoder.

use super::{check_in_stream, check_window, Stream, SymbolRange};
use crate::config::SlideConfig;
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::linalg::SparseRow;
use crate::log::{impl_log_accessors, Log};
use crate::state::{CodingState, SymbolStatus};
use crate::tracing_compat::{debug, trace};

/// Callback invoked with the stream index of each newly decoded symbol.
pub type StreamDecodedCallback = Box<dyn FnMut(u64) + Send>;

#[derive(Debug, Clone)]
struct Slot {
    data: Vec<u8>,
    row: Option<SparseRow>,
    status: SymbolStatus,
}

impl Slot {
    fn empty(symbol_bytes: usize) -> Self {
        Self {
            data: vec![0; symbol_bytes],
            row: None,
            status: SymbolStatus::Missing,
        }
    }
}

/// Decodes a stream of coded symbols over sliding windows.
///
/// Unlike the block decoder, decoded status here is exact: every insertion
/// re-checks the rows it touched, so a symbol is reported decoded (and the
/// callback fires) as soon as its row reduces to a unit row.
pub struct Decoder {
    field: FiniteField,
    max_symbol_bytes: usize,
    stream: Stream<Slot>,
    window: SymbolRange,
    rank: usize,
    decoded: usize,
    pivot: Option<u64>,
    on_decoded: Option<StreamDecodedCallback>,
    log: Log,
}

impl Decoder {
    /// An unconfigured decoder over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            max_symbol_bytes: 0,
            stream: Stream::new(),
            window: SymbolRange::default(),
            rank: 0,
            decoded: 0,
            pivot: None,
            on_decoded: None,
            log: Log::new(),
        }
    }

    /// Sets the symbol size and empties the stream.
    pub fn configure(&mut self, max_symbol_bytes: usize) -> Result<()> {
        self.configure_with(&SlideConfig::new(max_symbol_bytes))
    }

    /// Configures from a [`SlideConfig`] and empties the stream.
    pub fn configure_with(&mut self, config: &SlideConfig) -> Result<()> {
        config.validate(self.field)?;
        self.max_symbol_bytes = config.max_symbol_bytes;
        self.reset();
        debug!(field = %self.field, max_symbol_bytes = config.max_symbol_bytes, "stream decoder configured");
        Ok(())
    }

    /// Empties the stream, rewinds its origin and drops all rows.
    pub fn reset(&mut self) {
        self.stream.clear();
        self.window = SymbolRange::default();
        self.rank = 0;
        self.decoded = 0;
        self.pivot = None;
    }

    // ========================================================================
    // Stream
    // ========================================================================

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// Bytes per symbol.
    #[must_use]
    pub const fn max_symbol_bytes(&self) -> usize {
        self.max_symbol_bytes
    }

    /// Index of the oldest resident symbol.
    #[must_use]
    pub const fn stream_lower_bound(&self) -> u64 {
        self.stream.lower_bound()
    }

    /// Index the next pushed symbol receives.
    #[must_use]
    pub fn stream_upper_bound(&self) -> u64 {
        self.stream.upper_bound()
    }

    /// Resident symbols.
    #[must_use]
    pub fn stream_symbols(&self) -> usize {
        self.stream.len()
    }

    /// True if no symbol is resident.
    #[must_use]
    pub fn is_stream_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// The resident range.
    #[must_use]
    pub fn stream_range(&self) -> SymbolRange {
        self.stream.range()
    }

    /// True if `index` is resident.
    #[must_use]
    pub fn in_stream(&self, index: u64) -> bool {
        self.stream.in_stream(index)
    }

    /// Moves the numbering origin. Only allowed while the stream is empty.
    pub fn set_stream_lower_bound(&mut self, lower_bound: u64) -> Result<()> {
        self.stream.set_lower_bound(lower_bound)
    }

    /// Opens a new, still unknown symbol at the upper bound.
    pub fn push_symbol(&mut self) -> Result<u64> {
        self.ensure_configured()?;
        let index = self.stream.push(Slot::empty(self.max_symbol_bytes));
        debug!(index, "stream symbol pushed");
        self.log.write("decoder", || format!("push {index}"));
        Ok(index)
    }

    /// Same as [`push_symbol`](Self::push_symbol).
    pub fn push_front_symbol(&mut self) -> Result<u64> {
        self.push_symbol()
    }

    /// Drops the oldest resident symbol, with its row if it has one.
    pub fn pop_symbol(&mut self) -> Result<u64> {
        let (index, slot) = self.stream.pop().ok_or(Error::EmptyStream)?;
        match slot.status {
            SymbolStatus::Missing => {}
            SymbolStatus::Partial => self.rank -= 1,
            SymbolStatus::Decoded => {
                self.rank -= 1;
                self.decoded -= 1;
            }
        }
        debug!(index, rank = self.rank, "stream symbol popped");
        self.log.write("decoder", || format!("pop {index}"));
        Ok(index)
    }

    /// Same as [`pop_symbol`](Self::pop_symbol).
    pub fn pop_back_symbol(&mut self) -> Result<u64> {
        self.pop_symbol()
    }

    /// Selects the default coding window.
    pub fn set_window(&mut self, lower_bound: u64, symbols: usize) -> Result<()> {
        let window = SymbolRange::from_count(lower_bound, symbols);
        check_window(self.stream.range(), window)?;
        self.window = window;
        Ok(())
    }

    /// The window chosen by the last [`set_window`](Self::set_window).
    #[must_use]
    pub const fn window(&self) -> SymbolRange {
        self.window
    }

    /// Bytes in a coefficient vector for `window`.
    #[must_use]
    pub const fn coefficients_bytes(&self, window: SymbolRange) -> usize {
        self.field.coefficients_bytes(window.symbols())
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Independent rows held.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Pivot added by the last decode call, if it was innovative.
    #[must_use]
    pub const fn pivot(&self) -> Option<u64> {
        self.pivot
    }

    /// True if the last decode call increased the rank.
    #[must_use]
    pub const fn pivot_found(&self) -> bool {
        self.pivot.is_some()
    }

    /// Decoded resident symbols.
    #[must_use]
    pub const fn symbols_decoded(&self) -> usize {
        self.decoded
    }

    /// Pivot symbols not yet decoded.
    #[must_use]
    pub const fn symbols_partially_decoded(&self) -> usize {
        self.rank - self.decoded
    }

    /// Resident symbols without a pivot.
    #[must_use]
    pub fn symbols_missing(&self) -> usize {
        self.stream.len() - self.rank
    }

    /// True if a row pivots at `index`.
    #[must_use]
    pub fn is_symbol_pivot(&self, index: u64) -> bool {
        self.stream
            .get(index)
            .is_some_and(|slot| slot.status != SymbolStatus::Missing)
    }

    /// True if resident symbol `index` is decoded.
    #[must_use]
    pub fn is_symbol_decoded(&self, index: u64) -> bool {
        self.stream
            .get(index)
            .is_some_and(|slot| slot.status == SymbolStatus::Decoded)
    }

    /// True if every symbol in `window` is decoded.
    #[must_use]
    pub fn is_window_decoded(&self, window: SymbolRange) -> bool {
        window.indices().all(|index| self.is_symbol_decoded(index))
    }

    /// True if every resident symbol is decoded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.decoded == self.stream.len()
    }

    /// Bytes of resident symbol `index`; final once it is decoded.
    pub fn symbol_at(&self, index: u64) -> Result<&[u8]> {
        check_in_stream(self.stream.range(), index)?;
        self.stream
            .get(index)
            .map(|slot| slot.data.as_slice())
            .ok_or(Error::EmptyStream)
    }

    /// Registers a callback fired once per newly decoded symbol.
    pub fn on_symbol_decoded<F>(&mut self, callback: F)
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.on_decoded = Some(Box::new(callback));
    }

    /// Removes the decoded-symbol callback.
    pub fn clear_symbol_decoded_callback(&mut self) {
        self.on_decoded = None;
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Feeds a coded symbol covering `window`.
    pub fn decode_symbol(
        &mut self,
        symbol: &[u8],
        window: SymbolRange,
        coefficients: &[u8],
    ) -> Result<()> {
        self.ensure_configured()?;
        check_window(self.stream.range(), window)?;
        ensure_len(symbol.len(), self.max_symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes(window))?;

        let field = self.field;
        let row = SparseRow::from_terms(
            window
                .indices()
                .enumerate()
                .map(|(k, index)| (index, field.get_value(coefficients, k))),
        );
        self.pivot = self.absorb(row, symbol[..self.max_symbol_bytes].to_vec());
        Ok(())
    }

    /// Feeds resident symbol `index` uncoded.
    pub fn decode_systematic_symbol(&mut self, symbol: &[u8], index: u64) -> Result<()> {
        self.ensure_configured()?;
        check_in_stream(self.stream.range(), index)?;
        ensure_len(symbol.len(), self.max_symbol_bytes)?;
        if self.is_symbol_decoded(index) {
            trace!(index, "systematic symbol already decoded");
            self.pivot = None;
            return Ok(());
        }
        let data = symbol[..self.max_symbol_bytes].to_vec();
        let rank_before = self.rank;
        self.absorb(SparseRow::singleton(index, 1), data);
        self.pivot = (self.rank > rank_before).then_some(index);
        Ok(())
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.max_symbol_bytes == 0 {
            return Err(Error::invalid_state("decoder not configured"));
        }
        Ok(())
    }

    /// Reduces `(row, data)` against the held rows and inserts what is left.
    fn absorb(&mut self, mut row: SparseRow, mut data: Vec<u8>) -> Option<u64> {
        let field = self.field;
        let columns: Vec<u64> = row.terms().iter().map(|&(column, _)| column).collect();
        for column in columns {
            let Some(slot) = self.stream.get(column) else {
                continue;
            };
            let Some(held) = slot.row.as_ref() else {
                continue;
            };
            let c = row.get(column);
            if c == 0 {
                continue;
            }
            row.add_scaled(field, held, c);
            field.vector_multiply_add(&mut data, &slot.data, c);
        }

        let Some((pivot, value)) = row.lowest() else {
            trace!(rank = self.rank, "redundant symbol");
            self.log.write("decoder", || "redundant symbol".to_string());
            return None;
        };
        let scale = field.invert(value);
        row.scale(field, scale);
        field.vector_multiply(&mut data, scale);

        let mut touched = Vec::new();
        for (index, slot) in self.stream.iter_mut() {
            let Some(held) = slot.row.as_mut() else {
                continue;
            };
            let c = held.get(pivot);
            if c == 0 {
                continue;
            }
            held.add_scaled(field, &row, c);
            field.vector_multiply_add(&mut slot.data, &data, c);
            touched.push(index);
        }

        if let Some(slot) = self.stream.get_mut(pivot) {
            slot.row = Some(row);
            slot.data = data;
            slot.status = SymbolStatus::Partial;
        }
        self.rank += 1;
        debug!(pivot, rank = self.rank, "new pivot");
        self.log
            .write("decoder", || format!("pivot {pivot} rank {}", self.rank));

        self.refresh_status(pivot);
        for index in touched {
            self.refresh_status(index);
        }
        Some(pivot)
    }

    fn refresh_status(&mut self, index: u64) {
        let Some(slot) = self.stream.get_mut(index) else {
            return;
        };
        let unit = slot.row.as_ref().is_some_and(|row| row.weight() == 1);
        if slot.status == SymbolStatus::Partial && unit {
            slot.status = SymbolStatus::Decoded;
            self.decoded += 1;
            if let Some(callback) = self.on_decoded.as_mut() {
                callback(index);
            }
        }
    }
}

impl_log_accessors!(Decoder);

impl CodingState for Decoder {
    type Index = u64;

    fn symbols(&self) -> usize {
        self.stream.len()
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn is_symbol_pivot(&self, index: u64) -> bool {
        Self::is_symbol_pivot(self, index)
    }

    fn is_symbol_decoded(&self, index: u64) -> bool {
        Self::is_symbol_decoded(self, index)
    }

    fn symbols_decoded(&self) -> usize {
        self.decoded
    }

    fn is_complete(&self) -> bool {
        Self::is_complete(self)
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("field", &self.field)
            .field("stream", &self.stream.range())
            .field("rank", &self.rank)
            .field("decoded", &self.decoded)
            .finish_non_exhaustive()
    }
}
