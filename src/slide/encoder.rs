//! Sliding-window encoder.

use super::{check_in_stream, check_window, Stream, SymbolRange};
use crate::config::SlideConfig;
use crate::error::{ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::tracing_compat::debug;

/// Holds the resident stream and combines windows of it into coded symbols.
#[derive(Debug)]
pub struct Encoder {
    field: FiniteField,
    max_symbol_bytes: usize,
    stream: Stream<Vec<u8>>,
    window: SymbolRange,
    log: Log,
}

impl Encoder {
    /// An unconfigured encoder over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            max_symbol_bytes: 0,
            stream: Stream::new(),
            window: SymbolRange::default(),
            log: Log::new(),
        }
    }

    /// Sets the maximum symbol size and empties the stream.
    pub fn configure(&mut self, max_symbol_bytes: usize) -> Result<()> {
        self.configure_with(&SlideConfig::new(max_symbol_bytes))
    }

    /// Configures from a [`SlideConfig`] and empties the stream.
    pub fn configure_with(&mut self, config: &SlideConfig) -> Result<()> {
        config.validate(self.field)?;
        self.max_symbol_bytes = config.max_symbol_bytes;
        self.reset();
        debug!(field = %self.field, max_symbol_bytes = config.max_symbol_bytes, "stream encoder configured");
        Ok(())
    }

    /// Empties the stream and rewinds its origin to zero.
    pub fn reset(&mut self) {
        self.stream.clear();
        self.window = SymbolRange::default();
    }

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// Maximum bytes per symbol; coded symbols are always this long.
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

    /// Appends a symbol of at most `max_symbol_bytes` bytes and returns its
    /// index. Shorter symbols are zero padded.
    pub fn push_symbol(&mut self, symbol: &[u8]) -> Result<u64> {
        self.ensure_configured()?;
        if symbol.len() > self.max_symbol_bytes {
            return Err(Error::BufferTooLarge {
                limit: self.max_symbol_bytes,
                actual: symbol.len(),
            });
        }
        let mut data = vec![0u8; self.max_symbol_bytes];
        data[..symbol.len()].copy_from_slice(symbol);
        let index = self.stream.push(data);
        debug!(index, "stream symbol pushed");
        self.log.write("encoder", || format!("push {index}"));
        Ok(index)
    }

    /// Same as [`push_symbol`](Self::push_symbol).
    pub fn push_front_symbol(&mut self, symbol: &[u8]) -> Result<u64> {
        self.push_symbol(symbol)
    }

    /// Drops the oldest resident symbol and returns its index.
    pub fn pop_symbol(&mut self) -> Result<u64> {
        let (index, _) = self.stream.pop().ok_or(Error::EmptyStream)?;
        debug!(index, "stream symbol popped");
        self.log.write("encoder", || format!("pop {index}"));
        Ok(index)
    }

    /// Same as [`pop_symbol`](Self::pop_symbol).
    pub fn pop_back_symbol(&mut self) -> Result<u64> {
        self.pop_symbol()
    }

    /// Bytes of resident symbol `index`, zero padded.
    pub fn symbol_at(&self, index: u64) -> Result<&[u8]> {
        check_in_stream(self.stream.range(), index)?;
        self.stream
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::EmptyStream)
    }

    /// Selects the default coding window `[lower_bound, lower_bound + symbols)`.
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

    /// Writes `Σ coefficients[k] * symbol(window.lower + k)` into `out`.
    pub fn encode_symbol(
        &mut self,
        out: &mut [u8],
        window: SymbolRange,
        coefficients: &[u8],
    ) -> Result<()> {
        self.ensure_configured()?;
        check_window(self.stream.range(), window)?;
        ensure_len(out.len(), self.max_symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes(window))?;

        let field = self.field;
        let out = &mut out[..self.max_symbol_bytes];
        out.fill(0);
        for (k, index) in window.indices().enumerate() {
            let c = field.get_value(coefficients, k);
            if let Some(symbol) = self.stream.get(index) {
                field.vector_multiply_add(out, symbol, c);
            }
        }
        self.log
            .write("encoder", || format!("coded symbol over {window}"));
        Ok(())
    }

    /// Copies resident symbol `index` into `out` uncoded.
    pub fn encode_systematic_symbol(&mut self, out: &mut [u8], index: u64) -> Result<()> {
        ensure_len(out.len(), self.max_symbol_bytes)?;
        let symbol = self.symbol_at(index)?;
        out[..symbol.len()].copy_from_slice(symbol);
        self.log
            .write("encoder", || format!("systematic symbol {index}"));
        Ok(())
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.max_symbol_bytes == 0 {
            return Err(Error::invalid_state("encoder not configured"));
        }
        Ok(())
    }
}

impl_log_accessors!(Encoder);
