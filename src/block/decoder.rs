//! Block decoder: incremental Gauss-Jordan elimination.
//!
//! Rows live at their pivot column: row `c` of the coefficient matrix and
//! slot `c` of the symbol arena belong to the row whose pivot is column `c`.
//! Every held row is normalised (pivot coefficient one) and has a zero in
//! every *other* pivot column. Inserting a new row therefore takes one
//! reduction pass over the held rows and one back-substitution pass that
//! clears the new pivot column from them.
//!
//! Decoded status is conservative. A column is reported decoded when it was
//! received systematically, when the block completes, or (with the status
//! updater on) when a row touched by an insertion is found to have weight
//! one. Rows that silently reduce to unit vectors otherwise stay "partially
//! decoded" until [`Decoder::update_symbol_status`] runs.

use crate::config::BlockConfig;
use crate::error::{ensure_index, ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::state::{CodingState, SymbolStatus};
use crate::storage::SymbolStorage;
use crate::tracing_compat::{debug, trace};

/// Callback invoked with the index of each newly decoded symbol.
pub type DecodedCallback = Box<dyn FnMut(usize) + Send>;

/// Block decoder and recoder.
pub struct Decoder {
    field: FiniteField,
    symbols: usize,
    symbol_bytes: usize,
    coefficients_bytes: usize,
    /// `symbols` packed coefficient rows, row `c` pivots at column `c`.
    rows: Vec<u8>,
    storage: SymbolStorage,
    status: Vec<SymbolStatus>,
    rank: usize,
    decoded: usize,
    pivot: Option<usize>,
    status_updater: bool,
    on_decoded: Option<DecodedCallback>,
    log: Log,
}

impl Decoder {
    /// An unconfigured decoder over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            symbols: 0,
            symbol_bytes: 0,
            coefficients_bytes: 0,
            rows: Vec::new(),
            storage: SymbolStorage::default(),
            status: Vec::new(),
            rank: 0,
            decoded: 0,
            pivot: None,
            status_updater: false,
            on_decoded: None,
            log: Log::new(),
        }
    }

    /// Configures the block geometry and resets all decoding state.
    pub fn configure(&mut self, symbols: usize, symbol_bytes: usize) -> Result<()> {
        self.configure_with(&BlockConfig::new(symbols, symbol_bytes))
    }

    /// Configures from a [`BlockConfig`] and resets all decoding state.
    pub fn configure_with(&mut self, config: &BlockConfig) -> Result<()> {
        config.validate(self.field)?;
        self.symbols = config.symbols;
        self.symbol_bytes = config.symbol_bytes;
        self.coefficients_bytes = self.field.coefficients_bytes(config.symbols);
        self.rows = vec![0; config.symbols * self.coefficients_bytes];
        self.storage = SymbolStorage::new(config.symbols, config.symbol_bytes);
        self.status = vec![SymbolStatus::Missing; config.symbols];
        self.rank = 0;
        self.decoded = 0;
        self.pivot = None;
        debug!(
            field = %self.field,
            symbols = config.symbols,
            symbol_bytes = config.symbol_bytes,
            "block decoder configured"
        );
        self.log.write("decoder", || {
            format!(
                "configured symbols={} symbol_bytes={}",
                config.symbols, config.symbol_bytes
            )
        });
        Ok(())
    }

    /// Discards all elimination progress, keeping the geometry.
    pub fn reset(&mut self) {
        self.rows.fill(0);
        self.storage.clear();
        self.status.fill(SymbolStatus::Missing);
        self.rank = 0;
        self.decoded = 0;
        self.pivot = None;
        self.log.write("decoder", || "reset".to_string());
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// Symbols per block.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.symbols
    }

    /// Bytes per symbol.
    #[must_use]
    pub const fn symbol_bytes(&self) -> usize {
        self.symbol_bytes
    }

    /// Bytes per block.
    #[must_use]
    pub const fn block_bytes(&self) -> usize {
        self.symbols * self.symbol_bytes
    }

    /// Bytes in one coefficient vector.
    #[must_use]
    pub const fn coefficients_bytes(&self) -> usize {
        self.coefficients_bytes
    }

    // ========================================================================
    // Storage
    // ========================================================================

    /// Seeds the decoder's arena from `buf`. Only allowed before the first
    /// innovative symbol arrives.
    pub fn set_symbols_storage(&mut self, buf: &[u8]) -> Result<()> {
        self.ensure_configured()?;
        if self.rank != 0 {
            return Err(Error::invalid_state(
                "decoder storage cannot be rebound after decoding started",
            ));
        }
        ensure_len(buf.len(), self.block_bytes())?;
        self.storage.fill_from(&buf[..self.block_bytes()]);
        Ok(())
    }

    /// Seeds slot `index` of the arena from `buf`. Same rule as
    /// [`set_symbols_storage`](Self::set_symbols_storage).
    pub fn set_symbol_storage(&mut self, buf: &[u8], index: usize) -> Result<()> {
        self.ensure_configured()?;
        if self.rank != 0 {
            return Err(Error::invalid_state(
                "decoder storage cannot be rebound after decoding started",
            ));
        }
        ensure_index(index, self.symbols)?;
        ensure_len(buf.len(), self.symbol_bytes)?;
        self.storage.store(index, &buf[..self.symbol_bytes]);
        Ok(())
    }

    /// Bytes of symbol `index`. Meaningful once the symbol is decoded.
    pub fn symbol_data(&self, index: usize) -> Result<&[u8]> {
        ensure_index(index, self.symbols)?;
        Ok(self.storage.symbol(index))
    }

    /// The whole block, symbol `i` at offset `i * symbol_bytes`.
    #[must_use]
    pub fn symbols_storage(&self) -> &[u8] {
        self.storage.as_bytes()
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Independent rows held.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Pivot column added by the last decode call, if it was innovative.
    #[must_use]
    pub const fn pivot(&self) -> Option<usize> {
        self.pivot
    }

    /// True if the last decode call increased the rank.
    #[must_use]
    pub const fn pivot_found(&self) -> bool {
        self.pivot.is_some()
    }

    /// True once all symbols are decoded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.symbols > 0 && self.rank == self.symbols
    }

    /// True if a row pivots at `index`.
    #[must_use]
    pub fn is_symbol_pivot(&self, index: usize) -> bool {
        self.status
            .get(index)
            .is_some_and(|s| *s != SymbolStatus::Missing)
    }

    /// True if `index` is known to be decoded.
    #[must_use]
    pub fn is_symbol_decoded(&self, index: usize) -> bool {
        self.status.get(index) == Some(&SymbolStatus::Decoded)
    }

    /// True if `index` is a pivot not yet known to be decoded.
    #[must_use]
    pub fn is_symbol_partially_decoded(&self, index: usize) -> bool {
        self.status.get(index) == Some(&SymbolStatus::Partial)
    }

    /// True if no row pivots at `index`.
    #[must_use]
    pub fn is_symbol_missing(&self, index: usize) -> bool {
        self.status.get(index) == Some(&SymbolStatus::Missing)
    }

    /// Lower bound on the number of decoded symbols.
    #[must_use]
    pub const fn symbols_decoded(&self) -> usize {
        self.decoded
    }

    /// Pivot symbols not yet known to be decoded.
    #[must_use]
    pub const fn symbols_partially_decoded(&self) -> usize {
        self.rank - self.decoded
    }

    /// Symbols without a pivot.
    #[must_use]
    pub const fn symbols_missing(&self) -> usize {
        self.symbols - self.rank
    }

    // ========================================================================
    // Status updater
    // ========================================================================

    /// Checks touched rows for weight one after every insertion.
    pub fn set_status_updater_on(&mut self) {
        self.status_updater = true;
    }

    /// Only systematic symbols and completion mark symbols decoded.
    pub fn set_status_updater_off(&mut self) {
        self.status_updater = false;
    }

    /// True if the status updater is on.
    #[must_use]
    pub const fn is_status_updater_enabled(&self) -> bool {
        self.status_updater
    }

    /// Scans every partially decoded row and marks unit rows decoded.
    pub fn update_symbol_status(&mut self) {
        for column in 0..self.symbols {
            self.refresh_status(column);
        }
    }

    /// Registers a callback fired once per newly decoded symbol.
    pub fn on_symbol_decoded<F>(&mut self, callback: F)
    where
        F: FnMut(usize) + Send + 'static,
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

    /// Feeds a coded symbol and its coefficient vector.
    ///
    /// A linearly dependent symbol is not an error: the call succeeds,
    /// the rank is unchanged and [`pivot_found`](Self::pivot_found) is false.
    pub fn decode_symbol(&mut self, symbol: &[u8], coefficients: &[u8]) -> Result<()> {
        self.ensure_configured()?;
        ensure_len(symbol.len(), self.symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes)?;

        let mut row = coefficients[..self.coefficients_bytes].to_vec();
        self.field.clear_padding(&mut row, self.symbols);
        let data = symbol[..self.symbol_bytes].to_vec();
        self.pivot = self.absorb(row, data);
        Ok(())
    }

    /// Feeds an uncoded symbol known to be source symbol `index`.
    pub fn decode_systematic_symbol(&mut self, symbol: &[u8], index: usize) -> Result<()> {
        self.ensure_configured()?;
        ensure_index(index, self.symbols)?;
        ensure_len(symbol.len(), self.symbol_bytes)?;

        let data = &symbol[..self.symbol_bytes];
        match self.status[index] {
            SymbolStatus::Decoded => {
                trace!(index, "systematic symbol already decoded");
                self.log
                    .write("decoder", || format!("systematic {index} redundant"));
                self.pivot = None;
            }
            SymbolStatus::Missing => {
                self.insert_unit(index, data);
                self.pivot = Some(index);
            }
            SymbolStatus::Partial => {
                // Swap the coded row at `index` for the unit row, then feed
                // the old row back in; it lands on a new pivot unless it
                // was already a unit row.
                let cb = self.coefficients_bytes;
                let old_row = self.rows[index * cb..(index + 1) * cb].to_vec();
                let old_data = self.storage.symbol(index).to_vec();
                self.status[index] = SymbolStatus::Missing;
                self.rank -= 1;
                let rank_before = self.rank;
                self.insert_unit(index, data);
                self.absorb(old_row, old_data);
                self.pivot = (self.rank > rank_before + 1).then_some(index);
            }
        }
        Ok(())
    }

    /// Produces a recoded symbol from the held rows.
    ///
    /// `in_coefficients` weights the held rows by pivot column and must be
    /// zero at every column without a pivot.
    pub fn recode_symbol(
        &self,
        out_symbol: &mut [u8],
        out_coefficients: &mut [u8],
        in_coefficients: &[u8],
    ) -> Result<()> {
        self.ensure_configured()?;
        let cb = self.coefficients_bytes;
        ensure_len(out_symbol.len(), self.symbol_bytes)?;
        ensure_len(out_coefficients.len(), cb)?;
        ensure_len(in_coefficients.len(), cb)?;
        if let Some(column) = (0..self.symbols).find(|&c| {
            self.status[c] == SymbolStatus::Missing
                && self.field.get_value(in_coefficients, c) != 0
        }) {
            return Err(Error::invalid_argument(format!(
                "recode coefficient for column {column} without a pivot"
            )));
        }

        let out_symbol = &mut out_symbol[..self.symbol_bytes];
        let out_coefficients = &mut out_coefficients[..cb];
        out_symbol.fill(0);
        out_coefficients.fill(0);
        for column in 0..self.symbols {
            let c = self.field.get_value(in_coefficients, column);
            if c == 0 {
                continue;
            }
            self.field.vector_multiply_add(
                out_coefficients,
                &self.rows[column * cb..(column + 1) * cb],
                c,
            );
            self.field
                .vector_multiply_add(out_symbol, self.storage.symbol(column), c);
        }
        Ok(())
    }

    // ========================================================================
    // Elimination core
    // ========================================================================

    fn ensure_configured(&self) -> Result<()> {
        if self.symbols == 0 {
            return Err(Error::invalid_state("decoder not configured"));
        }
        Ok(())
    }

    fn row(&self, column: usize) -> &[u8] {
        let cb = self.coefficients_bytes;
        &self.rows[column * cb..(column + 1) * cb]
    }

    /// Reduces `(row, data)` against the held rows and inserts it if
    /// anything is left. Returns the new pivot column.
    fn absorb(&mut self, mut row: Vec<u8>, mut data: Vec<u8>) -> Option<usize> {
        let field = self.field;
        for column in 0..self.symbols {
            if self.status[column] == SymbolStatus::Missing {
                continue;
            }
            let c = field.get_value(&row, column);
            if c == 0 {
                continue;
            }
            field.vector_multiply_add(&mut row, self.row(column), c);
            field.vector_multiply_add(&mut data, self.storage.symbol(column), c);
        }

        let Some(pivot) = field.pivot(&row, self.symbols) else {
            trace!(rank = self.rank, "redundant symbol");
            self.log.write("decoder", || "redundant symbol".to_string());
            return None;
        };

        let scale = field.invert(field.get_value(&row, pivot));
        field.vector_multiply(&mut row, scale);
        field.vector_multiply(&mut data, scale);

        let touched = self.back_substitute(pivot, &row, &data);
        self.store_row(pivot, &row, &data);
        if self.status_updater {
            self.refresh_status(pivot);
            for column in touched {
                self.refresh_status(column);
            }
        }
        Some(pivot)
    }

    /// Inserts the unit row for `index` with payload `data`.
    fn insert_unit(&mut self, index: usize, data: &[u8]) {
        let mut unit = vec![0u8; self.coefficients_bytes];
        self.field.set_value(&mut unit, index, 1);
        let touched = self.back_substitute(index, &unit, data);
        self.store_row(index, &unit, data);
        self.mark_decoded(index);
        if self.status_updater {
            for column in touched {
                self.refresh_status(column);
            }
        }
    }

    /// Clears column `pivot` from every held row using the normalised
    /// `(row, data)`. Returns the columns of the rows that changed.
    fn back_substitute(&mut self, pivot: usize, row: &[u8], data: &[u8]) -> Vec<usize> {
        let field = self.field;
        let cb = self.coefficients_bytes;
        let mut touched = Vec::new();
        for column in 0..self.symbols {
            if self.status[column] != SymbolStatus::Partial {
                continue;
            }
            let held = &mut self.rows[column * cb..(column + 1) * cb];
            let c = field.get_value(held, pivot);
            if c == 0 {
                continue;
            }
            field.vector_multiply_add(held, row, c);
            field.vector_multiply_add(self.storage.symbol_mut(column), data, c);
            touched.push(column);
        }
        touched
    }

    fn store_row(&mut self, pivot: usize, row: &[u8], data: &[u8]) {
        let cb = self.coefficients_bytes;
        self.rows[pivot * cb..(pivot + 1) * cb].copy_from_slice(row);
        self.storage.store(pivot, data);
        self.status[pivot] = SymbolStatus::Partial;
        self.rank += 1;
        debug!(pivot, rank = self.rank, symbols = self.symbols, "new pivot");
        self.log.write("decoder", || {
            format!("pivot {pivot} rank {}/{}", self.rank, self.symbols)
        });

        if self.rank == self.symbols {
            for column in 0..self.symbols {
                self.mark_decoded(column);
            }
            debug!(symbols = self.symbols, "block complete");
            self.log.write("decoder", || "complete".to_string());
        }
    }

    fn refresh_status(&mut self, column: usize) {
        if self.status[column] == SymbolStatus::Partial
            && self.field.weight(self.row(column), self.symbols) == 1
        {
            self.mark_decoded(column);
        }
    }

    fn mark_decoded(&mut self, column: usize) {
        if self.status[column] == SymbolStatus::Decoded {
            return;
        }
        self.status[column] = SymbolStatus::Decoded;
        self.decoded += 1;
        if let Some(callback) = self.on_decoded.as_mut() {
            callback(column);
        }
    }
}

impl_log_accessors!(Decoder);

impl CodingState for Decoder {
    type Index = usize;

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        Self::is_symbol_pivot(self, index)
    }

    fn is_symbol_decoded(&self, index: usize) -> bool {
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
            .field("symbols", &self.symbols)
            .field("symbol_bytes", &self.symbol_bytes)
            .field("rank", &self.rank)
            .field("decoded", &self.decoded)
            .field("status_updater", &self.status_updater)
            .finish_non_exhaustive()
    }
}
