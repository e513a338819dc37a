//! Perpetual decoder.

mod state;

use super::{Layout, Position};
use crate::config::PerpetualConfig;
use crate::error::{ensure_index, ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::linalg::SparseRow;
use crate::log::{impl_log_accessors, Log};
use crate::state::CodingState;
use crate::storage::SymbolStorage;
use crate::tracing_compat::{debug, trace};

/// Decodes width-limited coded symbols; see the [module docs](super).
///
/// Rows are indexed by inner position and only reduced forward until the
/// rank is full, so a symbol counts as decoded before completion only when
/// its row arrived with a single term.
#[derive(Debug)]
pub struct Decoder {
    field: FiniteField,
    config: PerpetualConfig,
    layout: Option<Layout>,
    rows: Vec<Option<SparseRow>>,
    data: SymbolStorage,
    outer: SymbolStorage,
    rank: usize,
    decoded: usize,
    pivot: Option<usize>,
    pivot_found: bool,
    mapped: bool,
    complete: bool,
    log: Log,
}

impl Decoder {
    /// An unconfigured decoder over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            config: PerpetualConfig::new(0, 0, 0),
            layout: None,
            rows: Vec::new(),
            data: SymbolStorage::default(),
            outer: SymbolStorage::default(),
            rank: 0,
            decoded: 0,
            pivot: None,
            pivot_found: false,
            mapped: false,
            complete: false,
            log: Log::new(),
        }
    }

    /// Configures the geometry with default outer-code parameters.
    pub fn configure(&mut self, block_bytes: usize, symbol_bytes: usize, width: usize) -> Result<()> {
        self.configure_with(&PerpetualConfig::new(block_bytes, symbol_bytes, width))
    }

    /// Configures from a [`PerpetualConfig`] and resets.
    pub fn configure_with(&mut self, config: &PerpetualConfig) -> Result<()> {
        config.validate(self.field)?;
        let layout = Layout::new(config);
        self.config = *config;
        self.layout = Some(layout);
        self.rows = vec![None; layout.inner_symbols()];
        self.data = SymbolStorage::new(layout.symbols(), config.symbol_bytes);
        self.outer = SymbolStorage::new(layout.outer_symbols(), config.symbol_bytes);
        self.reset();
        debug!(
            field = %self.field,
            symbols = layout.symbols(),
            outer_symbols = layout.outer_symbols(),
            width = config.width,
            "perpetual decoder configured"
        );
        Ok(())
    }

    /// Discards all decoding progress, keeping the geometry.
    pub fn reset(&mut self) {
        self.rows.fill(None);
        self.data.clear();
        self.outer.clear();
        self.rank = 0;
        self.decoded = 0;
        self.pivot = None;
        self.pivot_found = false;
        self.mapped = false;
        self.complete = false;
    }

    /// The field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PerpetualConfig {
        &self.config
    }

    /// The inner layout, once configured.
    #[must_use]
    pub const fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Data symbols.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.config.symbols()
    }

    /// Data plus outer symbols.
    #[must_use]
    pub const fn inner_symbols(&self) -> usize {
        self.config.inner_symbols()
    }

    /// Bytes per symbol.
    #[must_use]
    pub const fn symbol_bytes(&self) -> usize {
        self.config.symbol_bytes
    }

    /// Bytes of data in the block.
    #[must_use]
    pub const fn block_bytes(&self) -> usize {
        self.config.block_bytes
    }

    /// Coefficients per coded symbol.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.config.width
    }

    /// Bytes in one coefficient vector.
    #[must_use]
    pub const fn coefficients_bytes(&self) -> usize {
        self.field.coefficients_bytes(self.config.width)
    }

    /// Independent rows held, over inner positions.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Inner position of the newest pivot.
    #[must_use]
    pub const fn pivot(&self) -> Option<usize> {
        self.pivot
    }

    /// True if the last `decode_symbol` call added a pivot.
    #[must_use]
    pub const fn pivot_found(&self) -> bool {
        self.pivot_found
    }

    /// True if a row pivots at inner position `index`.
    #[must_use]
    pub fn is_pivot(&self, index: usize) -> bool {
        matches!(self.rows.get(index), Some(Some(_)))
    }

    /// True if inner position `index` is known to be decoded.
    #[must_use]
    pub fn is_decoded(&self, index: usize) -> bool {
        matches!(self.rows.get(index), Some(Some(row)) if row.weight() == 1)
    }

    /// True once the outer constraints have been inserted.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// True when the rank is full and back-substitution can run.
    #[must_use]
    pub fn can_complete_decoding(&self) -> bool {
        self.layout.is_some() && self.rank == self.rows.len()
    }

    /// True once `symbols_storage` holds the decoded block.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// The data block as decoded so far, `block_bytes` long.
    #[must_use]
    pub fn symbols_storage(&self) -> &[u8] {
        &self.data.as_bytes()[..self.config.block_bytes]
    }

    /// Seeds the data arena from `buf`, which must hold `block_bytes`.
    /// Only allowed before the first innovative symbol arrives.
    pub fn set_symbols_storage(&mut self, buf: &[u8]) -> Result<()> {
        self.configured_layout()?;
        if self.rank != 0 {
            return Err(Error::invalid_state(
                "decoder storage cannot be rebound after decoding started",
            ));
        }
        ensure_len(buf.len(), self.config.block_bytes)?;
        self.data.fill_from(&buf[..self.config.block_bytes]);
        Ok(())
    }

    /// Bytes of data symbol `index`.
    pub fn symbol_data(&self, index: usize) -> Result<&[u8]> {
        ensure_index(index, self.data.count())?;
        Ok(self.data.symbol(index))
    }

    /// Feeds a coded symbol whose `width` coefficients start at inner
    /// position `offset`.
    ///
    /// Redundant symbols are accepted and leave the rank unchanged. The
    /// decoder completes itself as soon as the rank is full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode_symbol(&mut self, symbol: &[u8], coefficients: &[u8], offset: usize) -> Result<()> {
        let layout = self.configured_layout()?;
        ensure_len(symbol.len(), self.config.symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes())?;
        let inner = layout.inner_symbols();
        ensure_index(offset, inner)?;

        self.pivot_found = false;
        if self.complete {
            trace!(offset, "perpetual decoder already complete");
            return Ok(());
        }
        let field = self.field;
        let row = SparseRow::from_terms((0..self.config.width).map(|k| {
            (((offset + k) % inner) as u64, field.get_value(coefficients, k))
        }));
        self.insert(layout, row, symbol[..self.config.symbol_bytes].to_vec());
        self.map_outer(layout);
        if self.rank == inner {
            self.back_substitute(layout);
        }
        Ok(())
    }

    /// Back-substitutes a full-rank decoder. A no-op once complete.
    pub fn complete_decoding(&mut self) -> Result<()> {
        let layout = self.configured_layout()?;
        if self.complete {
            return Ok(());
        }
        if self.rank < layout.inner_symbols() {
            return Err(Error::invalid_state(format!(
                "rank {} of {} is not full",
                self.rank,
                layout.inner_symbols()
            )));
        }
        self.back_substitute(layout);
        Ok(())
    }

    fn configured_layout(&self) -> Result<Layout> {
        self.layout
            .ok_or_else(|| Error::invalid_state("decoder not configured"))
    }

    /// Inserts a row, recording a new pivot if it is innovative.
    fn insert(&mut self, layout: Layout, row: SparseRow, payload: Vec<u8>) {
        match self.absorb(layout, row, payload) {
            Some(pivot) => {
                self.pivot = Some(pivot);
                self.pivot_found = true;
                self.log.write("decoder", || {
                    format!("pivot {pivot}, rank {}/{}", self.rank, self.rows.len())
                });
            }
            None => {
                trace!("redundant perpetual symbol");
            }
        }
    }

    /// Forward-reduces `row` against the held rows and stores it at its
    /// lowest column. Returns that column, or `None` if the row vanished.
    #[allow(clippy::cast_possible_truncation)]
    fn absorb(&mut self, layout: Layout, mut row: SparseRow, mut payload: Vec<u8>) -> Option<usize> {
        let field = self.field;
        while let Some((column, value)) = row.lowest() {
            let column = column as usize;
            if let Some(held) = &self.rows[column] {
                row.add_scaled(field, held, value);
                field.vector_multiply_add(&mut payload, self.slot(layout.position(column)), value);
                continue;
            }
            let inverse = field.invert(value);
            row.scale(field, inverse);
            field.vector_multiply(&mut payload, inverse);
            self.slot_mut(layout.position(column))
                .copy_from_slice(&payload);
            if row.weight() == 1 {
                self.decoded += 1;
            }
            self.rows[column] = Some(row);
            self.rank += 1;
            return Some(column);
        }
        None
    }

    /// Inserts the outer constraints once the rank crosses the mapping
    /// threshold.
    fn map_outer(&mut self, layout: Layout) {
        if self.mapped || layout.outer_symbols() == 0 || self.rank < self.mapping_rank() {
            return;
        }
        self.mapped = true;
        for index in 0..layout.outer_symbols() {
            let terms = layout
                .outer_terms(self.field, index)
                .into_iter()
                .map(|(d, c)| (layout.data_position(d) as u64, c));
            let row = SparseRow::from_terms(
                std::iter::once((layout.outer_position(index) as u64, 1)).chain(terms),
            );
            self.insert(layout, row, vec![0; self.config.symbol_bytes]);
        }
        debug!(
            rank = self.rank,
            outer_symbols = layout.outer_symbols(),
            "perpetual outer code mapped"
        );
        self.log.write("decoder", || {
            format!("mapped outer code at rank {}", self.rank)
        });
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn mapping_rank(&self) -> usize {
        (self.config.mapping_threshold * self.rows.len() as f64).ceil() as usize
    }

    /// Reduces every row to a unit vector, highest pivot first.
    #[allow(clippy::cast_possible_truncation)]
    fn back_substitute(&mut self, layout: Layout) {
        let field = self.field;
        for column in (0..self.rows.len()).rev() {
            let Some(row) = self.rows[column].take() else {
                continue;
            };
            let dst = layout.position(column);
            for &(other, value) in &row.terms()[1..] {
                let (out, src) = self.slot_pair(dst, layout.position(other as usize));
                field.vector_multiply_add(out, src, value);
            }
            if row.weight() > 1 {
                self.decoded += 1;
            }
            self.rows[column] = Some(SparseRow::singleton(column as u64, 1));
        }
        self.complete = true;
        debug!(symbols = layout.symbols(), "perpetual decoder complete");
        self.log.write("decoder", || "complete".to_string());
    }

    fn slot(&self, at: Position) -> &[u8] {
        match at {
            Position::Data(d) => self.data.symbol(d),
            Position::Outer(o) => self.outer.symbol(o),
        }
    }

    fn slot_mut(&mut self, at: Position) -> &mut [u8] {
        match at {
            Position::Data(d) => self.data.symbol_mut(d),
            Position::Outer(o) => self.outer.symbol_mut(o),
        }
    }

    fn slot_pair(&mut self, dst: Position, src: Position) -> (&mut [u8], &[u8]) {
        match (dst, src) {
            (Position::Data(a), Position::Data(b)) => self.data.pair_mut(a, b),
            (Position::Outer(a), Position::Outer(b)) => self.outer.pair_mut(a, b),
            (Position::Data(a), Position::Outer(b)) => {
                (self.data.symbol_mut(a), self.outer.symbol(b))
            }
            (Position::Outer(a), Position::Data(b)) => {
                (self.outer.symbol_mut(a), self.data.symbol(b))
            }
        }
    }
}

impl_log_accessors!(Decoder);

impl CodingState for Decoder {
    type Index = usize;

    fn symbols(&self) -> usize {
        self.rows.len()
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.is_pivot(index)
    }

    fn is_symbol_decoded(&self, index: usize) -> bool {
        self.is_decoded(index)
    }

    fn symbols_decoded(&self) -> usize {
        self.decoded
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perpetual::Encoder;
    use crate::ErrorKind;

    fn config(block_bytes: usize, symbol_bytes: usize, width: usize, interval: usize) -> PerpetualConfig {
        let mut config = PerpetualConfig::new(block_bytes, symbol_bytes, width);
        config.outer_interval = interval;
        config.outer_segments = 1;
        config
    }

    #[test]
    fn unit_rows_decode_immediately() {
        let mut d = Decoder::new(FiniteField::Binary8);
        d.configure_with(&config(4, 1, 2, 0)).expect("configure");
        d.decode_symbol(&[9], &[1, 0], 2).expect("decode");
        assert_eq!(d.rank(), 1);
        assert_eq!(d.pivot(), Some(2));
        assert!(d.pivot_found());
        assert!(d.is_decoded(2));
        assert_eq!(d.symbols_decoded(), 1);
        assert_eq!(d.symbol_data(2).expect("index"), &[9]);

        // same packet again is redundant
        d.decode_symbol(&[9], &[1, 0], 2).expect("decode");
        assert_eq!(d.rank(), 1);
        assert!(!d.pivot_found());
    }

    #[test]
    fn wrapping_rows_complete() {
        let field = FiniteField::Binary8;
        let data = [10u8, 20, 30, 40];
        let mut e = Encoder::new(field);
        let mut d = Decoder::new(field);
        let cfg = config(4, 1, 2, 0);
        e.configure_with(&cfg).expect("configure");
        d.configure_with(&cfg).expect("configure");
        e.set_symbols_storage(&data).expect("set");

        let mut out = [0u8; 1];
        for (offset, coefficients) in [(3usize, [2u8, 3]), (0, [1, 1]), (1, [5, 7]), (2, [1, 4])] {
            e.encode_symbol(&mut out, &coefficients, offset).expect("encode");
            assert!(!d.is_complete());
            d.decode_symbol(&out, &coefficients, offset).expect("decode");
        }
        assert!(d.is_complete());
        assert_eq!(d.symbols_decoded(), 4);
        assert_eq!(d.symbols_storage(), &data);
    }

    #[test]
    fn outer_mapping_saves_packets() {
        let field = FiniteField::Binary8;
        let mut cfg = config(4, 1, 1, 2);
        cfg.mapping_threshold = 0.5;
        // inner: D0 D1 O0 D2 D3 O1
        let mut e = Encoder::new(field);
        let mut d = Decoder::new(field);
        e.configure_with(&cfg).expect("configure");
        d.configure_with(&cfg).expect("configure");
        e.set_symbols_storage(&[1, 2, 3, 4]).expect("set");

        let mut out = [0u8; 1];
        let layout = *d.layout().expect("configured");
        for data in 0..4 {
            let offset = layout.data_position(data);
            e.encode_symbol(&mut out, &[1], offset).expect("encode");
            d.decode_symbol(&out, &[1], offset).expect("decode");
            if data < 2 {
                assert!(!d.is_mapped());
            }
        }
        // four data packets plus two outer constraints fill all six columns
        assert!(d.is_mapped());
        assert!(d.is_complete());
        assert_eq!(d.rank(), 6);
        assert_eq!(d.symbols_storage(), &[1, 2, 3, 4]);
    }

    #[test]
    fn storage_seeds_only_fresh_decoder() {
        let mut d = Decoder::new(FiniteField::Binary8);
        assert_eq!(
            d.set_symbols_storage(&[0; 3]).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        // three bytes in two-byte symbols: the padding stays zero
        d.configure_with(&config(3, 2, 1, 0)).expect("configure");
        assert_eq!(
            d.set_symbols_storage(&[0; 2]).unwrap_err().kind(),
            ErrorKind::BufferTooSmall
        );
        d.set_symbols_storage(&[4, 5, 6]).expect("fresh decoder");
        assert_eq!(d.symbols_storage(), &[4, 5, 6]);
        assert_eq!(d.symbol_data(1).expect("index"), &[6, 0]);

        d.decode_symbol(&[1, 2], &[1], 0).expect("decode");
        assert_eq!(
            d.set_symbols_storage(&[0; 3]).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn complete_requires_full_rank() {
        let mut d = Decoder::new(FiniteField::Binary);
        assert_eq!(
            d.complete_decoding().unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        d.configure_with(&config(2, 1, 1, 0)).expect("configure");
        assert!(!d.can_complete_decoding());
        assert_eq!(
            d.complete_decoding().unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            d.decode_symbol(&[0], &[1], 2).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
    }
}
