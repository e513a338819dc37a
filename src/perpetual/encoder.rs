//! Perpetual encoder.

use super::{Layout, Position};
use crate::config::PerpetualConfig;
use crate::error::{ensure_index, ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::storage::SymbolStorage;
use crate::tracing_compat::debug;

/// Encodes a block into width-limited coded symbols.
///
/// The whole block is set at once; the outer symbols are computed right
/// away.
#[derive(Debug)]
pub struct Encoder {
    field: FiniteField,
    config: PerpetualConfig,
    layout: Option<Layout>,
    data: SymbolStorage,
    outer: SymbolStorage,
    log: Log,
}

impl Encoder {
    /// An unconfigured encoder over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            config: PerpetualConfig::new(0, 0, 0),
            layout: None,
            data: SymbolStorage::default(),
            outer: SymbolStorage::default(),
            log: Log::new(),
        }
    }

    /// Configures the geometry with default outer-code parameters.
    pub fn configure(&mut self, block_bytes: usize, symbol_bytes: usize, width: usize) -> Result<()> {
        self.configure_with(&PerpetualConfig::new(block_bytes, symbol_bytes, width))
    }

    /// Configures from a [`PerpetualConfig`]. Clears the block.
    pub fn configure_with(&mut self, config: &PerpetualConfig) -> Result<()> {
        config.validate(self.field)?;
        let layout = Layout::new(config);
        self.data = SymbolStorage::new(layout.symbols(), config.symbol_bytes);
        self.outer = SymbolStorage::new(layout.outer_symbols(), config.symbol_bytes);
        self.config = *config;
        debug!(
            field = %self.field,
            symbols = layout.symbols(),
            outer_symbols = layout.outer_symbols(),
            width = config.width,
            "perpetual encoder configured"
        );
        self.layout = Some(layout);
        Ok(())
    }

    /// Clears the block, keeping the geometry.
    pub fn reset(&mut self) {
        self.data.clear();
        self.outer.clear();
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

    /// Data plus outer symbols; offsets range over these.
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

    /// True once the block is set.
    #[must_use]
    pub fn is_storage_set(&self) -> bool {
        self.data.count() > 0 && self.data.set_count() == self.data.count()
    }

    /// Sets the block from `buf`, which must hold at least `block_bytes`.
    /// The final symbol is zero padded.
    pub fn set_symbols_storage(&mut self, buf: &[u8]) -> Result<()> {
        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| Error::invalid_state("encoder not configured"))?;
        if self.data.set_count() != 0 {
            return Err(Error::AlreadySet { index: 0 });
        }
        ensure_len(buf.len(), self.config.block_bytes)?;
        self.data.fill_from(&buf[..self.config.block_bytes]);
        for index in 0..layout.outer_symbols() {
            let out = self.outer.symbol_mut(index);
            out.fill(0);
            for (d, c) in layout.outer_terms(self.field, index) {
                self.field.vector_multiply_add(out, self.data.symbol(d), c);
            }
            self.outer.mark_set(index);
        }
        self.log.write("encoder", || {
            format!(
                "set {} symbols, {} outer",
                self.data.count(),
                self.outer.count()
            )
        });
        Ok(())
    }

    /// Bytes of data symbol `index`, zero padded past `block_bytes`.
    pub fn symbol_data(&self, index: usize) -> Result<&[u8]> {
        ensure_index(index, self.data.count())?;
        Ok(self.data.symbol(index))
    }

    /// Writes `Σ coefficients[k] * inner((offset + k) mod inner_symbols)`
    /// into `out`.
    pub fn encode_symbol(&mut self, out: &mut [u8], coefficients: &[u8], offset: usize) -> Result<()> {
        let Some(layout) = self.layout.as_ref() else {
            return Err(Error::invalid_state("encoder not configured"));
        };
        ensure_len(out.len(), self.config.symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes())?;
        let inner = layout.inner_symbols();
        ensure_index(offset, inner)?;
        if !self.is_storage_set() {
            return Err(Error::NotReady { index: 0 });
        }

        let out = &mut out[..self.config.symbol_bytes];
        out.fill(0);
        for k in 0..self.config.width {
            let c = self.field.get_value(coefficients, k);
            let symbol = match layout.position((offset + k) % inner) {
                Position::Data(d) => self.data.symbol(d),
                Position::Outer(o) => self.outer.symbol(o),
            };
            self.field.vector_multiply_add(out, symbol, c);
        }
        self.log
            .write("encoder", || format!("coded symbol at offset {offset}"));
        Ok(())
    }
}

impl_log_accessors!(Encoder);
