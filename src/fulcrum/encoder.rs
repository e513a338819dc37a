//! Fulcrum encoder.

use super::Expansion;
use crate::config::FulcrumConfig;
use crate::error::{ensure_index, ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::storage::SymbolStorage;
use crate::tracing_compat::debug;

/// Encodes data symbols plus outer expansion symbols with binary
/// coefficients.
///
/// Expansion symbols are computed once every data symbol is set; coded
/// symbols that reference an expansion symbol fail with `NotReady` before
/// that.
#[derive(Debug)]
pub struct Encoder {
    field: FiniteField,
    config: FulcrumConfig,
    data: SymbolStorage,
    expansion: Option<Expansion>,
    expansion_symbols: SymbolStorage,
    log: Log,
}

impl Encoder {
    /// An unconfigured encoder with outer field `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            config: FulcrumConfig::new(0, 0, 0),
            data: SymbolStorage::default(),
            expansion: None,
            expansion_symbols: SymbolStorage::default(),
            log: Log::new(),
        }
    }

    /// Configures the geometry and clears all symbol data.
    pub fn configure(&mut self, symbols: usize, symbol_bytes: usize, expansion: usize) -> Result<()> {
        self.configure_with(&FulcrumConfig::new(symbols, symbol_bytes, expansion))
    }

    /// Configures from a [`FulcrumConfig`] and clears all symbol data.
    pub fn configure_with(&mut self, config: &FulcrumConfig) -> Result<()> {
        config.validate(self.field)?;
        self.config = *config;
        self.data = SymbolStorage::new(config.symbols, config.symbol_bytes);
        self.expansion = Some(Expansion::new(
            self.field,
            config.symbols,
            config.expansion,
        ));
        self.expansion_symbols = SymbolStorage::new(config.expansion, config.symbol_bytes);
        debug!(
            field = %self.field,
            symbols = config.symbols,
            expansion = config.expansion,
            "fulcrum encoder configured"
        );
        Ok(())
    }

    /// Clears all symbol data, keeping the geometry.
    pub fn reset(&mut self) {
        self.data.clear();
        self.expansion_symbols.clear();
    }

    /// The outer field.
    #[must_use]
    pub const fn field(&self) -> FiniteField {
        self.field
    }

    /// The inner field, always binary.
    #[must_use]
    pub const fn inner_field(&self) -> FiniteField {
        FiniteField::Binary
    }

    /// Data symbols.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        self.config.symbols
    }

    /// Expansion symbols.
    #[must_use]
    pub const fn expansion(&self) -> usize {
        self.config.expansion
    }

    /// Data plus expansion symbols.
    #[must_use]
    pub const fn inner_symbols(&self) -> usize {
        self.config.inner_symbols()
    }

    /// Bytes per symbol.
    #[must_use]
    pub const fn symbol_bytes(&self) -> usize {
        self.config.symbol_bytes
    }

    /// Bytes of data.
    #[must_use]
    pub const fn block_bytes(&self) -> usize {
        self.config.symbols * self.config.symbol_bytes
    }

    /// Bytes in one (binary, inner) coefficient vector.
    #[must_use]
    pub const fn coefficients_bytes(&self) -> usize {
        FiniteField::Binary.coefficients_bytes(self.inner_symbols())
    }

    /// Data symbols that are set.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.data.set_count()
    }

    /// True if data symbol `index` is set.
    #[must_use]
    pub fn is_symbol_set(&self, index: usize) -> bool {
        self.data.is_set(index)
    }

    /// Sets every data symbol from one buffer. Only allowed while no symbol
    /// is set.
    pub fn set_symbols_storage(&mut self, buf: &[u8]) -> Result<()> {
        self.ensure_configured()?;
        if let Some(index) = (0..self.symbols()).find(|&i| self.data.is_set(i)) {
            return Err(Error::AlreadySet {
                index: index as u64,
            });
        }
        ensure_len(buf.len(), self.block_bytes())?;
        self.data.fill_from(&buf[..self.block_bytes()]);
        self.compute_expansion();
        Ok(())
    }

    /// Sets data symbol `index`.
    pub fn set_symbol_storage(&mut self, buf: &[u8], index: usize) -> Result<()> {
        self.ensure_configured()?;
        ensure_index(index, self.symbols())?;
        if self.data.is_set(index) {
            return Err(Error::AlreadySet {
                index: index as u64,
            });
        }
        ensure_len(buf.len(), self.symbol_bytes())?;
        self.data.store(index, &buf[..self.symbol_bytes()]);
        if self.rank() == self.symbols() {
            self.compute_expansion();
        }
        Ok(())
    }

    /// Bytes of data symbol `index`.
    pub fn symbol_data(&self, index: usize) -> Result<&[u8]> {
        ensure_index(index, self.symbols())?;
        Ok(self.data.symbol(index))
    }

    /// Writes `Σ coefficients[i] * inner_symbol(i)` into `out`; the
    /// coefficients are binary over the inner symbols.
    pub fn encode_symbol(&mut self, out: &mut [u8], coefficients: &[u8]) -> Result<()> {
        self.ensure_configured()?;
        ensure_len(out.len(), self.symbol_bytes())?;
        ensure_len(coefficients.len(), self.coefficients_bytes())?;
        let binary = FiniteField::Binary;
        let symbols = self.symbols();
        for i in 0..self.inner_symbols() {
            if binary.get_value(coefficients, i) == 0 {
                continue;
            }
            let ready = if i < symbols {
                self.data.is_set(i)
            } else {
                self.expansion_symbols.is_set(i - symbols)
            };
            if !ready {
                let index = if i < symbols {
                    i
                } else {
                    (0..symbols).find(|&j| !self.data.is_set(j)).unwrap_or(i)
                };
                return Err(Error::NotReady {
                    index: index as u64,
                });
            }
        }

        let out = &mut out[..self.symbol_bytes()];
        out.fill(0);
        for i in 0..self.inner_symbols() {
            if binary.get_value(coefficients, i) == 0 {
                continue;
            }
            let symbol = if i < symbols {
                self.data.symbol(i)
            } else {
                self.expansion_symbols.symbol(i - symbols)
            };
            self.field.vector_add(out, symbol);
        }
        self.log.write("encoder", || "coded symbol".to_string());
        Ok(())
    }

    /// Copies data symbol `index` into `out` uncoded.
    pub fn encode_systematic_symbol(&mut self, out: &mut [u8], index: usize) -> Result<()> {
        self.ensure_configured()?;
        ensure_index(index, self.symbols())?;
        ensure_len(out.len(), self.symbol_bytes())?;
        if !self.data.is_set(index) {
            return Err(Error::NotReady {
                index: index as u64,
            });
        }
        out[..self.symbol_bytes()].copy_from_slice(self.data.symbol(index));
        Ok(())
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.expansion.is_none() {
            return Err(Error::invalid_state("encoder not configured"));
        }
        Ok(())
    }

    fn compute_expansion(&mut self) {
        let Some(expansion) = self.expansion.as_ref() else {
            return;
        };
        for row in 0..self.config.expansion {
            expansion.encode_expansion(row, &self.data, self.expansion_symbols.symbol_mut(row));
            self.expansion_symbols.mark_set(row);
        }
        self.log.write("encoder", || {
            format!("computed {} expansion symbols", self.config.expansion)
        });
    }
}

impl_log_accessors!(Encoder);
