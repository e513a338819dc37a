//! Block encoder.

use crate::config::BlockConfig;
use crate::error::{ensure_index, ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::storage::SymbolStorage;
use crate::tracing_compat::debug;

/// Combines the source symbols of one block into coded symbols.
///
/// The encoder's rank is the number of source symbols whose data has been
/// set; an encode may only reference symbols that are set.
#[derive(Debug)]
pub struct Encoder {
    field: FiniteField,
    symbols: usize,
    symbol_bytes: usize,
    storage: SymbolStorage,
    log: Log,
}

impl Encoder {
    /// An unconfigured encoder over `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            symbols: 0,
            symbol_bytes: 0,
            storage: SymbolStorage::default(),
            log: Log::new(),
        }
    }

    /// Configures the block geometry. Clears all symbol data.
    pub fn configure(&mut self, symbols: usize, symbol_bytes: usize) -> Result<()> {
        self.configure_with(&BlockConfig::new(symbols, symbol_bytes))
    }

    /// Configures from a [`BlockConfig`]. Clears all symbol data.
    pub fn configure_with(&mut self, config: &BlockConfig) -> Result<()> {
        config.validate(self.field)?;
        self.symbols = config.symbols;
        self.symbol_bytes = config.symbol_bytes;
        self.storage = SymbolStorage::new(config.symbols, config.symbol_bytes);
        debug!(
            field = %self.field,
            symbols = config.symbols,
            symbol_bytes = config.symbol_bytes,
            "block encoder configured"
        );
        Ok(())
    }

    /// Clears all symbol data, keeping the geometry.
    pub fn reset(&mut self) {
        self.storage.clear();
    }

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
        self.field.coefficients_bytes(self.symbols)
    }

    /// Number of symbols whose data is set.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.storage.set_count()
    }

    /// True if symbol `index` has data.
    #[must_use]
    pub fn is_symbol_set(&self, index: usize) -> bool {
        self.storage.is_set(index)
    }

    /// Sets the data of every symbol from one contiguous buffer. Only
    /// allowed while no symbol is set.
    pub fn set_symbols_storage(&mut self, buf: &[u8]) -> Result<()> {
        self.ensure_configured()?;
        if self.rank() != 0 {
            return Err(Error::AlreadySet {
                index: self.first_set_index() as u64,
            });
        }
        ensure_len(buf.len(), self.block_bytes())?;
        self.storage.fill_from(&buf[..self.block_bytes()]);
        self.log
            .write("encoder", || format!("set {} symbols", self.symbols));
        Ok(())
    }

    /// Sets the data of symbol `index`.
    pub fn set_symbol_storage(&mut self, buf: &[u8], index: usize) -> Result<()> {
        self.ensure_configured()?;
        ensure_index(index, self.symbols)?;
        if self.storage.is_set(index) {
            return Err(Error::AlreadySet {
                index: index as u64,
            });
        }
        ensure_len(buf.len(), self.symbol_bytes)?;
        self.storage.store(index, &buf[..self.symbol_bytes]);
        self.log.write("encoder", || format!("set symbol {index}"));
        Ok(())
    }

    /// Bytes of symbol `index`.
    pub fn symbol_data(&self, index: usize) -> Result<&[u8]> {
        ensure_index(index, self.symbols)?;
        Ok(self.storage.symbol(index))
    }

    /// Writes `Σ coefficients[i] * symbol(i)` into `out`.
    ///
    /// Fails with `NotReady` if a nonzero coefficient refers to a symbol
    /// without data.
    pub fn encode_symbol(&mut self, out: &mut [u8], coefficients: &[u8]) -> Result<()> {
        self.ensure_configured()?;
        ensure_len(out.len(), self.symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes())?;
        let field = self.field;
        if let Some(index) = (0..self.symbols)
            .find(|&i| !self.storage.is_set(i) && field.get_value(coefficients, i) != 0)
        {
            return Err(Error::NotReady {
                index: index as u64,
            });
        }

        let out = &mut out[..self.symbol_bytes];
        out.fill(0);
        for i in 0..self.symbols {
            let c = field.get_value(coefficients, i);
            field.vector_multiply_add(out, self.storage.symbol(i), c);
        }
        self.log.write("encoder", || "coded symbol".to_string());
        Ok(())
    }

    /// Copies symbol `index` into `out` uncoded.
    pub fn encode_systematic_symbol(&mut self, out: &mut [u8], index: usize) -> Result<()> {
        self.ensure_configured()?;
        ensure_index(index, self.symbols)?;
        ensure_len(out.len(), self.symbol_bytes)?;
        if !self.storage.is_set(index) {
            return Err(Error::NotReady {
                index: index as u64,
            });
        }
        out[..self.symbol_bytes].copy_from_slice(self.storage.symbol(index));
        self.log
            .write("encoder", || format!("systematic symbol {index}"));
        Ok(())
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.symbols == 0 {
            return Err(Error::invalid_state("encoder not configured"));
        }
        Ok(())
    }

    fn first_set_index(&self) -> usize {
        (0..self.symbols)
            .find(|&i| self.storage.is_set(i))
            .unwrap_or(0)
    }
}

impl_log_accessors!(Encoder);
