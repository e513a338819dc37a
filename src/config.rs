//! Coder configuration.
//!
//! Each coder family has a plain configuration struct with sensible
//! defaults and a `validate` method. The structs derive serde traits so an
//! application can load them from whatever format it already uses; coders
//! re-validate on `configure_with`, so a deserialized value cannot bypass
//! the checks.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::FiniteField;

/// Default number of expansion symbols for fulcrum codes.
pub const DEFAULT_EXPANSION: usize = 4;
/// Default spacing of perpetual outer symbols.
pub const DEFAULT_OUTER_INTERVAL: usize = 8;
/// Default span of a perpetual outer symbol, in multiples of the width.
pub const DEFAULT_OUTER_SEGMENTS: usize = 8;
/// Default rank fraction at which the perpetual outer code is mapped in.
pub const DEFAULT_MAPPING_THRESHOLD: f64 = 0.98;

/// Block code geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Symbols per block.
    pub symbols: usize,
    /// Bytes per symbol.
    pub symbol_bytes: usize,
}

impl BlockConfig {
    /// Creates a block configuration.
    #[must_use]
    pub const fn new(symbols: usize, symbol_bytes: usize) -> Self {
        Self {
            symbols,
            symbol_bytes,
        }
    }

    /// Bytes in a whole block.
    #[must_use]
    pub const fn block_bytes(&self) -> usize {
        self.symbols * self.symbol_bytes
    }

    /// Validates the geometry for `field`.
    pub fn validate(&self, field: FiniteField) -> Result<()> {
        if self.symbols == 0 {
            return Err(Error::invalid_argument("symbols must be > 0"));
        }
        field.check_symbol_bytes(self.symbol_bytes)?;
        arena_bytes(self.symbols, self.symbol_bytes).map(|_| ())
    }
}

/// `symbols * symbol_bytes`, or `InvalidArgument` if it overflows.
fn arena_bytes(symbols: usize, symbol_bytes: usize) -> Result<usize> {
    symbols.checked_mul(symbol_bytes).ok_or_else(|| {
        Error::invalid_argument(format!(
            "{symbols} symbols of {symbol_bytes} bytes overflow the address space"
        ))
    })
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self::new(16, 1400)
    }
}

/// Sliding-window stream geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideConfig {
    /// Maximum bytes per stream symbol; shorter symbols are zero padded.
    pub max_symbol_bytes: usize,
}

impl SlideConfig {
    /// Creates a stream configuration.
    #[must_use]
    pub const fn new(max_symbol_bytes: usize) -> Self {
        Self { max_symbol_bytes }
    }

    /// Validates the geometry for `field`.
    pub fn validate(&self, field: FiniteField) -> Result<()> {
        field.check_symbol_bytes(self.max_symbol_bytes)
    }
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self::new(1400)
    }
}

/// Fulcrum code geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulcrumConfig {
    /// Data symbols per block.
    pub symbols: usize,
    /// Bytes per symbol.
    pub symbol_bytes: usize,
    /// Outer expansion symbols added to the inner code.
    pub expansion: usize,
}

impl FulcrumConfig {
    /// Creates a fulcrum configuration.
    #[must_use]
    pub const fn new(symbols: usize, symbol_bytes: usize, expansion: usize) -> Self {
        Self {
            symbols,
            symbol_bytes,
            expansion,
        }
    }

    /// Symbols of the inner binary code.
    #[must_use]
    pub const fn inner_symbols(&self) -> usize {
        self.symbols + self.expansion
    }

    /// Validates the geometry for the outer `field`.
    pub fn validate(&self, field: FiniteField) -> Result<()> {
        BlockConfig::new(self.symbols, self.symbol_bytes).validate(field)?;
        if self.expansion == 0 {
            return Err(Error::invalid_argument("expansion must be > 0"));
        }
        if field == FiniteField::Binary {
            return Err(Error::invalid_argument(
                "fulcrum outer field must be larger than binary",
            ));
        }
        let inner = self
            .symbols
            .checked_add(self.expansion)
            .ok_or_else(|| Error::invalid_argument("expansion overflows the inner code"))?;
        arena_bytes(inner, self.symbol_bytes).map(|_| ())
    }
}

impl Default for FulcrumConfig {
    fn default() -> Self {
        Self::new(16, 1400, DEFAULT_EXPANSION)
    }
}

/// Perpetual code geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerpetualConfig {
    /// Bytes in the data block; rounded up to whole symbols.
    pub block_bytes: usize,
    /// Bytes per symbol.
    pub symbol_bytes: usize,
    /// Coefficients per coded symbol.
    pub width: usize,
    /// Data symbols between consecutive outer symbols; 0 disables the
    /// outer code.
    pub outer_interval: usize,
    /// Span of each outer symbol in multiples of `width`.
    pub outer_segments: usize,
    /// Fraction of the inner symbols that must be pivots before the outer
    /// constraints are mapped into the decoder.
    pub mapping_threshold: f64,
}

impl PerpetualConfig {
    /// Creates a configuration with default outer-code parameters.
    #[must_use]
    pub const fn new(block_bytes: usize, symbol_bytes: usize, width: usize) -> Self {
        Self {
            block_bytes,
            symbol_bytes,
            width,
            outer_interval: DEFAULT_OUTER_INTERVAL,
            outer_segments: DEFAULT_OUTER_SEGMENTS,
            mapping_threshold: DEFAULT_MAPPING_THRESHOLD,
        }
    }

    /// Data symbols needed to hold `block_bytes`.
    #[must_use]
    pub const fn symbols(&self) -> usize {
        if self.symbol_bytes == 0 {
            return 0;
        }
        self.block_bytes.div_ceil(self.symbol_bytes)
    }

    /// Number of interleaved outer symbols.
    #[must_use]
    pub const fn outer_symbols(&self) -> usize {
        if self.outer_interval == 0 {
            return 0;
        }
        self.symbols() / self.outer_interval
    }

    /// Data plus outer symbols.
    #[must_use]
    pub const fn inner_symbols(&self) -> usize {
        self.symbols() + self.outer_symbols()
    }

    /// Validates the geometry for `field`.
    pub fn validate(&self, field: FiniteField) -> Result<()> {
        if self.block_bytes == 0 {
            return Err(Error::invalid_argument("block_bytes must be > 0"));
        }
        field.check_symbol_bytes(self.symbol_bytes)?;
        let inner = self
            .symbols()
            .checked_add(self.outer_symbols())
            .ok_or_else(|| Error::invalid_argument("outer code overflows the inner code"))?;
        arena_bytes(inner, self.symbol_bytes)?;
        if self.width == 0 {
            return Err(Error::invalid_argument("width must be > 0"));
        }
        if self.width > self.inner_symbols() {
            return Err(Error::invalid_argument(format!(
                "width {} exceeds {} inner symbols",
                self.width,
                self.inner_symbols()
            )));
        }
        if self.outer_interval > 0 && self.outer_segments == 0 {
            return Err(Error::invalid_argument("outer_segments must be > 0"));
        }
        if !(self.mapping_threshold > 0.0 && self.mapping_threshold <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "mapping_threshold {} not in (0, 1]",
                self.mapping_threshold
            )));
        }
        Ok(())
    }
}

impl Default for PerpetualConfig {
    fn default() -> Self {
        Self::new(1400 * 256, 1400, 32)
    }
}
