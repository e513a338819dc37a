//! Fulcrum decoder.

use super::Expansion;
use crate::block;
use crate::config::FulcrumConfig;
use crate::error::{ensure_index, ensure_len, Error, Result};
use crate::field::FiniteField;
use crate::log::{impl_log_accessors, Log};
use crate::state::CodingState;
use crate::tracing_compat::debug;

/// Decodes fulcrum coded symbols; see the [module docs](super).
#[derive(Debug)]
pub struct Decoder {
    field: FiniteField,
    config: FulcrumConfig,
    expansion: Option<Expansion>,
    inner: block::Decoder,
    outer: block::Decoder,
    log: Log,
}

impl Decoder {
    /// An unconfigured decoder with outer field `field`.
    #[must_use]
    pub fn new(field: FiniteField) -> Self {
        Self {
            field,
            config: FulcrumConfig::new(0, 0, 0),
            expansion: None,
            inner: block::Decoder::new(FiniteField::Binary),
            outer: block::Decoder::new(field),
            log: Log::new(),
        }
    }

    /// Configures the geometry and resets both cores.
    pub fn configure(&mut self, symbols: usize, symbol_bytes: usize, expansion: usize) -> Result<()> {
        self.configure_with(&FulcrumConfig::new(symbols, symbol_bytes, expansion))
    }

    /// Configures from a [`FulcrumConfig`] and resets both cores.
    pub fn configure_with(&mut self, config: &FulcrumConfig) -> Result<()> {
        config.validate(self.field)?;
        self.inner
            .configure(config.inner_symbols(), config.symbol_bytes)?;
        self.outer.configure(config.symbols, config.symbol_bytes)?;
        self.config = *config;
        self.expansion = Some(Expansion::new(self.field, config.symbols, config.expansion));
        debug!(
            field = %self.field,
            symbols = config.symbols,
            expansion = config.expansion,
            "fulcrum decoder configured"
        );
        Ok(())
    }

    /// Resets both cores, keeping the geometry.
    pub fn reset(&mut self) {
        self.inner.reset();
        self.outer.reset();
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

    /// Rank over the data symbols.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.outer.rank()
    }

    /// Rank of the inner binary code.
    #[must_use]
    pub const fn inner_rank(&self) -> usize {
        self.inner.rank()
    }

    /// Data pivot added by the last decode call, if any.
    #[must_use]
    pub const fn pivot(&self) -> Option<usize> {
        self.outer.pivot()
    }

    /// True if the last decode call raised the data rank.
    #[must_use]
    pub const fn pivot_found(&self) -> bool {
        self.outer.pivot_found()
    }

    /// True once every data symbol is decoded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.outer.is_complete()
    }

    /// True if a data row pivots at `index`.
    #[must_use]
    pub fn is_symbol_pivot(&self, index: usize) -> bool {
        self.outer.is_symbol_pivot(index)
    }

    /// True if data symbol `index` is known to be decoded.
    #[must_use]
    pub fn is_symbol_decoded(&self, index: usize) -> bool {
        self.outer.is_symbol_decoded(index)
    }

    /// True if an inner row pivots at `index` (`index < inner_symbols`).
    #[must_use]
    pub fn is_inner_symbol_pivot(&self, index: usize) -> bool {
        self.inner.is_symbol_pivot(index)
    }

    /// Seeds the data arena from `buf`. Only allowed before the first
    /// innovative symbol arrives.
    pub fn set_symbols_storage(&mut self, buf: &[u8]) -> Result<()> {
        self.ensure_fresh()?;
        self.outer.set_symbols_storage(buf)
    }

    /// Seeds data symbol `index` from `buf`. Same rule as
    /// [`set_symbols_storage`](Self::set_symbols_storage).
    pub fn set_symbol_storage(&mut self, buf: &[u8], index: usize) -> Result<()> {
        self.ensure_fresh()?;
        self.outer.set_symbol_storage(buf, index)
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.expansion.is_none() {
            return Err(Error::invalid_state("decoder not configured"));
        }
        if self.inner.rank() != 0 {
            return Err(Error::invalid_state(
                "decoder storage cannot be rebound after decoding started",
            ));
        }
        Ok(())
    }

    /// Lower bound on decoded data symbols.
    #[must_use]
    pub const fn symbols_decoded(&self) -> usize {
        self.outer.symbols_decoded()
    }

    /// Bytes of data symbol `index`.
    pub fn symbol_data(&self, index: usize) -> Result<&[u8]> {
        self.outer.symbol_data(index)
    }

    /// All data, symbol `i` at offset `i * symbol_bytes`.
    #[must_use]
    pub fn symbols_storage(&self) -> &[u8] {
        self.outer.symbols_storage()
    }

    /// The inner binary core, for recoding generators.
    #[must_use]
    pub const fn inner_decoder(&self) -> &block::Decoder {
        &self.inner
    }

    /// Feeds a coded symbol with binary coefficients over the inner symbols.
    pub fn decode_symbol(&mut self, symbol: &[u8], coefficients: &[u8]) -> Result<()> {
        let expansion = self
            .expansion
            .as_ref()
            .ok_or_else(|| Error::invalid_state("decoder not configured"))?;
        ensure_len(symbol.len(), self.config.symbol_bytes)?;
        ensure_len(coefficients.len(), self.coefficients_bytes())?;

        let mut outer = vec![0u8; self.field.coefficients_bytes(self.config.symbols)];
        expansion.map_to_outer(coefficients, &mut outer);
        self.inner.decode_symbol(symbol, coefficients)?;
        self.outer.decode_symbol(symbol, &outer)?;
        self.log.write("decoder", || {
            format!(
                "rank {}/{} inner {}/{}",
                self.outer.rank(),
                self.config.symbols,
                self.inner.rank(),
                self.config.inner_symbols()
            )
        });
        Ok(())
    }

    /// Feeds data symbol `index` uncoded.
    pub fn decode_systematic_symbol(&mut self, symbol: &[u8], index: usize) -> Result<()> {
        if self.expansion.is_none() {
            return Err(Error::invalid_state("decoder not configured"));
        }
        ensure_index(index, self.config.symbols)?;
        ensure_len(symbol.len(), self.config.symbol_bytes)?;
        self.inner.decode_systematic_symbol(symbol, index)?;
        self.outer.decode_systematic_symbol(symbol, index)
    }

    /// Recodes from the inner rows; coefficients are binary over the inner
    /// symbols and must be zero where the inner code has no pivot.
    pub fn recode_symbol(
        &self,
        out_symbol: &mut [u8],
        out_coefficients: &mut [u8],
        in_coefficients: &[u8],
    ) -> Result<()> {
        self.inner
            .recode_symbol(out_symbol, out_coefficients, in_coefficients)
    }
}

impl_log_accessors!(Decoder);

impl CodingState for Decoder {
    type Index = usize;

    fn symbols(&self) -> usize {
        self.config.symbols
    }

    fn rank(&self) -> usize {
        self.outer.rank()
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.outer.is_symbol_pivot(index)
    }

    fn is_symbol_decoded(&self, index: usize) -> bool {
        self.outer.is_symbol_decoded(index)
    }

    fn symbols_decoded(&self) -> usize {
        self.outer.symbols_decoded()
    }

    fn is_complete(&self) -> bool {
        self.outer.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulcrum::Encoder;

    #[test]
    fn expansion_only_packets_still_decode() {
        let field = FiniteField::Binary8;
        let data: Vec<u8> = (0..8u8).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();
        let mut e = Encoder::new(field);
        e.configure(4, 2, 4).expect("configure");
        e.set_symbols_storage(&data).expect("set");
        let mut d = Decoder::new(field);
        d.configure(4, 2, 4).expect("configure");

        // Send the four expansion symbols alone: independent over GF(256)
        // with overwhelming probability, though the inner code sees only
        // four of eight pivots.
        for row in 0..4 {
            let coefficients = [1u8 << (4 + row)];
            let mut out = [0u8; 2];
            e.encode_symbol(&mut out, &coefficients).expect("encode");
            d.decode_symbol(&out, &coefficients).expect("decode");
        }
        assert_eq!(d.inner_rank(), 4);
        assert!(d.is_inner_symbol_pivot(4));
        assert!(!d.is_inner_symbol_pivot(0));
        assert!(d.is_complete());
        assert_eq!(d.symbols_storage(), &data[..]);
    }

    #[test]
    fn systematic_feeds_both_cores() {
        let mut d = Decoder::new(FiniteField::Binary4);
        d.configure(3, 1, 1).expect("configure");
        d.decode_systematic_symbol(&[0x21], 2).expect("decode");
        assert_eq!(d.rank(), 1);
        assert_eq!(d.inner_rank(), 1);
        assert!(d.is_symbol_decoded(2));
        assert!(d.decode_systematic_symbol(&[0], 3).is_err());
    }

    #[test]
    fn storage_binds_until_first_symbol() {
        let mut d = Decoder::new(FiniteField::Binary8);
        assert_eq!(
            d.set_symbols_storage(&[0; 4]).unwrap_err().kind(),
            crate::ErrorKind::InvalidState
        );
        d.configure(2, 2, 1).expect("configure");
        d.set_symbols_storage(&[1, 2, 3, 4]).expect("fresh decoder");
        d.set_symbol_storage(&[9, 9], 1).expect("fresh decoder");
        assert_eq!(d.symbols_storage(), &[1, 2, 9, 9]);
        assert_eq!(
            d.set_symbol_storage(&[0; 2], 2).unwrap_err().kind(),
            crate::ErrorKind::OutOfRange
        );

        d.decode_systematic_symbol(&[5, 6], 0).expect("decode");
        assert_eq!(
            d.set_symbol_storage(&[0; 2], 1).unwrap_err().kind(),
            crate::ErrorKind::InvalidState
        );
        assert_eq!(
            d.set_symbols_storage(&[0; 4]).unwrap_err().kind(),
            crate::ErrorKind::InvalidState
        );
    }
}
