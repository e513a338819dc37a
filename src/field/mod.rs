//! Finite-field arithmetic over packed byte vectors.
//!
//! Every coder is parameterised by a [`FiniteField`] tag. The tag fixes the
//! element width and the packing used by both coefficient vectors and symbol
//! payloads:
//!
//! | Field | Element | Packing |
//! |---|---|---|
//! | `Binary` | 1 bit | element `i` is bit `i % 8` (LSB first) of byte `i / 8` |
//! | `Binary4` | 4 bits | element `i` is the low (even `i`) or high (odd `i`) nibble of byte `i / 2` |
//! | `Binary8` | 8 bits | one element per byte |
//! | `Binary16` | 16 bits | little-endian word at byte `2 * i` |
//!
//! Elements are passed around as `u16` regardless of field. All fields have
//! characteristic two, so addition and subtraction are XOR and a plain byte
//! XOR adds two packed vectors in any field.

mod gf16;
mod gf256;
mod gf65536;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::DetRng;

/// The finite field a coder operates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiniteField {
    /// GF(2).
    Binary,
    /// GF(2^4).
    Binary4,
    /// GF(2^8).
    Binary8,
    /// GF(2^16).
    Binary16,
}

impl FiniteField {
    /// All supported fields, smallest first.
    pub const ALL: [Self; 4] = [Self::Binary, Self::Binary4, Self::Binary8, Self::Binary16];

    /// Bits per element.
    #[must_use]
    pub const fn bits(self) -> usize {
        match self {
            Self::Binary => 1,
            Self::Binary4 => 4,
            Self::Binary8 => 8,
            Self::Binary16 => 16,
        }
    }

    /// Number of field elements.
    #[must_use]
    pub const fn order(self) -> u32 {
        1 << self.bits()
    }

    /// Largest element value.
    #[must_use]
    pub const fn max_value(self) -> u16 {
        (self.order() - 1) as u16
    }

    /// Symbol sizes must be a multiple of this many bytes.
    #[must_use]
    pub const fn symbol_granularity(self) -> usize {
        match self {
            Self::Binary16 => 2,
            _ => 1,
        }
    }

    /// Bytes needed to pack `elements` field elements.
    #[must_use]
    pub const fn coefficients_bytes(self, elements: usize) -> usize {
        (elements * self.bits()).div_ceil(8)
    }

    /// Number of whole elements that fit in `bytes`.
    #[must_use]
    pub const fn elements(self, bytes: usize) -> usize {
        bytes * 8 / self.bits()
    }

    /// Lower-case name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Binary4 => "binary4",
            Self::Binary8 => "binary8",
            Self::Binary16 => "binary16",
        }
    }

    /// Fails with `InvalidArgument` unless `symbol_bytes` is a positive
    /// multiple of the field's symbol granularity.
    pub fn check_symbol_bytes(self, symbol_bytes: usize) -> Result<()> {
        if symbol_bytes == 0 {
            return Err(Error::invalid_argument("symbol_bytes must be > 0"));
        }
        if symbol_bytes % self.symbol_granularity() != 0 {
            return Err(Error::invalid_argument(format!(
                "symbol_bytes {symbol_bytes} must be a multiple of {} for {}",
                self.symbol_granularity(),
                self.name()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Element operations
    // ========================================================================

    /// `a + b` (also `a - b`).
    #[inline]
    #[must_use]
    pub const fn add(self, a: u16, b: u16) -> u16 {
        a ^ b
    }

    /// `a * b`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn multiply(self, a: u16, b: u16) -> u16 {
        match self {
            Self::Binary => a & b & 1,
            Self::Binary4 => u16::from(gf16::mul(a as u8, b as u8)),
            Self::Binary8 => u16::from(gf256::mul(a as u8, b as u8)),
            Self::Binary16 => gf65536::mul(a, b),
        }
    }

    /// Multiplicative inverse.
    ///
    /// # Panics
    ///
    /// Panics if `a` is zero.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn invert(self, a: u16) -> u16 {
        match self {
            Self::Binary => {
                assert!(a & 1 != 0, "cannot invert zero in GF(2)");
                1
            }
            Self::Binary4 => u16::from(gf16::inv(a as u8)),
            Self::Binary8 => u16::from(gf256::inv(a as u8)),
            Self::Binary16 => gf65536::inv(a),
        }
    }

    /// `a / b`.
    ///
    /// # Panics
    ///
    /// Panics if `b` is zero.
    #[inline]
    #[must_use]
    pub fn divide(self, a: u16, b: u16) -> u16 {
        self.multiply(a, self.invert(b))
    }

    // ========================================================================
    // Packed element access
    // ========================================================================

    /// Reads element `index` from a packed vector.
    ///
    /// # Panics
    ///
    /// Panics if `data` is too short to hold element `index`.
    #[inline]
    #[must_use]
    pub fn get_value(self, data: &[u8], index: usize) -> u16 {
        match self {
            Self::Binary => u16::from((data[index / 8] >> (index % 8)) & 1),
            Self::Binary4 => u16::from((data[index / 2] >> ((index % 2) * 4)) & 0x0F),
            Self::Binary8 => u16::from(data[index]),
            Self::Binary16 => u16::from_le_bytes([data[2 * index], data[2 * index + 1]]),
        }
    }

    /// Writes element `index` of a packed vector. Bits of `value` above the
    /// element width are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `data` is too short to hold element `index`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_value(self, data: &mut [u8], index: usize, value: u16) {
        match self {
            Self::Binary => {
                let mask = 1u8 << (index % 8);
                if value & 1 == 0 {
                    data[index / 8] &= !mask;
                } else {
                    data[index / 8] |= mask;
                }
            }
            Self::Binary4 => {
                let shift = (index % 2) * 4;
                let byte = &mut data[index / 2];
                *byte = (*byte & !(0x0F << shift)) | (((value as u8) & 0x0F) << shift);
            }
            Self::Binary8 => data[index] = value as u8,
            Self::Binary16 => {
                data[2 * index..2 * index + 2].copy_from_slice(&value.to_le_bytes());
            }
        }
    }

    /// Clears the packing bits past element `elements` in the final byte.
    pub fn clear_padding(self, data: &mut [u8], elements: usize) {
        let used_bits = elements * self.bits();
        let full = used_bits / 8;
        if used_bits % 8 != 0 {
            data[full] &= (1u8 << (used_bits % 8)) - 1;
        }
        let end = self.coefficients_bytes(elements);
        for byte in &mut data[end..] {
            *byte = 0;
        }
    }

    /// Index of the first nonzero element among the first `elements`.
    #[must_use]
    pub fn pivot(self, data: &[u8], elements: usize) -> Option<usize> {
        let bytes = self.coefficients_bytes(elements);
        let first_byte = data[..bytes].iter().position(|&b| b != 0)?;
        let start = self.elements(first_byte);
        (start..elements).find(|&i| self.get_value(data, i) != 0)
    }

    /// Number of nonzero elements among the first `elements`.
    #[must_use]
    pub fn weight(self, data: &[u8], elements: usize) -> usize {
        (0..elements)
            .filter(|&i| self.get_value(data, i) != 0)
            .count()
    }

    // ========================================================================
    // Vector operations
    // ========================================================================

    /// `dst += src` element-wise.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn vector_add(self, dst: &mut [u8], src: &[u8]) {
        assert_eq!(dst.len(), src.len(), "slice length mismatch");
        let mut d_chunks = dst.chunks_exact_mut(8);
        let mut s_chunks = src.chunks_exact(8);
        for (d_chunk, s_chunk) in d_chunks.by_ref().zip(s_chunks.by_ref()) {
            let mut d = [0u8; 8];
            let mut s = [0u8; 8];
            d.copy_from_slice(d_chunk);
            s.copy_from_slice(s_chunk);
            d_chunk.copy_from_slice(&(u64::from_ne_bytes(d) ^ u64::from_ne_bytes(s)).to_ne_bytes());
        }
        for (d, s) in d_chunks
            .into_remainder()
            .iter_mut()
            .zip(s_chunks.remainder())
        {
            *d ^= s;
        }
    }

    /// `dst *= c` element-wise.
    #[allow(clippy::cast_possible_truncation)]
    pub fn vector_multiply(self, dst: &mut [u8], c: u16) {
        let c = c & self.max_value();
        if c == 0 {
            dst.fill(0);
            return;
        }
        if c == 1 {
            return;
        }
        match self {
            Self::Binary => {}
            Self::Binary4 => gf16::mul_slice(dst, c as u8),
            Self::Binary8 => gf256::mul_slice(dst, c as u8),
            Self::Binary16 => gf65536::mul_slice(dst, c),
        }
    }

    /// `dst += c * src` element-wise. In characteristic two this is also
    /// `dst -= c * src`.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[allow(clippy::cast_possible_truncation)]
    pub fn vector_multiply_add(self, dst: &mut [u8], src: &[u8], c: u16) {
        assert_eq!(dst.len(), src.len(), "slice length mismatch");
        let c = c & self.max_value();
        if c == 0 {
            return;
        }
        if c == 1 {
            self.vector_add(dst, src);
            return;
        }
        match self {
            Self::Binary => {}
            Self::Binary4 => gf16::addmul_slice(dst, src, c as u8),
            Self::Binary8 => gf256::addmul_slice(dst, src, c as u8),
            Self::Binary16 => gf65536::addmul_slice(dst, src, c),
        }
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Uniform element, zero included.
    #[allow(clippy::cast_possible_truncation)]
    pub fn random_value(self, rng: &mut DetRng) -> u16 {
        (rng.next_u64() as u16) & self.max_value()
    }

    /// Uniform nonzero element.
    #[allow(clippy::cast_possible_truncation)]
    pub fn random_nonzero(self, rng: &mut DetRng) -> u16 {
        1 + rng.next_usize(usize::from(self.max_value())) as u16
    }
}

impl TryFrom<u8> for FiniteField {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| Error::invalid_argument(format!("unknown field tag {value}")))
    }
}

impl From<FiniteField> for u8 {
    fn from(field: FiniteField) -> Self {
        match field {
            FiniteField::Binary => 0,
            FiniteField::Binary4 => 1,
            FiniteField::Binary8 => 2,
            FiniteField::Binary16 => 3,
        }
    }
}

impl std::fmt::Display for FiniteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
