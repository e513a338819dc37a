//! Decoder checkpoints.
//!
//! The layout is private to this crate version and little-endian
//! throughout:
//!
//! ```text
//! magic u32 | version u8 | field u8
//! block_bytes u64 | symbol_bytes u64 | width u64
//! outer_interval u64 | outer_segments u64 | mapping_threshold f64
//! rank u64 | flags u8 (1 = mapped, 2 = complete) | pivot u64 (MAX = none)
//! per inner position:
//!   0u8                                   no row
//!   1u8 | terms u32 | (column u64, value u16)* | symbol bytes
//! ```

use bytes::{Buf, BufMut};

use super::Decoder;
use crate::config::PerpetualConfig;
use crate::error::{ensure_len, Result};
use crate::field::FiniteField;
use crate::linalg::SparseRow;
use crate::tracing_compat::{debug, warn};

const MAGIC: u32 = 0x5052_5054;
const VERSION: u8 = 1;
const HEADER_BYTES: usize = 4 + 1 + 1 + 6 * 8 + 8 + 1 + 8;
const TERM_BYTES: usize = 8 + 2;
const NO_PIVOT: u64 = u64::MAX;
const FLAG_MAPPED: u8 = 1;
const FLAG_COMPLETE: u8 = 2;

impl Decoder {
    /// Bytes `save_state` writes.
    #[must_use]
    pub fn state_bytes(&self) -> usize {
        let rows: usize = self
            .rows
            .iter()
            .map(|row| {
                1 + row.as_ref().map_or(0, |row| {
                    4 + row.weight() * TERM_BYTES + self.config.symbol_bytes
                })
            })
            .sum();
        HEADER_BYTES + rows
    }

    /// Writes a checkpoint into `buf`, which must hold `state_bytes()`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn save_state(&self, buf: &mut [u8]) -> Result<()> {
        let layout = self.configured_layout()?;
        ensure_len(buf.len(), self.state_bytes())?;
        let mut out = &mut buf[..];

        out.put_u32_le(MAGIC);
        out.put_u8(VERSION);
        out.put_u8(u8::from(self.field));
        for value in [
            self.config.block_bytes,
            self.config.symbol_bytes,
            self.config.width,
            self.config.outer_interval,
            self.config.outer_segments,
        ] {
            out.put_u64_le(value as u64);
        }
        out.put_f64_le(self.config.mapping_threshold);
        out.put_u64_le(self.rank as u64);
        let mut flags = 0;
        if self.mapped {
            flags |= FLAG_MAPPED;
        }
        if self.complete {
            flags |= FLAG_COMPLETE;
        }
        out.put_u8(flags);
        out.put_u64_le(self.pivot.map_or(NO_PIVOT, |p| p as u64));

        for (column, row) in self.rows.iter().enumerate() {
            let Some(row) = row else {
                out.put_u8(0);
                continue;
            };
            out.put_u8(1);
            out.put_u32_le(row.weight() as u32);
            for &(c, v) in row.terms() {
                out.put_u64_le(c);
                out.put_u16_le(v);
            }
            out.put_slice(self.slot(layout.position(column)));
        }
        debug!(rank = self.rank, bytes = self.state_bytes(), "perpetual state saved");
        Ok(())
    }

    /// Rebuilds a decoder from a checkpoint written by `save_state`.
    ///
    /// Returns `None` if `buf` is truncated or does not describe a
    /// consistent decoder. Trailing bytes are ignored.
    #[must_use]
    pub fn restore_state(buf: &[u8]) -> Option<Self> {
        let restored = read_state(buf);
        if restored.is_none() {
            warn!(bytes = buf.len(), "rejected perpetual decoder state");
        }
        restored
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_state(mut input: &[u8]) -> Option<Decoder> {
    if read_u32(&mut input)? != MAGIC || read_u8(&mut input)? != VERSION {
        return None;
    }
    let field = FiniteField::try_from(read_u8(&mut input)?).ok()?;
    let config = PerpetualConfig {
        block_bytes: read_usize(&mut input)?,
        symbol_bytes: read_usize(&mut input)?,
        width: read_usize(&mut input)?,
        outer_interval: read_usize(&mut input)?,
        outer_segments: read_usize(&mut input)?,
        mapping_threshold: f64::from_bits(read_u64(&mut input)?),
    };
    config.validate(field).ok()?;
    let inner = config.inner_symbols();

    let rank = read_usize(&mut input)?;
    let flags = read_u8(&mut input)?;
    let pivot = match read_u64(&mut input)? {
        NO_PIVOT => None,
        p if p < inner as u64 => Some(p as usize),
        _ => return None,
    };

    // One tag per position plus the smallest possible record per held row;
    // checked before the arena is allocated.
    if rank > inner {
        return None;
    }
    let records = rank.checked_mul(4 + TERM_BYTES + config.symbol_bytes)?;
    if input.remaining() < inner.checked_add(records)? {
        return None;
    }

    let mut decoder = Decoder::new(field);
    decoder.configure_with(&config).ok()?;
    let layout = decoder.configured_layout().ok()?;

    for column in 0..inner {
        match read_u8(&mut input)? {
            0 => {}
            1 => {
                let count = read_u32(&mut input)? as usize;
                if count == 0 || count > inner {
                    return None;
                }
                let mut terms = Vec::with_capacity(count);
                for _ in 0..count {
                    let c = read_u64(&mut input)?;
                    let v = read_u16(&mut input)?;
                    if c >= inner as u64 || v == 0 || v > field.max_value() {
                        return None;
                    }
                    terms.push((c, v));
                }
                let row = SparseRow::from_terms(terms);
                if row.weight() != count || row.lowest() != Some((column as u64, 1)) {
                    return None;
                }
                if input.remaining() < config.symbol_bytes {
                    return None;
                }
                input.copy_to_slice(decoder.slot_mut(layout.position(column)));
                if row.weight() == 1 {
                    decoder.decoded += 1;
                }
                decoder.rows[column] = Some(row);
                decoder.rank += 1;
            }
            _ => return None,
        }
    }

    let complete = flags & FLAG_COMPLETE != 0;
    if decoder.rank != rank || (complete && decoder.decoded != inner) {
        return None;
    }
    decoder.mapped = flags & FLAG_MAPPED != 0;
    decoder.complete = complete;
    decoder.pivot = pivot;
    Some(decoder)
}

fn read_u8(input: &mut &[u8]) -> Option<u8> {
    (input.remaining() >= 1).then(|| input.get_u8())
}

fn read_u16(input: &mut &[u8]) -> Option<u16> {
    (input.remaining() >= 2).then(|| input.get_u16_le())
}

fn read_u32(input: &mut &[u8]) -> Option<u32> {
    (input.remaining() >= 4).then(|| input.get_u32_le())
}

fn read_u64(input: &mut &[u8]) -> Option<u64> {
    (input.remaining() >= 8).then(|| input.get_u64_le())
}

fn read_usize(input: &mut &[u8]) -> Option<usize> {
    usize::try_from(read_u64(input)?).ok()
}
