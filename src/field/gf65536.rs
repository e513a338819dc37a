//! GF(2^16) arithmetic.
//!
//! Irreducible polynomial x^16 + x^12 + x^3 + x + 1 (0x1100B). Elements are
//! stored as little-endian 16-bit words. The log/exp tables are too large to
//! build in a const context, so they are built once on first use.

use std::sync::OnceLock;

const POLY: u32 = 0x1_100B;
const GROUP_ORDER: usize = 65_535;

struct Tables {
    log: Box<[u16]>,
    /// Mirrored to `2 * GROUP_ORDER` entries.
    exp: Box<[u16]>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut log = vec![0u16; 1 << 16].into_boxed_slice();
        let mut exp = vec![0u16; 2 * GROUP_ORDER].into_boxed_slice();
        let mut val: u32 = 1;
        for i in 0..GROUP_ORDER {
            #[allow(clippy::cast_possible_truncation)]
            {
                exp[i] = val as u16;
                exp[i + GROUP_ORDER] = val as u16;
                log[val as usize] = i as u16;
            }
            val <<= 1;
            if val & 0x1_0000 != 0 {
                val ^= POLY;
            }
        }
        Tables { log, exp }
    })
}

/// `a * b`.
#[inline]
#[must_use]
pub fn mul(a: u16, b: u16) -> u16 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

/// Multiplicative inverse.
///
/// # Panics
///
/// Panics if `a` is zero.
#[inline]
#[must_use]
pub fn inv(a: u16) -> u16 {
    assert!(a != 0, "cannot invert zero in GF(65536)");
    let t = tables();
    t.exp[GROUP_ORDER - t.log[a as usize] as usize]
}

#[inline]
fn read(chunk: &[u8]) -> u16 {
    u16::from_le_bytes([chunk[0], chunk[1]])
}

/// `dst[i] *= c` over little-endian words. Caller handles `c == 0` and `c == 1`.
pub fn mul_slice(dst: &mut [u8], c: u16) {
    let t = tables();
    let log_c = t.log[c as usize] as usize;
    for chunk in dst.chunks_exact_mut(2) {
        let v = read(chunk);
        if v != 0 {
            let product = t.exp[t.log[v as usize] as usize + log_c];
            chunk.copy_from_slice(&product.to_le_bytes());
        }
    }
}

/// `dst[i] ^= c * src[i]` over little-endian words. Caller handles `c == 0`
/// and `c == 1`.
pub fn addmul_slice(dst: &mut [u8], src: &[u8], c: u16) {
    let t = tables();
    let log_c = t.log[c as usize] as usize;
    for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
        let v = read(s);
        if v != 0 {
            let product = t.exp[t.log[v as usize] as usize + log_c];
            let sum = read(d) ^ product;
            d.copy_from_slice(&sum.to_le_bytes());
        }
    }
}
