//! GF(2^8) arithmetic.
//!
//! Irreducible polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D). Elements are
//! plain bytes; multiplication goes through log/exp tables built at compile
//! time, and bulk kernels switch to a per-scalar 256-entry product table for
//! long slices.

/// Reduction mask: the low 8 bits of 0x11D.
const POLY: u16 = 0x1D;

/// `LOG[a]` = discrete log of `a` base 2. `LOG[0]` is unused.
static LOG: [u8; 256] = build_log_table();

/// `EXP[i]` = 2^i. Mirrored to 512 entries so `EXP[a + b]` needs no `% 255`.
static EXP: [u8; 512] = build_exp_table();

// ============================================================================
// Table generation (const)
// ============================================================================

const fn build_exp_table() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut val: u16 = 1;
    let mut i = 0usize;
    while i < 255 {
        table[i] = val as u8;
        table[i + 255] = val as u8;
        val <<= 1;
        if val & 0x100 != 0 {
            val ^= 0x100 | POLY;
        }
        i += 1;
    }
    table[510] = 1;
    table
}

const fn build_log_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut val: u16 = 1;
    let mut i = 0u8;
    loop {
        table[val as usize] = i;
        val <<= 1;
        if val & 0x100 != 0 {
            val ^= 0x100 | POLY;
        }
        if i == 254 {
            break;
        }
        i += 1;
    }
    table
}

// ============================================================================
// Element operations
// ============================================================================

/// `a * b`.
#[inline]
#[must_use]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[LOG[a as usize] as usize + LOG[b as usize] as usize]
}

/// Multiplicative inverse.
///
/// # Panics
///
/// Panics if `a` is zero.
#[inline]
#[must_use]
pub fn inv(a: u8) -> u8 {
    assert!(a != 0, "cannot invert zero in GF(256)");
    EXP[255 - LOG[a as usize] as usize]
}

// ============================================================================
// Slice kernels
// ============================================================================

/// Minimum slice length that amortises building a product table.
const MUL_TABLE_THRESHOLD: usize = 64;

/// `table[x] = x * c` for the scalar with `LOG[c] == log_c`.
fn build_mul_table(log_c: usize) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (x, entry) in table.iter_mut().enumerate().skip(1) {
        *entry = EXP[LOG[x] as usize + log_c];
    }
    table
}

/// `dst[i] *= c`. Caller handles `c == 0` and `c == 1`.
pub fn mul_slice(dst: &mut [u8], c: u8) {
    let log_c = LOG[c as usize] as usize;
    if dst.len() >= MUL_TABLE_THRESHOLD {
        let table = build_mul_table(log_c);
        for d in dst.iter_mut() {
            *d = table[*d as usize];
        }
    } else {
        for d in dst.iter_mut() {
            if *d != 0 {
                *d = EXP[LOG[*d as usize] as usize + log_c];
            }
        }
    }
}

/// `dst[i] ^= c * src[i]`. Caller handles `c == 0` and `c == 1`.
pub fn addmul_slice(dst: &mut [u8], src: &[u8], c: u8) {
    let log_c = LOG[c as usize] as usize;
    if src.len() >= MUL_TABLE_THRESHOLD {
        let table = build_mul_table(log_c);
        let mut d_chunks = dst.chunks_exact_mut(8);
        let mut s_chunks = src.chunks_exact(8);
        for (d_chunk, s_chunk) in d_chunks.by_ref().zip(s_chunks.by_ref()) {
            for (d, s) in d_chunk.iter_mut().zip(s_chunk) {
                *d ^= table[*s as usize];
            }
        }
        for (d, s) in d_chunks
            .into_remainder()
            .iter_mut()
            .zip(s_chunks.remainder())
        {
            *d ^= table[*s as usize];
        }
        return;
    }
    for (d, s) in dst.iter_mut().zip(src) {
        if *s != 0 {
            *d ^= EXP[LOG[*s as usize] as usize + log_c];
        }
    }
}
