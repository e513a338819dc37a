//! GF(2^4) arithmetic.
//!
//! Irreducible polynomial x^4 + x + 1 (0x13). Two elements share a byte:
//! element `2k` in the low nibble, element `2k + 1` in the high nibble.
//! The whole 16x16 product table is built at compile time, so byte kernels
//! are two lookups per byte.

const POLY: u8 = 0x13;

/// `MUL[a][b] = a * b`.
static MUL: [[u8; 16]; 16] = build_mul_table();

/// `INV[a]` = multiplicative inverse of `a`; `INV[0]` is unused.
static INV: [u8; 16] = build_inv_table();

const fn slow_mul(a: u8, b: u8) -> u8 {
    let mut a = a;
    let mut b = b;
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a <<= 1;
        if a & 0x10 != 0 {
            a ^= POLY;
        }
        b >>= 1;
    }
    product
}

const fn build_mul_table() -> [[u8; 16]; 16] {
    let mut table = [[0u8; 16]; 16];
    let mut a = 0;
    while a < 16 {
        let mut b = 0;
        while b < 16 {
            table[a][b] = slow_mul(a as u8, b as u8);
            b += 1;
        }
        a += 1;
    }
    table
}

const fn build_inv_table() -> [u8; 16] {
    let mut table = [0u8; 16];
    let mut a = 1;
    while a < 16 {
        let mut b = 1;
        while b < 16 {
            if slow_mul(a as u8, b as u8) == 1 {
                table[a] = b as u8;
            }
            b += 1;
        }
        a += 1;
    }
    table
}

/// `a * b` for nibbles.
#[inline]
#[must_use]
pub fn mul(a: u8, b: u8) -> u8 {
    MUL[(a & 0x0F) as usize][(b & 0x0F) as usize]
}

/// Multiplicative inverse.
///
/// # Panics
///
/// Panics if `a` is zero.
#[inline]
#[must_use]
pub fn inv(a: u8) -> u8 {
    assert!(a & 0x0F != 0, "cannot invert zero in GF(16)");
    INV[(a & 0x0F) as usize]
}

/// Multiplies both nibbles of `byte` by `c`.
#[inline]
fn mul_byte(row: &[u8; 16], byte: u8) -> u8 {
    row[(byte & 0x0F) as usize] | (row[(byte >> 4) as usize] << 4)
}

/// `dst[i] *= c` nibble-wise.
pub fn mul_slice(dst: &mut [u8], c: u8) {
    let row = &MUL[(c & 0x0F) as usize];
    for d in dst.iter_mut() {
        *d = mul_byte(row, *d);
    }
}

/// `dst[i] ^= c * src[i]` nibble-wise.
pub fn addmul_slice(dst: &mut [u8], src: &[u8], c: u8) {
    let row = &MUL[(c & 0x0F) as usize];
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= mul_byte(row, *s);
    }
}
