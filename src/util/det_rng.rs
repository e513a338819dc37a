//! Deterministic pseudo-random number generator.
//!
//! Coefficient generators must be reproducible: two generators with the same
//! seed and the same call sequence produce identical coefficients, on every
//! platform. This is a xorshift64 generator whose seed is first scrambled
//! with splitmix64, so small consecutive seeds (0, 1, 2, ...) still start
//! from well-separated states.

/// A deterministic xorshift64 PRNG. Not cryptographically secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetRng {
    state: u64,
}

const fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl DetRng {
    /// Creates a generator from `seed`. Every seed, zero included, is valid.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let state = splitmix64(seed);
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Restarts the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Generates the next pseudo-random u64 value.
    #[allow(clippy::missing_const_for_fn)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generates a pseudo-random u32 value.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generates a pseudo-random usize value in the range [0, bound).
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_usize(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "bound must be non-zero");
        (self.next_u64() % bound as u64) as usize
    }

    /// Fills `buf` with pseudo-random bytes.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    /// Shuffles a slice in place using the Fisher-Yates algorithm.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_usize(i + 1);
            slice.swap(i, j);
        }
    }

    /// Picks `count` distinct values from `[0, population)`, in draw order.
    ///
    /// # Panics
    ///
    /// Panics if `count > population`.
    pub fn sample_distinct(&mut self, population: usize, count: usize) -> Vec<usize> {
        assert!(count <= population, "cannot sample {count} of {population}");
        let mut pool: Vec<usize> = (0..population).collect();
        for i in 0..count {
            let j = i + self.next_usize(population - i);
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_sequence() {
        let mut rng1 = DetRng::new(42);
        let mut rng2 = DetRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn different_seeds_different_sequences() {
        let mut rng1 = DetRng::new(1);
        let mut rng2 = DetRng::new(2);
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn zero_seed_handled() {
        let mut rng = DetRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn reseed_restarts() {
        let mut rng = DetRng::new(9);
        let first = rng.next_u64();
        rng.next_u64();
        rng.reseed(9);
        assert_eq!(rng.next_u64(), first);
    }

    #[test]
    fn fill_bytes_partial_chunk() {
        let mut a = DetRng::new(5);
        let mut b = DetRng::new(5);
        let mut buf = [0u8; 11];
        a.fill_bytes(&mut buf);
        let first = b.next_u64().to_le_bytes();
        assert_eq!(&buf[..8], &first);
    }

    #[test]
    fn sample_distinct_has_no_repeats() {
        let mut rng = DetRng::new(77);
        let picks = rng.sample_distinct(20, 20);
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        assert_eq!(rng.sample_distinct(5, 0), Vec::<usize>::new());
    }
}
