use crate::error::{Error, Result};

/// Decides when a streaming sender should emit a repair symbol.
///
/// Out of every `n` transmissions the first `k` carry new source symbols
/// and the remaining `n - k` are repair symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateController {
    n: usize,
    k: usize,
    position: usize,
}

impl RateController {
    /// `k` source symbols per `n` transmissions; requires `0 < k <= n`.
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k == 0 || k > n {
            return Err(Error::invalid_argument(format!(
                "rate k/n = {k}/{n} needs 0 < k <= n"
            )));
        }
        Ok(Self { n, k, position: 0 })
    }

    /// Transmissions per period.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Source transmissions per period.
    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Moves to the next transmission.
    pub fn advance(&mut self) {
        self.position = (self.position + 1) % self.n;
    }

    /// True if the current transmission should be a repair symbol.
    #[must_use]
    pub const fn send_repair(&self) -> bool {
        self.position >= self.k
    }

    /// Rewinds to the start of a period.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_repeats_per_period() {
        let mut rate = RateController::new(4, 2).expect("valid rate");
        let pattern: Vec<bool> = (0..8)
            .map(|_| {
                let repair = rate.send_repair();
                rate.advance();
                repair
            })
            .collect();
        assert_eq!(
            pattern,
            vec![false, false, true, true, false, false, true, true]
        );
    }

    #[test]
    fn invalid_rates() {
        assert!(RateController::new(3, 0).is_err());
        assert!(RateController::new(3, 4).is_err());
        let rate = RateController::new(1, 1).expect("no redundancy");
        assert!(!rate.send_repair());
    }
}
