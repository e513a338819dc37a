#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use rlnc::{DetRng, FiniteField};
use std::sync::Once;
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Default seed for generated block data.
pub const DEFAULT_TEST_SEED: u64 = 0xDEAD_BEEF;
/// Property test seed used under CI when none is given.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED_5EED;

const PROPTEST_SEED_ENV: &str = "RLNC_PROPTEST_SEED";
const PROPTEST_MAX_SHRINK_ITERS_ENV: &str = "RLNC_PROPTEST_MAX_SHRINK_ITERS";

/// Proptest configuration running `cases` cases.
///
/// `RLNC_PROPTEST_SEED` pins the RNG seed (CI pins it to
/// [`DEFAULT_PROPTEST_SEED`]); an explicit `PROPTEST_RNG_SEED` still wins.
/// `RLNC_PROPTEST_MAX_SHRINK_ITERS` caps shrinking.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    let mut config = ProptestConfig::with_cases(cases);
    if matches!(config.rng_seed, RngSeed::Random) {
        if let Some(seed) = env_u64(PROPTEST_SEED_ENV)
            .or_else(|| std::env::var("CI").is_ok().then_some(DEFAULT_PROPTEST_SEED))
        {
            config.rng_seed = RngSeed::Fixed(seed);
        }
    }
    if let Some(iters) = env_u64(PROPTEST_MAX_SHRINK_ITERS_ENV) {
        config.max_shrink_iters = u32::try_from(iters).unwrap_or(u32::MAX);
    }
    config
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.parse().ok()
}

/// Initialize test logging with trace-level output.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// `len` deterministic pseudo-random bytes.
#[must_use]
pub fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = DetRng::new(seed);
    let mut data = vec![0; len];
    rng.fill_bytes(&mut data);
    data
}

/// Rounds `requested` up to a symbol size `field` accepts.
#[must_use]
pub fn symbol_bytes_for(field: FiniteField, requested: usize) -> usize {
    let granularity = field.symbol_granularity();
    requested.div_ceil(granularity).max(1) * granularity
}

/// Log a test phase transition.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
    };
}

/// Log test completion with optional key/value summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}
