//! Property tests for the block and perpetual coders.
//!
//! Verifies round trips across fields and geometries, rank monotonicity,
//! that recoded and repeated symbols never add rank, seed determinism,
//! that a decoder short of `symbols` packets never reports completion, and
//! that the decoded count stays a lower bound.

mod common;

use common::{init_test_logging, random_bytes, symbol_bytes_for, test_proptest_config};
use proptest::prelude::*;
use rlnc::block::{Decoder, Encoder, RandomUniform};
use rlnc::perpetual;
use rlnc::{FiniteField, PerpetualConfig};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_field() -> impl Strategy<Value = FiniteField> {
    prop_oneof![
        Just(FiniteField::Binary),
        Just(FiniteField::Binary4),
        Just(FiniteField::Binary8),
        Just(FiniteField::Binary16),
    ]
}

fn arb_geometry() -> impl Strategy<Value = (FiniteField, usize, usize)> {
    (arb_field(), 1usize..=24, 1usize..=40)
        .prop_map(|(field, symbols, bytes)| (field, symbols, symbol_bytes_for(field, bytes)))
}

struct Block {
    encoder: Encoder,
    decoder: Decoder,
    generator: RandomUniform,
    data: Vec<u8>,
    symbol: Vec<u8>,
    coefficients: Vec<u8>,
}

impl Block {
    fn new(field: FiniteField, symbols: usize, symbol_bytes: usize, seed: u64) -> Self {
        let data = random_bytes(seed, symbols * symbol_bytes);
        let mut encoder = Encoder::new(field);
        encoder.configure(symbols, symbol_bytes).expect("configure");
        encoder.set_symbols_storage(&data).expect("storage");
        let mut decoder = Decoder::new(field);
        decoder.configure(symbols, symbol_bytes).expect("configure");
        let mut generator = RandomUniform::new(field);
        generator.configure(symbols).expect("configure");
        generator.set_seed(seed);
        let coefficients = vec![0u8; generator.max_coefficients_bytes()];
        Self {
            encoder,
            decoder,
            generator,
            data,
            symbol: vec![0u8; symbol_bytes],
            coefficients,
        }
    }

    fn send_coded(&mut self) {
        self.generator
            .generate(&mut self.coefficients)
            .expect("generate");
        self.encoder
            .encode_symbol(&mut self.symbol, &self.coefficients)
            .expect("encode");
        self.decoder
            .decode_symbol(&self.symbol, &self.coefficients)
            .expect("decode");
    }
}

// ============================================================================
// Round Trip
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(64))]

    /// Enough coded symbols always rebuild the block exactly.
    #[test]
    fn block_round_trip((field, symbols, symbol_bytes) in arb_geometry(), seed in any::<u64>()) {
        init_test_logging();
        let mut block = Block::new(field, symbols, symbol_bytes, seed);
        let limit = symbols * 40 + 64;
        let mut sent = 0;
        while !block.decoder.is_complete() && sent < limit {
            block.send_coded();
            sent += 1;
        }
        prop_assert!(block.decoder.is_complete(), "{} after {} symbols", field, sent);
        prop_assert_eq!(block.decoder.symbols_storage(), &block.data[..]);
    }

    /// Rank never drops, never exceeds the block, and moves exactly when a
    /// pivot is found.
    #[test]
    fn rank_is_monotone((field, symbols, symbol_bytes) in arb_geometry(), seed in any::<u64>()) {
        init_test_logging();
        let mut block = Block::new(field, symbols, symbol_bytes, seed);
        for _ in 0..symbols * 2 {
            let before = block.decoder.rank();
            block.send_coded();
            let after = block.decoder.rank();
            prop_assert!(after == before || after == before + 1);
            prop_assert!(after <= symbols);
            prop_assert_eq!(block.decoder.pivot_found(), after > before);
            prop_assert!(block.decoder.symbols_decoded() <= after);

            // a symbol reported decoded already holds its source bytes
            for index in 0..symbols {
                if block.decoder.is_symbol_decoded(index) {
                    prop_assert_eq!(
                        block.decoder.symbol_data(index).expect("index"),
                        block.encoder.symbol_data(index).expect("index")
                    );
                }
            }
        }
    }

    /// The same packet twice adds rank at most once.
    #[test]
    fn repeated_packet_is_redundant((field, symbols, symbol_bytes) in arb_geometry(), seed in any::<u64>()) {
        init_test_logging();
        let mut block = Block::new(field, symbols, symbol_bytes, seed);
        for _ in 0..symbols {
            block.send_coded();
            let rank = block.decoder.rank();
            block
                .decoder
                .decode_symbol(&block.symbol, &block.coefficients)
                .expect("decode");
            prop_assert_eq!(block.decoder.rank(), rank);
            prop_assert!(!block.decoder.pivot_found());
        }
    }

    /// A recoded symbol is a combination of held rows and adds nothing.
    #[test]
    fn recoded_symbols_are_redundant(
        (field, symbols, symbol_bytes) in arb_geometry(),
        seed in any::<u64>(),
        received in 1usize..24,
    ) {
        init_test_logging();
        let mut block = Block::new(field, symbols, symbol_bytes, seed);
        for _ in 0..received.min(symbols) {
            block.send_coded();
        }
        let rank = block.decoder.rank();
        prop_assume!(rank > 0);

        let mut relay = RandomUniform::new(field);
        relay.configure(symbols).expect("configure");
        relay.set_seed(seed.rotate_left(7));
        let cb = relay.max_coefficients_bytes();
        let mut weights = vec![0u8; cb];
        let mut out_symbol = vec![0u8; symbol_bytes];
        let mut out_coefficients = vec![0u8; cb];
        relay.generate_recode(&mut weights, &block.decoder).expect("generate");
        block
            .decoder
            .recode_symbol(&mut out_symbol, &mut out_coefficients, &weights)
            .expect("recode");

        // the recoded payload matches what the encoder makes from the
        // recoded coefficients
        let mut expected = vec![0u8; symbol_bytes];
        block
            .encoder
            .encode_symbol(&mut expected, &out_coefficients)
            .expect("encode");
        prop_assert_eq!(&out_symbol, &expected);

        block
            .decoder
            .decode_symbol(&out_symbol, &out_coefficients)
            .expect("decode");
        prop_assert_eq!(block.decoder.rank(), rank);
        prop_assert!(!block.decoder.pivot_found());
    }

    /// Fewer than `symbols` packets can never complete a block.
    #[test]
    fn short_of_symbols_never_completes(
        (field, symbols, symbol_bytes) in arb_geometry(),
        seed in any::<u64>(),
    ) {
        init_test_logging();
        let mut block = Block::new(field, symbols, symbol_bytes, seed);
        for _ in 0..symbols - 1 {
            block.send_coded();
            prop_assert!(!block.decoder.is_complete());
        }
        prop_assert!(block.decoder.rank() < symbols);
    }

    /// With the status updater off, the decoded count never exceeds what a
    /// full status scan finds, and every symbol reported decoded is right.
    #[test]
    fn decoded_count_is_a_lower_bound(
        (field, symbols, symbol_bytes) in arb_geometry(),
        seed in any::<u64>(),
        systematic in proptest::collection::vec(any::<bool>(), 1..24),
    ) {
        init_test_logging();
        let mut block = Block::new(field, symbols, symbol_bytes, seed);
        prop_assert!(!block.decoder.is_status_updater_enabled());
        for (step, &uncoded) in systematic.iter().enumerate().take(symbols - 1) {
            if uncoded {
                let index = (seed as usize).wrapping_add(step * 7) % symbols;
                let mut out = vec![0u8; symbol_bytes];
                block.encoder.encode_systematic_symbol(&mut out, index).expect("encode");
                block.decoder.decode_systematic_symbol(&out, index).expect("decode");
            } else {
                block.send_coded();
            }
        }

        let reported = block.decoder.symbols_decoded();
        prop_assert!(reported <= block.decoder.rank());
        block.decoder.update_symbol_status();
        prop_assert!(reported <= block.decoder.symbols_decoded());
        for index in 0..symbols {
            if block.decoder.is_symbol_decoded(index) {
                let expected = &block.data[index * symbol_bytes..(index + 1) * symbol_bytes];
                prop_assert_eq!(block.decoder.symbol_data(index).expect("index"), expected);
            }
        }
    }

    /// Equal seeds give equal coefficient sequences.
    #[test]
    fn generators_are_deterministic(field in arb_field(), symbols in 1usize..64, seed in any::<u64>()) {
        init_test_logging();
        let mut a = RandomUniform::new(field);
        let mut b = RandomUniform::new(field);
        a.configure(symbols).expect("configure");
        b.configure(symbols).expect("configure");
        a.set_seed(seed);
        b.set_seed(seed);
        let mut out_a = vec![0u8; a.max_coefficients_bytes()];
        let mut out_b = vec![0u8; b.max_coefficients_bytes()];
        for _ in 0..4 {
            a.generate(&mut out_a).expect("generate");
            b.generate(&mut out_b).expect("generate");
            prop_assert_eq!(&out_a, &out_b);
        }
        b.reset();
        let mut rewound = vec![0u8; b.max_coefficients_bytes()];
        b.generate(&mut rewound).expect("generate");
        a.reset();
        a.generate(&mut out_a).expect("generate");
        prop_assert_eq!(out_a, rewound);
    }
}

// ============================================================================
// Perpetual
// ============================================================================

fn arb_perpetual() -> impl Strategy<Value = (PerpetualConfig, u64)> {
    (8usize..=64, 1usize..=8, 1usize..=8, 0usize..=6, any::<u64>()).prop_map(
        |(symbols, symbol_bytes, width, interval, seed)| {
            // the last symbol is one byte long
            let block_bytes = (symbols - 1) * symbol_bytes + 1;
            let mut config = PerpetualConfig::new(block_bytes, symbol_bytes, width);
            config.outer_interval = interval;
            config.outer_segments = 2;
            (config, seed)
        },
    )
}

proptest! {
    #![proptest_config(test_proptest_config(48))]

    /// Perpetual coding rebuilds the block for any geometry and layout.
    #[test]
    fn perpetual_round_trip((config, seed) in arb_perpetual()) {
        init_test_logging();
        let field = FiniteField::Binary8;
        let data = random_bytes(seed, config.block_bytes);
        let mut encoder = perpetual::Encoder::new(field);
        encoder.configure_with(&config).expect("configure");
        encoder.set_symbols_storage(&data).expect("storage");
        let mut decoder = perpetual::Decoder::new(field);
        decoder.configure_with(&config).expect("configure");

        let mut coefficients = perpetual::generator::RandomUniform::new(field);
        coefficients.configure(config.width).expect("configure");
        coefficients.set_seed(seed);
        let mut offsets = perpetual::offset::RandomUniform::new();
        offsets.configure(decoder.inner_symbols()).expect("configure");
        offsets.set_seed(!seed);

        let mut vector = vec![0u8; coefficients.coefficients_bytes()];
        let mut symbol = vec![0u8; config.symbol_bytes];
        let limit = decoder.inner_symbols() * 40;
        let mut sent = 0;
        while !decoder.is_complete() && sent < limit {
            let offset = offsets.offset().expect("offset");
            coefficients.generate(&mut vector).expect("generate");
            encoder.encode_symbol(&mut symbol, &vector, offset).expect("encode");
            let before = decoder.rank();
            decoder.decode_symbol(&symbol, &vector, offset).expect("decode");
            prop_assert!(decoder.rank() >= before);
            prop_assert!(decoder.rank() <= decoder.inner_symbols());
            sent += 1;
        }
        prop_assert!(decoder.is_complete(), "rank {} of {}", decoder.rank(), decoder.inner_symbols());
        prop_assert_eq!(decoder.symbols_storage(), &data[..]);
    }
}
