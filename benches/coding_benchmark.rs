//! Coding benchmarks.
//!
//! Measures per-symbol cost of the block and perpetual coders:
//! - Block encode across fields
//! - Block decode of a full block across fields
//! - Perpetual decode of a full block per width
//! - Raw field kernels (multiply-add)

#![allow(missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rlnc::block::{Decoder, Encoder, RandomUniform};
use rlnc::perpetual::{self, Width};
use rlnc::{DetRng, FiniteField, PerpetualConfig};

const SYMBOLS: usize = 64;
const SYMBOL_BYTES: usize = 1024;

fn block_data(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    DetRng::new(42).fill_bytes(&mut data);
    data
}

// =============================================================================
// BLOCK BENCHMARKS
// =============================================================================

fn bench_block_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("block/encode");
    group.throughput(Throughput::Bytes(SYMBOL_BYTES as u64));
    let data = block_data(SYMBOLS * SYMBOL_BYTES);

    for field in FiniteField::ALL {
        let mut encoder = Encoder::new(field);
        encoder.configure(SYMBOLS, SYMBOL_BYTES).expect("configure");
        encoder.set_symbols_storage(&data).expect("storage");
        let mut generator = RandomUniform::new(field);
        generator.configure(SYMBOLS).expect("configure");
        let mut coefficients = vec![0u8; generator.max_coefficients_bytes()];
        let mut symbol = vec![0u8; SYMBOL_BYTES];

        group.bench_function(BenchmarkId::from_parameter(field), |b| {
            b.iter(|| {
                generator.generate(&mut coefficients).expect("generate");
                encoder
                    .encode_symbol(&mut symbol, &coefficients)
                    .expect("encode");
                black_box(&symbol);
            });
        });
    }

    group.finish();
}

fn bench_block_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("block/decode");
    group.throughput(Throughput::Bytes((SYMBOLS * SYMBOL_BYTES) as u64));
    group.sample_size(20);
    let data = block_data(SYMBOLS * SYMBOL_BYTES);

    for field in FiniteField::ALL {
        let mut encoder = Encoder::new(field);
        encoder.configure(SYMBOLS, SYMBOL_BYTES).expect("configure");
        encoder.set_symbols_storage(&data).expect("storage");
        let mut generator = RandomUniform::new(field);
        generator.configure(SYMBOLS).expect("configure");

        // pre-encode enough packets to finish every iteration
        let cb = generator.max_coefficients_bytes();
        let packets: Vec<(Vec<u8>, Vec<u8>)> = (0..SYMBOLS * 3)
            .map(|_| {
                let mut coefficients = vec![0u8; cb];
                let mut symbol = vec![0u8; SYMBOL_BYTES];
                generator.generate(&mut coefficients).expect("generate");
                encoder
                    .encode_symbol(&mut symbol, &coefficients)
                    .expect("encode");
                (symbol, coefficients)
            })
            .collect();

        group.bench_function(BenchmarkId::from_parameter(field), |b| {
            let mut decoder = Decoder::new(field);
            decoder.configure(SYMBOLS, SYMBOL_BYTES).expect("configure");
            b.iter(|| {
                decoder.reset();
                for (symbol, coefficients) in &packets {
                    if decoder.is_complete() {
                        break;
                    }
                    decoder.decode_symbol(symbol, coefficients).expect("decode");
                }
                black_box(decoder.rank());
            });
        });
    }

    group.finish();
}

// =============================================================================
// PERPETUAL BENCHMARKS
// =============================================================================

fn bench_perpetual_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("perpetual/decode");
    group.sample_size(20);
    let field = FiniteField::Binary8;

    for width in Width::ALL {
        let config = PerpetualConfig::new(256 * SYMBOL_BYTES, SYMBOL_BYTES, width.symbols());
        group.throughput(Throughput::Bytes(config.block_bytes as u64));
        let data = block_data(config.block_bytes);
        let mut encoder = perpetual::Encoder::new(field);
        encoder.configure_with(&config).expect("configure");
        encoder.set_symbols_storage(&data).expect("storage");
        let mut generator = perpetual::generator::RandomUniform::new(field);
        generator.configure(config.width).expect("configure");
        let mut offsets = perpetual::offset::RandomUniform::new();
        offsets.configure(encoder.inner_symbols()).expect("configure");

        let packets: Vec<(Vec<u8>, Vec<u8>, usize)> = (0..encoder.inner_symbols() * 2)
            .map(|_| {
                let offset = offsets.offset().expect("offset");
                let mut coefficients = vec![0u8; generator.coefficients_bytes()];
                let mut symbol = vec![0u8; SYMBOL_BYTES];
                generator.generate(&mut coefficients).expect("generate");
                encoder
                    .encode_symbol(&mut symbol, &coefficients, offset)
                    .expect("encode");
                (symbol, coefficients, offset)
            })
            .collect();

        group.bench_function(BenchmarkId::from_parameter(width.symbols()), |b| {
            let mut decoder = perpetual::Decoder::new(field);
            decoder.configure_with(&config).expect("configure");
            b.iter(|| {
                decoder.reset();
                for (symbol, coefficients, offset) in &packets {
                    if decoder.is_complete() {
                        break;
                    }
                    decoder
                        .decode_symbol(symbol, coefficients, *offset)
                        .expect("decode");
                }
                black_box(decoder.rank());
            });
        });
    }

    group.finish();
}

// =============================================================================
// FIELD KERNELS
// =============================================================================

fn bench_field_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("field/multiply_add");
    group.throughput(Throughput::Bytes(SYMBOL_BYTES as u64));
    let src = block_data(SYMBOL_BYTES);

    for field in FiniteField::ALL {
        let mut dst = vec![0u8; SYMBOL_BYTES];
        let c = field.max_value();
        group.bench_function(BenchmarkId::from_parameter(field), |b| {
            b.iter(|| {
                field.vector_multiply_add(&mut dst, black_box(&src), c);
            });
        });
    }

    group.finish();
}

// =============================================================================
// MAIN
// =============================================================================

criterion_group!(
    benches,
    bench_block_encode,
    bench_block_decode,
    bench_perpetual_decode,
    bench_field_kernels,
);

criterion_main!(benches);
