//! Document scanner benchmark suite.
//!
//! Measures splitting of concatenated event buffers:
//! - Documents per buffer: 1, 16, 256
//! - Whole buffers vs. small chunks carried across feeds
//!
//! Run with: cargo bench --bench document_scan
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use streamdeck_plugin::protocol::decode_document;
use streamdeck_plugin::transport::{DocumentScanner, Fragment};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const DOCUMENT_COUNTS: &[usize] = &[1, 16, 256];
const CHUNK_SIZE: usize = 64;

const EVENT: &str = r#"{"action":"com.example.counter","event":"keyDown","context":"A1B2C3","device":"D1","payload":{"settings":{"count":5,"label":"a \"quoted\" {brace}"},"coordinates":{"column":3,"row":1},"state":0,"isInMultiAction":false}}"#;

fn buffer_of(count: usize) -> Vec<u8> {
    EVENT.repeat(count).into_bytes()
}

// ============================================================================
// Benchmark: Whole Buffers
// ============================================================================

fn bench_whole_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_whole");

    for &count in DOCUMENT_COUNTS {
        let buffer = buffer_of(count);
        group.throughput(Throughput::Bytes(buffer.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &buffer, |b, buffer| {
            b.iter(|| {
                let mut scanner = DocumentScanner::new();
                black_box(scanner.feed(black_box(buffer)))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Chunked Buffers
// ============================================================================

fn bench_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_chunked");

    for &count in DOCUMENT_COUNTS {
        let buffer = buffer_of(count);
        group.throughput(Throughput::Bytes(buffer.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &buffer, |b, buffer| {
            b.iter(|| {
                let mut scanner = DocumentScanner::new();
                let mut documents = 0;
                for chunk in buffer.chunks(CHUNK_SIZE) {
                    documents += scanner.feed(chunk).len();
                }
                black_box(documents)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Scan and Decode
// ============================================================================

fn bench_scan_and_decode(c: &mut Criterion) {
    let buffer = buffer_of(16);

    c.bench_function("scan_and_decode_16", |b| {
        b.iter(|| {
            let mut scanner = DocumentScanner::new();
            let mut decoded = 0;
            for fragment in scanner.feed(&buffer) {
                if let Fragment::Document(bytes) = fragment
                    && decode_document(&bytes).is_ok()
                {
                    decoded += 1;
                }
            }
            black_box(decoded)
        });
    });
}

criterion_group!(benches, bench_whole_buffer, bench_chunked, bench_scan_and_decode);
criterion_main!(benches);
