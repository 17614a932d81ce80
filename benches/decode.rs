//! Decoder benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use termkey::{Flags, KeyResult, TermKey};

/// Push `input` and drain it, returning the number of keys decoded
fn drain(input: &[u8]) -> usize {
    let mut tk = TermKey::new_abstract(Flags::UTF8);
    tk.set_buffer_size(input.len()).unwrap();
    tk.push_bytes(input).unwrap();

    let mut keys = 0;
    while let KeyResult::Key(key) = tk.getkey_force() {
        black_box(key);
        keys += 1;
    }
    keys
}

fn bench_decode_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    // Typed ASCII text
    let ascii = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(ascii.len() as u64));
    group.bench_function("ascii", |b| b.iter(|| drain(black_box(ascii.as_bytes()))));

    // Multi-byte UTF-8
    let unicode = "日本語テキスト ".repeat(500);
    group.throughput(Throughput::Bytes(unicode.len() as u64));
    group.bench_function("utf8", |b| b.iter(|| drain(black_box(unicode.as_bytes()))));

    group.finish();
}

fn bench_decode_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    // Cursor and function keys with modifiers
    let keys = "\x1b[A\x1b[1;5C\x1bOP\x1b[15~\x1b[3;2~\x1ba".repeat(200);
    group.throughput(Throughput::Bytes(keys.len() as u64));
    group.bench_function("keys", |b| b.iter(|| drain(black_box(keys.as_bytes()))));

    // SGR mouse motion
    let mouse = "\x1b[<32;120;40M\x1b[<0;1;1m".repeat(200);
    group.throughput(Throughput::Bytes(mouse.len() as u64));
    group.bench_function("mouse", |b| b.iter(|| drain(black_box(mouse.as_bytes()))));

    group.finish();
}

criterion_group!(benches, bench_decode_text, bench_decode_sequences);
criterion_main!(benches);
