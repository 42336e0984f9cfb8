use bytes::Bytes;
use candy_core::workspace::{Cursor, chunked, to_addressed_chunks};
use candy_core::{ShareableValue, decode, encode};
use criterion::{Criterion, criterion_group, criterion_main};

fn large_value() -> ShareableValue {
    ShareableValue::bytes(Bytes::from(vec![0u8; 8 * 1024 * 1024]))
}

fn bench_codec(c: &mut Criterion) {
    let value = large_value();
    let encoded = encode(&value).unwrap();

    let mut group = c.benchmark_group("codec");
    group.bench_function("encode_8mb", |b| b.iter(|| encode(&value).unwrap()));
    group.bench_function("decode_8mb", |b| b.iter(|| decode(&encoded).unwrap()));
    group.finish();
}

fn bench_chunking(c: &mut Criterion) {
    let values = vec![large_value()];
    let workspace = chunked(&values, 2_000_000).unwrap();

    let mut group = c.benchmark_group("workspace");
    group.bench_function("chunk_8mb_2mb", |b| b.iter(|| chunked(&values, 2_000_000).unwrap()));
    group.bench_function("page_value_payload", |b| {
        let source = to_addressed_chunks(&values).unwrap();
        b.iter(|| source.page(2_000_000, Cursor::new(0, 2)).unwrap());
    });
    group.bench_function("pages_8mb_64k", |b| {
        b.iter(|| workspace.pages(64 * 1024).count());
    });
    group.bench_function("reassemble_8mb", |b| b.iter(|| workspace.to_values().unwrap()));
    group.finish();
}

criterion_group!(benches, bench_codec, bench_chunking);
criterion_main!(benches);
