use criterion::{Criterion, criterion_group, criterion_main};
use ragline::chunking::{chunk, clean_text};
use std::hint::black_box;

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = "The quick brown fox jumps over the lazy dog.  \n\n".repeat(2_000);
    let cleaned = clean_text(&text);

    c.bench_function("chunking", |b| {
        b.iter(|| chunk(black_box(&cleaned), black_box(500), black_box(50)))
    });

    c.bench_function("clean_text", |b| b.iter(|| clean_text(black_box(&text))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
