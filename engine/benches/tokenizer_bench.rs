use criterion::{criterion_group, criterion_main, Criterion};
use engine::frequency::count;
use engine::tokenizer::tokenize;

fn sample_text() -> Vec<u8> {
    "The quick brown fox jumps over the lazy dog. Съешь же ещё этих мягких французских булок! 42 "
        .repeat(2_000)
        .into_bytes()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("tokenize_mixed", |b| b.iter(|| tokenize(&text)));
    let tokens = tokenize(&text);
    c.bench_function("count_tokens", |b| b.iter(|| count(&tokens)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
