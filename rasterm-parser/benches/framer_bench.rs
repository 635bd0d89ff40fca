//! Framer benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rasterm_parser::{classify, sequence_end, Args};

fn bench_sequence_end(c: &mut Criterion) {
    let csi: Vec<char> = "\x1b[38;5;196;48;2;10;20;30m".chars().collect();
    let osc: Vec<char> = "\x1b]0;a window title of usual length\x07".chars().collect();

    c.bench_function("sequence_end_csi", |b| {
        b.iter(|| sequence_end(black_box(&csi)))
    });
    c.bench_function("sequence_end_osc", |b| {
        b.iter(|| sequence_end(black_box(&osc)))
    });
}

fn bench_classify_and_args(c: &mut Criterion) {
    let seq: Vec<char> = "\x1b[1;31;42m".chars().collect();
    c.bench_function("classify_and_parse_args", |b| {
        b.iter(|| {
            let s = classify(black_box(&seq));
            let args = Args::parse(black_box(&seq[2..seq.len() - 1]), 1);
            (s.is_some(), args.len())
        })
    });
}

criterion_group!(benches, bench_sequence_end, bench_classify_and_args);
criterion_main!(benches);
