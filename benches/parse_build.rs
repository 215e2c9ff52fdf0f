//! Benchmarks for the text-to-model pipeline.
//!
//! Measures parse plus build throughput on synthetic problems of growing
//! size; the solve step is excluded since it belongs to the backend.

use std::fmt::Write;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lptext::model_from_text;

fn synthetic_problem(num_variables: usize, num_constraints: usize) -> String {
    let mut text = String::from("Maximize: ");
    for idx in 0..num_variables {
        if idx > 0 {
            text.push_str(" + ");
        }
        write!(text, "{}x{}", idx % 7 + 1, idx).unwrap();
    }
    text.push('\n');
    for row in 0..num_constraints {
        for idx in 0..num_variables {
            if idx > 0 {
                text.push_str(" + ");
            }
            write!(text, "{}x{}", (idx + row) % 5 + 1, idx).unwrap();
        }
        writeln!(text, " <= {}", 10 * (row + 1)).unwrap();
    }
    text
}

fn bench_parse_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_build");
    for (name, variables, constraints) in
        [("small", 2, 2), ("medium", 20, 20), ("large", 100, 100)]
    {
        let text = synthetic_problem(variables, constraints);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| model_from_text(black_box(text)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_build);
criterion_main!(benches);
