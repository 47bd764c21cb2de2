use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fuzzy_autodiag::diagnosis::DiagnosticSession;

fn recompute_benchmark(c: &mut Criterion) {
    let mut session = DiagnosticSession::new().expect("diagnosis system builds");
    let mut step = 0usize;

    c.bench_function("diagnosis recompute", |b| {
        b.iter(|| {
            step = (step + 7) % 121;
            session.set_inputs(black_box(step as f64), black_box((step % 101) as f64));
            session.recompute().expect("inputs are bound")
        })
    });
}

criterion_group!(benches, recompute_benchmark);
criterion_main!(benches);
