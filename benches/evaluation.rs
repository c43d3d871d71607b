//! Evaluation Benchmarks
//!
//! Measures the cost of the lazy tree operations that callers repeat most:
//!
//! - **Evaluation**: re-resolving a whole tree after a variable changed
//! - **Dependency extraction**: walking a tree to collect its variables
//! - **Deep clone**: copying a tree together with its variables
//! - **Parsing**: building a live tree from text
//!
//! Run with: `cargo bench --bench evaluation`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lazy_params::prelude::*;

/// Builds a polynomial `sum(c_i * x^i) + y / (x + 1)` of the given degree.
fn polynomial(x: &Variable, y: &Variable, degree: usize) -> Transform {
    let mut tree = y / (x + 1.0);
    for i in 0..=degree {
        tree = tree + (i as f64 + 0.5) * x.pow(i as f64);
    }
    tree
}

fn benchmark_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluation");
    let x = Variable::new("x", 1.1);
    let y = Variable::new("y", 2.2);

    for degree in [2, 8, 32] {
        let tree = polynomial(&x, &y, degree);
        group.bench_with_input(BenchmarkId::new("evaluate", degree), &tree, |b, tree| {
            b.iter(|| {
                x.add_in_place(1e-9).unwrap();
                black_box(tree.evaluate().unwrap())
            })
        });
        group.bench_with_input(BenchmarkId::new("variables", degree), &tree, |b, tree| {
            b.iter(|| black_box(tree.variables()))
        });
        group.bench_with_input(BenchmarkId::new("deep_clone", degree), &tree, |b, tree| {
            b.iter(|| black_box(tree.deep_clone()))
        });
    }

    group.finish();
}

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parsing");
    let bindings = [
        Variable::new("a", 1.0),
        Variable::new("b", 2.0),
        Variable::new("c", 3.0),
    ];

    let expressions = [
        ("linear", "2.2 * a + 1.1"),
        ("quadratic", "a^2 + 3*a*b - c"),
        ("nested", "((a + b) * (b - c)) / (inv(a) + c^3)"),
    ];

    for (name, text) in expressions {
        group.bench_function(name, |b| {
            b.iter(|| black_box(Expression::new(text, &bindings).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_evaluation, benchmark_parsing);
criterion_main!(benches);
