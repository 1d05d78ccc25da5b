//! Criterion benchmarks for the probe and fixpoint routines.
//!
//! The probe runs on every eligible entity, so it dominates a full run; the
//! fixpoint only runs after a remote fetch.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package toponym-core
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use toponym_core::{CorrectionRule, DEFAULT_MAX_PASSES, converge, probe};

/// Catalogue sizes to benchmark.
const CATALOGUE_SIZES: &[usize] = &[10, 100, 500];

fn build_catalogue(size: usize) -> Vec<CorrectionRule> {
    (0..size)
        .map(|i| {
            CorrectionRule::search_and_replace(&format!(r"^Abbr{i}\.\s"), &format!("Expanded{i} "))
                .expect("benchmark pattern compiles")
        })
        .collect()
}

fn bench_probe(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe");
    for &size in CATALOGUE_SIZES {
        let rules = build_catalogue(size);
        group.bench_with_input(BenchmarkId::new("clean_label", size), &size, |b, _| {
            b.iter(|| probe(&rules, black_box("Rue Pasteur")));
        });
    }
    group.finish();
}

fn bench_converge(c: &mut Criterion) {
    let mut group = c.benchmark_group("converge");
    for &size in CATALOGUE_SIZES {
        let rules = build_catalogue(size);
        let label = format!("Abbr{}. Pasteur", size - 1);
        group.bench_with_input(BenchmarkId::new("one_rewrite", size), &size, |b, _| {
            b.iter(|| converge(&rules, black_box(&label), DEFAULT_MAX_PASSES));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_probe, bench_converge);
criterion_main!(benches);
