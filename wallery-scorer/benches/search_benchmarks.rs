//! Criterion benchmarks for fuzzy search and related scoring.
//!
//! Measures ranking time over synthetic catalogs of 1 000, 5 000 and
//! 20 000 wallpapers.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package wallery-scorer
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wallery_core::Wallpaper;
use wallery_scorer::{RelatedScorer, search};

/// Seed for deterministic catalog generation.
const BENCHMARK_SEED: u64 = 42;

/// Catalog sizes to benchmark.
const CATALOG_SIZES: &[usize] = &[1_000, 5_000, 20_000];

const CATEGORIES: [&str; 6] = ["Nature", "City", "Space", "Abstract", "Animals", "Minimal"];

const VOCABULARY: [&str; 16] = [
    "sunset", "forest", "ocean", "mountain", "neon", "night", "galaxy", "nebula", "pattern",
    "gradient", "tiger", "wolf", "snow", "desert", "river", "skyline",
];

/// Generate a deterministic catalog of `count` wallpapers.
fn generate_catalog(count: usize, seed: u64) -> Vec<Wallpaper> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let tag_count = rng.gen_range(1..=5);
            let tags: Vec<&str> = VOCABULARY
                .choose_multiple(&mut rng, tag_count)
                .copied()
                .collect();
            let title = VOCABULARY
                .choose_multiple(&mut rng, 2)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            Wallpaper::new(format!("w{index}"))
                .with_title(title)
                .with_category(CATEGORIES.choose(&mut rng).copied().unwrap_or("Nature"))
                .with_tags(tags)
                .with_engagement(
                    rng.gen_range(0..10_000),
                    rng.gen_range(0..2_000),
                    rng.gen_range(0..50_000),
                )
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for &size in CATALOG_SIZES {
        let catalog = generate_catalog(size, BENCHMARK_SEED);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::new("fuzzy", size), &catalog, |b, catalog| {
            b.iter(|| search(black_box("mountian sunset"), catalog));
        });
        group.bench_with_input(BenchmarkId::new("fallback", size), &catalog, |b, catalog| {
            b.iter(|| search(black_box("sky"), catalog));
        });
    }
    group.finish();
}

fn bench_related(c: &mut Criterion) {
    let mut group = c.benchmark_group("related");
    let scorer = RelatedScorer::default();
    for &size in CATALOG_SIZES {
        let catalog = generate_catalog(size, BENCHMARK_SEED);
        let current = Wallpaper::new("current")
            .with_category("Nature")
            .with_tags(["forest", "river", "snow"]);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::new("related", size), &catalog, |b, catalog| {
            b.iter(|| scorer.related(&current, catalog, 12, &["w1", "w2"]));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search, bench_related);
criterion_main!(benches);
