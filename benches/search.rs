// Recommendation throughput over synthetic catalogs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fitlife_core::{CanonicalFeatures, RawQuery};
use fitlife_similarity::{Catalog, CatalogEncoder, PointQuery, Recommender, RoutineEntry, DEFAULT_MODEL_ID};
use rand::prelude::*;

const GOALS: [&str; 5] = ["salud", "ganar_musculo", "hiit", "recomp", "perder_grasa"];
const LEVELS: [&str; 3] = ["novato", "intermedio", "avanzado"];
const SEXES: [&str; 3] = ["any", "m", "f"];
const TAGS: [&str; 8] = ["fullbody", "core", "cardio", "pecho", "espalda", "pierna", "gluteo", "hombro"];

fn random_catalog(size: usize, rng: &mut StdRng) -> Catalog {
    (0..size)
        .map(|i| {
            let min_age = rng.random_range(14..40) as f64;
            let min_minutes = rng.random_range(10..50) as f64;
            let focus: Vec<&str> = (0..rng.random_range(1..4))
                .map(|_| TAGS[rng.random_range(0..TAGS.len())])
                .collect();
            RoutineEntry {
                name: Some(format!("routine-{i}")),
                goal: Some(GOALS[rng.random_range(0..GOALS.len())].to_string()),
                level: Some(LEVELS[rng.random_range(0..LEVELS.len())].to_string()),
                sex: Some(SEXES[rng.random_range(0..SEXES.len())].to_string()),
                min_age: Some(min_age),
                max_age: Some(min_age + rng.random_range(5..40) as f64),
                min_minutes: Some(min_minutes),
                max_minutes: Some(min_minutes + rng.random_range(5..30) as f64),
                focus: Some(focus.join("|")),
            }
        })
        .collect::<Vec<_>>()
        .into()
}

fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    let mut rng = StdRng::seed_from_u64(1);

    for size in [100, 1000, 10000].iter() {
        let catalog = random_catalog(*size, &mut rng);
        group.bench_with_input(BenchmarkId::new("catalog_encoder", size), &catalog, |b, catalog| {
            b.iter(|| CatalogEncoder::fit(black_box(catalog)));
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let mut rng = StdRng::seed_from_u64(2);
    let query = PointQuery {
        goal: "hiit".into(),
        minutes_available: 25,
        ..PointQuery::default()
    };

    for size in [100, 1000, 10000].iter() {
        let recommender = Recommender::fit(DEFAULT_MODEL_ID, random_catalog(*size, &mut rng));
        group.bench_with_input(BenchmarkId::new("top5", size), &recommender, |b, r| {
            b.iter(|| r.recommend(black_box(&query), 5).unwrap());
        });
    }

    group.finish();
}

fn benchmark_feature_mapping(c: &mut Criterion) {
    let raw: RawQuery = serde_json::from_value(serde_json::json!({
        "goal": "ganar_musculo",
        "experienceLevel": "avanzado",
        "minutesAvailable": "25",
        "frecuencia": 4
    }))
    .unwrap();

    c.bench_function("map_features", |b| {
        b.iter(|| CanonicalFeatures::from_raw(black_box(raw.clone())));
    });
}

criterion_group!(benches, benchmark_fit, benchmark_recommend, benchmark_feature_mapping);
criterion_main!(benches);
