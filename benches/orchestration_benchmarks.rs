use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dashboard_core::constants::modules;
use dashboard_core::orchestration::{
    EndpointKey, FetchPlanner, FilterState, LoadingTracker, ParameterKey, ResultCache, Selection,
};
use serde_json::json;
use uuid::Uuid;

fn filters() -> FilterState {
    FilterState::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .with_filter("site_id", "42")
}

fn selections(per_module: usize) -> Vec<Selection> {
    modules::ALL
        .iter()
        .flat_map(|module| {
            (0..per_module).map(move |i| {
                Selection::new(
                    format!("{module}-{i}"),
                    *module,
                    format!("endpoint_{i}"),
                    format!("{module} {i}"),
                )
            })
        })
        .collect()
}

fn benchmark_parameter_key(c: &mut Criterion) {
    let state = filters();
    c.bench_function("parameter_key_build", |b| {
        b.iter(|| ParameterKey::build(black_box(&state)))
    });
}

fn benchmark_plan_cold(c: &mut Criterion) {
    let state = filters();
    let key = ParameterKey::build(&state);
    let selections = selections(8);
    let cache = ResultCache::new();
    let planner = FetchPlanner::new();

    c.bench_function("plan_cold_cache", |b| {
        b.iter(|| {
            let mut loading = LoadingTracker::new();
            planner.plan(
                Uuid::new_v4(),
                black_box(&selections),
                &state,
                &key,
                &cache,
                &mut loading,
            )
        })
    });
}

fn benchmark_plan_warm(c: &mut Criterion) {
    let state = filters();
    let key = ParameterKey::build(&state);
    let selections = selections(8);
    let mut cache = ResultCache::new();
    for (i, selection) in selections.iter().enumerate() {
        let endpoint = EndpointKey::new(selection.module.clone(), selection.endpoint.clone());
        if i % 5 == 0 {
            cache.record_failure(&endpoint, &key, "HTTP 500".to_string());
        } else {
            cache.record_success(&endpoint, &key, json!({"value": i}));
        }
    }
    let planner = FetchPlanner::new();

    c.bench_function("plan_warm_cache", |b| {
        b.iter(|| {
            let mut loading = LoadingTracker::new();
            planner.plan(
                Uuid::new_v4(),
                black_box(&selections),
                &state,
                &key,
                &cache,
                &mut loading,
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_parameter_key,
    benchmark_plan_cold,
    benchmark_plan_warm
);
criterion_main!(benches);
