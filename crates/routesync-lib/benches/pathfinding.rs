use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use routesync_lib::{
    load_dataset, plan_routes, Dataset, PolicyFlag, RouteRequest, SearchOptions, TransportMode,
};
use std::hint::black_box;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/network")
}

static DATASET: Lazy<Dataset> = Lazy::new(|| load_dataset(fixture_path()).expect("fixture loads"));
static SINGLE_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::new("Shanghai", "Rotterdam").with_top_n(1));
static TOP5_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::new("Shanghai", "Rotterdam").with_top_n(5));
static TOP20_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::new("Los Angeles", "Warsaw").with_top_n(20));
static CONSTRAINED_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::new("Shenzhen", "Paris")
        .with_top_n(5)
        .with_avoid_countries(["DE"])
        .with_allowed_modes([TransportMode::Sea, TransportMode::Land])
        .with_policy_flags(PolicyFlag::Strict, PolicyFlag::Avoid)
});

fn benchmark_pathfinding(c: &mut Criterion) {
    let dataset = &*DATASET;
    let options = SearchOptions::default();

    for (name, request) in [
        ("dijkstra_shanghai_rotterdam", &*SINGLE_REQUEST),
        ("yen_top5_shanghai_rotterdam", &*TOP5_REQUEST),
        ("yen_top20_los_angeles_warsaw", &*TOP20_REQUEST),
        ("yen_constrained_shenzhen_paris", &*CONSTRAINED_REQUEST),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                let plan = plan_routes(&dataset.network, &dataset.policies, request, &options)
                    .expect("request is valid");
                black_box(plan.paths.paths().len())
            });
        });
    }
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
