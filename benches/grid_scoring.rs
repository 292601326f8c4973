//! Benchmarks for grid scoring.

use catch_scorer_rust::models::{parse_classifier, parse_regressor, DefaultPipeline, JuvenileModel};
use catch_scorer_rust::{
    GridSampler, ModelStack, PipelineChoice, ScoringBudget, SpatialScorer, DEFAULT_MAP_CENTER,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

/// Depth-2 forest of `n_trees` identical trees over the 4-field vector
fn forest(n_trees: usize, classifier: bool) -> String {
    let (leaf_lo, leaf_hi) = if classifier { ("[7.0, 3.0]", "[2.0, 8.0]") } else { ("[80.0]", "[260.0]") };
    let tree = format!(
        r#"{{"nodes": [
            {{"feature": 0, "threshold": 27.5, "left": 1, "right": 2}},
            {{"feature": -1, "value": {lo}}},
            {{"feature": 3, "threshold": 410.0, "left": 3, "right": 4}},
            {{"feature": -1, "value": {lo}}},
            {{"feature": -1, "value": {hi}}}
        ]}}"#,
        lo = leaf_lo,
        hi = leaf_hi
    );
    let trees = vec![tree; n_trees].join(",");
    let classes = if classifier { r#""classes": [0, 1],"# } else { "" };
    format!(
        r#"{{"model_type": "random_forest", "n_features": 4, {} "trees": [{}]}}"#,
        classes, trees
    )
}

fn bench_stack(n_trees: usize) -> Arc<ModelStack> {
    let classifier = parse_classifier(&forest(n_trees, true), "availability").unwrap();
    let regressor = parse_regressor(&forest(n_trees, false), "quantity").unwrap();
    let juvenile = parse_classifier(
        r#"{"model_type": "random_forest", "n_features": 3, "classes": ["High", "Low", "Medium"],
            "trees": [{"nodes": [{"feature": -1, "value": [1.0, 8.0, 1.0]}]}]}"#,
        "juvenile",
    )
    .unwrap();

    let default = DefaultPipeline::new(classifier, regressor).unwrap();
    Arc::new(ModelStack::new(default, JuvenileModel::new(juvenile).unwrap()))
}

fn bench_grid_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_scoring");
    let scorer = SpatialScorer::new(bench_stack(100));
    let budget = ScoringBudget::unbounded();

    for resolution in [10usize, 30, 80].iter() {
        let grid = GridSampler::generate(DEFAULT_MAP_CENTER, 25.0, *resolution);

        group.bench_with_input(BenchmarkId::from_parameter(resolution), resolution, |b, _| {
            b.iter(|| {
                scorer
                    .score(black_box(&grid), DEFAULT_MAP_CENTER, PipelineChoice::Default, &budget)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grid_scoring);
criterion_main!(benches);
