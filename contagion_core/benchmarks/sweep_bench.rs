use contagion_core::generators::erdos_renyi;
use contagion_core::{
    optimize, simulate_with_aid, ExecutionMode, NetworkView, OptimizationRequest,
    SimulationParams, StopRule,
};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn network(nodes: u32) -> NetworkView {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let (graph, weights) =
        erdos_renyi(nodes, 5.0 / nodes as f64, 0.1, 0.5, &mut rng).expect("valid generator input");
    NetworkView::build(&graph, &weights).expect("generated graph is valid")
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");

    for size in [100u32, 1_000, 10_000] {
        let view = network(size);
        let params = SimulationParams {
            aid_level: 0.05,
            stop_rule: StopRule::FixedBudget,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("nodes", size), &size, |b, _| {
            b.iter_batched(
                || ChaCha8Rng::seed_from_u64(11),
                |mut rng| simulate_with_aid(&view, &params, &mut rng),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    let view = network(1_000);

    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let request = OptimizationRequest {
            execution: mode,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("mode", format!("{mode:?}")),
            &request,
            |b, request| b.iter(|| optimize(&view, request)),
        );
    }

    group.finish();
}

criterion_group!(sweep_benches, bench_run, bench_sweep);
criterion_main!(sweep_benches);
