use board::{legal_moves, legal_moves_scalar, record, Position};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use evaluation::{Evaluator, LinearBackend, PatternSet};
use search::{Engine, EngineConfig};
use std::sync::Arc;

const DEPTH: u8 = 10;
const SAMPLE_SIZE: usize = 10;

/// Opening, midgame and early endgame positions.
const RECORDS: &[&str] = &[
    "c4c5b6d3",
    "c4c5f6c3b5g7e3e6c2f3g3a5h8b3f4f2b4f5f7h3",
    "f5f6e6f4g6d7c3c5d3g4c6c4e8g7f3c7h4b2g5h3b4f2e7e3g8a4c2c8b5d6a2c1",
    "d3e3f4c3c2d2d6f6e6g5g4b1c4f5e2c6h6h5d7f3f2e7b6h7f8c8b3f1e8b4g3e1h4a6b5a5d1d8",
];

fn positions() -> Vec<Position> {
    RECORDS
        .iter()
        .map(|line| record::replay(line).unwrap())
        .collect()
}

fn create_engine() -> Engine {
    let config = EngineConfig::default();
    let patterns = Arc::new(PatternSet::new());
    let backend = Box::new(LinearBackend::heuristic(&patterns));

    Engine::new(&config, Evaluator::new(patterns, backend)).unwrap()
}

fn bench_movegen(c: &mut Criterion) {
    let positions = positions();
    let mut group = c.benchmark_group("movegen");

    group.bench_function("legal_moves", |b| {
        b.iter(|| {
            for position in &positions {
                black_box(legal_moves(
                    black_box(position.mover()),
                    black_box(position.opponent()),
                ));
            }
        })
    });
    group.bench_function("legal_moves_scalar", |b| {
        b.iter(|| {
            for position in &positions {
                black_box(legal_moves_scalar(
                    black_box(position.mover()),
                    black_box(position.opponent()),
                ));
            }
        })
    });

    group.finish();
}

fn bench_positions(c: &mut Criterion) {
    let mut engine = create_engine();
    let mut group = c.benchmark_group(format!("search/depth_{}", DEPTH));

    group.sample_size(SAMPLE_SIZE);
    group.sampling_mode(SamplingMode::Flat);

    let mut config = engine.config().clone();
    config.max_depth.value = DEPTH;
    engine.configure(&config).unwrap();

    for position in positions() {
        group.bench_with_input(
            BenchmarkId::from_parameter(position.empty_count()),
            &position,
            |b, position| {
                b.iter(|| {
                    engine.new_game();
                    black_box(engine.search_position(position, false).unwrap())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_movegen, bench_positions);
criterion_main!(benches);
