use std::error::Error;
use std::time::{Duration, Instant};

use board::{record, Position, Square};
use search::{EngineConfig, SearchStats};

use crate::engine::{Engine, Shared};

/// Random game prefixes from the opening to the early endgame.
pub const POSITIONS: &[&str] = &[
    "c4c5b6d3",
    "d3c3b3e3f3c5f6g2b5c6f4a5",
    "c4c5f6c3b5g7e3e6c2f3g3a5h8b3f4f2b4f5f7h3",
    "c4e3f2c5d6e2f3g1d1g3e6c3b6e1b2a7g4f4h2f7d2h3b4c1g8e7",
    "f5f6e6f4g6d7c3c5d3g4c6c4e8g7f3c7h4b2g5h3b4f2e7e3g8a4c2c8b5d6a2c1",
    "d3e3f4c3c2d2d6f6e6g5g4b1c4f5e2c6h6h5d7f3f2e7b6h7f8c8b3f1e8b4g3e1h4a6b5a5d1d8",
    "f5f4f3f6d3f2g6c3b3b2g4g3b1d2c4c5f1g2g1g5c6a1h6a2b5c7f7d6c2h5b8e7d1a4a3g7h4e3e6h1d8e1e8b4",
];

pub fn run(shared: &Shared, mut config: EngineConfig, depth: u8) -> Result<(), Box<dyn Error>> {
    config.max_depth.value = depth;
    let engine = shared.create_engine(&config)?;

    let benchmark = Benchmark::new(engine, depth);
    benchmark.run()
}

struct Benchmark {
    depth: u8,
    engine: Engine,
}

impl Benchmark {
    fn new(engine: Engine, depth: u8) -> Self {
        Self { depth, engine }
    }

    fn run(mut self) -> Result<(), Box<dyn Error>> {
        self.print_header();

        let mut results = Vec::with_capacity(POSITIONS.len());
        for line in POSITIONS {
            let position = record::replay(line)?;
            let result = self.execute_search(&position)?;
            self.print_result(&position, &result);
            results.push(result);
        }

        self.print_summary(&results);
        Ok(())
    }

    fn print_header(&self) {
        println!(
            "Running benchmark: {} positions, depth {}, {}\n",
            POSITIONS.len(),
            self.depth,
            self.engine.name()
        );
    }

    fn execute_search(&mut self, position: &Position) -> Result<SearchResult, Box<dyn Error>> {
        self.engine.new_game();

        let start = Instant::now();
        let best_move = self.engine.search_position(position, false)?;
        let elapsed = start.elapsed();

        let report = self.engine.report();
        Ok(SearchResult {
            best_move,
            score: report.score,
            depth: report.depth,
            exact: report.exact,
            stats: report.stats,
            elapsed,
        })
    }

    fn print_result(&self, position: &Position, result: &SearchResult) {
        let best_move = result
            .best_move
            .map(|square| square.to_string())
            .unwrap_or_else(|| "pass".to_string());

        println!(
            "empties {:>2} depth {:>2}{} best {} score {:>+3} nodes {:>11} nps {:>10} time {} ms",
            position.empty_count(),
            result.depth,
            if result.exact { "@" } else { " " },
            best_move,
            result.score,
            result.stats.nodes,
            result.stats.nodes_per_second(),
            result.elapsed.as_millis()
        );
    }

    fn print_summary(&self, results: &[SearchResult]) {
        let nodes: u64 = results.iter().map(|r| r.stats.nodes).sum();
        let elapsed: Duration = results.iter().map(|r| r.elapsed).sum();
        let nps = if elapsed.as_secs_f64() > 0.0 {
            (nodes as f64 / elapsed.as_secs_f64()) as u64
        } else {
            0
        };

        println!("\n=== Benchmark Summary ===");
        println!("Nodes: {}", nodes);
        println!("NPS: {}", nps);
        println!("Time: {} ms", elapsed.as_millis());
    }
}

struct SearchResult {
    best_move: Option<Square>,
    score: i32,
    depth: u8,
    exact: bool,
    stats: SearchStats,
    elapsed: Duration,
}
