use std::error::Error;
use std::time::Instant;

use board::{record, Position};
use search::EngineConfig;

use crate::engine::Shared;

pub fn run(
    shared: &Shared,
    config: &EngineConfig,
    board: Option<&str>,
    record: Option<&str>,
    second_best: bool,
) -> Result<(), Box<dyn Error>> {
    let position = parse_position(board, record)?;
    println!("{}", position);

    let mut engine = shared.create_engine(config)?;
    let start = Instant::now();
    let chosen = engine.search_position(&position, second_best)?;
    let elapsed = start.elapsed();

    let Some(chosen) = chosen else {
        if position.is_game_over() {
            println!("Game over, final score {:+}", position.final_score());
        } else {
            println!("No legal move, pass");
        }
        return Ok(());
    };

    let report = engine.report();
    println!("Move: {}", chosen);
    if let Some(best) = report.best_move {
        println!("Best: {} ({:+})", best, report.score);
    }
    if let (Some(second), Some(score)) = (report.second_move, report.second_score) {
        println!("Second: {} ({:+})", second, score);
    }
    println!(
        "Depth: {}{}",
        report.depth,
        if report.exact { " (exact)" } else { "" }
    );
    println!("Nodes: {}", report.stats.nodes);
    println!("NPS: {}", report.stats.nodes_per_second());
    println!("Time: {} ms", elapsed.as_millis());

    Ok(())
}

fn parse_position(board: Option<&str>, record: Option<&str>) -> Result<Position, Box<dyn Error>> {
    match (board, record) {
        (Some(board), _) => Ok(board.parse()?),
        (None, Some(line)) => Ok(record::replay(line)?),
        (None, None) => Ok(Position::start()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_defaults_to_start() {
        assert_eq!(parse_position(None, None).unwrap(), Position::start());
    }

    #[test]
    fn test_parse_position_from_record() {
        let position = parse_position(None, Some("f5d6c3")).unwrap();
        assert_eq!(position.empty_count(), 57);
    }

    #[test]
    fn test_parse_position_rejects_illegal_record() {
        assert!(parse_position(None, Some("a1")).is_err());
    }
}
