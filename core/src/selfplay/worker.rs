use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ahash::AHashSet;
use board::Position;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use search::{Engine, SearchError};

use super::opening::{play, random_opening};
use super::samples::{black_score, label_game, Sample};
use super::Settings;

/// Plays whole games with its own engine until the shared game budget is
/// used up or a stop is requested.
pub struct SelfPlayWorker {
    tid: usize,
    engine: Engine,
    rng: StdRng,
    settings: Settings,

    /// Positions already scored by any worker
    seen: Arc<Mutex<AHashSet<(u64, u64)>>>,
    game_counter: Arc<AtomicUsize>,
    progress: ProgressBar,
}

impl SelfPlayWorker {
    pub fn new(
        tid: usize,
        engine: Engine,
        settings: Settings,
        seen: Arc<Mutex<AHashSet<(u64, u64)>>>,
        game_counter: Arc<AtomicUsize>,
        progress: ProgressBar,
    ) -> Self {
        Self {
            tid,
            engine,
            rng: StdRng::from_entropy(),
            settings,
            seen,
            game_counter,
            progress,
        }
    }

    pub fn play_games(&mut self, stop: &AtomicBool) -> Result<Vec<Sample>, SearchError> {
        let mut samples = Vec::new();

        while !stop.load(Ordering::Relaxed) {
            let game_id = self.game_counter.fetch_add(1, Ordering::Relaxed);
            if game_id >= self.settings.games {
                break;
            }

            self.play_game(game_id, stop, &mut samples)?;
            self.progress.inc(1);
        }

        Ok(samples)
    }

    /// Appends the game's samples once it is over. An interrupted game has
    /// no result, so it contributes nothing.
    fn play_game(
        &mut self,
        game_id: usize,
        stop: &AtomicBool,
        samples: &mut Vec<Sample>,
    ) -> Result<(), SearchError> {
        self.engine.new_game();
        let mut position = random_opening(&mut self.rng, self.settings.random_plies);
        let mut game = Vec::new();

        while !position.is_game_over() {
            if stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            if position.can_pass() {
                position.pass();
                continue;
            }

            let want_second_best = self.rng.gen_bool(self.settings.second_best_probability);
            let Some(square) = self.engine.search_position(&position, want_second_best)? else {
                position.pass();
                continue;
            };

            // Forced moves are returned without a search and carry no score
            let report = self.engine.report();
            if report.depth > 0 && self.first_visit(&position) {
                game.push(Sample::pending(&position, report.score, game_id));
            }

            play(&mut position, square);
        }

        label_game(&mut game, &position);
        log::info!(
            "[{}] Game {} ended: {:+} for black, {} positions",
            self.tid,
            game_id,
            black_score(&position),
            game.len()
        );
        samples.append(&mut game);
        Ok(())
    }

    fn first_visit(&self, position: &Position) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((position.mover(), position.opponent()))
    }
}

#[cfg(test)]
mod tests {
    use board::Color;
    use search::EngineConfig;

    use super::*;
    use crate::engine::Shared;

    fn worker(games: usize) -> SelfPlayWorker {
        let mut config = EngineConfig::default();
        config.hash_bits.value = 12;
        config.max_depth.value = 2;
        config.endgame_empties.value = 8;

        let settings = Settings {
            games,
            threads: 1,
            depth: 2,
            second_best_probability: 0.5,
            random_plies: 4,
        };

        SelfPlayWorker::new(
            0,
            Shared::default().create_engine(&config).unwrap(),
            settings,
            Arc::new(Mutex::new(AHashSet::new())),
            Arc::new(AtomicUsize::new(0)),
            ProgressBar::hidden(),
        )
    }

    #[test]
    fn test_plays_requested_games() {
        let mut worker = worker(2);
        let samples = worker.play_games(&AtomicBool::new(false)).unwrap();

        assert!(!samples.is_empty());
        assert!(samples.iter().all(|s| s.game_id < 2));
        assert!(samples.iter().all(|s| s.score.abs() <= 64));

        let unique: AHashSet<(&str, Color)> =
            samples.iter().map(|s| (s.squares.as_str(), s.side)).collect();
        assert_eq!(unique.len(), samples.len());
    }

    #[test]
    fn test_samples_labelled_with_game_result() {
        let mut worker = worker(1);
        let samples = worker.play_games(&AtomicBool::new(false)).unwrap();

        // Both sides of the same game see opposite results
        let black = samples.iter().find(|s| s.side == Color::Black).unwrap();
        let white = samples.iter().find(|s| s.side == Color::White).unwrap();
        assert_eq!(black.result, -white.result);
        assert!(samples.iter().all(|s| s.result.abs() <= 64));
    }

    #[test]
    fn test_stop_before_start() {
        let mut worker = worker(5);
        let samples = worker.play_games(&AtomicBool::new(true)).unwrap();
        assert!(samples.is_empty());
    }
}
