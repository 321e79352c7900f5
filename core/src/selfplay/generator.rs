use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::{Arc, Mutex};

use ahash::AHashSet;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::*;
use rayon::ThreadPoolBuilder;
use search::{EngineConfig, SearchError};

use super::samples::Sample;
use super::worker::SelfPlayWorker;
use super::Settings;
use crate::engine::Shared;

// Each of the worker engines owns two tables of this size
const WORKER_HASH_BITS: u32 = 18;

pub struct Generator {
    config: EngineConfig,
    settings: Settings,
    shared: Shared,
}

impl Generator {
    pub fn new(shared: Shared, mut config: EngineConfig, settings: Settings) -> Self {
        config.max_depth.value = settings.depth;
        config.hash_bits.value = config.hash_bits.value.min(WORKER_HASH_BITS);

        Self {
            config,
            settings,
            shared,
        }
    }

    pub fn run(&self, stop: Arc<AtomicBool>) -> Result<Vec<Sample>, Box<dyn Error>> {
        log::info!(
            "Playing {} games at depth {} on {} threads",
            self.settings.games,
            self.settings.depth,
            self.settings.threads
        );

        // Positions are only scored once across all workers
        let seen = Arc::new(Mutex::new(AHashSet::new()));
        let game_counter = Arc::new(AtomicUsize::new(0));

        let progress = ProgressBar::new(self.settings.games as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template(" {spinner:.cyan} {pos}/{len} [{wide_bar:.cyan/blue}] {eta_precise}")?,
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .build()?;

        let samples: Result<Vec<Vec<Sample>>, SearchError> = pool.install(|| {
            (0..self.settings.threads)
                .into_par_iter()
                .map(|tid| {
                    let engine = self.shared.create_engine(&self.config)?;
                    let mut worker = SelfPlayWorker::new(
                        tid,
                        engine,
                        self.settings,
                        Arc::clone(&seen),
                        Arc::clone(&game_counter),
                        progress.clone(),
                    );

                    worker.play_games(&stop)
                })
                .collect()
        });

        progress.finish();
        Ok(samples?.into_iter().flatten().collect())
    }
}
