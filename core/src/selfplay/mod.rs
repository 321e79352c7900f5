mod generator;
mod opening;
mod samples;
mod worker;

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use generator::Generator;
pub use opening::random_opening;
use samples::write_csv;
use search::EngineConfig;

use crate::engine::Shared;

#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub games: usize,
    pub threads: usize,
    pub depth: u8,
    pub second_best_probability: f64,
    pub random_plies: usize,
}

pub fn run(
    shared: Shared,
    config: EngineConfig,
    mut settings: Settings,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    settings.threads = settings.threads.max(1);
    settings.second_best_probability = settings.second_best_probability.clamp(0.0, 1.0);

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = Arc::clone(&stop_flag);

    ctrlc::set_handler(move || {
        log::info!("Received SIGINT, stopping self-play...");
        stop_flag_handler.store(true, Ordering::Relaxed);
    })?;

    let generator = Generator::new(shared, config, settings);
    let samples = generator.run(stop_flag)?;
    log::info!("Generated {} samples", samples.len());

    fs::create_dir_all(output)?;
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    let filename = output.join(format!("selfplay-{}.csv", timestamp));

    log::info!("Writing samples to {}", filename.display());
    let mut file = BufWriter::new(File::create(&filename)?);
    write_csv(&samples, &mut file)?;

    Ok(())
}
