use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::Path;

use board::Position;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::*;
use search::{Algorithm, Engine, EngineConfig, MpcModel, MpcSample, SearchError};

use crate::engine::Shared;
use crate::selfplay::random_opening;

const MIN_DEPTH: u8 = 2;

pub fn run(
    mut config: EngineConfig,
    positions: usize,
    max_depth: u8,
    seed: u64,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    // Both searches must be unpruned for the fit to mean anything
    config.use_mpc.value = false;
    let max_depth = max_depth.max(MIN_DEPTH);

    let openings = sample_positions(positions, max_depth, seed);
    log::info!(
        "Calibrating on {} positions, depths {}..={}",
        openings.len(),
        MIN_DEPTH,
        max_depth
    );

    let progress = ProgressBar::new(openings.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(" {spinner:.cyan} {pos}/{len} [{wide_bar:.cyan/blue}] {eta_precise}")?,
    );

    let shared = Shared::default();
    let threads = num_cpus::get().max(1);
    let samples: Result<Vec<Vec<MpcSample>>, SearchError> = (0..threads)
        .into_par_iter()
        .map(|tid| {
            let mut engine = shared.create_engine(&config)?;
            let mut samples = Vec::new();
            for position in openings.iter().skip(tid).step_by(threads) {
                samples.extend(measure(&mut engine, position, max_depth)?);
                progress.inc(1);
            }
            Ok(samples)
        })
        .collect();
    progress.finish();

    let samples: Vec<MpcSample> = samples?.into_iter().flatten().collect();
    let model = MpcModel::fit(&samples);
    print_model(&model, &samples, max_depth);

    if let Some(path) = output {
        fs::write(path, model.to_string())?;
        log::info!("Saved MPC model to {}", path.display());
    }

    Ok(())
}

/// Random positions with room for the deepest search.
fn sample_positions(count: usize, max_depth: u8, seed: u64) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max_plies = 59 - max_depth as usize;

    (0..count)
        .map(|_| {
            let plies = rng.gen_range(0..=max_plies);
            random_opening(&mut rng, plies)
        })
        .filter(|position| {
            position.legal_moves() != 0 && position.empty_count() > max_depth as u32
        })
        .collect()
}

/// Scores `position` at every model depth and at the matching shallow depth.
fn measure(
    engine: &mut Engine,
    position: &Position,
    max_depth: u8,
) -> Result<Vec<MpcSample>, SearchError> {
    engine.new_game();

    let empties = position.empty_count();
    let mut samples = Vec::new();
    for depth in MIN_DEPTH..=max_depth {
        let (shallow, _) =
            engine.analyse(position, MpcModel::shallow_depth(depth), Algorithm::Pvs)?;
        let (deep, _) = engine.analyse(position, depth, Algorithm::Pvs)?;

        samples.push(MpcSample {
            empties,
            depth,
            shallow,
            deep,
        });
    }

    Ok(samples)
}

fn print_model(model: &MpcModel, samples: &[MpcSample], max_depth: u8) {
    let buckets: BTreeSet<u32> = samples.iter().map(|s| s.empties / 8).collect();

    println!("\n=== MPC Model ({} samples) ===", samples.len());
    for bucket in buckets {
        for depth in MIN_DEPTH..=max_depth {
            let params = model.params(bucket * 8, depth);
            println!(
                "empties {:>2}-{:<2} depth {:>2}: slope {:.3} bias {:+.3} std {:.3}",
                bucket * 8,
                bucket * 8 + 7,
                depth,
                params.slope,
                params.bias,
                params.std
            );
        }
    }
}
