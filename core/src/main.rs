mod args;
mod bench;
mod calibrate;
mod engine;
mod selfplay;
mod solve;

use std::error::Error;
use std::fs::File;

use args::{Args, Command};
use clap::Parser;
use crate::engine::Shared;
use log::LevelFilter;
use search::EngineConfig;
use simplelog::{Config, SimpleLogger, WriteLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let mut config = EngineConfig::default();
    engine::apply_options(&mut config, &args.options)?;

    let shared = match &args.mpc {
        Some(path) => Shared::with_mpc(engine::load_mpc_model(path)?),
        None => Shared::default(),
    };

    match args.command {
        Command::Bench { depth } => bench::run(&shared, config, depth)?,
        Command::Solve {
            board,
            record,
            second_best,
        } => solve::run(
            &shared,
            &config,
            board.as_deref(),
            record.as_deref(),
            second_best,
        )?,
        Command::Options => {
            for line in config.describe() {
                println!("{}", line);
            }
        }
        Command::Selfplay {
            games,
            threads,
            depth,
            second_best_probability,
            random_plies,
            output,
        } => {
            let settings = selfplay::Settings {
                games,
                threads: threads.unwrap_or_else(num_cpus::get),
                depth,
                second_best_probability,
                random_plies,
            };
            selfplay::run(shared, config, settings, &output)?
        }
        Command::Calibrate {
            positions,
            max_depth,
            seed,
            output,
        } => calibrate::run(config, positions, max_depth, seed, output.as_deref())?,
    }

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    match &args.log_file {
        Some(log_file) => WriteLogger::init(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        )?,
        None => SimpleLogger::init(LevelFilter::Info, Config::default())?,
    }

    Ok(args)
}
