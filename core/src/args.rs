use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "Outflank")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Write debug logs to a file instead of info logs to the terminal.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Engine option as `Name=value`, e.g. `--set "Max Depth=14"`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Multi-ProbCut model written by `calibrate --output`.
    #[arg(long)]
    pub mpc: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search a fixed suite of positions and report speed.
    Bench {
        #[arg(long, default_value_t = 12)]
        depth: u8,
    },

    /// Find the best move in one position.
    Solve {
        /// 64 squares a1..h8 (`X`/`*` black, `O` white, `-`/`.` empty) then the side to move.
        #[arg(long, conflicts_with = "record")]
        board: Option<String>,

        /// Moves from the start position, e.g. `f5d6c3`.
        #[arg(long)]
        record: Option<String>,

        /// Report the second best move instead of the best.
        #[arg(long)]
        second_best: bool,
    },

    /// List the engine options accepted by `--set`.
    Options,

    /// Generate scored positions from engine self-play.
    Selfplay {
        #[arg(long, default_value_t = 1000)]
        games: usize,

        /// Worker threads (defaults to the number of cores).
        #[arg(long)]
        threads: Option<usize>,

        #[arg(long, default_value_t = 8)]
        depth: u8,

        /// Chance of playing the second best move instead of the best.
        #[arg(long, default_value_t = 0.1)]
        second_best_probability: f64,

        /// Random moves played before the engine takes over.
        #[arg(long, default_value_t = 8)]
        random_plies: usize,

        /// Output directory for the CSV file.
        #[arg(long, default_value = "data")]
        output: PathBuf,
    },

    /// Fit the Multi-ProbCut model from shallow and deep searches.
    Calibrate {
        #[arg(long, default_value_t = 200)]
        positions: usize,

        /// Deepest search the model is fitted for.
        #[arg(long, default_value_t = 8)]
        max_depth: u8,

        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// File to save the fitted model to, for use with `--mpc`.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
