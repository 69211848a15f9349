use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use mcvolume_volume::VolumeConfig;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "mcvolume", about = "Timing runs and sanity checks for the mcvolume block volume")]
struct Cli {
    /// Volume settings file (TOML); built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write the log to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill a cube one block at a time and report the write rate
    BenchSet {
        /// Cube side length in blocks
        #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(i32).range(1..=1024))]
        size: i32,
        /// Number of distinct block states to cycle through
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..))]
        palette_size: u16,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Extract a filled cube, place it into a fresh volume and verify samples
    BenchBulk {
        /// Cube side length in blocks
        #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(i32).range(1..=1024))]
        size: i32,
        /// Worker threads (defaults to `bulk_threads` from the config)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        threads: Option<u16>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Scatter blocks sparsely and print the computed build bounds
    Bounds {
        /// Cube side length in blocks, centered on the origin
        #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(i32).range(1..=1024))]
        size: i32,
        /// Number of blocks to scatter
        #[arg(long, default_value_t = 32)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => VolumeConfig::from_path(path)?,
        None => VolumeConfig::default(),
    };
    log::debug!("volume config: {config:?}");

    match cli.command {
        Command::BenchSet {
            size,
            palette_size,
            seed,
        } => commands::bench_set(&config, size, palette_size as usize, seed)?,
        Command::BenchBulk {
            size,
            threads,
            seed,
        } => {
            let threads = threads.map_or(config.bulk_threads, usize::from);
            commands::bench_bulk(&config, size, threads, seed)?
        }
        Command::Bounds { size, count, seed } => commands::bounds(&config, size, count, seed)?,
    }
    Ok(())
}
