mod config;
mod error;
mod manager;
mod scales;
mod series;
mod stats;
mod table;

use crate::config::Config;
use crate::manager::Manager;
use crate::scales::Backend;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Folder containing the wind-speed files.
    data_dir: PathBuf,

    /// Result table (.xlsx or .csv).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Header lines skipped in every file.
    #[arg(long)]
    skip_rows: Option<usize>,

    #[arg(long, value_enum)]
    backend: Option<Backend>,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mut cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to construct cfg")?,
        None => Config::default(),
    };
    if let Some(output) = args.output {
        cfg.output.file = output;
    }
    if let Some(skip_rows) = args.skip_rows {
        cfg.input.skip_rows = skip_rows;
    }
    if let Some(backend) = args.backend {
        cfg.analysis.backend = backend;
    }

    let mgr = Manager::new(args.data_dir, cfg).context("failed to construct mgr")?;
    mgr.run_batch()?;

    Ok(())
}
