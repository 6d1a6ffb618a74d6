//! Clean the raw Kickstarter dump and build the feature-engineered table.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kickstarter_regression::config::{self, PrepareConfig};
use kickstarter_regression::logging;
use kickstarter_regression::preprocessing::{prepare_clean, prepare_features};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Raw dump to the two cleaned tables
    Clean,
    /// Cleaned table to the feature table, cleaning first if needed
    Features,
    /// Both stages in order
    All,
}

#[derive(Parser, Debug)]
#[command(name = "prepare")]
#[command(about = "Clean the raw Kickstarter data and engineer features", version)]
struct Args {
    #[arg(value_enum)]
    stage: Stage,

    /// TOML file with preparation settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw Kickstarter CSV
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Directory for the cleaned tables
    #[arg(long)]
    cleaned_dir: Option<PathBuf>,

    /// Output path of the feature table
    #[arg(long)]
    featured: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut cfg = match &args.config {
        Some(path) => config::load::<PrepareConfig>(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PrepareConfig::default(),
    };
    if let Some(raw) = args.raw {
        cfg.raw = raw;
    }
    if let Some(dir) = args.cleaned_dir {
        cfg.cleaned_dir = dir;
    }
    if let Some(featured) = args.featured {
        cfg.featured = featured;
    }

    if matches!(args.stage, Stage::Clean | Stage::All) {
        let cleaned = prepare_clean(&cfg)
            .with_context(|| format!("cleaning {} failed", cfg.raw.display()))?;
        info!(
            main = cleaned.main.len(),
            with_cancelled = cleaned.with_cancelled.len(),
            "cleaning complete"
        );
    }
    if matches!(args.stage, Stage::Features | Stage::All) {
        let featured = prepare_features(&cfg).context("feature engineering failed")?;
        info!(rows = featured.len(), "feature engineering complete");
    }
    Ok(())
}
