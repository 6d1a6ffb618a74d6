//! Fit the Kickstarter regression model and persist it with the held-out test partition.

use anyhow::{Context, Result};
use clap::Parser;
use kickstarter_regression::config::{self, TrainConfig};
use kickstarter_regression::{logging, Trainer};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Split the dataset, fit a linear regression and save model and test data", version)]
struct Args {
    /// TOML file with training settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input table with a header row
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Target column
    #[arg(long)]
    target: Option<String>,

    /// Comma-separated feature columns; pass "" to use every column except the target
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Fraction of rows held out for testing
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed of the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Hold out a shuffled sample (the default)
    #[arg(long, overrides_with = "no_shuffle")]
    shuffle: bool,

    /// Hold out the last rows instead of a shuffled sample
    #[arg(long, overrides_with = "shuffle")]
    no_shuffle: bool,

    /// Ridge penalty on the coefficients
    #[arg(long)]
    l2: Option<f64>,

    /// Fit an intercept (the default)
    #[arg(long, overrides_with = "no_intercept")]
    intercept: bool,

    /// Fit without an intercept
    #[arg(long, overrides_with = "intercept")]
    no_intercept: bool,

    /// Drop rows with empty or non-numeric cells instead of failing
    #[arg(long, overrides_with = "keep_incomplete_rows")]
    skip_incomplete_rows: bool,

    /// Fail on rows with empty or non-numeric cells (the default)
    #[arg(long, overrides_with = "skip_incomplete_rows")]
    keep_incomplete_rows: bool,

    #[arg(long)]
    model_out: Option<PathBuf>,

    #[arg(long)]
    x_test_out: Option<PathBuf>,

    #[arg(long)]
    y_test_out: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<TrainConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load::<TrainConfig>(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => TrainConfig::default(),
        };

        if let Some(dataset) = self.dataset {
            cfg.dataset = dataset;
        }
        if let Some(target) = self.target {
            cfg.target = target;
        }
        if let Some(features) = self.features {
            cfg.features = features
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if let Some(test_size) = self.test_size {
            cfg.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(shuffle) = switch(self.shuffle, self.no_shuffle) {
            cfg.shuffle = shuffle;
        }
        if let Some(l2) = self.l2 {
            cfg.l2 = l2;
        }
        if let Some(intercept) = switch(self.intercept, self.no_intercept) {
            cfg.fit_intercept = intercept;
        }
        if let Some(skip) = switch(self.skip_incomplete_rows, self.keep_incomplete_rows) {
            cfg.skip_incomplete_rows = skip;
        }
        if let Some(path) = self.model_out {
            cfg.model_out = path;
        }
        if let Some(path) = self.x_test_out {
            cfg.x_test_out = path;
        }
        if let Some(path) = self.y_test_out {
            cfg.y_test_out = path;
        }
        Ok(cfg)
    }
}

/// Value set by a `--x` / `--no-x` flag pair, if either was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let cfg = args.into_config()?;
    let report = Trainer::run(&cfg)
        .with_context(|| format!("training on {} failed", cfg.dataset.display()))?;

    info!(
        samples = report.n_samples,
        train = report.n_train,
        test = report.n_test,
        intercept = report.intercept,
        train_rmse = report.train_metrics.rmse,
        train_r2 = report.train_metrics.r_squared,
        "training complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_file(body: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(file.path(), body).unwrap();
        file
    }

    fn parse(file: &tempfile::NamedTempFile, flags: &[&str]) -> TrainConfig {
        let path = file.path().to_str().unwrap();
        Args::parse_from(["train", "--config", path].iter().chain(flags))
            .into_config()
            .unwrap()
    }

    #[test]
    fn test_flags_override_config_both_ways() {
        let file = config_file(
            "shuffle = false\nfit_intercept = false\nskip_incomplete_rows = true\n",
        );

        let cfg = parse(&file, &[]);
        assert!(!cfg.shuffle);
        assert!(!cfg.fit_intercept);
        assert!(cfg.skip_incomplete_rows);

        let cfg = parse(&file, &["--shuffle", "--intercept", "--keep-incomplete-rows"]);
        assert!(cfg.shuffle);
        assert!(cfg.fit_intercept);
        assert!(!cfg.skip_incomplete_rows);
    }

    #[test]
    fn test_last_flag_of_a_pair_wins() {
        let file = config_file("seed = 7\n");
        assert!(!parse(&file, &["--shuffle", "--no-shuffle"]).shuffle);
        assert!(parse(&file, &["--no-shuffle", "--shuffle"]).shuffle);
        assert!(!parse(&file, &["--intercept", "--no-intercept"]).fit_intercept);
    }

    #[test]
    fn test_defaults_without_flags_or_config() {
        let cfg = Args::parse_from(["train"]).into_config().unwrap();
        assert_eq!(cfg, TrainConfig::default());
    }
}
