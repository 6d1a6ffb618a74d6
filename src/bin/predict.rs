//! Evaluate a saved model on the saved test partition and print the error metrics.

use anyhow::{Context, Result};
use clap::Parser;
use kickstarter_regression::{logging, Metric, Predictor};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "predict")]
#[command(about = "Score a saved linear regression model on X_test/y_test", version)]
struct Args {
    /// Model file written by `train`
    model: PathBuf,

    /// Test features with a header row
    x_test: PathBuf,

    /// Test targets with a header row
    y_test: PathBuf,

    /// Print only this metric
    #[arg(long, value_enum)]
    metric: Option<Metric>,

    /// Print metrics and predictions as JSON
    #[arg(long, conflicts_with = "metric")]
    json: bool,

    /// Debug logging, including every prediction
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let predictor = Predictor::from_files(&args.model, &args.x_test, &args.y_test)
        .context("failed to load the model and test partition")?;
    let report = predictor.evaluate().context("evaluation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(metric) = args.metric {
        println!("{}", report.metrics.get(metric));
    } else {
        println!("{}", report.metrics);
    }
    Ok(())
}
