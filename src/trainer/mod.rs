//! The Trainer: split a dataset, fit a linear model on the training partition and
//! persist the model together with the held-out test partition.
//!
//! ```no_run
//! use kickstarter_regression::config::TrainConfig;
//! use kickstarter_regression::trainer::Trainer;
//!
//! let report = Trainer::run(&TrainConfig::default())?;
//! println!("test rows written: {}", report.n_test);
//! # Ok::<(), kickstarter_regression::Error>(())
//! ```

use crate::config::TrainConfig;
use crate::dataset::{self, train_test_split, InMemoryDataset, SplitConfig, TrainTestSplit};
use crate::error::Result;
use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::linear::{LinearModel, LinearRegression};
use crate::model::{Fitted, InferenceModel};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fits linear models on a seeded training partition.
///
/// Once built via [`TrainerBuilder`] it is immutable and can be reused across datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct Trainer {
    split: SplitConfig,
    l2: f64,
    fit_intercept: bool,
}

/// Fluent builder for a [`Trainer`].
///
/// Defaults: `test_size` 0.2, `seed` 42, shuffling on, no penalty, intercept fitted.
#[derive(Debug, Clone)]
pub struct TrainerBuilder {
    split: SplitConfig,
    l2: f64,
    fit_intercept: bool,
}

impl Default for TrainerBuilder {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            l2: 0.0,
            fit_intercept: true,
        }
    }
}

impl TrainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_size(mut self, test_size: f64) -> Self {
        self.split.test_size = test_size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.split.seed = seed;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.split.shuffle = shuffle;
        self
    }

    pub fn l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn build(self) -> Result<Trainer> {
        self.split.validate()?;
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(crate::Error::InvalidParameter(format!(
                "l2 must be a non-negative number, got {}",
                self.l2
            )));
        }
        Ok(Trainer {
            split: self.split,
            l2: self.l2,
            fit_intercept: self.fit_intercept,
        })
    }
}

/// Everything produced by [`Trainer::fit`].
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model: LinearModel<Fitted>,
    pub split: TrainTestSplit,
    /// Metrics of the fitted model on its own training partition.
    pub train_metrics: RegressionMetrics,
}

/// Summary of a [`Trainer::run`], also logged and printed by the `train` binary.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub n_samples: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub target: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub train_metrics: RegressionMetrics,
    pub model_path: PathBuf,
    pub x_test_path: PathBuf,
    pub y_test_path: PathBuf,
}

impl Trainer {
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::new()
    }

    pub fn from_config(config: &TrainConfig) -> Result<Self> {
        Self::builder()
            .test_size(config.test_size)
            .seed(config.seed)
            .shuffle(config.shuffle)
            .l2(config.l2)
            .fit_intercept(config.fit_intercept)
            .build()
    }

    pub fn split_config(&self) -> &SplitConfig {
        &self.split
    }

    /// Split `dataset` and fit on the training partition.
    pub fn fit(&self, dataset: &InMemoryDataset) -> Result<TrainOutcome> {
        let split = train_test_split(dataset, &self.split)?;
        info!(
            n_train = split.train.len(),
            n_test = split.test.len(),
            seed = self.split.seed,
            "dataset split"
        );

        let model = LinearRegression::new()
            .l2(self.l2)
            .fit_intercept(self.fit_intercept)
            .fit(&split.train)?;

        let train_pred = model.predict_batch(split.train.features().view())?;
        let train_metrics =
            Metrics::calculate_all(&split.train.targets().to_vec(), &train_pred.to_vec())?;
        for (name, coef) in model.feature_names().iter().zip(model.coefficients()) {
            debug!(feature = %name, coefficient = coef, "fitted coefficient");
        }
        info!(
            intercept = model.intercept(),
            train_mse = train_metrics.mse,
            train_r2 = train_metrics.r_squared,
            "model fitted"
        );

        Ok(TrainOutcome {
            model,
            split,
            train_metrics,
        })
    }

    /// Read the configured dataset, fit, and write the three artifacts.
    pub fn run(config: &TrainConfig) -> Result<TrainReport> {
        config.validate()?;
        let trainer = Self::from_config(config)?;

        info!(path = %config.dataset.display(), target = %config.target, "loading dataset");
        let dataset = InMemoryDataset::read_csv(
            &config.dataset,
            &config.target,
            &config.features,
            config.skip_incomplete_rows,
        )?;
        info!(
            rows = dataset.len(),
            features = dataset.n_features(),
            "dataset loaded"
        );

        let outcome = trainer.fit(&dataset)?;
        write_artifacts(
            &outcome,
            &config.model_out,
            &config.x_test_out,
            &config.y_test_out,
        )?;

        Ok(TrainReport {
            n_samples: dataset.len(),
            n_train: outcome.split.train.len(),
            n_test: outcome.split.test.len(),
            target: dataset.target_name().to_string(),
            feature_names: outcome.model.feature_names().to_vec(),
            coefficients: outcome.model.coefficients().to_vec(),
            intercept: outcome.model.intercept(),
            train_metrics: outcome.train_metrics,
            model_path: config.model_out.clone(),
            x_test_path: config.x_test_out.clone(),
            y_test_path: config.y_test_out.clone(),
        })
    }
}

/// Write the fitted model and the test partition (features and targets, same row order).
pub fn write_artifacts(
    outcome: &TrainOutcome,
    model_path: &Path,
    x_test_path: &Path,
    y_test_path: &Path,
) -> Result<()> {
    outcome.model.save_to_file(model_path)?;
    let test = &outcome.split.test;
    dataset::write_features(x_test_path, test.feature_names(), test.features())?;
    dataset::write_targets(y_test_path, test.target_name(), test.targets())?;
    info!(
        model = %model_path.display(),
        x_test = %x_test_path.display(),
        y_test = %y_test_path.display(),
        "artifacts written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2, Axis};

    fn linear_dataset(n: usize) -> InMemoryDataset {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                ((i * 13) % 7) as f64
            }
        });
        let y: Array1<f64> = x.map_axis(Axis(1), |r| 4.0 * r[0] - 2.0 * r[1] + 0.5);
        InMemoryDataset::new(vec!["a".into(), "b".into()], "y", x, y).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let trainer = Trainer::builder().build().unwrap();
        assert_eq!(trainer.split_config(), &SplitConfig::default());
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(Trainer::builder().test_size(1.5).build().is_err());
        assert!(Trainer::builder().l2(f64::NAN).build().is_err());
    }

    #[test]
    fn test_fit_recovers_exact_relation() {
        let outcome = Trainer::builder().build().unwrap().fit(&linear_dataset(40)).unwrap();

        assert_eq!(outcome.split.train.len(), 32);
        assert_eq!(outcome.split.test.len(), 8);
        assert_abs_diff_eq!(outcome.model.coefficients()[0], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.model.coefficients()[1], -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.model.intercept(), 0.5, epsilon = 1e-9);
        assert!(outcome.train_metrics.mse < 1e-12);
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let ds = linear_dataset(25);
        let trainer = Trainer::builder().seed(3).build().unwrap();
        let a = trainer.fit(&ds).unwrap();
        let b = trainer.fit(&ds).unwrap();
        assert_eq!(a.split.indices, b.split.indices);
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn test_write_artifacts_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = Trainer::builder().build().unwrap().fit(&linear_dataset(10)).unwrap();
        let model = dir.path().join("models/m.sav");
        let x = dir.path().join("data/X_test.csv");
        let y = dir.path().join("data/y_test.csv");

        write_artifacts(&outcome, &model, &x, &y).unwrap();

        assert!(model.exists());
        let (names, x_test) = dataset::read_features(&x).unwrap();
        let (target, y_test) = dataset::read_targets(&y).unwrap();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(target, "y");
        assert_eq!(&x_test, outcome.split.test.features());
        assert_eq!(&y_test, outcome.split.test.targets());
    }
}
