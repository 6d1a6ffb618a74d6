//! # kickstarter-regression
//!
//! Fit and evaluate a linear regression on the Kickstarter projects dataset.
//!
//! The crate is a small pipeline connected through files on disk:
//!
//! 1. `prepare` turns the raw Kickstarter dump into a cleaned and then a
//!    feature-engineered CSV ([`preprocessing`]).
//! 2. `train` reads a numeric dataset, splits it with a fixed seed, fits an
//!    ordinary-least-squares model and writes the model plus the held-out test
//!    partition ([`trainer`]).
//! 3. `predict` reloads the model and the test partition and reports the
//!    regression error ([`predictor`]).
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: models carry their training state in the type system
//!   (`Unfitted` vs `Fitted`); only fitted models can predict or be saved.
//! - **Schema Awareness**: a fitted model remembers the ordered feature names it was
//!   fitted on and refuses inputs with a different schema.
//! - **Reproducibility**: the train/test split is fully determined by the seed.
//!
//! ## Quick Start
//!
//! ```rust
//! use kickstarter_regression::dataset::InMemoryDataset;
//! use kickstarter_regression::model::linear::LinearRegression;
//! use ndarray::array;
//!
//! let x = array![[0.0], [1.0], [2.0], [3.0]];
//! let y = array![1.0, 3.0, 5.0, 7.0];
//! let dataset = InMemoryDataset::new(vec!["x".into()], "y", x, y).unwrap();
//!
//! let fitted = LinearRegression::new().fit(&dataset).unwrap();
//! assert!((fitted.coefficients()[0] - 2.0).abs() < 1e-9);
//! assert!((fitted.intercept() - 1.0).abs() < 1e-9);
//! ```

/// Training and preparation settings with file-based overrides.
pub mod config;

/// Tabular data loading, numeric datasets and train/test splitting.
pub mod dataset;

/// Crate-wide error type.
pub mod error;

mod linalg;

/// Tracing subscriber setup for the binaries.
pub mod logging;

/// Regression error metrics.
pub mod metrics;

/// Linear models with compile-time state safety.
pub mod model;

/// Evaluation of a persisted model on a persisted test partition.
pub mod predictor;

/// Cleaning and feature engineering of the raw Kickstarter dump.
pub mod preprocessing;

/// Versioned binary persistence of fitted parameters.
pub mod serialization;

/// Split, fit and persist.
pub mod trainer;

pub use error::{Error, Result};
pub use metrics::{Metric, Metrics, RegressionMetrics};
pub use model::linear::{LinearModel, LinearRegression};
pub use model::{Fitted, InferenceModel, Unfitted};
pub use predictor::{PredictReport, Predictor};
pub use trainer::{TrainReport, Trainer};
