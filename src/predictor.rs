//! The Predictor: reload a persisted model and its held-out test partition and
//! measure the prediction error.

use crate::dataset::{read_features, read_targets};
use crate::error::{Error, Result};
use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::linear::LinearModel;
use crate::model::{Fitted, InferenceModel};
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// A fitted model paired with a test partition whose schema it accepts.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: LinearModel<Fitted>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
}

/// Outcome of [`Predictor::evaluate`].
#[derive(Debug, Clone, Serialize)]
pub struct PredictReport {
    /// One prediction per test row, in file order.
    pub predictions: Vec<f64>,
    pub metrics: RegressionMetrics,
}

impl Predictor {
    /// Pair `model` with a test partition.
    ///
    /// `feature_names` must equal the model's feature names in order, and `x_test`
    /// and `y_test` must have the same number of rows.
    pub fn new(
        model: LinearModel<Fitted>,
        feature_names: &[String],
        x_test: Array2<f64>,
        y_test: Array1<f64>,
    ) -> Result<Self> {
        model.check_features(feature_names)?;
        if x_test.nrows() != y_test.len() {
            return Err(Error::InvalidShape {
                expected: format!("{} target values (one per X_test row)", x_test.nrows()),
                got: y_test.len().to_string(),
            });
        }
        if x_test.nrows() == 0 {
            return Err(Error::EmptyData("test partition has no rows".into()));
        }
        Ok(Self {
            model,
            x_test,
            y_test,
        })
    }

    /// Load the model file and the two test tables.
    pub fn from_files(
        model_path: impl AsRef<Path>,
        x_test_path: impl AsRef<Path>,
        y_test_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = LinearModel::<Fitted>::load_from_file(model_path)?;
        info!(
            path = %model_path.display(),
            features = model.n_features(),
            "model loaded"
        );

        let (feature_names, x_test) = read_features(x_test_path.as_ref())?;
        let (target_name, y_test) = read_targets(y_test_path.as_ref())?;
        if target_name != model.target_name() {
            warn!(
                model_target = model.target_name(),
                file_target = %target_name,
                "y_test column differs from the model's target"
            );
        }
        info!(rows = x_test.nrows(), "test partition loaded");

        Self::new(model, &feature_names, x_test, y_test)
    }

    pub fn model(&self) -> &LinearModel<Fitted> {
        &self.model
    }

    pub fn n_samples(&self) -> usize {
        self.x_test.nrows()
    }

    /// Predictions for every test row.
    pub fn predict(&self) -> Result<Array1<f64>> {
        let predictions = self.model.predict_batch(self.x_test.view())?;
        for (row, p) in predictions.iter().enumerate() {
            debug!(row, prediction = p, "predicted");
        }
        Ok(predictions)
    }

    /// Predict and score against `y_test`.
    pub fn evaluate(&self) -> Result<PredictReport> {
        let predictions = self.predict()?.to_vec();
        let metrics = Metrics::calculate_all(&self.y_test.to_vec(), &predictions)?;
        info!(
            mse = metrics.mse,
            rmse = metrics.rmse,
            mae = metrics.mae,
            r2 = metrics.r_squared,
            "evaluation finished"
        );
        Ok(PredictReport {
            predictions,
            metrics,
        })
    }
}
