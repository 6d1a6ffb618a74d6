//! Ordinary least squares with an optional ridge penalty.
//!
//! This module implements a linear model with compile-time state tracking:
//! - [`LinearRegression`] = `LinearModel<Unfitted>`: holds fitting options only.
//! - [`LinearModel<Fitted>`]: coefficients, intercept and the feature schema;
//!   predicts and serializes.
//!
//! Fitting solves the centred normal equations
//!
//! ```text
//! (Xcᵀ Xc + α I) w = Xcᵀ yc        b = ȳ - x̄ · w
//! ```
//!
//! after scaling each column of `Xc` to unit norm, which keeps the Cholesky
//! factorisation well conditioned when features live on very different scales
//! (pledge amounts next to month numbers). The scaling is undone on the solution,
//! so the penalty still applies to the unscaled coefficients.

use crate::dataset::InMemoryDataset;
use crate::error::{Error, Result};
use crate::linalg::solve_spd;
pub use crate::model::{Fitted, InferenceModel, Unfitted};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trained parameters of a linear model: one coefficient per feature and an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

/// Serializable representation of a fitted linear model.
///
/// Stores `f64` values unchanged, so a save/load cycle is bit-for-bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// A linear model with its state encoded at the type level.
///
/// You cannot call `predict()` on an untrained model; [`LinearModel::fit`] consumes the
/// unfitted model and returns a fitted one.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel<S> {
    state: S,
}

/// Alias for an **unfitted** linear regression model.
pub type LinearRegression = LinearModel<Unfitted>;

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Plain least squares with an intercept.
    pub fn new() -> Self {
        Self {
            state: Unfitted::default(),
        }
    }

    /// Ridge penalty `α ≥ 0` on the coefficients (the intercept is never penalised).
    pub fn l2(mut self, alpha: f64) -> Self {
        self.state.l2 = alpha;
        self
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.state.fit_intercept = fit_intercept;
        self
    }

    /// Fit on every row of `dataset`.
    ///
    /// # Errors
    /// - [`Error::InvalidParameter`] for a negative or non-finite penalty
    /// - [`Error::SingularMatrix`] when the features are collinear (or there are fewer
    ///   rows than features) and no penalty is set
    pub fn fit(self, dataset: &InMemoryDataset) -> Result<LinearModel<Fitted>> {
        let Unfitted { l2, fit_intercept } = self.state;
        if !(l2.is_finite() && l2 >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "l2 must be a non-negative number, got {l2}"
            )));
        }

        let x = dataset.features();
        let y = dataset.targets();
        let n_features = x.ncols();

        let (x_mean, y_mean) = if fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or_else(|| Error::EmptyData("cannot fit on zero rows".into()))?;
            let y_mean = y
                .mean()
                .ok_or_else(|| Error::EmptyData("cannot fit on zero rows".into()))?;
            (x_mean, y_mean)
        } else {
            (Array1::zeros(n_features), 0.0)
        };
        let xc = x - &x_mean;
        let yc = y - y_mean;

        let gram = xc.t().dot(&xc);
        let rhs = xc.t().dot(&yc);

        let scale: Array1<f64> = gram
            .diag()
            .mapv(|d| if d > 0.0 { d.sqrt() } else { 1.0 });
        let system = Array2::from_shape_fn((n_features, n_features), |(i, j)| {
            let ridge = if i == j { l2 } else { 0.0 };
            (gram[[i, j]] + ridge) / (scale[i] * scale[j])
        });
        let scaled_rhs = &rhs / &scale;

        let solution = solve_spd(&system, &scaled_rhs)?;
        let coefficients = &solution / &scale;
        let intercept = if fit_intercept {
            y_mean - x_mean.dot(&coefficients)
        } else {
            0.0
        };
        debug!(?coefficients, intercept, "least squares solved");

        Ok(LinearModel {
            state: Fitted {
                params: LinearParams {
                    coefficients,
                    intercept,
                },
                feature_names: dataset.feature_names().to_vec(),
                target_name: dataset.target_name().to_string(),
            },
        })
    }
}

impl LinearModel<Fitted> {
    /// Build a fitted model from known parameters.
    pub fn new(
        params: LinearParams,
        feature_names: Vec<String>,
        target_name: impl Into<String>,
    ) -> Result<Self> {
        if params.coefficients.len() != feature_names.len() {
            return Err(Error::InvalidShape {
                expected: format!("{} coefficients", feature_names.len()),
                got: params.coefficients.len().to_string(),
            });
        }
        Ok(Self {
            state: Fitted {
                params,
                feature_names,
                target_name: target_name.into(),
            },
        })
    }

    pub fn params(&self) -> &LinearParams {
        &self.state.params
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.state.params.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.state.params.intercept
    }

    /// Feature names in the order the coefficients expect them.
    pub fn feature_names(&self) -> &[String] {
        &self.state.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.state.target_name
    }

    pub fn n_features(&self) -> usize {
        self.state.feature_names.len()
    }

    /// Require `names` to equal the fitted feature names, in the same order.
    pub fn check_features(&self, names: &[String]) -> Result<()> {
        if names == self.feature_names() {
            Ok(())
        } else {
            Err(Error::FeatureMismatch {
                expected: self.state.feature_names.clone(),
                got: names.to_vec(),
            })
        }
    }
}

/// Inference for a trained linear model: `y = wᵀx + b`.
impl InferenceModel for LinearModel<Fitted> {
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: ArrayView1<'_, f64>) -> Result<f64> {
        if input.len() != self.n_features() {
            return Err(Error::InvalidShape {
                expected: format!("{} features", self.n_features()),
                got: input.len().to_string(),
            });
        }
        Ok(input.dot(self.coefficients()) + self.intercept())
    }

    fn predict_batch(&self, input: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if input.ncols() != self.n_features() {
            return Err(Error::InvalidShape {
                expected: format!("(_, {})", self.n_features()),
                got: format!("{:?}", input.dim()),
            });
        }
        Ok(input.dot(self.coefficients()) + self.intercept())
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        SerializableLinearParams {
            feature_names: self.state.feature_names.clone(),
            target_name: self.state.target_name.clone(),
            coefficients: self.state.params.coefficients.to_vec(),
            intercept: self.state.params.intercept,
        }
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self> {
        Self::new(
            LinearParams {
                coefficients: Array1::from(params.coefficients),
                intercept: params.intercept,
            },
            params.feature_names,
            params.target_name,
        )
    }
}
