use crate::model::linear::LinearParams;

/// State of a linear model that is **not yet trained**.
///
/// Carries only the fitting hyperparameters. Prediction methods are not available
/// on `LinearModel<Unfitted>`, so an untrained model can never be used for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Unfitted {
    pub(crate) l2: f64,
    pub(crate) fit_intercept: bool,
}

impl Default for Unfitted {
    fn default() -> Self {
        Self {
            l2: 0.0,
            fit_intercept: true,
        }
    }
}

/// State of a linear model that has been **fully trained**.
///
/// Contains only inference parameters and the schema they apply to; no training
/// hyperparameters survive fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Fitted {
    pub(crate) params: LinearParams,
    pub(crate) feature_names: Vec<String>,
    pub(crate) target_name: String,
}
