pub mod linear;
pub mod state;

pub use state::{Fitted, Unfitted};

use crate::dataset::io::ensure_parent_dir;
use crate::error::{Error, Result};
use crate::serialization::SerializableParams;
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::path::Path;
use tracing::debug;

/// Prediction and persistence interface of a trained model.
pub trait InferenceModel: Sized {
    /// Plain-data representation written to disk.
    type ParamsRepr: SerializableParams;

    /// Predict one sample.
    fn predict(&self, input: ArrayView1<'_, f64>) -> Result<f64>;

    /// Predict every row of `input`.
    fn predict_batch(&self, input: ArrayView2<'_, f64>) -> Result<Array1<f64>>;

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> Result<Self>;

    /// Write the model to `path`, creating parent directories as needed.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.extract_params().to_bytes()?;
        ensure_parent_dir(path)?;
        std::fs::write(path, &bytes).map_err(|e| Error::io(path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "model saved");
        Ok(())
    }

    fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let params = Self::ParamsRepr::from_bytes(&bytes)?;
        Self::from_params(params)
    }
}
