//! Error type shared by every stage of the pipeline.

use std::path::{Path, PathBuf};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while preparing data, training or evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening, reading or writing a file failed.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited file itself is malformed (ragged rows, bad quoting).
    #[error("CSV error in {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A cell that must be numeric could not be parsed.
    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    /// A column required by the current stage is absent from the header.
    #[error("column '{0}' not found")]
    MissingColumn(String),

    /// Empty data provided where non-empty was required.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// Shape mismatch between expected and actual dimensions.
    #[error("invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },

    /// The feature columns handed to a model differ from those it was fitted on.
    #[error("feature mismatch: model expects [{}], got [{}]", expected.join(", "), got.join(", "))]
    FeatureMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    /// The normal equations have no unique solution.
    #[error("design matrix is singular or ill-conditioned at column {column}; try a positive l2 penalty")]
    SingularMatrix { column: usize },

    /// Invalid hyperparameter or configuration value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Serialization or deserialization of a model file failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The model file was written by an incompatible version.
    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    /// A configuration file could not be parsed.
    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        // Surface plain I/O failures (missing file, permissions) as such.
        if let csv::ErrorKind::Io(io) = source.kind() {
            return Error::io(path, std::io::Error::new(io.kind(), io.to_string()));
        }
        Error::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True when the error is a missing input file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
