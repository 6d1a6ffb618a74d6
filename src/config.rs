//! Settings for the `train` and `prepare` stages.
//!
//! Defaults follow the fixed `data/` and `models/` layout. A TOML file can override
//! any subset of fields; the binaries apply command-line flags on top of that.

use crate::dataset::split::SplitConfig;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Numeric columns of the feature-engineered Kickstarter table used by default.
pub const DEFAULT_FEATURES: [&str; 7] = [
    "usd_goal_real",
    "backers",
    "duration_days",
    "launched_year",
    "launched_month",
    "goal_per_category",
    "pledged_per_category",
];

/// Settings for the Trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Input table with a header row.
    pub dataset: PathBuf,
    /// Target column.
    pub target: String,
    /// Feature columns in model order. Empty means every column except the target.
    pub features: Vec<String>,
    /// Fraction of rows held out for testing, in `(0, 1)`.
    pub test_size: f64,
    pub seed: u64,
    pub shuffle: bool,
    /// Ridge penalty on the coefficients; `0.0` is plain least squares.
    pub l2: f64,
    pub fit_intercept: bool,
    /// Drop rows with empty or non-numeric cells instead of failing.
    pub skip_incomplete_rows: bool,
    pub model_out: PathBuf,
    pub x_test_out: PathBuf,
    pub y_test_out: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/feature/kickstarter_featured.csv"),
            target: "usd_pledged_real".to_string(),
            features: DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect(),
            test_size: 0.2,
            seed: 42,
            shuffle: true,
            l2: 0.0,
            fit_intercept: true,
            skip_incomplete_rows: false,
            model_out: PathBuf::from("models/linear_regression_model.sav"),
            x_test_out: PathBuf::from("data/X_test.csv"),
            y_test_out: PathBuf::from("data/y_test.csv"),
        }
    }
}

impl TrainConfig {
    /// Split settings carried by this config.
    pub fn split(&self) -> SplitConfig {
        SplitConfig {
            test_size: self.test_size,
            seed: self.seed,
            shuffle: self.shuffle,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.split().validate()?;
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "l2 must be a non-negative number, got {}",
                self.l2
            )));
        }
        if self.target.trim().is_empty() {
            return Err(Error::InvalidParameter("target column is empty".into()));
        }
        if self.features.iter().any(|f| f == &self.target) {
            return Err(Error::InvalidParameter(format!(
                "target '{}' is also listed as a feature",
                self.target
            )));
        }
        Ok(())
    }
}

/// Settings for the data preparation stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepareConfig {
    /// Raw Kickstarter dump.
    pub raw: PathBuf,
    /// Directory receiving the two cleaned tables.
    pub cleaned_dir: PathBuf,
    /// Feature-engineered output table.
    pub featured: PathBuf,
    /// States kept in the main cleaned table.
    pub main_states: Vec<String>,
    /// Extra state kept in the "with cancelled" table.
    pub cancelled_state: String,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("data/raw/ks-projects-201801.csv"),
            cleaned_dir: PathBuf::from("data/cleaned"),
            featured: PathBuf::from("data/feature/kickstarter_featured.csv"),
            main_states: vec!["successful".to_string(), "failed".to_string()],
            cancelled_state: "canceled".to_string(),
        }
    }
}

impl PrepareConfig {
    /// Cleaned table restricted to the main states.
    pub fn cleaned_main(&self) -> PathBuf {
        self.cleaned_dir.join(crate::preprocessing::clean::CLEANED_MAIN_FILE)
    }

    /// Cleaned table that also keeps the cancelled state.
    pub fn cleaned_with_cancelled(&self) -> PathBuf {
        self.cleaned_dir
            .join(crate::preprocessing::clean::CLEANED_WITH_CANCELLED_FILE)
    }
}

/// Load a TOML config file; fields absent from the file keep their defaults.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    toml::from_str(&text).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_train_defaults_follow_path_convention() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.model_out, PathBuf::from("models/linear_regression_model.sav"));
        assert_eq!(cfg.x_test_out, PathBuf::from("data/X_test.csv"));
        assert_eq!(cfg.y_test_out, PathBuf::from("data/y_test.csv"));
        assert_eq!(cfg.features.len(), DEFAULT_FEATURES.len());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "target = \"y\"\nfeatures = []\ntest_size = 0.25").unwrap();

        let cfg: TrainConfig = load(file.path()).unwrap();
        assert_eq!(cfg.target, "y");
        assert!(cfg.features.is_empty());
        assert_eq!(cfg.test_size, 0.25);
        assert_eq!(cfg.seed, 42);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "learning_rate = 0.1").unwrap();

        let err = load::<TrainConfig>(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = TrainConfig {
            l2: -1.0,
            ..TrainConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = TrainConfig {
            test_size: 1.0,
            ..TrainConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = TrainConfig {
            features: vec!["usd_pledged_real".into()],
            ..TrainConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_prepare_paths() {
        let cfg = PrepareConfig::default();
        assert_eq!(
            cfg.cleaned_main(),
            PathBuf::from("data/cleaned/kickstarter_cleaned.csv")
        );
        assert_eq!(
            cfg.cleaned_with_cancelled(),
            PathBuf::from("data/cleaned/kickstarter_cleaned_with_cancelled.csv")
        );
    }
}
