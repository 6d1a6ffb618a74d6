//! Data preparation stages run before training.
//!
//! - [`clean`]: raw Kickstarter dump to the two cleaned tables.
//! - [`features`]: cleaned table to the feature-engineered table the Trainer reads.
//! - [`binning`]: the quantile and fixed-edge binning used by feature engineering.

pub mod binning;
pub mod clean;
pub mod features;

pub use clean::{clean_file, clean_kickstarter, CleanOptions, CleanedTables};
pub use features::{build_features, build_features_file};

use crate::config::PrepareConfig;
use crate::dataset::RawTable;
use crate::error::Result;

/// Run the cleaning stage with the paths of `config`.
pub fn prepare_clean(config: &PrepareConfig) -> Result<CleanedTables> {
    clean_file(&config.raw, &config.cleaned_dir, &CleanOptions::from(config))
}

/// Run feature engineering with the paths of `config`, cleaning first if needed.
pub fn prepare_features(config: &PrepareConfig) -> Result<RawTable> {
    build_features_file(
        config.cleaned_main(),
        &config.featured,
        &config.raw,
        &CleanOptions::from(config),
    )
}
