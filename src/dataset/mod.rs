//! Tabular data for the pipeline.
//!
//! # Core Concepts
//!
//! - [`RawTable`]: header plus string cells, as read from a delimited file. Used by
//!   the preparation stages where columns mix text, dates and numbers.
//! - [`InMemoryDataset`]: named numeric feature matrix of shape `(n_samples, n_features)`
//!   and a named target vector of shape `(n_samples,)`.
//! - [`split::train_test_split`]: seeded, disjoint train/test partitions.
//!
//! # Example
//!
//! ```rust
//! use kickstarter_regression::dataset::{InMemoryDataset, RawTable};
//!
//! let table = RawTable::new(
//!     vec!["goal".into(), "pledged".into()],
//!     vec![vec!["100".into(), "50".into()], vec!["200".into(), "250".into()]],
//! )
//! .unwrap();
//! let dataset = InMemoryDataset::from_table(&table, "pledged", &[], false).unwrap();
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.feature_names(), ["goal"]);
//! ```

pub mod io;
pub mod memory;
pub mod split;
pub mod table;

pub use self::io::{read_features, read_targets, write_features, write_targets};
pub use self::memory::InMemoryDataset;
pub use self::split::{split_indices, train_test_split, SplitConfig, SplitIndices, TrainTestSplit};
pub use self::table::RawTable;
