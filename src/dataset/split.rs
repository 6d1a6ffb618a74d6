//! Seeded train/test partitioning.
//!
//! The test partition size is `ceil(test_size * n)`. With shuffling enabled the rows
//! are permuted by a `StdRng` seeded from [`SplitConfig::seed`]; the first `n_test`
//! permuted indices form the test partition and the rest the training partition.
//! Without shuffling the tail of the dataset is held out.

use crate::dataset::memory::InMemoryDataset;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing, in `(0, 1)`.
    pub test_size: f64,
    pub seed: u64,
    pub shuffle: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            shuffle: true,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "test_size must be between 0 and 1, got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Row indices of both partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Both partitions of a dataset together with the indices that produced them.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: InMemoryDataset,
    pub test: InMemoryDataset,
    pub indices: SplitIndices,
}

pub fn split_indices(n_samples: usize, config: &SplitConfig) -> Result<SplitIndices> {
    config.validate()?;

    let n_test = (config.test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(Error::InvalidParameter(format!(
            "split of {n_samples} rows would leave an empty partition (n_train={n_train}, n_test={n_test})"
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    if config.shuffle {
        let mut rng = StdRng::seed_from_u64(config.seed);
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        Ok(SplitIndices {
            train,
            test: indices,
        })
    } else {
        let test = indices.split_off(n_train);
        Ok(SplitIndices {
            train: indices,
            test,
        })
    }
}

pub fn train_test_split(dataset: &InMemoryDataset, config: &SplitConfig) -> Result<TrainTestSplit> {
    let indices = split_indices(dataset.len(), config)?;
    Ok(TrainTestSplit {
        train: dataset.select_rows(&indices.train)?,
        test: dataset.select_rows(&indices.test)?,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::collections::HashSet;

    fn dataset(n: usize) -> InMemoryDataset {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| i as f64);
        InMemoryDataset::new(vec!["a".into(), "b".into()], "y", x, y).unwrap()
    }

    #[test]
    fn test_split_sizes_80_20() {
        let idx = split_indices(100, &SplitConfig::default()).unwrap();
        assert_eq!(idx.test.len(), 20);
        assert_eq!(idx.train.len(), 80);
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let cfg = SplitConfig {
            test_size: 0.25,
            ..SplitConfig::default()
        };
        let idx = split_indices(10, &cfg).unwrap();
        assert_eq!(idx.test.len(), 3);
        assert_eq!(idx.train.len(), 7);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let idx = split_indices(57, &SplitConfig::default()).unwrap();
        let train: HashSet<_> = idx.train.iter().copied().collect();
        let test: HashSet<_> = idx.test.iter().copied().collect();

        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 57);
        assert!((0..57).all(|i| train.contains(&i) || test.contains(&i)));
    }

    #[test]
    fn test_split_reproducible_with_seed() {
        let cfg = SplitConfig::default();
        assert_eq!(split_indices(100, &cfg).unwrap(), split_indices(100, &cfg).unwrap());

        let other = SplitConfig { seed: 7, ..cfg };
        assert_ne!(split_indices(100, &cfg).unwrap(), split_indices(100, &other).unwrap());
    }

    #[test]
    fn test_split_without_shuffle_holds_out_tail() {
        let cfg = SplitConfig {
            shuffle: false,
            ..SplitConfig::default()
        };
        let idx = split_indices(10, &cfg).unwrap();
        assert_eq!(idx.train, (0..8).collect::<Vec<_>>());
        assert_eq!(idx.test, vec![8, 9]);
    }

    #[test]
    fn test_split_rejects_degenerate_partitions() {
        assert!(split_indices(1, &SplitConfig::default()).is_err());
        assert!(split_indices(0, &SplitConfig::default()).is_err());
        let cfg = SplitConfig {
            test_size: 0.0,
            ..SplitConfig::default()
        };
        assert!(split_indices(10, &cfg).is_err());
    }

    #[test]
    fn test_train_test_split_rows_follow_indices() {
        let ds = dataset(10);
        let split = train_test_split(&ds, &SplitConfig::default()).unwrap();

        assert_eq!(split.train.len() + split.test.len(), 10);
        for (pos, &row) in split.indices.test.iter().enumerate() {
            assert_eq!(split.test.targets()[pos], row as f64);
            assert_eq!(split.test.features()[[pos, 0]], (row * 2) as f64);
        }
    }
}
