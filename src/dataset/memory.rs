use crate::dataset::io::parse_cell;
use crate::dataset::table::RawTable;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use std::path::Path;
use tracing::{debug, info};

/// Numeric dataset held fully in memory.
///
/// Feature columns are named and ordered; the order is the order the model sees.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryDataset {
    feature_names: Vec<String>,
    target_name: String,
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(
        feature_names: Vec<String>,
        target_name: impl Into<String>,
        x: Array2<f64>,
        y: Array1<f64>,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(Error::InvalidShape {
                expected: format!("{} targets", x.nrows()),
                got: y.len().to_string(),
            });
        }
        if x.ncols() != feature_names.len() {
            return Err(Error::InvalidShape {
                expected: format!("{} feature columns", feature_names.len()),
                got: x.ncols().to_string(),
            });
        }
        if x.nrows() == 0 {
            return Err(Error::EmptyData("dataset has no rows".into()));
        }
        if feature_names.is_empty() {
            return Err(Error::EmptyData("dataset has no feature columns".into()));
        }
        Ok(Self {
            feature_names,
            target_name: target_name.into(),
            x,
            y,
        })
    }

    /// Select and parse numeric columns from a raw table.
    ///
    /// An empty `features` slice selects every column except `target`.
    /// With `skip_incomplete`, rows holding an empty or non-numeric selected cell are
    /// dropped; otherwise the first such cell is an error.
    pub fn from_table(
        table: &RawTable,
        target: &str,
        features: &[String],
        skip_incomplete: bool,
    ) -> Result<Self> {
        let target_idx = table.column_index(target)?;
        let feature_names: Vec<String> = if features.is_empty() {
            table
                .headers()
                .iter()
                .filter(|h| h.as_str() != target)
                .cloned()
                .collect()
        } else {
            features.to_vec()
        };
        if feature_names.iter().any(|f| f == target) {
            return Err(Error::InvalidParameter(format!(
                "target '{target}' is also listed as a feature"
            )));
        }
        let feature_idx = feature_names
            .iter()
            .map(|f| table.column_index(f))
            .collect::<Result<Vec<usize>>>()?;

        let n_features = feature_idx.len();
        let mut data = Vec::with_capacity(table.len() * n_features);
        let mut targets = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for (i, row) in table.rows().iter().enumerate() {
            let parsed = parse_row(row, i + 1, target_idx, target, &feature_idx, &feature_names);
            match parsed {
                Ok((values, y)) => {
                    data.extend(values);
                    targets.push(y);
                }
                Err(err) if skip_incomplete => {
                    debug!("skipping row: {err}");
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        if skipped > 0 {
            info!(skipped, kept = targets.len(), "dropped incomplete rows");
        }

        let n_rows = targets.len();
        let x = Array2::from_shape_vec((n_rows, n_features), data).map_err(|e| {
            Error::InvalidShape {
                expected: format!("({n_rows}, {n_features})"),
                got: e.to_string(),
            }
        })?;
        Self::new(feature_names, target, x, Array1::from(targets))
    }

    /// Read a CSV file and select its numeric columns, see [`Self::from_table`].
    pub fn read_csv(
        path: impl AsRef<Path>,
        target: &str,
        features: &[String],
        skip_incomplete: bool,
    ) -> Result<Self> {
        let table = RawTable::read_csv(path)?;
        Self::from_table(&table, target, features, skip_incomplete)
    }

    /// Rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(Error::InvalidParameter(format!(
                "row index {bad} out of bounds for {} rows",
                self.len()
            )));
        }
        Self::new(
            self.feature_names.clone(),
            self.target_name.clone(),
            self.x.select(Axis(0), indices),
            self.y.select(Axis(0), indices),
        )
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Feature matrix of shape `(n_samples, n_features)`.
    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    /// Target vector of shape `(n_samples,)`.
    pub fn targets(&self) -> &Array1<f64> {
        &self.y
    }
}

fn parse_row(
    row: &[String],
    row_no: usize,
    target_idx: usize,
    target: &str,
    feature_idx: &[usize],
    feature_names: &[String],
) -> Result<(Vec<f64>, f64)> {
    let values = feature_idx
        .iter()
        .zip(feature_names)
        .map(|(&idx, name)| parse_cell(&row[idx], row_no, name))
        .collect::<Result<Vec<f64>>>()?;
    let y = parse_cell(&row[target_idx], row_no, target)?;
    Ok((values, y))
}
