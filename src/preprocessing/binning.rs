//! Equal-frequency and fixed-edge binning of numeric columns.
//!
//! Missing values (`None`) stay missing. Bins are right-closed: a value `v` falls in
//! bin `i` when `edges[i] < v <= edges[i + 1]`.

use crate::error::{Error, Result};

/// What to do when quantile edges coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateEdges {
    /// Fail with an error naming the column.
    Raise,
    /// Collapse equal edges, producing fewer bins.
    Drop,
}

/// Quantile `q` in `[0, 1]` of sorted data with linear interpolation between the two
/// nearest ranks. `None` for empty data.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let idx = (q.clamp(0.0, 1.0) * last as f64).min(last as f64);
    let lower = idx.floor() as usize;
    let upper = (lower + 1).min(last);
    let frac = idx - lower as f64;

    if frac == 0.0 {
        Some(sorted[lower])
    } else {
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
    }
}

/// `n_bins + 1` edges splitting `values` into equal-frequency bins.
///
/// `None` when `values` is empty or `n_bins` is zero.
pub fn quantile_edges(values: &[f64], n_bins: usize) -> Option<Vec<f64>> {
    if n_bins == 0 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    (0..=n_bins)
        .map(|i| quantile(&sorted, i as f64 / n_bins as f64))
        .collect()
}

/// Assign each value to one of `n_bins` equal-frequency bins.
///
/// The lowest edge is included in the first bin. Returns bin indices; with
/// [`DuplicateEdges::Drop`] fewer than `n_bins` distinct indices may occur.
pub fn qcut(
    values: &[Option<f64>],
    n_bins: usize,
    duplicates: DuplicateEdges,
    column: &str,
) -> Result<Vec<Option<usize>>> {
    if n_bins == 0 {
        return Err(Error::InvalidParameter(format!(
            "'{column}': number of bins must be positive"
        )));
    }
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(mut edges) = quantile_edges(&present, n_bins) else {
        return Ok(vec![None; values.len()]);
    };
    let unique = {
        let mut e = edges.clone();
        e.dedup();
        e
    };
    if unique.len() != edges.len() {
        match duplicates {
            DuplicateEdges::Raise => {
                return Err(Error::InvalidParameter(format!(
                    "quantile bin edges of '{column}' are not unique: {edges:?}"
                )))
            }
            DuplicateEdges::Drop => edges = unique,
        }
    }

    Ok(cut(values, &edges, true))
}

/// Assign each value to the bin delimited by `edges` (ascending).
///
/// Values outside the edges, or equal to the lowest edge when `include_lowest` is
/// false, are `None`.
pub fn cut(values: &[Option<f64>], edges: &[f64], include_lowest: bool) -> Vec<Option<usize>> {
    values
        .iter()
        .map(|v| v.and_then(|v| assign_bin(v, edges, include_lowest)))
        .collect()
}

fn assign_bin(value: f64, edges: &[f64], include_lowest: bool) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || value.is_nan() || value < first || value > last {
        return None;
    }
    if value == first {
        return include_lowest.then_some(0);
    }
    // first edge >= value; value lies in (edges[idx - 1], edges[idx]]
    let idx = edges.partition_point(|&e| e < value);
    Some(idx - 1)
}
