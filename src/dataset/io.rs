//! Numeric CSV files exchanged between the Trainer and the Predictor.
//!
//! Both files carry a header row. Values are written with Rust's shortest
//! round-trip float formatting, so reading a file back reproduces every `f64`.

use crate::dataset::table::RawTable;
use crate::error::{Error, Result};
use csv::WriterBuilder;
use ndarray::{Array1, Array2};
use std::path::Path;

/// Read a feature table: header of feature names, one numeric row per sample.
pub fn read_features(path: impl AsRef<Path>) -> Result<(Vec<String>, Array2<f64>)> {
    let path = path.as_ref();
    let table = RawTable::read_csv(path)?;
    if table.is_empty() {
        return Err(Error::EmptyData(format!("{} has no rows", path.display())));
    }

    let n_cols = table.headers().len();
    let mut data = Vec::with_capacity(table.len() * n_cols);
    for (i, row) in table.rows().iter().enumerate() {
        for (value, column) in row.iter().zip(table.headers()) {
            data.push(parse_cell(value, i + 1, column)?);
        }
    }
    let x = Array2::from_shape_vec((table.len(), n_cols), data).map_err(|e| {
        Error::InvalidShape {
            expected: format!("({}, {})", table.len(), n_cols),
            got: e.to_string(),
        }
    })?;
    Ok((table.headers().to_vec(), x))
}

/// Read a single-column target table.
pub fn read_targets(path: impl AsRef<Path>) -> Result<(String, Array1<f64>)> {
    let path = path.as_ref();
    let table = RawTable::read_csv(path)?;
    if table.headers().len() != 1 {
        return Err(Error::InvalidShape {
            expected: "1 target column".to_string(),
            got: format!("{} columns in {}", table.headers().len(), path.display()),
        });
    }
    if table.is_empty() {
        return Err(Error::EmptyData(format!("{} has no rows", path.display())));
    }

    let name = table.headers()[0].clone();
    let y = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| parse_cell(&row[0], i + 1, &name))
        .collect::<Result<Vec<f64>>>()?;
    Ok((name, Array1::from(y)))
}

pub fn write_features(path: impl AsRef<Path>, names: &[String], x: &Array2<f64>) -> Result<()> {
    let path = path.as_ref();
    if names.len() != x.ncols() {
        return Err(Error::InvalidShape {
            expected: format!("{} columns", names.len()),
            got: x.ncols().to_string(),
        });
    }
    ensure_parent_dir(path)?;
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;
    wtr.write_record(names).map_err(|e| Error::csv(path, e))?;
    for row in x.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| Error::csv(path, e))?;
    }
    wtr.flush().map_err(|e| Error::io(path, e))
}

pub fn write_targets(path: impl AsRef<Path>, name: &str, y: &Array1<f64>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;
    wtr.write_record([name]).map_err(|e| Error::csv(path, e))?;
    for v in y {
        wtr.write_record([v.to_string()])
            .map_err(|e| Error::csv(path, e))?;
    }
    wtr.flush().map_err(|e| Error::io(path, e))
}

/// Parse one numeric cell. `row` is the 1-based data row, header excluded.
pub(crate) fn parse_cell(value: &str, row: usize, column: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidNumber {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(" 1.5 ", 1, "a").unwrap(), 1.5);
        assert_eq!(parse_cell("-3e2", 1, "a").unwrap(), -300.0);
        assert!(parse_cell("", 2, "a").is_err());
        assert!(parse_cell("NaN", 2, "a").is_err());
        assert!(matches!(
            parse_cell("abc", 4, "goal"),
            Err(Error::InvalidNumber { row: 4, .. })
        ));
    }

    #[test]
    fn test_features_file_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("X.csv");
        let names = vec!["a".to_string(), "b".to_string()];
        let x = array![[0.1, 1.0 / 3.0], [-2.5e-12, 123456789.123]];

        write_features(&path, &names, &x).unwrap();
        let (read_names, read_x) = read_features(&path).unwrap();

        assert_eq!(read_names, names);
        assert_eq!(read_x, x);
    }

    #[test]
    fn test_targets_file_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("y.csv");
        write_targets(&path, "pledged", &array![1.0, 2.5]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "pledged\n1\n2.5\n");

        let (name, y) = read_targets(&path).unwrap();
        assert_eq!(name, "pledged");
        assert_eq!(y, array![1.0, 2.5]);
    }

    #[test]
    fn test_read_targets_rejects_multiple_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("y.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        assert!(matches!(
            read_targets(&path),
            Err(Error::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_read_features_reports_bad_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("X.csv");
        std::fs::write(&path, "a,b\n1,2\n3,oops\n").unwrap();

        match read_features(&path) {
            Err(Error::InvalidNumber { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "b");
                assert_eq!(value, "oops");
            }
            other => panic!("expected InvalidNumber, got {:?}", other.map(|(n, _)| n)),
        }
    }
}
