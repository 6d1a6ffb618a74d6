use crate::dataset::io::ensure_parent_dir;
use crate::error::{Error, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// A header row plus rows of string cells.
///
/// Missing values are empty strings. Every row has exactly one cell per header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(Error::InvalidShape {
                expected: format!("{} cells per row", headers.len()),
                got: format!("{} cells in row {}", row.len(), i + 1),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Read a comma-separated file with a header row.
    ///
    /// Cells that are not valid UTF-8 are decoded as Latin-1, which is how the raw
    /// Kickstarter dump is encoded.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| Error::csv(path, e))?;

        let headers: Vec<String> = rdr
            .byte_headers()
            .map_err(|e| Error::csv(path, e))?
            .iter()
            .map(decode_field)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.byte_records() {
            let record = record.map_err(|e| Error::csv(path, e))?;
            rows.push(record.iter().map(decode_field).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Write the table as CSV, creating parent directories as needed.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        let mut wtr = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| Error::csv(path, e))?;
        wtr.write_record(&self.headers)
            .map_err(|e| Error::csv(path, e))?;
        for row in &self.rows {
            wtr.write_record(row).map_err(|e| Error::csv(path, e))?;
        }
        wtr.flush().map_err(|e| Error::io(path, e))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Remove the named columns that exist; returns the names actually removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !names.contains(&h.as_str()))
            .collect();
        let dropped = self
            .headers
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(h, _)| h.clone())
            .collect();

        self.headers = retain_by_mask(std::mem::take(&mut self.headers), &keep);
        for row in &mut self.rows {
            *row = retain_by_mask(std::mem::take(row), &keep);
        }
        dropped
    }

    /// Append a column, or overwrite it when a column of that name already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::InvalidShape {
                expected: format!("{} values for column '{}'", self.rows.len(), name),
                got: values.len().to_string(),
            });
        }
        match self.headers.iter().position(|h| h == name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    pub fn rename_columns(&mut self, rename: impl Fn(&str) -> String) {
        for header in &mut self.headers {
            *header = rename(header);
        }
    }

    /// Rows for which `keep` returns true, in their original order.
    pub fn filter_rows(&self, keep: impl Fn(&[String]) -> bool) -> RawTable {
        RawTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Rows whose mask entry is true; `mask` must have one entry per row.
    pub fn filter_by_mask(&self, mask: &[bool]) -> Result<RawTable> {
        if mask.len() != self.rows.len() {
            return Err(Error::InvalidShape {
                expected: format!("{} mask entries", self.rows.len()),
                got: mask.len().to_string(),
            });
        }
        Ok(RawTable {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .zip(mask)
                .filter(|(_, k)| **k)
                .map(|(r, _)| r.clone())
                .collect(),
        })
    }
}

fn retain_by_mask(values: Vec<String>, keep: &[bool]) -> Vec<String> {
    values
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(v, _)| v)
        .collect()
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
