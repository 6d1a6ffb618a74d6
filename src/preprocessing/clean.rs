//! Cleaning of the raw Kickstarter projects dump.
//!
//! Drops the redundant currency columns, derives the campaign duration, normalises
//! column names and splits the rows by campaign state into two tables.

use crate::config::PrepareConfig;
use crate::dataset::RawTable;
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns duplicated by their `usd_*_real` counterparts or not used downstream.
pub const COLUMNS_TO_DROP: [&str; 6] = [
    "name",
    "category",
    "goal",
    "pledged",
    "currency",
    "usd pledged",
];

pub const CLEANED_MAIN_FILE: &str = "kickstarter_cleaned.csv";
pub const CLEANED_WITH_CANCELLED_FILE: &str = "kickstarter_cleaned_with_cancelled.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SECONDS_PER_DAY: i64 = 86_400;

/// Which campaign states survive cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    pub main_states: Vec<String>,
    /// Additionally kept in [`CleanedTables::with_cancelled`].
    pub cancelled_state: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::from(&PrepareConfig::default())
    }
}

impl From<&PrepareConfig> for CleanOptions {
    fn from(config: &PrepareConfig) -> Self {
        Self {
            main_states: config.main_states.clone(),
            cancelled_state: config.cancelled_state.clone(),
        }
    }
}

/// The two outputs of cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTables {
    /// Rows in the main states only.
    pub main: RawTable,
    /// Rows in the main states or the cancelled state.
    pub with_cancelled: RawTable,
}

/// Parse `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare `YYYY-MM-DD`
/// (midnight). Anything else is `None`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Whole days from `launched` to `deadline`, rounded towards negative infinity.
pub fn duration_days(launched: &NaiveDateTime, deadline: &NaiveDateTime) -> i64 {
    (*deadline - *launched)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

/// `" USD Pledged "` becomes `"usd_pledged"`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Clean a raw table and split it by campaign state.
///
/// Fails when `launched`, `deadline` or `state` is missing.
pub fn clean_kickstarter(raw: &RawTable, options: &CleanOptions) -> Result<CleanedTables> {
    info!(rows = raw.len(), columns = raw.headers().len(), "cleaning raw table");
    let mut table = raw.clone();

    let dropped = table.drop_columns(&COLUMNS_TO_DROP);
    let missing: Vec<&str> = COLUMNS_TO_DROP
        .iter()
        .copied()
        .filter(|c| !dropped.iter().any(|d| d == c))
        .collect();
    info!(?dropped, "dropped columns");
    if !missing.is_empty() {
        warn!(?missing, "columns to drop not found, skipping");
    }

    let launched = rewrite_timestamps(&mut table, "launched")?;
    let deadline = rewrite_timestamps(&mut table, "deadline")?;
    let durations = launched
        .iter()
        .zip(&deadline)
        .map(|(l, d)| match (l, d) {
            (Some(l), Some(d)) => duration_days(l, d).to_string(),
            _ => String::new(),
        })
        .collect();
    table.set_column("duration_days", durations)?;

    table.rename_columns(normalize_column_name);
    debug!(columns = ?table.headers(), "renamed columns");

    let state_idx = table.column_index("state")?;
    log_state_counts("state distribution", &table, state_idx);

    let main = table.filter_rows(|row| options.main_states.iter().any(|s| s == &row[state_idx]));
    let main = with_target(main, state_idx)?;
    log_state_counts("main table", &main, state_idx);

    let with_cancelled = table.filter_rows(|row| {
        row[state_idx] == options.cancelled_state
            || options.main_states.iter().any(|s| s == &row[state_idx])
    });
    let with_cancelled = with_target(with_cancelled, state_idx)?;
    log_state_counts("table with cancelled", &with_cancelled, state_idx);

    Ok(CleanedTables {
        main,
        with_cancelled,
    })
}

/// Read the raw dump, clean it and write both tables into `output_dir`.
pub fn clean_file(
    raw_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &CleanOptions,
) -> Result<CleanedTables> {
    let raw_path = raw_path.as_ref();
    let output_dir = output_dir.as_ref();
    info!(path = %raw_path.display(), "loading raw data");
    let raw = RawTable::read_csv(raw_path)?;

    let cleaned = clean_kickstarter(&raw, options)?;

    let main_path = output_dir.join(CLEANED_MAIN_FILE);
    cleaned.main.write_csv(&main_path)?;
    info!(path = %main_path.display(), rows = cleaned.main.len(), "saved cleaned table");

    let cancelled_path = output_dir.join(CLEANED_WITH_CANCELLED_FILE);
    cleaned.with_cancelled.write_csv(&cancelled_path)?;
    info!(
        path = %cancelled_path.display(),
        rows = cleaned.with_cancelled.len(),
        "saved cleaned table"
    );
    Ok(cleaned)
}

/// Re-format a date column in place; unparsable cells become empty.
fn rewrite_timestamps(table: &mut RawTable, column: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let parsed: Vec<Option<NaiveDateTime>> = table
        .column(column)?
        .into_iter()
        .map(parse_timestamp)
        .collect();
    let invalid = parsed.iter().filter(|p| p.is_none()).count();
    if invalid > 0 {
        warn!(column, invalid, "unparsable timestamps set to missing");
    }
    let formatted = parsed
        .iter()
        .map(|p| p.as_ref().map(format_timestamp).unwrap_or_default())
        .collect();
    table.set_column(column, formatted)?;
    Ok(parsed)
}

fn with_target(mut table: RawTable, state_idx: usize) -> Result<RawTable> {
    let target = table
        .rows()
        .iter()
        .map(|row| (if row[state_idx] == "successful" { "1" } else { "0" }).to_string())
        .collect();
    table.set_column("target", target)?;
    Ok(table)
}

fn log_state_counts(label: &str, table: &RawTable, state_idx: usize) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in table.rows() {
        *counts.entry(row[state_idx].as_str()).or_default() += 1;
    }
    info!(rows = table.len(), ?counts, "{label}");
}
