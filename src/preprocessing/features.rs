//! Feature engineering on the cleaned Kickstarter table.

use crate::dataset::io::parse_cell;
use crate::dataset::RawTable;
use crate::error::{Error, Result};
use crate::preprocessing::binning::{cut, qcut, DuplicateEdges};
use crate::preprocessing::clean::{clean_file, parse_timestamp, CleanOptions};
use chrono::Datelike;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Labels of the five equal-frequency bins, lowest first.
pub const QUINTILE_LABELS: [&str; 5] = ["Very Low", "Low", "Medium", "High", "Very High"];

/// Campaign length edges in days, right-closed.
pub const DURATION_EDGES: [f64; 5] = [15.0, 29.0, 45.0, 60.0, 75.0];
pub const DURATION_LABELS: [&str; 4] = ["2 weeks", "4 weeks", "6 weeks", "8 weeks"];

/// Coarse grouping of Kickstarter main categories.
pub fn group_category(main_category: &str) -> &'static str {
    match main_category {
        "Art" | "Comics" | "Crafts" | "Dance" | "Design" | "Photography" | "Publishing" => {
            "Creative"
        }
        "Fashion" | "Food" => "Consumer",
        "Film & Video" | "Games" | "Music" | "Theater" => "Entertainment",
        "Technology" => "Tech",
        _ => "Other",
    }
}

/// Continent of a two-letter country code.
pub fn continent(country: &str) -> &'static str {
    match country {
        "US" | "CA" | "MX" => "North America",
        "GB" | "DE" | "FR" | "IT" | "ES" | "NL" | "IE" | "SE" | "CH" | "AT" | "DK" | "BE"
        | "LU" | "NO" => "Europe",
        "AU" | "NZ" => "Oceania",
        "JP" | "SG" | "HK" => "Asia",
        _ => "Other",
    }
}

/// Meteorological season of a month (1-12).
pub fn season(month: u32) -> Option<&'static str> {
    match month {
        12 | 1 | 2 => Some("Winter"),
        3..=5 => Some("Spring"),
        6..=8 => Some("Summer"),
        9..=11 => Some("Fall"),
        _ => None,
    }
}

/// Derive the engineered columns from a cleaned table.
///
/// Rows without a positive goal and pledge are dropped first. Requires the columns
/// `usd_goal_real`, `usd_pledged_real`, `backers`, `main_category`, `country`,
/// `launched`, `deadline` and `duration_days`.
pub fn build_features(cleaned: &RawTable) -> Result<RawTable> {
    info!(rows = cleaned.len(), "starting feature engineering");

    let goal = numeric_column(cleaned, "usd_goal_real")?;
    let pledged = numeric_column(cleaned, "usd_pledged_real")?;
    let keep: Vec<bool> = goal
        .iter()
        .zip(&pledged)
        .map(|(g, p)| matches!((g, p), (Some(g), Some(p)) if *g > 0.0 && *p > 0.0))
        .collect();
    let mut table = cleaned.filter_by_mask(&keep)?;
    info!(
        kept = table.len(),
        dropped = cleaned.len() - table.len(),
        "filtered non-positive goal or pledge"
    );

    let goal = numeric_column(&table, "usd_goal_real")?;
    let pledged = numeric_column(&table, "usd_pledged_real")?;
    let backers = numeric_column(&table, "backers")?;
    let duration = numeric_column(&table, "duration_days")?;

    let main_category: Vec<String> = owned_column(&table, "main_category")?;
    let grouped: Vec<&'static str> = main_category.iter().map(|c| group_category(c)).collect();
    table.set_column("main_category_grouped", to_strings(&grouped))?;

    let continents: Vec<&'static str> = table
        .column("country")?
        .into_iter()
        .map(continent)
        .collect();
    table.set_column("continent", to_strings(&continents))?;

    let mut months = HashMap::new();
    for col in ["launched", "deadline"] {
        let parsed: Vec<_> = table
            .column(col)?
            .into_iter()
            .map(parse_timestamp)
            .collect();
        let years = parsed
            .iter()
            .map(|ts| ts.map(|t| t.year().to_string()).unwrap_or_default())
            .collect();
        let month: Vec<Option<u32>> = parsed.iter().map(|ts| ts.map(|t| t.month())).collect();
        table.set_column(&format!("{col}_year"), years)?;
        table.set_column(
            &format!("{col}_month"),
            month
                .iter()
                .map(|m| m.map(|m| m.to_string()).unwrap_or_default())
                .collect(),
        )?;
        months.insert(col, month);
    }

    let goal_bins = qcut(&goal, 5, DuplicateEdges::Raise, "usd_goal_real")?;
    table.set_column("usd_goal_bins", bin_labels(&goal_bins, &QUINTILE_LABELS))?;
    let pledged_bins = qcut(&pledged, 5, DuplicateEdges::Raise, "usd_pledged_real")?;
    table.set_column("usd_pledged_bins", bin_labels(&pledged_bins, &QUINTILE_LABELS))?;

    table.set_column(
        "pledged_per_category",
        format_numbers(&group_means(&main_category, &pledged)),
    )?;
    table.set_column(
        "goal_per_category",
        format_numbers(&group_means(&main_category, &goal)),
    )?;

    table.set_column(
        "category_goal_percentile",
        grouped_quintiles(&grouped, &goal)?,
    )?;

    let duration_bins = cut(&duration, &DURATION_EDGES, false);
    table.set_column("duration_bins", bin_labels(&duration_bins, &DURATION_LABELS))?;

    let backers_per_pledged: Vec<Option<f64>> = backers
        .iter()
        .zip(&pledged)
        .map(|(b, p)| Some((*b)? / (*p)?))
        .collect();
    table.set_column("backers_per_pledged", format_numbers(&backers_per_pledged))?;
    let backer_bins = qcut(
        &backers_per_pledged,
        5,
        DuplicateEdges::Raise,
        "backers_per_pledged",
    )?;
    table.set_column("backer_pledged_bins", bin_labels(&backer_bins, &QUINTILE_LABELS))?;

    for (col, source) in [("launch_season", "launched"), ("deadline_season", "deadline")] {
        let seasons = months[source]
            .iter()
            .map(|m| m.and_then(season).unwrap_or_default().to_string())
            .collect();
        table.set_column(col, seasons)?;
    }

    info!(columns = ?table.headers(), "engineered columns");
    Ok(table)
}

/// Build the feature table from `input` and write it to `output`.
///
/// When `input` does not exist, the raw dump at `raw` is cleaned first (the cleaned
/// tables land in `input`'s directory) and the main cleaned table is used.
pub fn build_features_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    raw: impl AsRef<Path>,
    options: &CleanOptions,
) -> Result<RawTable> {
    let (input, output, raw) = (input.as_ref(), output.as_ref(), raw.as_ref());

    let cleaned = if input.exists() {
        info!(path = %input.display(), "loading cleaned data");
        RawTable::read_csv(input)?
    } else {
        warn!(path = %input.display(), "cleaned input not found");
        if !raw.exists() {
            return Err(Error::io(
                input,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!(
                        "neither the cleaned input {} nor the raw file {} exists",
                        input.display(),
                        raw.display()
                    ),
                ),
            ));
        }
        info!(raw = %raw.display(), "running cleaning first");
        let dir = input.parent().unwrap_or_else(|| Path::new("."));
        clean_file(raw, dir, options)?.main
    };

    let featured = build_features(&cleaned)?;
    featured.write_csv(output)?;
    info!(path = %output.display(), rows = featured.len(), "saved engineered dataset");
    Ok(featured)
}

/// Parse a numeric column; empty cells are missing, anything else must be a number.
fn numeric_column(table: &RawTable, name: &str) -> Result<Vec<Option<f64>>> {
    table
        .column(name)?
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            if cell.trim().is_empty() {
                Ok(None)
            } else {
                parse_cell(cell, i + 1, name).map(Some)
            }
        })
        .collect()
}

fn owned_column(table: &RawTable, name: &str) -> Result<Vec<String>> {
    Ok(table.column(name)?.into_iter().map(str::to_string).collect())
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn format_numbers(values: &[Option<f64>]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
        .collect()
}

fn bin_labels(bins: &[Option<usize>], labels: &[&str]) -> Vec<String> {
    bins.iter()
        .map(|b| {
            b.and_then(|i| labels.get(i))
                .map(|l| l.to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Mean of `values` per key, broadcast back to every row. Missing values are skipped.
fn group_means(keys: &[String], values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for (key, value) in keys.iter().zip(values) {
        if let Some(v) = value {
            let entry = sums.entry(key.as_str()).or_default();
            entry.0 += v;
            entry.1 += 1;
        }
    }
    keys.iter()
        .map(|k| {
            sums.get(k.as_str())
                .filter(|(_, n)| *n > 0)
                .map(|(s, n)| s / *n as f64)
        })
        .collect()
}

/// Quintile labels computed separately inside each group.
///
/// Groups with coinciding edges get fewer bins and use the lowest labels.
fn grouped_quintiles(groups: &[&str], values: &[Option<f64>]) -> Result<Vec<String>> {
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, g) in groups.iter().enumerate() {
        members.entry(*g).or_default().push(i);
    }

    let mut labels = vec![String::new(); values.len()];
    for (group, rows) in members {
        let group_values: Vec<Option<f64>> = rows.iter().map(|&i| values[i]).collect();
        let bins = qcut(&group_values, 5, DuplicateEdges::Drop, group)?;
        for (row, label) in rows.iter().zip(bin_labels(&bins, &QUINTILE_LABELS)) {
            labels[*row] = label;
        }
    }
    Ok(labels)
}
