//! Read-side views over the results table, used to render the dashboard.
//!
//! Rows are normalized (trailing slashes stripped from URLs), de-duplicated on
//! `(url, instant)` keeping the first occurrence, and then projected into a
//! per-URL latest snapshot, per-run averages and a list of runs.

mod html;

pub use html::render_html;

use crate::core::{ScanError, ScanResult};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

pub const RUN_LABEL_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Zone the run picker labels are shown in.
pub const RUN_LABEL_ZONE: Tz = chrono_tz::America::New_York;

/// One row of the results table as written by the CSV backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableRow {
    pub url: String,
    pub timestamp: i64,
    #[serde(default)]
    pub timestamp_h: String,
    #[serde(default)]
    pub screenshot_file: String,
    #[serde(rename = "Errors", default)]
    pub errors: i64,
    #[serde(rename = "Contrast Errors", default)]
    pub contrast_errors: i64,
    #[serde(rename = "Alerts", default)]
    pub alerts: i64,
    #[serde(rename = "Features", default)]
    pub features: i64,
    #[serde(rename = "Structure", default)]
    pub structure: i64,
    #[serde(rename = "ARIA", default)]
    pub aria: i64,
    #[serde(rename = "AIM Score", default)]
    pub aim_score: f64,
}

/// A normalized table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub url: String,
    pub timestamp: i64,
    pub datetime: DateTime<Utc>,
    pub screenshot_file: String,
    #[serde(rename = "Errors")]
    pub errors: i64,
    #[serde(rename = "Contrast Errors")]
    pub contrast_errors: i64,
    #[serde(rename = "Alerts")]
    pub alerts: i64,
    #[serde(rename = "Features")]
    pub features: i64,
    #[serde(rename = "Structure")]
    pub structure: i64,
    #[serde(rename = "ARIA")]
    pub aria: i64,
    #[serde(rename = "AIM Score")]
    pub aim_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAggregate {
    pub timestamp: i64,
    pub datetime: DateTime<Utc>,
    #[serde(rename = "AIM Score")]
    pub aim_score: f64,
    #[serde(rename = "Errors")]
    pub errors: f64,
    #[serde(rename = "Contrast Errors")]
    pub contrast_errors: f64,
    #[serde(rename = "Alerts")]
    pub alerts: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunLabel {
    pub unix_s: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub history: Vec<Snapshot>,
    pub latest: Vec<Snapshot>,
    pub all_urls: Vec<String>,
    pub trend: Vec<RunAggregate>,
    pub runs: Vec<RunLabel>,
}

impl ReportData {
    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        let history = normalize(rows);
        Self {
            latest: latest_snapshot(&history),
            all_urls: all_urls(&history),
            trend: run_aggregates(&history),
            runs: runs(&history),
            history,
        }
    }
}

/// Reads every data row of the table. A missing file is an error, an empty one is not.
/// Rows that do not parse are logged and skipped.
pub fn load_rows<P: AsRef<Path>>(path: P) -> ScanResult<Vec<TableRow>> {
    let path = path.as_ref();
    if fs::metadata(path)?.len() == 0 {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<TableRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(0, |pos| pos.line());
                warn!("Skipping malformed row at line {} of {}: {}", line, path.display(), e);
            }
        }
    }
    Ok(rows)
}

pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Strips trailing slashes and drops repeated `(url, instant)` pairs, keeping the first.
pub fn normalize(rows: Vec<TableRow>) -> Vec<Snapshot> {
    let mut seen = HashSet::new();
    let mut snapshots = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(datetime) = Utc.timestamp_opt(row.timestamp, 0).single() else {
            warn!("Skipping row for {} with invalid timestamp {}", row.url, row.timestamp);
            continue;
        };
        let url = normalize_url(&row.url);
        if !seen.insert((url.clone(), row.timestamp)) {
            continue;
        }
        snapshots.push(Snapshot {
            url,
            timestamp: row.timestamp,
            datetime,
            screenshot_file: row.screenshot_file,
            errors: row.errors,
            contrast_errors: row.contrast_errors,
            alerts: row.alerts,
            features: row.features,
            structure: row.structure,
            aria: row.aria,
            aim_score: row.aim_score,
        });
    }

    snapshots
}

/// The newest snapshot of every URL, newest first.
pub fn latest_snapshot(history: &[Snapshot]) -> Vec<Snapshot> {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| b.datetime.cmp(&a.datetime));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|snapshot| seen.insert(snapshot.url.clone()))
        .collect()
}

pub fn all_urls(history: &[Snapshot]) -> Vec<String> {
    history
        .iter()
        .map(|snapshot| snapshot.url.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Per-run averages, oldest run first.
pub fn run_aggregates(history: &[Snapshot]) -> Vec<RunAggregate> {
    let mut by_run: BTreeMap<i64, Vec<&Snapshot>> = BTreeMap::new();
    for snapshot in history {
        by_run.entry(snapshot.timestamp).or_default().push(snapshot);
    }

    by_run
        .into_iter()
        .map(|(timestamp, snapshots)| {
            let n = snapshots.len() as f64;
            let mean = |f: fn(&Snapshot) -> f64| snapshots.iter().map(|s| f(s)).sum::<f64>() / n;
            RunAggregate {
                timestamp,
                datetime: snapshots[0].datetime,
                aim_score: mean(|s| s.aim_score),
                errors: mean(|s| s.errors as f64),
                contrast_errors: mean(|s| s.contrast_errors as f64),
                alerts: mean(|s| s.alerts as f64),
            }
        })
        .collect()
}

/// Distinct runs, newest first.
pub fn runs(history: &[Snapshot]) -> Vec<RunLabel> {
    let instants: BTreeSet<DateTime<Utc>> = history.iter().map(|s| s.datetime).collect();
    instants
        .into_iter()
        .rev()
        .map(|at| RunLabel {
            unix_s: at.timestamp(),
            label: at
                .with_timezone(&RUN_LABEL_ZONE)
                .format(RUN_LABEL_FORMAT)
                .to_string(),
        })
        .collect()
}

/// Loads the table, builds every view and writes the dashboard.
pub fn generate_report<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> ScanResult<ReportData> {
    let input = input.as_ref();
    let output = output.as_ref();

    let rows = load_rows(input).map_err(|e| match e {
        ScanError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            ScanError::ConfigError(format!("Input file not found at {}", input.display()))
        }
        other => other,
    })?;
    if rows.is_empty() {
        warn!("{} is empty. Report will be blank.", input.display());
    }

    let data = ReportData::from_rows(rows);
    fs::write(output, render_html(&data)?)?;
    info!("Report successfully generated: {}", output.display());
    Ok(data)
}
