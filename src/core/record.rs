use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

pub const HUMAN_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// The single instant shared by every record of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTimestamp {
    pub unix: i64,
    pub human: String,
}

impl RunTimestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            unix: at.timestamp(),
            human: at.format(HUMAN_TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn from_unix(unix: i64) -> Option<Self> {
        Utc.timestamp_opt(unix, 0).single().map(Self::from_datetime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    #[serde(rename = "count")]
    Count(i64),
    #[serde(rename = "value")]
    Score(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    #[serde(flatten)]
    pub value: MetricValue,
}

impl Metric {
    pub fn count(label: impl Into<String>, count: i64) -> Self {
        Self {
            label: label.into(),
            value: MetricValue::Count(count),
        }
    }

    pub fn score(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: MetricValue::Score(value),
        }
    }
}

/// Measurements in extraction order, keyed by the label the page supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(Vec<Metric>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metric: Metric) {
        self.0.push(metric);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label to value lookup. Blank labels are skipped and a repeated label keeps its last value.
    pub fn flatten(&self) -> HashMap<&str, MetricValue> {
        self.0
            .iter()
            .filter_map(|metric| {
                let label = metric.label.trim();
                (!label.is_empty()).then_some((label, metric.value))
            })
            .collect()
    }
}

impl FromIterator<Metric> for Metrics {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    pub url: String,
    #[serde(rename = "timestamp")]
    pub run_timestamp_unix: i64,
    #[serde(rename = "timestamp_h")]
    pub run_timestamp_human: String,
    #[serde(rename = "screenshot_file")]
    pub screenshot_path: String,
    #[serde(rename = "results")]
    pub metrics: Metrics,
}

impl ScrapeRecord {
    pub fn new(url: &str, run: &RunTimestamp, screenshot_path: &Path, metrics: Metrics) -> Self {
        Self {
            url: url.to_string(),
            run_timestamp_unix: run.unix,
            run_timestamp_human: run.human.clone(),
            screenshot_path: screenshot_path.display().to_string(),
            metrics,
        }
    }
}

fn protocol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://").expect("valid protocol pattern"))
}

fn unsafe_chars_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_.-]+").expect("valid filename pattern"))
}

pub fn sanitize_filename(url: &str) -> String {
    let without_protocol = protocol_pattern().replace_all(url, "");
    unsafe_chars_pattern()
        .replace_all(&without_protocol, "_")
        .into_owned()
}

/// `{run_unix}_{sanitized_url}_{uuid}.png` inside `dir`.
pub fn screenshot_path(dir: &Path, run: &RunTimestamp, url: &str) -> PathBuf {
    dir.join(format!(
        "{}_{}_{}.png",
        run.unix,
        sanitize_filename(url),
        Uuid::new_v4()
    ))
}
