use super::base::{StorageBackend, StorageError};
use crate::core::{MetricValue, ScrapeRecord};
use async_trait::async_trait;
use log::{debug, info};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const TABLE_HEADER: [&str; 11] = [
    "url",
    "timestamp",
    "timestamp_h",
    "screenshot_file",
    "Errors",
    "Contrast Errors",
    "Alerts",
    "Features",
    "Structure",
    "ARIA",
    "AIM Score",
];

pub const COUNT_COLUMNS: [&str; 6] = [
    "Errors",
    "Contrast Errors",
    "Alerts",
    "Features",
    "Structure",
    "ARIA",
];

pub const SCORE_COLUMN: &str = "AIM Score";

/// Fixed-column table, header written only when the file does not exist yet.
#[derive(Debug, Clone)]
pub struct CsvTableStorage {
    path: PathBuf,
}

impl CsvTableStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when this call created the file.
    pub fn ensure_header(&self) -> Result<bool, StorageError> {
        if self.path.exists() {
            return Ok(false);
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(TABLE_HEADER)?;
        writer.flush()?;
        Ok(true)
    }

    /// Projects a record onto the fixed column order, defaulting absent metrics.
    pub fn row(record: &ScrapeRecord) -> Vec<String> {
        let flat = record.metrics.flatten();

        let mut row = vec![
            record.url.clone(),
            record.run_timestamp_unix.to_string(),
            record.run_timestamp_human.clone(),
            record.screenshot_path.clone(),
        ];
        row.extend(COUNT_COLUMNS.iter().map(|column| match flat.get(column) {
            Some(value) => format_value(value),
            None => "0".to_string(),
        }));
        row.push(match flat.get(SCORE_COLUMN) {
            Some(value) => format_value(value),
            None => format_score(0.0),
        });
        row
    }
}

fn format_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Count(count) => count.to_string(),
        MetricValue::Score(score) => format_score(*score),
    }
}

/// Whole scores keep one decimal place so the column always reads as a float.
fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}

#[async_trait]
impl StorageBackend for CsvTableStorage {
    fn name(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    async fn prepare(&self) -> Result<(), StorageError> {
        if self.ensure_header()? {
            info!(
                "CSV file '{}' not found. Created new file with header.",
                self.path.display()
            );
        } else {
            info!(
                "CSV file '{}' already exists. Appending results.",
                self.path.display()
            );
        }
        Ok(())
    }

    async fn store(&self, record: &ScrapeRecord) -> Result<(), StorageError> {
        self.ensure_header()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(Self::row(record))?;
        writer.flush()?;

        debug!("Appended row for {} to {}", record.url, self.path.display());
        Ok(())
    }
}
