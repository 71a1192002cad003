use super::base::{StorageBackend, StorageError};
use crate::core::ScrapeRecord;
use async_trait::async_trait;
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One JSON document per line, appended.
#[derive(Debug, Clone)]
pub struct JsonLinesStorage {
    path: PathBuf,
}

impl JsonLinesStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageBackend for JsonLinesStorage {
    fn name(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }

    async fn store(&self, record: &ScrapeRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!("Appended record for {} to {}", record.url, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Metric, RunTimestamp};
    use std::fs;

    fn record(url: &str) -> ScrapeRecord {
        let run = RunTimestamp::from_unix(100).unwrap();
        ScrapeRecord::new(
            url,
            &run,
            Path::new("shot.png"),
            [Metric::count("Errors", 2)].into_iter().collect(),
        )
    }

    #[tokio::test]
    async fn test_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonLinesStorage::new(dir.path().join("results.jsonl"));

        storage.store(&record("a.com")).await.unwrap();
        storage.store(&record("b.com")).await.unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ScrapeRecord = serde_json::from_str(lines[0]).unwrap();
        let second: ScrapeRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.url, "a.com");
        assert_eq!(second.url, "b.com");
    }

    #[tokio::test]
    async fn test_unwritable_destination_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let storage = JsonLinesStorage::new(dir.path());

        let result = storage.store(&record("a.com")).await;
        assert!(matches!(result, Err(StorageError::OperationError(_))));
    }
}
