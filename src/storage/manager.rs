use super::base::StorageBackend;
use crate::core::ScrapeRecord;
use log::{debug, error};

/// Fans each record out to the registered backends, in registration order.
#[derive(Default)]
pub struct StorageManager {
    storages: Vec<Box<dyn StorageBackend>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_storage(mut self, storage: Box<dyn StorageBackend>) -> Self {
        debug!("Registered storage backend {}", storage.name());
        self.storages.push(storage);
        self
    }

    pub fn len(&self) -> usize {
        self.storages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }

    /// Returns the number of backends that failed to prepare.
    pub async fn prepare(&self) -> usize {
        let mut failures = 0;
        for storage in &self.storages {
            if let Err(e) = storage.prepare().await {
                error!("Failed to initialize {}: {}", storage.name(), e);
                failures += 1;
            }
        }
        failures
    }

    /// Returns the number of backends that failed. A failure never stops the remaining backends.
    pub async fn store(&self, record: &ScrapeRecord) -> usize {
        let mut failures = 0;
        for storage in &self.storages {
            if let Err(e) = storage.store(record).await {
                error!("Failed to save {} to {}: {}", record.url, storage.name(), e);
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RunTimestamp;
    use crate::storage::base::StorageError;
    use crate::storage::{create_storage, StorageType};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    struct RecordingStorage {
        name: &'static str,
        fail: bool,
        journal: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl StorageBackend for RecordingStorage {
        fn name(&self) -> String {
            self.name.to_string()
        }

        async fn store(&self, record: &ScrapeRecord) -> Result<(), StorageError> {
            self.journal
                .lock()
                .push(format!("{}:{}", self.name, record.url));
            if self.fail {
                return Err(StorageError::OperationError("disk full".to_string()));
            }
            Ok(())
        }
    }

    fn record() -> ScrapeRecord {
        let run = RunTimestamp::from_unix(1).unwrap();
        ScrapeRecord::new("a.com", &run, Path::new("a.png"), Default::default())
    }

    #[tokio::test]
    async fn test_stores_in_registration_order_and_survives_failures() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let manager = StorageManager::new()
            .register_storage(Box::new(RecordingStorage {
                name: "log",
                fail: true,
                journal: Arc::clone(&journal),
            }))
            .register_storage(Box::new(RecordingStorage {
                name: "table",
                fail: false,
                journal: Arc::clone(&journal),
            }));

        assert_eq!(manager.store(&record()).await, 1);
        assert_eq!(*journal.lock(), vec!["log:a.com", "table:a.com"]);
    }

    #[tokio::test]
    async fn test_prepare_creates_table_header() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("results.csv");
        let manager = StorageManager::new()
            .register_storage(create_storage(StorageType::JsonLines {
                path: dir.path().join("results.jsonl"),
            }))
            .register_storage(create_storage(StorageType::CsvTable {
                path: table.clone(),
            }));

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.prepare().await, 0);
        assert!(table.exists());
        assert!(!dir.path().join("results.jsonl").exists());
    }
}
