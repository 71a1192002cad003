use super::{CsvTableStorage, JsonLinesStorage, StorageBackend};
use std::path::PathBuf;

pub enum StorageType {
    JsonLines { path: PathBuf },
    CsvTable { path: PathBuf },
}

pub fn create_storage(storage_type: StorageType) -> Box<dyn StorageBackend> {
    match storage_type {
        StorageType::JsonLines { path } => Box::new(JsonLinesStorage::new(path)),
        StorageType::CsvTable { path } => Box::new(CsvTableStorage::new(path)),
    }
}
