pub mod base;
pub mod csv_table;
pub mod factory;
pub mod jsonl;
pub mod manager;

pub use base::{StorageBackend, StorageError};
pub use csv_table::{CsvTableStorage, TABLE_HEADER};
pub use factory::{create_storage, StorageType};
pub use jsonl::JsonLinesStorage;
pub use manager::StorageManager;
