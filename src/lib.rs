pub mod core;
pub mod logging;
pub mod report;
pub mod scrapers;
pub mod sources;
pub mod stats;
pub mod storage;

pub use core::{ScanConfig, ScanError, ScanOutcome, ScanResult, Scanner, ScrapeRecord};
pub use scrapers::{BrowserLauncher, ChromeLauncher, ReportPage, ScrapeWorker};
pub use stats::StatsTracker;
pub use storage::{CsvTableStorage, JsonLinesStorage, StorageManager};
