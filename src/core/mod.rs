mod config;
mod errors;
mod record;
mod scanner;

#[cfg(test)]
mod tests;

pub use config::{ScanConfig, SelectorSet, SleepWindow, Viewport, DEFAULT_REPORT_URL_TEMPLATE};
pub use errors::{ScanError, ScanResult};
pub use record::{
    sanitize_filename, screenshot_path, Metric, MetricValue, Metrics, RunTimestamp, ScrapeRecord,
    HUMAN_TIMESTAMP_FORMAT,
};
pub use scanner::{ScanOutcome, Scanner};
