use chrono::{DateTime, Duration, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ScanStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_urls: usize,
    pub successful_urls: usize,
    pub failed_urls: usize,
    pub degraded_waits: usize,
    pub storage_errors: usize,
    pub average_duration: f64, // in milliseconds
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScanStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScanStats {
                start_time: Utc::now(),
                end_time: None,
                total_urls: 0,
                successful_urls: 0,
                failed_urls: 0,
                degraded_waits: 0,
                storage_errors: 0,
                average_duration: 0.0,
            })),
        }
    }

    pub fn record_url(&self, succeeded: bool, duration: Duration) {
        let mut stats = self.stats.write();
        stats.total_urls += 1;

        if succeeded {
            stats.successful_urls += 1;
        } else {
            stats.failed_urls += 1;
        }

        let current_total = stats.average_duration * (stats.total_urls - 1) as f64;
        let new_duration = duration.num_milliseconds() as f64;
        stats.average_duration = (current_total + new_duration) / stats.total_urls as f64;
    }

    /// The loading indicator outlived its wait and processing went on regardless.
    pub fn record_degraded_wait(&self) {
        self.stats.write().degraded_waits += 1;
    }

    pub fn record_storage_errors(&self, count: usize) {
        self.stats.write().storage_errors += count;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    pub fn log_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        info!("Scan statistics:");
        info!("  Duration: {} seconds", duration.num_seconds());
        info!("  URLs processed: {}", stats.total_urls);
        info!("  Successful: {}", stats.successful_urls);
        info!("  Failed: {}", stats.failed_urls);
        info!("  Degraded loading waits: {}", stats.degraded_waits);
        info!("  Storage errors: {}", stats.storage_errors);
        info!("  Average time per URL: {:.2}ms", stats.average_duration);
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
