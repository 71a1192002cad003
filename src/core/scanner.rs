use super::{RunTimestamp, ScanConfig, ScanError, ScanResult};
use crate::scrapers::{BrowserLauncher, ReportPage, ScrapeWorker};
use crate::sources::read_urls;
use crate::stats::{ScanStats, StatsTracker};
use crate::storage::{create_storage, StorageManager, StorageType};
use chrono::Utc;
use log::{error, info, warn};
use std::fs;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Completed(ScanStats),
    Interrupted(ScanStats),
    /// The URL source was missing or empty; no browser was started.
    NoUrls,
}

/// Runs one batch: a single browser tab visits every URL in order.
pub struct Scanner {
    config: ScanConfig,
    launcher: Box<dyn BrowserLauncher>,
    storage: StorageManager,
    worker: ScrapeWorker,
    stats: Arc<StatsTracker>,
}

impl Scanner {
    pub fn new(config: ScanConfig, launcher: Box<dyn BrowserLauncher>) -> ScanResult<Self> {
        config.validate()?;

        let storage = StorageManager::new()
            .register_storage(create_storage(StorageType::JsonLines {
                path: config.log_file.clone(),
            }))
            .register_storage(create_storage(StorageType::CsvTable {
                path: config.table_file.clone(),
            }));

        let stats = Arc::new(StatsTracker::new());
        let worker = ScrapeWorker::new(config.clone(), Arc::clone(&stats));

        Ok(Self {
            config,
            launcher,
            storage,
            worker,
            stats,
        })
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Runs until every URL is processed or Ctrl-C is received.
    pub async fn run(&self) -> ScanResult<ScanOutcome> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for interrupt signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    pub async fn run_until<F>(&self, shutdown: F) -> ScanResult<ScanOutcome>
    where
        F: Future<Output = ()>,
    {
        fs::create_dir_all(&self.config.screenshots_dir)?;
        let failures = self.storage.prepare().await;
        self.stats.record_storage_errors(failures);

        let urls = read_urls(&self.config.urls_file);
        if urls.is_empty() {
            error!(
                "No URLs found in {}. Exiting.",
                self.config.urls_file.display()
            );
            return Ok(ScanOutcome::NoUrls);
        }

        info!("Starting browser...");
        let session = match self.launcher.launch(&self.config).await {
            Ok(session) => session,
            Err(ScanError::BrowserNotFound(detail)) => {
                log_browser_not_found(&detail);
                return Err(ScanError::BrowserNotFound(detail));
            }
            Err(e) => {
                error!("An unexpected error occurred while starting the browser: {}", e);
                return Err(e);
            }
        };

        info!("Starting scan for {} URLs...", urls.len());
        let run = RunTimestamp::now();
        info!("Using run timestamp: {} (UTC)", run.human);

        let interrupted = tokio::select! {
            _ = self.scan_urls(session.page(), &urls, &run) => false,
            _ = shutdown => true,
        };

        if interrupted {
            info!("Scan interrupted by user. Exiting.");
        } else {
            info!("Scan complete.");
        }

        session.stop();
        self.stats.finish();
        self.stats.log_summary();

        let stats = self.stats.get_stats();
        Ok(if interrupted {
            ScanOutcome::Interrupted(stats)
        } else {
            ScanOutcome::Completed(stats)
        })
    }

    async fn scan_urls(&self, page: &dyn ReportPage, urls: &[String], run: &RunTimestamp) {
        for (index, url) in urls.iter().enumerate() {
            info!("Processing {} ({}/{})...", url, index + 1, urls.len());
            let started = Utc::now();

            let record = self.worker.scrape(page, url, run).await;
            let succeeded = record.is_some();

            match record {
                Some(record) => {
                    let failures = self.storage.store(&record).await;
                    self.stats.record_storage_errors(failures);
                    if failures == 0 {
                        info!("Successfully saved data for {}", url);
                    } else {
                        warn!("Scraped {} but {} storage write(s) failed", url, failures);
                    }
                }
                None => warn!("No data returned for {}. Skipping save.", url),
            }

            self.stats
                .record_url(succeeded, Utc::now().signed_duration_since(started));
        }
    }
}

fn log_browser_not_found(detail: &str) {
    error!("{}", "=".repeat(60));
    error!("! Google Chrome Not Found !");
    error!("This tool needs Google Chrome or Chromium to work ({}).", detail);
    error!("Please download and install Google Chrome here:");
    error!("  https://www.google.com/chrome/");
    error!("If Chrome is already installed in a custom location, point to it with:");
    error!("  wavescan scan --chrome /path/to/chrome");
    error!("or set the CHROME environment variable to the executable path.");
    error!("{}", "=".repeat(60));
}
