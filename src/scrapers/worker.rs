use super::page::ReportPage;
use crate::core::{
    screenshot_path, Metric, Metrics, RunTimestamp, ScanConfig, ScanError, ScanResult,
    ScrapeRecord,
};
use crate::stats::StatsTracker;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Drives one tab through a single report page and extracts its scores.
pub struct ScrapeWorker {
    config: ScanConfig,
    stats: Arc<StatsTracker>,
}

impl ScrapeWorker {
    pub fn new(config: ScanConfig, stats: Arc<StatsTracker>) -> Self {
        Self { config, stats }
    }

    /// Any failure is logged and collapses to `None`.
    pub async fn scrape(
        &self,
        page: &dyn ReportPage,
        url: &str,
        run: &RunTimestamp,
    ) -> Option<ScrapeRecord> {
        match self.try_scrape(page, url, run).await {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Failed to process {}: {}", url, e);
                None
            }
        }
    }

    async fn try_scrape(
        &self,
        page: &dyn ReportPage,
        url: &str,
        run: &RunTimestamp,
    ) -> ScanResult<ScrapeRecord> {
        let report_url = self.config.report_url(url);
        debug!("Navigating to {}", report_url);
        page.navigate(&report_url).await?;

        let settle = self.config.sleep_window.sample();
        info!("Waiting {}s for page to settle...", settle.as_secs());
        sleep(settle).await;

        page.set_viewport(&self.config.viewport).await?;

        info!("Waiting for AIM score for {}...", url);
        self.wait_for_element(page, &self.config.selectors.score_value, self.config.score_timeout)
            .await?;
        info!("AIM score found for {}.", url);

        info!("Waiting for spinner to disappear for {}...", url);
        if self.wait_for_spinner(page).await {
            info!("Spinner is gone for {}.", url);
            debug!("Waiting {:?} extra for rendering...", self.config.settle_delay);
            sleep(self.config.settle_delay).await;
        } else {
            warn!(
                "Spinner did NOT disappear for {} after {:?}. Taking screenshot anyway.",
                url, self.config.spinner_timeout
            );
            self.stats.record_degraded_wait();
        }

        let screenshot = screenshot_path(&self.config.screenshots_dir, run, url);
        page.save_screenshot(&screenshot).await?;
        debug!("Saved screenshot to {}", screenshot.display());

        let metrics = self.extract_metrics(page).await?;

        Ok(ScrapeRecord::new(url, run, &screenshot, metrics))
    }

    /// Hard wait: the element must show up before `timeout`.
    async fn wait_for_element(
        &self,
        page: &dyn ReportPage,
        selector: &str,
        timeout: Duration,
    ) -> ScanResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if page.element_exists(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ScanError::Timeout {
                    what: selector.to_string(),
                    after: timeout,
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Soft wait: `false` when the loading indicator is still showing at the deadline.
    async fn wait_for_spinner(&self, page: &dyn ReportPage) -> bool {
        let selector = &self.config.selectors.loading_indicator;
        let deadline = Instant::now() + self.config.spinner_timeout;
        while Instant::now() < deadline {
            match page.element_visibility(selector).await {
                Ok(visibility) if visibility.is_gone() => return true,
                Ok(_) => {}
                Err(e) => debug!("Spinner check failed, treating as still visible: {}", e),
            }
            sleep(self.config.poll_interval).await;
        }
        false
    }

    async fn extract_metrics(&self, page: &dyn ReportPage) -> ScanResult<Metrics> {
        let selectors = &self.config.selectors;
        let mut metrics = Metrics::new();

        for (label, selector) in &selectors.counts {
            let text = page.text_of(selector).await?;
            metrics.push(Metric::count(label.clone(), parse_count(label, &text)?));
        }

        let label = page.text_of(&selectors.score_label).await?;
        let value = page.text_of(&selectors.score_value).await?;
        metrics.push(Metric::score(
            normalize_label(&label),
            parse_score(&value)?,
        ));

        Ok(metrics)
    }
}

pub fn normalize_label(label: &str) -> String {
    label.trim().trim_end_matches(':').trim_end().to_string()
}

fn parse_count(label: &str, text: &str) -> ScanResult<i64> {
    text.trim().parse::<i64>().map_err(|e| {
        ScanError::ExtractionError(format!("{} value '{}' is not an integer: {}", label, text, e))
    })
}

fn parse_score(text: &str) -> ScanResult<f64> {
    text.trim().parse::<f64>().map_err(|e| {
        ScanError::ExtractionError(format!("score value '{}' is not a number: {}", text, e))
    })
}
