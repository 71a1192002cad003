use super::page::{BrowserLauncher, BrowserSession, ElementVisibility, ReportPage};
use crate::core::{ScanConfig, ScanError, ScanResult, SelectorSet, Viewport, DEFAULT_REPORT_URL_TEMPLATE};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSpinner {
    Absent,
    HiddenAfter(Duration),
    RemovedAfter(Duration),
    Stuck,
    /// Every visibility check fails.
    Erroring,
}

/// What the mocked report page shows for one target URL.
#[derive(Debug, Clone)]
pub struct MockReport {
    pub texts: HashMap<String, String>,
    /// `None` means the score element never appears.
    pub score_delay: Option<Duration>,
    pub spinner: MockSpinner,
    pub fail_screenshot: bool,
}

impl MockReport {
    pub fn wave(counts: [i64; 6], aim_score: f64) -> Self {
        let selectors = SelectorSet::default();
        let mut texts: HashMap<String, String> = selectors
            .counts
            .iter()
            .zip(counts)
            .map(|((_, selector), count)| (selector.clone(), format!(" {} ", count)))
            .collect();
        texts.insert(selectors.score_label, " AIM Score: ".to_string());
        texts.insert(selectors.score_value, aim_score.to_string());

        Self {
            texts,
            score_delay: Some(Duration::ZERO),
            spinner: MockSpinner::RemovedAfter(Duration::from_secs(2)),
            fail_screenshot: false,
        }
    }

    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn without_text(mut self, selector: &str) -> Self {
        self.texts.remove(selector);
        self
    }

    pub fn with_score_delay(mut self, delay: Option<Duration>) -> Self {
        self.score_delay = delay;
        self
    }

    pub fn with_spinner(mut self, spinner: MockSpinner) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn with_failing_screenshot(mut self) -> Self {
        self.fail_screenshot = true;
        self
    }
}

#[derive(Default)]
struct MockState {
    current: Option<(MockReport, Instant)>,
    navigations: Vec<String>,
    viewports: Vec<Viewport>,
    screenshots: Vec<PathBuf>,
}

/// In-memory stand-in for a browser tab showing report pages.
#[derive(Clone)]
pub struct MockPage {
    template: String,
    reports: Arc<HashMap<String, MockReport>>,
    state: Arc<Mutex<MockState>>,
}

impl MockPage {
    pub fn new(reports: Vec<(&str, MockReport)>) -> Self {
        Self {
            template: DEFAULT_REPORT_URL_TEMPLATE.to_string(),
            reports: Arc::new(
                reports
                    .into_iter()
                    .map(|(url, report)| (url.to_string(), report))
                    .collect(),
            ),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.state.lock().viewports.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().screenshots.clone()
    }

    fn elapsed_report(&self) -> Option<(MockReport, Duration)> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|(report, loaded_at)| (report.clone(), loaded_at.elapsed()))
    }
}

#[async_trait]
impl ReportPage for MockPage {
    async fn navigate(&self, url: &str) -> ScanResult<()> {
        let report = self
            .reports
            .iter()
            .find(|(target, _)| self.template.replace("{url}", target) == url)
            .map(|(_, report)| report.clone());

        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        state.current = report.map(|report| (report, Instant::now()));
        Ok(())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> ScanResult<()> {
        self.state.lock().viewports.push(*viewport);
        Ok(())
    }

    async fn element_exists(&self, selector: &str) -> ScanResult<bool> {
        let Some((report, elapsed)) = self.elapsed_report() else {
            return Ok(false);
        };
        if !report.texts.contains_key(selector) {
            return Ok(false);
        }
        let score_selector = SelectorSet::default().score_value;
        if selector == score_selector {
            return Ok(report.score_delay.is_some_and(|delay| elapsed >= delay));
        }
        Ok(true)
    }

    async fn element_visibility(&self, _selector: &str) -> ScanResult<ElementVisibility> {
        let Some((report, elapsed)) = self.elapsed_report() else {
            return Ok(ElementVisibility::Absent);
        };
        match report.spinner {
            MockSpinner::Erroring => Err(ScanError::BrowserError(
                "visibility check failed".to_string(),
            )),
            MockSpinner::Absent => Ok(ElementVisibility::Absent),
            MockSpinner::HiddenAfter(delay) if elapsed >= delay => Ok(ElementVisibility::Hidden),
            MockSpinner::RemovedAfter(delay) if elapsed >= delay => Ok(ElementVisibility::Absent),
            _ => Ok(ElementVisibility::Visible),
        }
    }

    async fn text_of(&self, selector: &str) -> ScanResult<String> {
        self.elapsed_report()
            .and_then(|(report, _)| report.texts.get(selector).cloned())
            .ok_or_else(|| ScanError::ElementNotFound(selector.to_string()))
    }

    async fn save_screenshot(&self, path: &Path) -> ScanResult<()> {
        if self
            .elapsed_report()
            .is_some_and(|(report, _)| report.fail_screenshot)
        {
            return Err(ScanError::BrowserError("screenshot capture failed".to_string()));
        }
        std::fs::write(path, PNG_SIGNATURE)?;
        self.state.lock().screenshots.push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockLaunchFailure {
    NotFound,
    Crash,
}

struct MockSession {
    page: MockPage,
    stops: Arc<AtomicUsize>,
}

impl BrowserSession for MockSession {
    fn page(&self) -> &dyn ReportPage {
        &self.page
    }

    fn stop(self: Box<Self>) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct MockLauncher {
    page: MockPage,
    failure: Option<MockLaunchFailure>,
    launches: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(page: MockPage) -> Self {
        Self {
            page,
            failure: None,
            launches: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(failure: MockLaunchFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new(MockPage::new(Vec::new()))
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, _config: &ScanConfig) -> ScanResult<Box<dyn BrowserSession>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(MockLaunchFailure::NotFound) => {
                Err(ScanError::BrowserNotFound("chrome".to_string()))
            }
            Some(MockLaunchFailure::Crash) => {
                Err(ScanError::BrowserError("browser exited during startup".to_string()))
            }
            None => Ok(Box::new(MockSession {
                page: self.page.clone(),
                stops: Arc::clone(&self.stops),
            })),
        }
    }
}
