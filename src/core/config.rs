use super::{ScanError, ScanResult};
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REPORT_URL_TEMPLATE: &str = "https://wave.webaim.org/report#/{url}";

/// Inclusive window, in whole seconds, for the settle delay after navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl SleepWindow {
    pub fn new(min_secs: u64, max_secs: u64) -> ScanResult<Self> {
        if min_secs > max_secs {
            return Err(ScanError::ConfigError(format!(
                "min sleep ({}s) cannot be greater than max sleep ({}s)",
                min_secs, max_secs
            )));
        }
        Ok(Self { min_secs, max_secs })
    }

    pub fn sample(&self) -> Duration {
        let secs = rand::rng().random_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

impl Default for SleepWindow {
    fn default() -> Self {
        Self {
            min_secs: 5,
            max_secs: 35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: 1.0,
            mobile: false,
        }
    }
}

/// CSS selectors addressing the parts of the report page the worker reads.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub score_value: String,
    pub score_label: String,
    pub loading_indicator: String,
    /// Count fields in extraction order, paired with the label they are stored under.
    pub counts: Vec<(String, String)>,
}

impl Default for SelectorSet {
    fn default() -> Self {
        let counts = [
            ("Errors", "li#error span"),
            ("Contrast Errors", "li#contrastnum span"),
            ("Alerts", "li#alert span"),
            ("Features", "li#feature span"),
            ("Structure", "li#structure span"),
            ("ARIA", "li#aria span"),
        ]
        .into_iter()
        .map(|(label, selector)| (label.to_string(), selector.to_string()))
        .collect();

        Self {
            score_value: "span#aim-score-value".to_string(),
            score_label: "span#aim-score-label".to_string(),
            loading_indicator: "#wave5_loading".to_string(),
            counts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub urls_file: PathBuf,
    pub table_file: PathBuf,
    pub log_file: PathBuf,
    pub screenshots_dir: PathBuf,
    pub sleep_window: SleepWindow,
    pub report_url_template: String,
    pub score_timeout: Duration,
    pub spinner_timeout: Duration,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub viewport: Viewport,
    pub selectors: SelectorSet,
    pub chrome_executable: Option<PathBuf>,
    pub headless: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            urls_file: PathBuf::from("urls.txt"),
            table_file: PathBuf::from("results.csv"),
            log_file: PathBuf::from("results.jsonl"),
            screenshots_dir: PathBuf::from("screenshots"),
            sleep_window: SleepWindow::default(),
            report_url_template: DEFAULT_REPORT_URL_TEMPLATE.to_string(),
            score_timeout: Duration::from_secs(60),
            spinner_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            settle_delay: Duration::from_secs(1),
            viewport: Viewport::default(),
            selectors: SelectorSet::default(),
            chrome_executable: None,
            headless: false,
        }
    }
}

impl ScanConfig {
    pub fn with_urls_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.urls_file = path.into();
        self
    }

    pub fn with_table_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.table_file = path.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    pub fn with_screenshots_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshots_dir = path.into();
        self
    }

    pub fn with_sleep_window(mut self, window: SleepWindow) -> Self {
        self.sleep_window = window;
        self
    }

    pub fn with_report_url_template(mut self, template: impl Into<String>) -> Self {
        self.report_url_template = template.into();
        self
    }

    pub fn with_score_timeout(mut self, timeout: Duration) -> Self {
        self.score_timeout = timeout;
        self
    }

    pub fn with_spinner_timeout(mut self, timeout: Duration) -> Self {
        self.spinner_timeout = timeout;
        self
    }

    pub fn with_selectors(mut self, selectors: SelectorSet) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_chrome_executable(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_executable = path;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn validate(&self) -> ScanResult<()> {
        SleepWindow::new(self.sleep_window.min_secs, self.sleep_window.max_secs)?;
        if !self.report_url_template.contains("{url}") {
            return Err(ScanError::ConfigError(format!(
                "report URL template '{}' has no {{url}} placeholder",
                self.report_url_template
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(ScanError::ConfigError(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Embeds the raw target URL into the report endpoint. No encoding is applied.
    pub fn report_url(&self, url: &str) -> String {
        self.report_url_template.replace("{url}", url)
    }
}
