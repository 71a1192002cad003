use super::page::{BrowserLauncher, BrowserSession, ElementVisibility, ReportPage};
use crate::core::{ScanConfig, ScanError, ScanResult, Viewport};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, info};
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;

const CHROME_ENV_VAR: &str = "CHROME";

impl From<CdpError> for ScanError {
    fn from(err: CdpError) -> Self {
        ScanError::BrowserError(err.to_string())
    }
}

fn is_missing_executable(err: &CdpError) -> bool {
    if let CdpError::Io(io) = err {
        return io.kind() == std::io::ErrorKind::NotFound;
    }
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::NotFound {
                return true;
            }
        }
        source = current.source();
    }
    false
}

/// Quotes a selector as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl ReportPage for ChromePage {
    async fn navigate(&self, url: &str) -> ScanResult<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> ScanResult<()> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            viewport.device_scale_factor,
            viewport.mobile,
        );
        self.page.execute(params).await?;
        Ok(())
    }

    async fn element_exists(&self, selector: &str) -> ScanResult<bool> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        let exists = self.page.evaluate(script).await?.into_value::<bool>()?;
        Ok(exists)
    }

    async fn element_visibility(&self, selector: &str) -> ScanResult<ElementVisibility> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return "absent";
                const style = window.getComputedStyle(el);
                return (style.display === "none" || style.visibility === "hidden") ? "hidden" : "visible";
            }})()"#,
            js_string(selector)
        );
        let state = self.page.evaluate(script).await?.into_value::<String>()?;
        Ok(match state.as_str() {
            "absent" => ElementVisibility::Absent,
            "hidden" => ElementVisibility::Hidden,
            _ => ElementVisibility::Visible,
        })
    }

    async fn text_of(&self, selector: &str) -> ScanResult<String> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| ScanError::ElementNotFound(format!("{}: {}", selector, e)))?;
        element
            .inner_text()
            .await?
            .ok_or_else(|| ScanError::ElementNotFound(format!("{}: no text", selector)))
    }

    async fn save_screenshot(&self, path: &Path) -> ScanResult<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page.save_screenshot(params, path).await?;
        Ok(())
    }
}

pub struct ChromeSession {
    browser: Browser,
    page: ChromePage,
    handler_task: JoinHandle<()>,
}

impl BrowserSession for ChromeSession {
    fn page(&self) -> &dyn ReportPage {
        &self.page
    }

    fn stop(self: Box<Self>) {
        let ChromeSession {
            browser,
            page,
            handler_task,
        } = *self;
        drop(page);
        // Dropping the browser kills the child process in the background.
        drop(browser);
        handler_task.abort();
        info!("Browser stopped");
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }

    fn executable(config: &ScanConfig) -> Option<PathBuf> {
        config
            .chrome_executable
            .clone()
            .or_else(|| std::env::var_os(CHROME_ENV_VAR).map(PathBuf::from))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, config: &ScanConfig) -> ScanResult<Box<dyn BrowserSession>> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport.width, config.viewport.height);

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(path) = Self::executable(config) {
            if !path.exists() {
                return Err(ScanError::BrowserNotFound(path.display().to_string()));
            }
            builder = builder.chrome_executable(path);
        }

        // Without an explicit executable the builder only fails when auto-detection finds none.
        let browser_config = builder.build().map_err(ScanError::BrowserNotFound)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            if is_missing_executable(&e) {
                ScanError::BrowserNotFound(e.to_string())
            } else {
                ScanError::from(e)
            }
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };

        Ok(Box::new(ChromeSession {
            browser,
            page: ChromePage::new(page),
            handler_task,
        }))
    }
}
