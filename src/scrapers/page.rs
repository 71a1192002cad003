use crate::core::{ScanConfig, ScanResult, Viewport};
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementVisibility {
    Absent,
    Hidden,
    Visible,
}

impl ElementVisibility {
    pub fn is_gone(&self) -> bool {
        !matches!(self, ElementVisibility::Visible)
    }
}

/// The operations the scrape worker issues against one browser tab.
#[async_trait]
pub trait ReportPage: Send + Sync {
    async fn navigate(&self, url: &str) -> ScanResult<()>;
    async fn set_viewport(&self, viewport: &Viewport) -> ScanResult<()>;
    async fn element_exists(&self, selector: &str) -> ScanResult<bool>;
    async fn element_visibility(&self, selector: &str) -> ScanResult<ElementVisibility>;
    async fn text_of(&self, selector: &str) -> ScanResult<String>;
    async fn save_screenshot(&self, path: &Path) -> ScanResult<()>;
}

/// A running browser owning the single reusable tab.
pub trait BrowserSession: Send {
    fn page(&self) -> &dyn ReportPage;

    /// Releases the browser without waiting for the process to exit.
    fn stop(self: Box<Self>);
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, config: &ScanConfig) -> ScanResult<Box<dyn BrowserSession>>;
}
