pub mod chrome;
pub mod mock_page;
mod page;
mod worker;


pub use chrome::{ChromeLauncher, ChromePage};
pub use mock_page::{MockLauncher, MockPage, MockReport, MockSpinner};
pub use page::{BrowserLauncher, BrowserSession, ElementVisibility, ReportPage};
pub use worker::{normalize_label, ScrapeWorker};
