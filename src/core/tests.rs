use super::*;
use crate::scrapers::mock_page::MockLaunchFailure;
use crate::scrapers::{MockLauncher, MockPage, MockReport, MockSpinner};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(urls: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("urls.txt"), urls).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_urls_file(self.path("urls.txt"))
            .with_table_file(self.path("results.csv"))
            .with_log_file(self.path("results.jsonl"))
            .with_screenshots_dir(self.path("screenshots"))
            .with_sleep_window(SleepWindow::new(0, 1).unwrap())
    }

    fn table_rows(&self) -> Vec<Vec<String>> {
        read_table(&self.path("results.csv"))
    }

    fn log_records(&self) -> Vec<ScrapeRecord> {
        match fs::read_to_string(self.path("results.jsonl")) {
            Ok(content) => content
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn read_table(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_single_url_writes_one_row_in_column_order() {
    let ws = Workspace::new("https://site.com\n");
    let page = MockPage::new(vec![(
        "https://site.com",
        MockReport::wave([3, 0, 5, 2, 10, 1], 87.5),
    )]);
    let launcher = MockLauncher::new(page);
    let scanner = Scanner::new(ws.config(), Box::new(launcher.clone())).unwrap();

    let outcome = scanner.run_until(std::future::pending()).await.unwrap();

    let ScanOutcome::Completed(stats) = outcome else {
        panic!("expected a completed scan");
    };
    assert_eq!(stats.successful_urls, 1);
    assert_eq!(launcher.launches(), 1);
    assert_eq!(launcher.stops(), 1);

    let rows = ws.table_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "url");
    assert_eq!(rows[1][0], "https://site.com");
    assert_eq!(&rows[1][4..], &["3", "0", "5", "2", "10", "1", "87.5"]);

    let logged = ws.log_records();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].metrics.len(), 7);
    assert_eq!(logged[0].screenshot_path, rows[1][3]);
    assert!(Path::new(&rows[1][3]).exists());
}

#[tokio::test(start_paused = true)]
async fn test_failed_url_is_skipped_and_batch_continues() {
    let ws = Workspace::new("https://broken.com\nhttps://ok.com\n");
    let page = MockPage::new(vec![
        (
            "https://broken.com",
            MockReport::wave([1; 6], 10.0).with_text("li#error span", "oops"),
        ),
        ("https://ok.com", MockReport::wave([2; 6], 20.0)),
    ]);
    let scanner = Scanner::new(ws.config(), Box::new(MockLauncher::new(page))).unwrap();

    let outcome = scanner.run_until(std::future::pending()).await.unwrap();

    let ScanOutcome::Completed(stats) = outcome else {
        panic!("expected a completed scan");
    };
    assert_eq!(stats.total_urls, 2);
    assert_eq!(stats.failed_urls, 1);
    assert_eq!(stats.successful_urls, 1);

    let rows = ws.table_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "https://ok.com");

    let logged = ws.log_records();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].url, "https://ok.com");
}

#[tokio::test(start_paused = true)]
async fn test_stuck_spinner_still_records_row() {
    let ws = Workspace::new("https://slow.com\n");
    let page = MockPage::new(vec![(
        "https://slow.com",
        MockReport::wave([4; 6], 60.0).with_spinner(MockSpinner::Stuck),
    )]);
    let scanner = Scanner::new(ws.config(), Box::new(MockLauncher::new(page.clone()))).unwrap();

    let outcome = scanner.run_until(std::future::pending()).await.unwrap();

    let ScanOutcome::Completed(stats) = outcome else {
        panic!("expected a completed scan");
    };
    assert_eq!(stats.degraded_waits, 1);
    assert_eq!(page.screenshots().len(), 1);
    assert_eq!(ws.table_rows().len(), 2);
}

#[tokio::test]
async fn test_empty_source_stops_before_launching_browser() {
    let ws = Workspace::new("\n   \n\t\n");
    let launcher = MockLauncher::new(MockPage::new(Vec::new()));
    let scanner = Scanner::new(ws.config(), Box::new(launcher.clone())).unwrap();

    let outcome = scanner.run_until(std::future::pending()).await.unwrap();

    assert!(matches!(outcome, ScanOutcome::NoUrls));
    assert_eq!(launcher.launches(), 0);
    // Init still prepares the table and screenshot folder.
    assert!(ws.path("screenshots").is_dir());
    assert_eq!(ws.table_rows().len(), 1);
}

#[tokio::test]
async fn test_missing_source_stops_before_launching_browser() {
    let ws = Workspace::new("");
    let launcher = MockLauncher::new(MockPage::new(Vec::new()));
    let config = ws.config().with_urls_file(ws.path("nope.txt"));
    let scanner = Scanner::new(config, Box::new(launcher.clone())).unwrap();

    let outcome = scanner.run_until(std::future::pending()).await.unwrap();

    assert!(matches!(outcome, ScanOutcome::NoUrls));
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test]
async fn test_missing_browser_aborts_with_distinct_error() {
    let ws = Workspace::new("https://site.com\n");
    let scanner = Scanner::new(
        ws.config(),
        Box::new(MockLauncher::failing(MockLaunchFailure::NotFound)),
    )
    .unwrap();

    let result = scanner.run_until(std::future::pending()).await;

    assert!(matches!(result, Err(ScanError::BrowserNotFound(_))));
    assert!(ws.log_records().is_empty());
    assert_eq!(ws.table_rows().len(), 1);
}

#[tokio::test]
async fn test_browser_crash_aborts_run() {
    let ws = Workspace::new("https://site.com\n");
    let scanner = Scanner::new(
        ws.config(),
        Box::new(MockLauncher::failing(MockLaunchFailure::Crash)),
    )
    .unwrap();

    let result = scanner.run_until(std::future::pending()).await;

    assert!(matches!(result, Err(ScanError::BrowserError(_))));
    assert_eq!(scanner.stats().get_stats().total_urls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_all_records_share_run_timestamp() {
    let ws = Workspace::new("a.com\nb.com\nc.com\n");
    let page = MockPage::new(vec![
        ("a.com", MockReport::wave([1; 6], 1.0)),
        (
            "b.com",
            MockReport::wave([1; 6], 1.0).with_score_delay(Some(Duration::from_secs(50))),
        ),
        ("c.com", MockReport::wave([1; 6], 1.0).with_spinner(MockSpinner::Stuck)),
    ]);
    let scanner = Scanner::new(ws.config(), Box::new(MockLauncher::new(page))).unwrap();

    scanner.run_until(std::future::pending()).await.unwrap();

    let logged = ws.log_records();
    assert_eq!(logged.len(), 3);
    assert!(logged
        .iter()
        .all(|r| r.run_timestamp_unix == logged[0].run_timestamp_unix
            && r.run_timestamp_human == logged[0].run_timestamp_human));

    let rows = ws.table_rows();
    assert!(rows[1..].iter().all(|row| row[1] == rows[1][1] && row[2] == rows[1][2]));
}

#[tokio::test(start_paused = true)]
async fn test_urls_processed_in_file_order() {
    let ws = Workspace::new("b.com\na.com\n");
    let page = MockPage::new(vec![
        ("a.com", MockReport::wave([1; 6], 1.0)),
        ("b.com", MockReport::wave([1; 6], 1.0)),
    ]);
    let scanner = Scanner::new(ws.config(), Box::new(MockLauncher::new(page.clone()))).unwrap();

    scanner.run_until(std::future::pending()).await.unwrap();

    assert_eq!(
        page.navigations(),
        vec![
            "https://wave.webaim.org/report#/b.com",
            "https://wave.webaim.org/report#/a.com"
        ]
    );
    let urls: Vec<_> = ws.log_records().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec!["b.com", "a.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_second_run_appends_without_new_header() {
    let ws = Workspace::new("a.com\n");
    let page = MockPage::new(vec![("a.com", MockReport::wave([1; 6], 1.0))]);

    for _ in 0..2 {
        let scanner =
            Scanner::new(ws.config(), Box::new(MockLauncher::new(page.clone()))).unwrap();
        scanner.run_until(std::future::pending()).await.unwrap();
    }

    let rows = ws.table_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|row| row[0] == "url").count(), 1);
    assert_ne!(rows[1][3], rows[2][3]);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_stops_batch_and_releases_browser() {
    let ws = Workspace::new("a.com\nb.com\nc.com\n");
    let page = MockPage::new(vec![
        ("a.com", MockReport::wave([1; 6], 1.0).with_score_delay(None)),
        ("b.com", MockReport::wave([1; 6], 1.0).with_score_delay(None)),
        ("c.com", MockReport::wave([1; 6], 1.0).with_score_delay(None)),
    ]);
    let launcher = MockLauncher::new(page.clone());
    let scanner = Scanner::new(ws.config(), Box::new(launcher.clone())).unwrap();

    let outcome = scanner
        .run_until(tokio::time::sleep(Duration::from_secs(90)))
        .await
        .unwrap();

    assert!(matches!(outcome, ScanOutcome::Interrupted(_)));
    assert_eq!(launcher.stops(), 1);
    assert!(page.navigations().len() < 3);
    assert!(ws.log_records().is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ScanConfig {
        sleep_window: SleepWindow {
            min_secs: 10,
            max_secs: 2,
        },
        ..Default::default()
    };
    let result = Scanner::new(config, Box::new(MockLauncher::new(MockPage::new(Vec::new()))));
    assert!(matches!(result, Err(ScanError::ConfigError(_))));
}
