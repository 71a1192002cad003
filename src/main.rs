use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;
use wavescan::core::SleepWindow;
use wavescan::{logging, report, ChromeLauncher, ScanConfig, ScanOutcome, Scanner};

#[derive(Debug, Parser)]
#[command(
    name = "wavescan",
    version,
    about = "Run WAVE accessibility scans on a list of URLs and report the results"
)]
struct Cli {
    /// off, error, warn, info, debug or trace.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape every URL in the input file and append the results.
    Scan {
        #[arg(long, value_name = "FILE", default_value = "urls.txt")]
        urls: PathBuf,

        #[arg(long, value_name = "FILE", default_value = "results.csv")]
        csv: PathBuf,

        #[arg(long, value_name = "FILE", default_value = "results.jsonl")]
        jsonl: PathBuf,

        #[arg(long, value_name = "DIR", default_value = "screenshots")]
        screenshots: PathBuf,

        /// Minimum time (in seconds) to wait for the page to settle.
        #[arg(long, value_name = "SECS", default_value_t = 5)]
        min_sleep: u64,

        /// Maximum time (in seconds) to wait for the page to settle.
        #[arg(long, value_name = "SECS", default_value_t = 35)]
        max_sleep: u64,

        /// Path to the Chrome or Chromium executable.
        #[arg(long, value_name = "PATH")]
        chrome: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        headless: bool,
    },
    /// Render the HTML dashboard from the results table.
    Report {
        #[arg(short, long, value_name = "FILE", default_value = "results.csv")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE", default_value = "report.html")]
        output: PathBuf,
    },
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level '{}'", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Scan {
            urls,
            csv,
            jsonl,
            screenshots,
            min_sleep,
            max_sleep,
            chrome,
            headless,
        } => {
            let sleep_window = SleepWindow::new(min_sleep, max_sleep)
                .context("--min-sleep cannot be greater than --max-sleep")?;
            let config = ScanConfig::default()
                .with_urls_file(urls)
                .with_table_file(csv)
                .with_log_file(jsonl)
                .with_screenshots_dir(screenshots)
                .with_sleep_window(sleep_window)
                .with_chrome_executable(chrome)
                .with_headless(headless);

            let scanner = Scanner::new(config, Box::new(ChromeLauncher::new()))?;
            // Launch failures are already reported by the scanner.
            match scanner.run().await {
                Ok(ScanOutcome::NoUrls) | Err(_) => Ok(ExitCode::FAILURE),
                Ok(ScanOutcome::Completed(_) | ScanOutcome::Interrupted(_)) => Ok(ExitCode::SUCCESS),
            }
        }
        Command::Report { input, output } => {
            report::generate_report(&input, &output)
                .with_context(|| format!("failed to generate report from {}", input.display()))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
