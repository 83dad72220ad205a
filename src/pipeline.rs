//! One complete CareerFind run
//!
//! Builds the target list, crawls it, saves the results to a file and the
//! results database, then sends the notification. Only a failed file save
//! stops a run; every other failure is logged and the run carries on.

use crate::config::Config;
use crate::crawler::{
    identify_target_pages, Coordinator, CrawlSettings, FetchError, FetchSettings, HttpFetcher,
    TargetError,
};
use crate::notify::{format_message, Notifier, TelegramNotifier, TELEGRAM_API_BASE};
use crate::output::{FileSink, OutputError, OutputFormat, ResultSink, SqliteSink};
use crate::results::{PageResult, ResultStore};
use crate::CrawlError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Where results are announced once saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NotifyMethod {
    #[default]
    Telegram,
    None,
}

/// What to search for and where to put the results
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub location: String,
    pub engines: String,
    pub linkedin: bool,
    /// Route requests through the configured proxy
    pub proxy: bool,
    pub verbose: bool,
    pub output_format: OutputFormat,
    pub notify: NotifyMethod,
    pub output_dir: PathBuf,
    /// Results database; `None` skips the database save
    pub database: Option<PathBuf>,
    pub telegram_api_base: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            location: String::new(),
            engines: "all".to_string(),
            linkedin: false,
            proxy: false,
            verbose: false,
            output_format: OutputFormat::Json,
            notify: NotifyMethod::Telegram,
            output_dir: PathBuf::from("."),
            database: Some(PathBuf::from("careerfind.db")),
            telegram_api_base: TELEGRAM_API_BASE.to_string(),
        }
    }
}

/// Errors that end a run early
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to identify target pages: {0}")]
    Targets(#[from] TargetError),

    #[error("failed to set up fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("failed to save results: {0}")]
    Save(#[source] OutputError),
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Pages in the target list
    pub pages: usize,
    /// Pages that yielded at least one email
    pub results: usize,
    pub saved_to: PathBuf,
    /// Some pages failed or the crawl was cancelled
    pub crawl_errors: bool,
    /// Rows written to the results database, if that save succeeded
    pub database_rows: Option<usize>,
    pub notified: bool,
}

/// Runs a complete search
///
/// # Flow
///
/// 1. Build the target page list
/// 2. Crawl it with the configured rate limit, retries and proxy
/// 3. Save the results to a timestamped file (fatal on failure)
/// 4. Append the results to the database (logged on failure)
/// 5. Send the Telegram notification if enabled (logged on failure)
pub async fn run_pipeline(
    config: &Config,
    options: &PipelineOptions,
    cancel: &CancellationToken,
) -> Result<PipelineReport, PipelineError> {
    let pages = identify_target_pages(&options.engines, options.linkedin, &options.location)?;
    if options.verbose {
        tracing::info!("Identified {} target pages for {}", pages.len(), options.location);
    }

    let proxy_address = match (options.proxy, config.proxy()) {
        (true, Some(address)) => Some(address.to_string()),
        (true, None) => {
            tracing::warn!("Proxy requested but no proxy address is configured; connecting directly");
            None
        }
        (false, _) => None,
    };

    let fetcher = HttpFetcher::new(&FetchSettings {
        user_agent: config.user_agent.clone(),
        request_timeout: config.request_timeout(),
        proxy_address,
    })?;

    let store = ResultStore::new();
    let coordinator = Coordinator::new(
        fetcher,
        store.clone(),
        CrawlSettings::from_config(config, options.verbose),
    );

    let crawl_errors = match coordinator.crawl(cancel, &pages).await {
        Ok(()) => false,
        Err(CrawlError::Cancelled) => {
            tracing::warn!("Crawl cancelled; saving the {} results collected so far", store.len());
            true
        }
        Err(e) => {
            tracing::warn!("Some errors occurred during email extraction: {}", e);
            true
        }
    };

    // Detached workers from a cancelled crawl may still hold the store
    drop(coordinator);
    let results = store.into_results();
    let saved_to = FileSink::new(options.output_format, &options.output_dir)
        .persist(&results)
        .map(PathBuf::from)
        .map_err(PipelineError::Save)?;

    let database_rows = options
        .database
        .as_deref()
        .and_then(|path| save_to_database(path, &results));

    let notified = match options.notify {
        NotifyMethod::Telegram => notify_telegram(config, options, &results).await,
        NotifyMethod::None => false,
    };

    Ok(PipelineReport {
        pages: pages.len(),
        results: results.len(),
        saved_to,
        crawl_errors,
        database_rows,
        notified,
    })
}

fn save_to_database(path: &Path, results: &[PageResult]) -> Option<usize> {
    let saved = SqliteSink::new(path).and_then(|sink| sink.persist(results).map(|_| results.len()));
    match saved {
        Ok(rows) => {
            tracing::info!("Saved {} results to database {}", rows, path.display());
            Some(rows)
        }
        Err(e) => {
            tracing::error!("Failed to save results to database: {}", e);
            None
        }
    }
}

async fn notify_telegram(config: &Config, options: &PipelineOptions, results: &[PageResult]) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to send Telegram notification: {}", e);
            return false;
        }
    };

    let notifier = TelegramNotifier::new(
        client,
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    )
    .with_api_base(options.telegram_api_base.clone());

    match notifier.send(&format_message(results)).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to send Telegram notification: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_location_stops_run() {
        let dir = TempDir::new().unwrap();
        let options = PipelineOptions {
            location: "  ".to_string(),
            output_dir: dir.path().to_path_buf(),
            database: None,
            notify: NotifyMethod::None,
            ..PipelineOptions::default()
        };

        let err = run_pipeline(&Config::default(), &options, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Targets(TargetError::EmptyLocation)));
    }

    #[tokio::test]
    async fn test_cancelled_run_with_no_results_fails_to_save() {
        let dir = TempDir::new().unwrap();
        let options = PipelineOptions {
            location: "Berlin".to_string(),
            engines: "bing".to_string(),
            output_dir: dir.path().to_path_buf(),
            database: Some(dir.path().join("results.db")),
            notify: NotifyMethod::None,
            ..PipelineOptions::default()
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_pipeline(&Config::default(), &options, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Save(OutputError::NoResults)));
        assert_eq!(err.to_string(), "failed to save results: no results to save");
        assert!(!dir.path().join("results.db").exists());
    }

    #[test]
    fn test_database_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let result = PageResult::new(vec!["a@b.test".to_string()], "loc", "src");
        let unopenable = dir.path().join("missing/dir/results.db");

        assert_eq!(save_to_database(&unopenable, &[result.clone()]), None);
        assert_eq!(save_to_database(&dir.path().join("ok.db"), &[result]), Some(1));
    }

    #[tokio::test]
    async fn test_telegram_without_credentials_is_not_fatal() {
        let result = PageResult::new(vec!["a@b.test".to_string()], "loc", "src");
        let notified = notify_telegram(&Config::default(), &PipelineOptions::default(), &[result]).await;
        assert!(!notified);
    }
}
