//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Rate-limited launch of one worker task per target page
//! - Cancellation between launches
//! - Per-page fetch with retry and exponential backoff
//! - Email extraction and result collection
//! - Aggregation of every worker's failure into a single error

use crate::config::Config;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::retry::RetryPolicy;
use crate::extract::extract_from_html;
use crate::results::{PageResult, ResultStore};
use crate::{AggregateError, CrawlError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Knobs that shape a crawl run
#[derive(Debug, Clone, Copy)]
pub struct CrawlSettings {
    /// Minimum time between two worker launches
    pub rate_limit: Duration,

    /// How failed fetches are retried
    pub retry: RetryPolicy,

    /// Log every attempt, retry and found email
    pub verbose: bool,
}

impl CrawlSettings {
    /// Derives crawl settings from the validated configuration
    pub fn from_config(config: &Config, verbose: bool) -> Self {
        Self {
            rate_limit: config.rate_limit(),
            retry: RetryPolicy::new(config.max_retries),
            verbose,
        }
    }
}

/// Main crawler coordinator structure
///
/// Owns the fetcher, the shared result store and the crawl settings. Every
/// worker gets its own clone of the fetcher and of the store handle.
pub struct Coordinator<F: PageFetcher> {
    fetcher: F,
    store: ResultStore,
    settings: CrawlSettings,
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a new coordinator instance
    pub fn new(fetcher: F, store: ResultStore, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            store,
            settings,
        }
    }

    /// The store results are appended to
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Crawls every page, launching one worker per rate-limit tick
    ///
    /// # Flow
    ///
    /// 1. Wait for the next tick (the first one fires one interval after the
    ///    call) or for cancellation, whichever comes first
    /// 2. On a tick, spawn a worker for the next page; workers run
    ///    concurrently and are not otherwise capped
    /// 3. On cancellation, return [`CrawlError::Cancelled`] at once; workers
    ///    already launched keep running detached
    /// 4. Once every page is launched, wait for all workers, then drain their
    ///    errors in completion order into one [`AggregateError`]
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every page was attempted and none failed terminally
    /// * `Err(CrawlError::Cancelled)` - Cancelled before all pages launched
    /// * `Err(CrawlError::Aggregate)` - At least one page failed
    pub async fn crawl(&self, cancel: &CancellationToken, pages: &[String]) -> Result<(), CrawlError> {
        if pages.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            "Starting crawl of {} pages ({}ms between launches)",
            pages.len(),
            self.settings.rate_limit.as_millis()
        );

        // Each worker reports at most once, so this never blocks a sender
        let (error_tx, mut error_rx) = mpsc::channel(pages.len());

        let period = self.settings.rate_limit.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(pages.len());

        for (index, page) in pages.iter().enumerate() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(
                        "Crawl cancelled after launching {} of {} pages",
                        index,
                        pages.len()
                    );
                    return Err(CrawlError::Cancelled);
                }
                _ = ticker.tick() => {
                    if self.settings.verbose {
                        tracing::info!("Launching worker {}/{} for {}", index + 1, pages.len(), page);
                    }
                    let worker = Worker {
                        fetcher: self.fetcher.clone(),
                        store: self.store.clone(),
                        retry: self.settings.retry,
                        verbose: self.settings.verbose,
                        errors: error_tx.clone(),
                    };
                    workers.push(spawn_reporting(worker, page.clone(), error_tx.clone()));
                }
            }
        }

        drop(error_tx);

        for handle in workers {
            // spawn_reporting never panics itself
            let _ = handle.await;
        }

        let mut errors = Vec::new();
        while let Some(message) = error_rx.recv().await {
            errors.push(message);
        }

        tracing::debug!(
            "Crawl finished: {} results, {} failed pages",
            self.store.len(),
            errors.len()
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CrawlError::Aggregate(AggregateError { errors }))
        }
    }
}

/// Spawns `worker` for `page` behind a supervising task
///
/// A worker that panics is reported on `errors` the moment it dies, so its
/// failure keeps its place in completion order.
fn spawn_reporting<F: PageFetcher>(
    worker: Worker<F>,
    page: String,
    errors: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::spawn(worker.run(page.clone())).await {
            tracing::error!("Worker for {} did not finish: {}", page, e);
            let _ = errors.try_send(format!("page {}: worker failed: {}", page, e));
        }
    })
}

/// Everything one spawned worker needs, owned so the task is `'static`
struct Worker<F: PageFetcher> {
    fetcher: F,
    store: ResultStore,
    retry: RetryPolicy,
    verbose: bool,
    errors: mpsc::Sender<String>,
}

impl<F: PageFetcher> Worker<F> {
    /// Fetches one page (with retries), extracts emails and records the outcome
    async fn run(self, page: String) {
        let fetcher = &self.fetcher;
        let url = page.as_str();
        let verbose = self.verbose;
        let max_retries = self.retry.max_retries;
        let mut attempt = 0u32;

        let outcome = self
            .retry
            .run(
                move || {
                    attempt += 1;
                    if verbose {
                        tracing::info!("Visiting {} (attempt {})", url, attempt);
                    }
                    fetcher.fetch(url)
                },
                move |retry, error, delay| {
                    if verbose {
                        tracing::info!(
                            "Retrying {} (attempt {}/{}) in {:?}: {}",
                            url,
                            retry,
                            max_retries,
                            delay,
                            error
                        );
                    }
                },
            )
            .await;

        match outcome {
            Ok(fetched) => {
                let emails = extract_from_html(&fetched.body);
                if emails.is_empty() {
                    if verbose {
                        tracing::info!("No emails found on {}", fetched.final_url);
                    }
                    return;
                }

                if verbose {
                    tracing::info!(
                        "Found {} unique email(s) on {}",
                        emails.len(),
                        fetched.final_url
                    );
                    for email in &emails {
                        tracing::info!("- {}", email);
                    }
                }

                self.store
                    .append(PageResult::new(emails, page.clone(), fetched.final_url));
            }
            Err(error) => {
                tracing::warn!("Giving up on {}: {}", page, error);
                // Capacity equals the page count; this only fails once the
                // coordinator has stopped listening after a cancellation.
                let _ = self.errors.try_send(format!("page {}: {}", page, error));
            }
        }
    }
}
