//! Daily automated search
//!
//! Runs the pipeline once a day at midnight UTC with a fixed set of search
//! options, until cancelled.

use crate::config::Config;
use crate::output::OutputFormat;
use crate::pipeline::{run_pipeline, NotifyMethod, PipelineOptions};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options used by every automated run
///
/// Searches worldwide on Google and Bing through the proxy, with verbose
/// logging, JSON output and a Telegram notification.
pub fn automation_options(output_dir: PathBuf, database: Option<PathBuf>) -> PipelineOptions {
    PipelineOptions {
        location: "worldwide".to_string(),
        engines: "google,bing".to_string(),
        linkedin: false,
        proxy: true,
        verbose: true,
        output_format: OutputFormat::Json,
        notify: NotifyMethod::Telegram,
        output_dir,
        database,
        ..PipelineOptions::default()
    }
}

/// Time left until the next midnight UTC strictly after `now`
///
/// # Example
///
/// ```
/// use careerfind::automation::duration_until_next_midnight;
/// use chrono::{TimeZone, Utc};
/// use std::time::Duration;
///
/// let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
/// assert_eq!(duration_until_next_midnight(now), Duration::from_secs(3600));
/// ```
pub fn duration_until_next_midnight(now: DateTime<Utc>) -> Duration {
    let tomorrow = now.date_naive() + ChronoDuration::days(1);
    let midnight = tomorrow.and_time(NaiveTime::MIN).and_utc();
    (midnight - now).to_std().unwrap_or(Duration::ZERO)
}

/// Runs the automated search every day at midnight UTC until `cancel` fires
///
/// A failed run is logged and the schedule continues.
pub async fn run_daily(config: &Config, options: &PipelineOptions, cancel: &CancellationToken) {
    tracing::info!("Automation scheduled - will run daily at midnight UTC");

    loop {
        let wait = duration_until_next_midnight(Utc::now());
        tracing::info!("Next automated search in {}s", wait.as_secs());

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Automation stopped");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        tracing::info!("Starting automated search for {}", options.location);
        match run_pipeline(config, options, cancel).await {
            Ok(report) => tracing::info!(
                "Automated search finished: {} results from {} pages saved to {}",
                report.results,
                report.pages,
                report.saved_to.display()
            ),
            Err(e) => tracing::error!("Automated search failed: {}", e),
        }
    }
}
