//! CareerFind: a rate-limited career email crawler
//!
//! This crate searches job and career pages for a location, extracts the
//! email addresses they publish, and saves the results to files, a SQLite
//! database, and optionally a Telegram chat.

pub mod automation;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod results;

use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),
}

/// Errors returned by a crawl run
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Cancellation arrived before every page was launched
    #[error("crawl cancelled")]
    Cancelled,

    /// One or more pages failed terminally
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Every terminal page failure from one crawl, in completion order
#[derive(Debug, Clone, Error)]
#[error("multiple errors occurred: {}", .errors.join("; "))]
pub struct AggregateError {
    pub errors: Vec<String>,
}

impl AggregateError {
    /// Number of failed pages
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlSettings, HttpFetcher, PageFetcher, RetryPolicy};
pub use results::{PageResult, ResultStore};
