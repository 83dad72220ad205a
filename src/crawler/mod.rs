//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Target page generation from a location and search engines
//! - HTTP fetching through an optional SOCKS5 proxy
//! - Retry with exponential backoff
//! - Rate-limited, cancellable crawl coordination

mod coordinator;
mod fetcher;
mod retry;
mod targets;

pub use coordinator::{Coordinator, CrawlSettings};
pub use fetcher::{build_http_client, FetchError, FetchSettings, FetchedPage, HttpFetcher, PageFetcher};
pub use retry::{RetryPolicy, Retryable};
pub use targets::{identify_target_pages, parse_engines, SearchEngine, TargetError};
