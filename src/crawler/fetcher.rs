//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with a browser-like user agent and header set
//! - Routing connections through an optional SOCKS5 proxy
//! - GET requests bounded by the configured timeout
//! - Error classification (proxy setup vs. per-page failures)
//!
//! The fetcher never retries. Retrying is the coordinator's job.

use crate::crawler::retry::Retryable;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The proxy could not be configured or reached
    #[error("proxy setup failed for {address}: {message}")]
    ProxySetup { address: String, message: String },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Returns true for errors raised before any page request was sent
    ///
    /// Covers an unreachable proxy and an HTTP client that could not be
    /// built. Neither is retryable.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::ProxySetup { .. } | Self::Client(_))
    }
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        !self.is_setup()
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Settings needed to build an [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// User agent sent with every request
    pub user_agent: String,

    /// Deadline for each request
    pub request_timeout: Duration,

    /// SOCKS5 proxy `host:port`; `None` connects directly
    pub proxy_address: Option<String>,
}

/// Fetches the raw content of a single URL
///
/// Implementations are shared by every crawl worker, so they must be cheap
/// to clone and safe to use from many tasks at once.
pub trait PageFetcher: Send + Sync + Clone + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with the configured identity and proxy
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(FetchError::ProxySetup)` - The proxy address is unusable
/// * `Err(FetchError::Client)` - Any other client construction failure
///
/// # Example
///
/// ```no_run
/// use careerfind::crawler::{build_http_client, FetchSettings};
/// use std::time::Duration;
///
/// let settings = FetchSettings {
///     user_agent: "Mozilla/5.0".to_string(),
///     request_timeout: Duration::from_secs(30),
///     proxy_address: None,
/// };
///
/// let client = build_http_client(&settings).unwrap();
/// ```
pub fn build_http_client(settings: &FetchSettings) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

    let mut builder = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .default_headers(headers)
        .timeout(settings.request_timeout)
        .connect_timeout(settings.request_timeout.min(MAX_CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true);

    if let Some(address) = &settings.proxy_address {
        // socks5h resolves hostnames on the proxy side
        let proxy = Proxy::all(format!("socks5h://{}", address)).map_err(|e| {
            FetchError::ProxySetup {
                address: address.clone(),
                message: e.to_string(),
            }
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}

/// [`PageFetcher`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    request_timeout: Duration,
    proxy_address: Option<String>,
}

impl HttpFetcher {
    /// Creates a fetcher from the given settings
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(settings)?,
            request_timeout: settings.request_timeout,
            proxy_address: settings.proxy_address.clone(),
        })
    }

    /// Returns true if requests are routed through a proxy
    pub fn uses_proxy(&self) -> bool {
        self.proxy_address.is_some()
    }

    /// Checks that the proxy accepts TCP connections before a page is requested
    ///
    /// This is a reachability check only: the connection is dropped at once
    /// and reqwest opens its own for the request, so every attempt costs two
    /// connections to the proxy. A proxy that accepts TCP but fails the SOCKS
    /// handshake passes this check and the failure surfaces from the request
    /// itself as a retryable [`FetchError::Request`].
    async fn connect_proxy(&self, address: &str) -> Result<(), FetchError> {
        let setup_error = |message: String| FetchError::ProxySetup {
            address: address.to_string(),
            message,
        };

        match tokio::time::timeout(self.request_timeout, TcpStream::connect(address)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(setup_error(e.to_string())),
            Err(_) => Err(setup_error(format!(
                "no connection within {}s",
                self.request_timeout.as_secs()
            ))),
        }
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if let Some(address) = &self.proxy_address {
            self.connect_proxy(address).await?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}
