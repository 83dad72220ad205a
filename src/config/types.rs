use serde::Deserialize;
use std::time::Duration;

/// User agent used when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default delay between worker launches in milliseconds
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Default number of retries after a failed fetch
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Main configuration structure for CareerFind
///
/// Built once at startup, validated, and then passed by reference to every
/// component that needs it. Nothing reads configuration from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Telegram bot token used for notifications
    pub telegram_bot_token: String,

    /// Telegram chat ID that receives notifications
    pub telegram_chat_id: String,

    /// SOCKS5 proxy address (`host:port`), empty when unused
    pub proxy_address: String,

    /// Per-request timeout (seconds)
    pub request_timeout_seconds: u64,

    /// Minimum time between launching two page fetches (milliseconds)
    pub rate_limit_ms: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Retries after the first failed fetch of a page
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            proxy_address: String::new(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Config {
    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Launch interval as a `Duration`
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// The proxy address, if one is configured
    pub fn proxy(&self) -> Option<&str> {
        let address = self.proxy_address.trim();
        (!address.is_empty()).then_some(address)
    }

    /// Returns true if both Telegram credentials are present
    pub fn has_telegram_credentials(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }

    /// Overrides every field that the config file sets
    pub(crate) fn apply_file(&mut self, file: FileConfig) {
        if let Some(token) = file.telegram_bot_token {
            self.telegram_bot_token = token;
        }
        if let Some(chat_id) = file.telegram_chat_id {
            self.telegram_chat_id = chat_id;
        }
        if let Some(proxy) = file.proxy_address {
            self.proxy_address = proxy;
        }
        if let Some(timeout) = file.request_timeout_seconds {
            self.request_timeout_seconds = timeout;
        }
        if let Some(rate_limit) = file.rate_limit_ms {
            self.rate_limit_ms = rate_limit;
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(max_retries) = file.max_retries {
            self.max_retries = max_retries;
        }
    }
}

/// Contents of the TOML configuration file
///
/// Every key is optional; keys that are present override the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub proxy_address: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub rate_limit_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub max_retries: Option<u32>,
}
