use crate::config::types::{
    Config, FileConfig, DEFAULT_MAX_RETRIES, DEFAULT_RATE_LIMIT_MS,
    DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from the process environment, falling back to a file
///
/// # Loading Order
///
/// 1. Environment variables (`TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
///    `PROXY_ADDRESS`, `REQUEST_TIMEOUT`, `RATE_LIMIT_MS`, `USER_AGENT`,
///    `MAX_RETRIES`)
/// 2. If either Telegram credential is missing, the TOML file at `path`;
///    every key it sets overrides the environment
/// 3. An empty user agent is replaced by a desktop browser default
///
/// A missing or unreadable file only produces a warning. The result is
/// validated.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use careerfind::config::load_config;
///
/// let config = load_config(Path::new("careerfind.toml")).unwrap();
/// println!("Rate limit: {}ms", config.rate_limit_ms);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Loads a configuration and returns the hash of the config file, if one was read
pub fn load_config_with_hash(path: &Path) -> Result<(Config, Option<String>), ConfigError> {
    load_config_from(path, |key| std::env::var(key).ok())
}

/// Loads configuration using `lookup` in place of the process environment
pub fn load_config_from<F>(path: &Path, lookup: F) -> Result<(Config, Option<String>), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = config_from_env(&lookup);
    let mut hash = None;

    if !config.has_telegram_credentials() {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let file: FileConfig = toml::from_str(&content)?;
                config.apply_file(file);
                hash = Some(hash_content(&content));
            }
            Err(e) => {
                tracing::warn!("Could not load config file {}: {}", path.display(), e);
            }
        }
    }

    if config.user_agent.trim().is_empty() {
        config.user_agent = DEFAULT_USER_AGENT.to_string();
    }

    validate(&config)?;

    Ok((config, hash))
}

/// Builds a configuration from environment-style lookups alone
fn config_from_env<F>(lookup: &F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    Config {
        telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
        telegram_chat_id: lookup("TELEGRAM_CHAT_ID").unwrap_or_default(),
        proxy_address: lookup("PROXY_ADDRESS").unwrap_or_default(),
        request_timeout_seconds: parse_or(lookup, "REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECONDS),
        rate_limit_ms: parse_or(lookup, "RATE_LIMIT_MS", DEFAULT_RATE_LIMIT_MS),
        user_agent: lookup("USER_AGENT").unwrap_or_default(),
        max_retries: parse_or(lookup, "MAX_RETRIES", DEFAULT_MAX_RETRIES),
    }
}

/// Parses a numeric variable, using `default` when unset or unparseable
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a set of results can be traced back to the config
/// that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
