use crate::config::types::Config;
use crate::ConfigError;

/// Validates the entire configuration
///
/// Every violation is collected so a single run reports all of them at once.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if config.request_timeout_seconds == 0 {
        problems.push("invalid request timeout value".to_string());
    }

    if config.rate_limit_ms == 0 {
        problems.push("invalid rate limit value".to_string());
    }

    if config.user_agent.trim().is_empty() {
        problems.push("user agent cannot be empty".to_string());
    }

    if let Some(proxy) = config.proxy() {
        if let Err(problem) = validate_proxy_address(proxy) {
            problems.push(problem);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "configuration validation failed: {}",
            problems.join(", ")
        )))
    }
}

/// Checks that a proxy address looks like `host:port`
fn validate_proxy_address(address: &str) -> Result<(), String> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("proxy address '{}' must be host:port", address))?;

    if host.is_empty() {
        return Err(format!("proxy address '{}' has no host", address));
    }

    port.parse::<u16>()
        .map_err(|_| format!("proxy address '{}' has an invalid port", address))?;

    Ok(())
}
