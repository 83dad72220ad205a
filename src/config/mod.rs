//! Configuration module for CareerFind
//!
//! This module loads settings from environment variables with a TOML file
//! fallback, fills in defaults, and validates the result before any crawl
//! starts.
//!
//! # Example
//!
//! ```no_run
//! use careerfind::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("careerfind.toml")).unwrap();
//! println!("Requests time out after {}s", config.request_timeout_seconds);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FileConfig, DEFAULT_MAX_RETRIES, DEFAULT_RATE_LIMIT_MS,
    DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_from, load_config_with_hash};
pub use validation::validate;
