//! Output sink traits and types
//!
//! This module defines the trait interface for result sinks, the error
//! type they share, and the file formats results can be written in.

use crate::results::PageResult;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no results to save")]
    NoResults,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// File formats results can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Txt,
}

impl OutputFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            other => Err(format!("unsupported format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for result sinks
///
/// A sink takes the final result set of a crawl and persists it somewhere.
/// Implementations refuse an empty result set with [`OutputError::NoResults`].
pub trait ResultSink {
    /// Persists every result
    ///
    /// # Returns
    ///
    /// A human-readable description of where the results went, suitable
    /// for logging.
    fn persist(&self, results: &[PageResult]) -> OutputResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!(" CSV ".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("txt".parse::<OutputFormat>(), Ok(OutputFormat::Txt));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_extension_and_display() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Txt.to_string(), "txt");
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_no_results_message() {
        assert_eq!(OutputError::NoResults.to_string(), "no results to save");
    }
}
