//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing results to timestamped JSON, CSV or text files
//! - Appending results to the SQLite results database

mod file;
mod schema;
mod sqlite_output;
mod traits;

pub use file::{result_filename, save_results, write_csv, write_json, write_txt, FileSink};
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite_output::SqliteSink;
pub use traits::{OutputError, OutputFormat, OutputResult, ResultSink};
