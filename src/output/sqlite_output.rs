//! SQLite-based result sink
//!
//! Every saved result becomes one row of the `results` table, with its
//! emails joined by commas. Rows accumulate across runs.

use crate::output::schema::initialize_schema;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::results::PageResult;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite result sink
pub struct SqliteSink {
    conn: Connection,
    path: PathBuf,
}

impl SqliteSink {
    /// Opens (or creates) the results database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(OutputError::Database)` - Failed to open database
    pub fn new(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Inserts every result in a single transaction
    pub fn save_results(&self, results: &[PageResult]) -> OutputResult<usize> {
        if results.is_empty() {
            return Err(OutputError::NoResults);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO results (emails, location, timestamp, source) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for result in results {
                stmt.execute(params![
                    result.emails.join(","),
                    result.location,
                    result.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                    result.source,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Inserted {} rows into {}", results.len(), self.path.display());
        Ok(results.len())
    }

    /// Reads every stored result back, oldest first
    pub fn load_results(&self) -> OutputResult<Vec<PageResult>> {
        let mut stmt = self
            .conn
            .prepare("SELECT emails, location, timestamp, source FROM results ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            let emails: String = row.get(0)?;
            let timestamp: String = row.get(2)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
                })?;

            Ok(PageResult {
                emails: emails
                    .split(',')
                    .filter(|e| !e.is_empty())
                    .map(String::from)
                    .collect(),
                location: row.get(1)?,
                timestamp,
                source: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Number of stored results
    pub fn count_results(&self) -> OutputResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl ResultSink for SqliteSink {
    fn persist(&self, results: &[PageResult]) -> OutputResult<String> {
        let inserted = self.save_results(results)?;
        Ok(format!("{} rows in {}", inserted, self.path.display()))
    }
}
