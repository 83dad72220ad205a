//! Database schema definitions
//!
//! This module contains the SQL schema for the CareerFind results database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per page that yielded emails
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    emails TEXT NOT NULL,
    location TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    source TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_timestamp ON results(timestamp);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
