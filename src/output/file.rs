//! File output in JSON, CSV and plain text

use crate::output::traits::{OutputError, OutputFormat, OutputResult, ResultSink};
use crate::results::PageResult;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

fn rfc3339(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Writes results as a pretty-printed JSON array
pub fn write_json<W: Write>(results: &[PageResult], mut writer: W) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes one CSV row per (result, email) pair, after a header row
pub fn write_csv<W: Write>(results: &[PageResult], writer: W) -> OutputResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Email", "Location", "Timestamp", "Source"])?;

    for result in results {
        let timestamp = rfc3339(&result.timestamp);
        for email in &result.emails {
            csv_writer.write_record([
                email.as_str(),
                result.location.as_str(),
                timestamp.as_str(),
                result.source.as_str(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes a plain-text block per result, each closed by `---`
pub fn write_txt<W: Write>(results: &[PageResult], mut writer: W) -> OutputResult<()> {
    for result in results {
        writeln!(writer, "Location: {}", result.location)?;
        writeln!(writer, "Timestamp: {}", rfc3339(&result.timestamp))?;
        writeln!(writer, "Source: {}", result.source)?;
        for email in &result.emails {
            writeln!(writer, "Email: {}", email)?;
        }
        writeln!(writer, "---")?;
    }
    writer.flush()?;
    Ok(())
}

/// File name for a result file written at `now`
///
/// # Example
///
/// ```
/// use careerfind::output::{result_filename, OutputFormat};
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(result_filename(OutputFormat::Csv, now), "results_20240309_070501.csv");
/// ```
pub fn result_filename(format: OutputFormat, now: DateTime<Utc>) -> String {
    format!("results_{}.{}", now.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Saves results to a timestamped file in `dir`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError::NoResults)` - Nothing to save; no file is created
/// * `Err(OutputError)` - The file could not be written
pub fn save_results(results: &[PageResult], format: OutputFormat, dir: &Path) -> OutputResult<PathBuf> {
    if results.is_empty() {
        return Err(OutputError::NoResults);
    }

    let path = dir.join(result_filename(format, Utc::now()));
    let writer = BufWriter::new(File::create(&path)?);

    match format {
        OutputFormat::Json => write_json(results, writer)?,
        OutputFormat::Csv => write_csv(results, writer)?,
        OutputFormat::Txt => write_txt(results, writer)?,
    }

    tracing::info!("Saved {} results to {}", results.len(), path.display());
    Ok(path)
}

/// [`ResultSink`] writing a timestamped file per call
#[derive(Debug, Clone)]
pub struct FileSink {
    pub format: OutputFormat,
    pub dir: PathBuf,
}

impl FileSink {
    pub fn new(format: OutputFormat, dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            dir: dir.into(),
        }
    }
}

impl ResultSink for FileSink {
    fn persist(&self, results: &[PageResult]) -> OutputResult<String> {
        let path = save_results(results, self.format, &self.dir)?;
        Ok(path.display().to_string())
    }
}
