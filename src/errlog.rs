//! Per-message failure records.
//!
//! The reporter hands every record to an [`ErrorSink`]. The CLI uses
//! [`FileErrorLog`], which appends to a plain-text file that grows across
//! runs and is never rotated; tests use [`MemoryErrorLog`].

use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{MboxError, Result};

/// One failed message, with enough context for a postmortem.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Local>,
    pub error: String,
    /// Header data of the offending message, or its TOC entry when it
    /// could not be read at all.
    pub message: serde_json::Value,
    pub backtrace: String,
}

impl ErrorRecord {
    /// Build a record stamped now, capturing the current stack.
    pub fn capture(error: &MboxError, message: serde_json::Value) -> Self {
        Self {
            timestamp: Local::now(),
            error: format!("Error processing message: {error}"),
            message,
            backtrace: Backtrace::force_capture().to_string(),
        }
    }

    /// Render the record the way it is written to the log file.
    pub fn render(&self) -> String {
        let data = match serde_json::to_string_pretty(&self.message) {
            Ok(json) => json,
            Err(e) => format!(
                "Unable to serialize message data using json: {e}\n\
                 Falling back to debug representation:\n{:?}",
                self.message
            ),
        };
        format!(
            "Error occurred at: {}\nError message: {}\nMessage data:\n{}\nStack Trace:\n{}\n{}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.error,
            data,
            self.backtrace,
            "-".repeat(50)
        )
    }
}

/// Destination for error records.
pub trait ErrorSink {
    fn append(&mut self, record: &ErrorRecord) -> Result<()>;
}

/// Append-only error log file. Created on first write.
#[derive(Debug, Clone)]
pub struct FileErrorLog {
    path: PathBuf,
}

impl FileErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ErrorSink for FileErrorLog {
    fn append(&mut self, record: &ErrorRecord) -> Result<()> {
        let to_log_error = |source| MboxError::ErrorLog {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_log_error)?;
        file.write_all(record.render().as_bytes())
            .map_err(to_log_error)?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryErrorLog {
    pub records: Vec<ErrorRecord>,
}

impl ErrorSink for MemoryErrorLog {
    fn append(&mut self, record: &ErrorRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
