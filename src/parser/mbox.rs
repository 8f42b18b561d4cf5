//! Streaming MBOX table-of-contents scanner.
//!
//! Reads the archive line by line in a single forward pass and records the
//! byte range of every message. Never loads the file into memory, never
//! parses message content.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MboxError, Result};
use crate::model::toc::TocEntry;
use crate::progress::PercentBar;

/// Prefix of the line that opens every message.
pub const SEPARATOR: &[u8] = b"From ";

/// Platform line terminator; a line equal to it counts as blank.
#[cfg(windows)]
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Default size of the read buffer (128 KB).
const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Scanner settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Stop after this many messages; the rest of the file is never read.
    pub max_messages: Option<usize>,
    /// Draw a percentage bar on stderr while scanning.
    pub print_progress: bool,
    /// Capacity of the buffered reader.
    pub read_buffer_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_messages: None,
            print_progress: false,
            read_buffer_size: READ_BUFFER_SIZE,
        }
    }
}

/// Builds the table of contents of an MBOX archive.
///
/// Message boundaries are found with the classic heuristic: a line starting
/// with `From ` opens a message, and when the line just before it is blank
/// that blank line is trimmed from the previous message. A `From ` line with
/// no blank line before it is still a boundary; the previous message then
/// ends exactly where the new one starts. A body line that happens to begin
/// with `From ` also splits the message; that is accepted behavior.
pub struct MboxScanner {
    path: PathBuf,
    file_size: u64,
    options: ScanOptions,
}

impl MboxScanner {
    /// Create a scanner for the given archive.
    ///
    /// Verifies that the path is an existing regular file and records its
    /// size, which is used only as the progress denominator.
    pub fn new(path: impl AsRef<Path>, options: ScanOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| MboxError::open(&path, e))?;
        if !metadata.is_file() {
            return Err(MboxError::NotAFile(path));
        }
        Ok(Self {
            path,
            file_size: metadata.len(),
            options,
        })
    }

    /// Size of the archive when the scanner was created.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Scan the archive and return one entry per message, in file order.
    ///
    /// `on_progress` receives the percentage of the file consumed after every
    /// line, then exactly `100.0` once more when the scan is over.
    pub fn scan(&self, mut on_progress: Option<&mut dyn FnMut(f64)>) -> Result<Vec<TocEntry>> {
        let file = File::open(&self.path).map_err(|e| MboxError::open(&self.path, e))?;
        let mut reader = BufReader::with_capacity(self.options.read_buffer_size.max(1), file);

        let mut display = if self.options.print_progress {
            Some(PercentBar::new("Reading mbox"))
        } else {
            None
        };

        let mut starts: Vec<u64> = Vec::new();
        let mut stops: Vec<u64> = Vec::new();
        let mut last_was_empty = false;
        let mut position: u64 = 0;

        // Reusable line buffer
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);

        loop {
            let line_pos = position;
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| MboxError::io(&self.path, e))?;
            position += line_len as u64;

            if line_buf.starts_with(SEPARATOR) {
                if stops.len() < starts.len() {
                    stops.push(message_end(line_pos, last_was_empty));
                }
                starts.push(line_pos);
                last_was_empty = false;

                if let Some(max) = self.options.max_messages {
                    if starts.len() >= max {
                        stops.push(position);
                        debug!(max, offset = position, "Message cap reached, stopping scan");
                        break;
                    }
                }
            } else if line_buf.is_empty() {
                // EOF
                if stops.len() < starts.len() {
                    stops.push(message_end(line_pos, last_was_empty));
                }
                break;
            } else if line_buf == LINE_TERMINATOR {
                last_was_empty = true;
            } else {
                last_was_empty = false;
            }

            let percent = percent_of(line_pos, self.file_size);
            if let Some(cb) = on_progress.as_mut() {
                cb(percent);
            }
            if let Some(bar) = display.as_mut() {
                bar.update(percent);
            }
        }

        let entries: Vec<TocEntry> = starts
            .into_iter()
            .zip(stops)
            .enumerate()
            .map(|(ordinal, (start, stop))| TocEntry {
                ordinal,
                start,
                stop,
            })
            .collect();

        if let Some(cb) = on_progress.as_mut() {
            cb(100.0);
        }
        if let Some(mut bar) = display {
            bar.update(100.0);
            bar.finish();
        }

        info!(
            path = %self.path.display(),
            messages = entries.len(),
            bytes_scanned = position,
            "Built table of contents"
        );

        Ok(entries)
    }
}

/// Scan `path` with default options.
///
/// Shorthand for [`MboxScanner::new`] followed by [`MboxScanner::scan`].
pub fn scan(
    path: impl AsRef<Path>,
    max_messages: Option<usize>,
    on_progress: Option<&mut dyn FnMut(f64)>,
) -> Result<Vec<TocEntry>> {
    let options = ScanOptions {
        max_messages,
        ..ScanOptions::default()
    };
    MboxScanner::new(path, options)?.scan(on_progress)
}

/// Where a message closed by the line at `line_pos` ends.
///
/// A blank line right before the boundary is not part of the message.
fn message_end(line_pos: u64, last_was_empty: bool) -> u64 {
    if last_was_empty {
        line_pos.saturating_sub(LINE_TERMINATOR.len() as u64)
    } else {
        line_pos
    }
}

fn percent_of(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    done as f64 / total as f64 * 100.0
}
