//! MBOX store: reads individual messages by TOC entry.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MboxError, Result};
use crate::model::message::Message;
use crate::model::toc::TocEntry;

/// Read-only handle on an archive, opened once and released on drop.
pub struct MboxStore {
    path: PathBuf,
    file: File,
}

impl MboxStore {
    /// Open an MBOX file for random-access reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| MboxError::open(&path, e))?;
        Ok(Self { path, file })
    }

    /// Read and parse the message covered by `entry`.
    pub fn get_message(&mut self, entry: &TocEntry) -> Result<Message> {
        let raw = self.read_raw(entry)?;
        Ok(Message::parse(*entry, raw))
    }

    /// Lazily yield the messages of `toc`, reading each one only when asked.
    pub fn messages<'a>(&'a mut self, toc: &'a [TocEntry]) -> Messages<'a> {
        Messages {
            store: self,
            entries: toc.iter(),
        }
    }

    /// Low-level: seek to the entry start and read its bytes.
    fn read_raw(&mut self, entry: &TocEntry) -> Result<Vec<u8>> {
        debug!(
            path = %self.path.display(),
            ordinal = entry.ordinal,
            offset = entry.start,
            length = entry.len(),
            "Reading message from MBOX"
        );
        let read = |file: &mut File| -> std::io::Result<Vec<u8>> {
            file.seek(SeekFrom::Start(entry.start))?;
            let mut buf = vec![0u8; entry.len() as usize];
            file.read_exact(&mut buf)?;
            Ok(buf)
        };
        read(&mut self.file).map_err(|source| MboxError::MessageRead {
            entry: *entry,
            source,
        })
    }
}

/// Iterator returned by [`MboxStore::messages`].
///
/// A message that cannot be read yields an error and iteration continues
/// with the next entry.
pub struct Messages<'a> {
    store: &'a mut MboxStore,
    entries: std::slice::Iter<'a, TocEntry>,
}

impl Iterator for Messages<'_> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(self.store.get_message(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Messages<'_> {}
