//! Table-of-contents entries produced by the scanner.

/// Byte range of one message inside the archive.
///
/// `start` points at the `From ` separator line; `stop` is exclusive and
/// never exceeds the next entry's `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TocEntry {
    /// Position in file order, contiguous from 0.
    pub ordinal: usize,
    /// Byte offset of the separator line.
    pub start: u64,
    /// Byte offset where the message ends.
    pub stop: u64,
}

impl TocEntry {
    /// Number of bytes covered by this entry.
    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.stop == self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        let entry = TocEntry {
            ordinal: 0,
            start: 10,
            stop: 42,
        };
        assert_eq!(entry.len(), 32);
        assert!(!entry.is_empty());
    }
}
