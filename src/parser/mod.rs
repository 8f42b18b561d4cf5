//! Archive and message parsing: MBOX table-of-contents scanner, header decoding, and MIME sizing.

pub mod header;
pub mod mbox;
pub mod mime;
