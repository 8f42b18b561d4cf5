//! Per-message values accumulated by the reporter.

use crate::error::{MboxError, Result};
use crate::model::message::Message;
use crate::parser::mime;

/// What each message contributes to its sender's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Measure {
    /// Message size in bytes.
    #[default]
    Size,
    /// One per message.
    Count,
}

impl Measure {
    pub fn measure(self, message: &Message) -> Result<u64> {
        match self {
            Measure::Size => message_size(message),
            Measure::Count => Ok(1),
        }
    }
}

/// Size of a message in bytes.
///
/// An explicit `Content-Length` header wins; it must be a non-negative
/// integer. Without one, the body is measured (see [`mime::body_size`]).
pub fn message_size(message: &Message) -> Result<u64> {
    if let Some(raw) = message.header("content-length") {
        return raw
            .trim()
            .parse::<u64>()
            .map_err(|e| MboxError::InvalidHeader {
                name: "Content-Length".to_string(),
                reason: format!("{raw:?}: {e}"),
            });
    }
    Ok(mime::body_size(message.content()))
}
