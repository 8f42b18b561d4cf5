//! Grouping keys: who sent a message.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::message::Message;
use crate::parser::header::has_raw_non_ascii;

/// Key used when no address can be found.
pub const NO_EMAIL_FOUND: &str = "no email found";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.+-]+@[\w.+-]+").expect("email pattern is valid"));

/// How messages are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// First email address found in the sender header.
    #[default]
    Address,
    /// The whole sender header value, as written in the message.
    ///
    /// A message without a `From` header is keyed as [`NO_EMAIL_FOUND`].
    FullFrom,
}

impl GroupBy {
    /// Grouping key of `message`.
    pub fn key(self, message: &Message) -> String {
        let Some(source) = sender_source(message) else {
            return NO_EMAIL_FOUND.to_string();
        };
        match self {
            GroupBy::Address => extract_address(&source)
                .unwrap_or(NO_EMAIL_FOUND)
                .to_string(),
            GroupBy::FullFrom => source,
        }
    }
}

/// Header value that identifies the sender.
///
/// A `From` holding raw 8-bit text is replaced by `Return-Path` when that
/// header is present and non-empty. RFC 2047 encoded-words are ASCII, so
/// such a `From` is used as is, without decoding.
fn sender_source(message: &Message) -> Option<String> {
    let from = message.header("from")?;
    if has_raw_non_ascii(from) {
        if let Some(return_path) = message.header("return-path").filter(|v| !v.is_empty()) {
            return Some(return_path.to_string());
        }
    }
    Some(from.to_string())
}

/// First email-address-shaped substring of `source`.
pub fn extract_address(source: &str) -> Option<&str> {
    EMAIL_RE.find(source).map(|m| m.as_str())
}
