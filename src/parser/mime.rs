//! MIME body sizing.
//!
//! Only byte counts are computed here; parts are never decoded to text.

use mail_parser::decoders::base64::base64_decode;
use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use mail_parser::{Encoding, MessagePart, MessageParser, PartType};
use tracing::debug;

use super::header::split_header_block;

/// Byte size of a message's body.
///
/// `message` is the RFC 5322 message (headers and body, no `From ` separator line).
///
/// - Single-part: length of the payload with its transfer encoding undone.
///   Text is not converted from its charset.
/// - Multipart: sum of the raw byte lengths of every part in the MIME tree,
///   the root included.
///
/// Input that `mail-parser` cannot make sense of is measured as the raw
/// bytes after the header block.
pub fn body_size(message: &[u8]) -> u64 {
    let parsed = match MessageParser::default().parse(message) {
        Some(msg) => msg,
        None => return fallback_body_size(message),
    };

    let Some(root) = parsed.parts.first() else {
        return fallback_body_size(message);
    };

    match &root.body {
        PartType::Multipart(_) => parsed
            .parts
            .iter()
            .map(|part| part.offset_end.saturating_sub(part.offset_header) as u64)
            .sum(),
        _ => single_part_size(message, root),
    }
}

fn single_part_size(message: &[u8], part: &MessagePart<'_>) -> u64 {
    if let PartType::Binary(bytes) | PartType::InlineBinary(bytes) = &part.body {
        return bytes.len() as u64;
    }
    // Text bodies were converted to UTF-8; measure the original bytes instead
    let raw = message
        .get(part.offset_body..part.offset_end)
        .unwrap_or_default();
    let decoded = match part.encoding {
        Encoding::None => None,
        Encoding::Base64 => base64_decode(raw),
        Encoding::QuotedPrintable => quoted_printable_decode(raw),
    };
    decoded.map_or(raw.len(), |bytes| bytes.len()) as u64
}

/// Raw length of everything after the first blank line.
fn fallback_body_size(message: &[u8]) -> u64 {
    let (_, body_start) = split_header_block(message);
    debug!(
        body_len = message.len() - body_start,
        "MIME parse failed, measuring raw body"
    );
    (message.len() - body_start) as u64
}
