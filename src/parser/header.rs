//! RFC 5322 header parsing: header/body split and folding.

/// Parsed header fields as `(lowercase_name, unfolded_value)` pairs, in file order.
pub type HeaderFields = Vec<(String, String)>;

/// Split an RFC 5322 message into its header block and the offset where the body starts.
///
/// The header block ends at the first empty line (`\n` or `\r\n`). A message
/// with no empty line is all headers and has an empty body.
pub fn split_header_block(message: &[u8]) -> (&[u8], usize) {
    let mut pos = 0;
    while pos < message.len() {
        let line_end = message[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i + 1)
            .unwrap_or(message.len());
        let line = &message[pos..line_end];
        if line == b"\n" || line == b"\r\n" {
            return (&message[..pos], line_end);
        }
        pos = line_end;
    }
    (message, message.len())
}

/// Parse a raw header block into unfolded fields.
pub fn parse_header_block(raw_headers: &[u8]) -> HeaderFields {
    unfold_headers(&decode_header_bytes(raw_headers))
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Join folded continuation lines onto their field and lowercase the names.
fn unfold_headers(text: &str) -> HeaderFields {
    let mut fields: HeaderFields = Vec::new();

    for line in text.lines() {
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = fields.last_mut() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line.trim());
            }
            continue;
        }
        // Lines without a colon are ignored
        if let Some((name, value)) = line.split_once(':') {
            fields.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    fields
}

/// Whether a header value carries raw non-ASCII text.
///
/// RFC 2047 encoded-words are plain ASCII and do not count.
pub fn has_raw_non_ascii(value: &str) -> bool {
    !value.is_ascii()
}
