//! A parsed view over one archived message.

use serde_json::{Map, Value};

use super::toc::TocEntry;
use crate::parser::header::{self, HeaderFields};

/// One message of the archive, parsed on demand from its TOC byte range.
///
/// The `From ` separator line is dropped; only the RFC 5322 content is kept.
/// Header names are stored lowercased so lookups are case-insensitive;
/// repeated headers are all kept in file order.
#[derive(Debug, Clone)]
pub struct Message {
    entry: TocEntry,
    headers: HeaderFields,
    content: Vec<u8>,
    body_start: usize,
}

impl Message {
    /// Parse the raw bytes of `entry` (separator line included).
    pub fn parse(entry: TocEntry, mut raw: Vec<u8>) -> Self {
        if raw.starts_with(b"From ") {
            let line_end = raw
                .iter()
                .position(|&b| b == b'\n')
                .map(|pos| pos + 1)
                .unwrap_or(raw.len());
            raw.drain(..line_end);
        }

        let (header_block, body_start) = header::split_header_block(&raw);
        let headers = header::parse_header_block(header_block);

        Self {
            entry,
            headers,
            content: raw,
            body_start,
        }
    }

    /// The TOC entry this message was read from.
    pub fn entry(&self) -> &TocEntry {
        &self.entry
    }

    /// First value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a repeatable header, in file order.
    pub fn header_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The RFC 5322 message: headers and body, without the separator line.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Raw body bytes after the header block.
    pub fn body(&self) -> &[u8] {
        &self.content[self.body_start..]
    }

    /// Header data as a JSON object, for error records.
    ///
    /// Repeated headers become arrays.
    pub fn header_data(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.headers {
            match map.get_mut(name) {
                None => {
                    map.insert(name.clone(), Value::String(value.clone()));
                }
                Some(Value::Array(values)) => values.push(Value::String(value.clone())),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value.clone())]);
                }
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> TocEntry {
        TocEntry {
            ordinal: 0,
            start: 0,
            stop: 0,
        }
    }

    const RAW: &[u8] = b"From a@x.com Thu Jan  4 10:00:00 2024\n\
From: Alice <a@x.com>\n\
Received: by one\n\
Received: by two\n\
Subject: a long\n\tsubject\n\
\n\
Body text\n";

    #[test]
    fn test_separator_line_is_split_off() {
        let msg = Message::parse(entry(), RAW.to_vec());
        assert!(msg.content().starts_with(b"From: Alice"));
    }

    #[test]
    fn test_header_outlives_the_name_it_was_looked_up_with() {
        let msg = Message::parse(entry(), RAW.to_vec());
        let subject = {
            let name = String::from("Subject");
            msg.header(&name)
        };
        assert_eq!(subject, Some("a long subject"));

        let received: Vec<&str> = {
            let name = String::from("received");
            msg.header_all(&name).collect()
        };
        assert_eq!(received, vec!["by one", "by two"]);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let msg = Message::parse(entry(), RAW.to_vec());
        assert_eq!(msg.header("FROM"), Some("Alice <a@x.com>"));
        assert_eq!(msg.header("subject"), Some("a long subject"));
        assert_eq!(msg.header("x-missing"), None);
    }

    #[test]
    fn test_repeated_headers() {
        let msg = Message::parse(entry(), RAW.to_vec());
        let received: Vec<&str> = msg.header_all("Received").collect();
        assert_eq!(received, vec!["by one", "by two"]);

        let data = msg.header_data();
        assert_eq!(data["received"], serde_json::json!(["by one", "by two"]));
        assert_eq!(data["from"], "Alice <a@x.com>");
    }

    #[test]
    fn test_body() {
        let msg = Message::parse(entry(), RAW.to_vec());
        assert_eq!(msg.body(), b"Body text\n");
    }

    #[test]
    fn test_separator_only_message() {
        let msg = Message::parse(entry(), b"From a@x.com Thu Jan  4 10:00:00 2024\n".to_vec());
        assert!(msg.headers().is_empty());
        assert!(msg.body().is_empty());
    }
}
