//! End-to-end tests: scan an archive, read messages lazily, aggregate per sender.

use std::io::Write;
use std::path::Path;

use mboxfreq::errlog::MemoryErrorLog;
use mboxfreq::error::MboxError;
use mboxfreq::parser::mbox;
use mboxfreq::report::format::{format_line, sizeof_fmt};
use mboxfreq::report::key::GroupBy;
use mboxfreq::report::measure::Measure;
use mboxfreq::report::{FrequencyTable, Reporter};
use mboxfreq::store::reader::MboxStore;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn message(sender: &str, size: u64) -> String {
    format!(
        "From {sender} Mon Jan  1 00:00:00 2024\n\
         From: Someone <{sender}>\n\
         Content-Length: {size}\n\
         \n\
         body\n"
    )
}

fn archive(messages: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(messages.join("\n").as_bytes())
        .expect("write archive");
    file
}

fn scenario() -> Vec<String> {
    vec![
        message("a@x.com", 10),
        message("b@y.com", 100),
        message("a@x.com", 20),
        message("b@y.com", 100),
        message("a@x.com", 5),
    ]
}

fn aggregate(path: &Path, measure: Measure) -> FrequencyTable {
    let toc = mbox::scan(path, None, None).unwrap();
    let mut store = MboxStore::open(path).unwrap();
    let mut sink = MemoryErrorLog::default();
    Reporter::new(&mut sink).accumulate(
        store.messages(&toc),
        |m| Ok(GroupBy::Address.key(m)),
        |m| measure.measure(m),
    )
}

fn run_report(
    path: &Path,
    group_by: GroupBy,
    measure: Measure,
    threshold: u64,
) -> mboxfreq::error::Result<Vec<(String, u64)>> {
    let toc = mbox::scan(path, None, None)?;
    let mut store = MboxStore::open(path)?;
    let mut sink = MemoryErrorLog::default();
    Reporter::new(&mut sink).report(
        store.messages(&toc),
        |m| Ok(group_by.key(m)),
        |m| measure.measure(m),
        threshold,
    )
}

#[test]
fn test_size_mode_scenario() {
    let file = archive(&scenario());
    let rows = run_report(file.path(), GroupBy::Address, Measure::Size, 30).unwrap();
    assert_eq!(
        rows,
        vec![("b@y.com".to_string(), 200), ("a@x.com".to_string(), 35)]
    );

    let rows = run_report(file.path(), GroupBy::Address, Measure::Size, 35).unwrap();
    assert_eq!(rows, vec![("b@y.com".to_string(), 200)]);
    assert_eq!(sizeof_fmt(rows[0].1), "200.0B");
    assert_eq!(
        format_line(&rows[0].0, rows[0].1, Measure::Size).trim_start(),
        "200.0B: 'b@y.com'"
    );
}

#[test]
fn test_count_mode_scenario() {
    let file = archive(&scenario());
    let rows = run_report(file.path(), GroupBy::Address, Measure::Count, 1).unwrap();
    assert_eq!(
        rows,
        vec![("a@x.com".to_string(), 3), ("b@y.com".to_string(), 2)]
    );
    assert_eq!(
        format_line(&rows[1].0, rows[1].1, Measure::Count),
        "2 mails from : 'b@y.com'"
    );
}

#[test]
fn test_threshold_boundary() {
    let file = archive(&scenario());
    // a@x.com totals 35 bytes
    let at = run_report(file.path(), GroupBy::Address, Measure::Size, 35).unwrap();
    assert!(at.iter().all(|(k, _)| k != "a@x.com"));
    let below = run_report(file.path(), GroupBy::Address, Measure::Size, 34).unwrap();
    assert!(below.iter().any(|(k, v)| k == "a@x.com" && *v == 35));
}

#[test]
fn test_aggregation_ignores_message_order() {
    let forward = scenario();
    let mut reversed = scenario();
    reversed.reverse();

    let a = archive(&forward);
    let b = archive(&reversed);
    assert_eq!(
        aggregate(a.path(), Measure::Size).totals(),
        aggregate(b.path(), Measure::Size).totals()
    );
    assert_eq!(
        aggregate(a.path(), Measure::Count).totals(),
        aggregate(b.path(), Measure::Count).totals()
    );
}

#[test]
fn test_empty_archive_has_no_qualifying_senders() {
    let result = run_report(&fixture("empty.mbox"), GroupBy::Address, Measure::Count, 0);
    assert!(matches!(
        result,
        Err(MboxError::NoQualifyingSenders { threshold: 0 })
    ));
}

#[test]
fn test_bad_message_is_logged_and_skipped() {
    let mut messages = scenario();
    messages.push(
        "From c@z.com Mon Jan  1 00:00:00 2024\n\
         From: c@z.com\n\
         Content-Length: not-a-number\n\
         \n\
         body\n"
            .to_string(),
    );
    let file = archive(&messages);
    let toc = mbox::scan(file.path(), None, None).unwrap();
    let mut store = MboxStore::open(file.path()).unwrap();
    let mut sink = MemoryErrorLog::default();

    let table = Reporter::new(&mut sink).accumulate(
        store.messages(&toc),
        |m| Ok(GroupBy::Address.key(m)),
        |m| Measure::Size.measure(m),
    );

    assert_eq!(table.get("c@z.com"), None);
    assert_eq!(table.get("b@y.com"), Some(200));
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].message["content-length"], "not-a-number");
    assert!(sink.records[0].error.contains("Content-Length"));
    assert!(!sink.records[0].backtrace.is_empty());
}

#[test]
fn test_fixture_grouping() {
    let path = fixture("simple.mbox");
    let rows = run_report(&path, GroupBy::Address, Measure::Count, 0).unwrap();
    assert_eq!(rows[0], ("user1@example.com".to_string(), 3));
    assert!(rows.contains(&("user2@example.com".to_string(), 1)));
    // An encoded-word From is plain ASCII, so Return-Path is not consulted
    assert!(rows.contains(&("jose@example.com".to_string(), 1)));
    assert!(rows.iter().all(|(k, _)| k != "bounce@lists.example.com"));
}

#[test]
fn test_fixture_full_from_grouping() {
    let path = fixture("simple.mbox");
    let rows = run_report(&path, GroupBy::FullFrom, Measure::Count, 0).unwrap();
    assert_eq!(rows[0], ("User One <user1@example.com>".to_string(), 3));
    assert!(rows.contains(&(
        "=?UTF-8?B?Sm9zw6kgR2FyY8OtYQ==?= <jose@example.com>".to_string(),
        1
    )));
}

#[test]
fn test_raw_non_ascii_sender_groups_by_return_path() {
    let file = archive(&[
        "From bounce@l.com Mon Jan  1 00:00:00 2024\n\
         Return-Path: <bounce@l.com>\n\
         From: Jos\u{e9} <jose@x.com>\n\
         \n\
         body\n"
            .to_string(),
        "From jose@x.com Mon Jan  1 00:00:00 2024\n\
         Return-Path: <bounce@l.com>\n\
         From: =?UTF-8?Q?Jos=C3=A9?= <jose@x.com>\n\
         \n\
         body\n"
            .to_string(),
    ]);

    let rows = run_report(file.path(), GroupBy::Address, Measure::Count, 0).unwrap();
    assert_eq!(
        rows,
        vec![("bounce@l.com".to_string(), 1), ("jose@x.com".to_string(), 1)]
    );

    let rows = run_report(file.path(), GroupBy::FullFrom, Measure::Count, 0).unwrap();
    assert_eq!(
        rows,
        vec![
            ("<bounce@l.com>".to_string(), 1),
            ("=?UTF-8?Q?Jos=C3=A9?= <jose@x.com>".to_string(), 1)
        ]
    );
}

#[test]
fn test_fixture_content_length_is_trusted() {
    let path = fixture("simple.mbox");
    let rows = run_report(&path, GroupBy::Address, Measure::Size, 0).unwrap();
    assert!(rows.contains(&("user2@example.com".to_string(), 4096)));
}

#[test]
fn test_capped_scan_limits_report() {
    let file = archive(&scenario());
    let toc = mbox::scan(file.path(), Some(2), None).unwrap();
    let mut store = MboxStore::open(file.path()).unwrap();
    let mut sink = MemoryErrorLog::default();
    let table = Reporter::new(&mut sink).accumulate(
        store.messages(&toc),
        |m| Ok(GroupBy::Address.key(m)),
        |m| Measure::Count.measure(m),
    );
    assert_eq!(table.get("a@x.com"), Some(1));
    // The capped message is only its separator line, so no From header
    assert_eq!(table.get("no email found"), Some(1));
}
