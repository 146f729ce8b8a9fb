use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use logsift_logs::{Config, Error, LinePattern, LineRecord, PatternPreset, QueryClient};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn example_log() -> QueryClient {
    QueryClient::new(fixture("example.log"), &Config::default())
}

fn at(ts: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(ts).unwrap()
}

fn full_messages(records: &[LineRecord]) -> Vec<String> {
    records.iter().map(|r| r.full_message().into_owned()).collect()
}

#[test]
fn test_initialize_with_name() {
    let log = QueryClient::new("test.log", &Config::with_log_dir("/srv/app/log"));
    assert_eq!(log.path(), Path::new("/srv/app/log/test.log"));
}

#[test]
fn test_initialize_with_path() {
    let log = example_log();
    assert_eq!(log.path(), fixture("example.log"));
    assert!(log.path().exists());
}

#[test]
fn test_counts_by_type() {
    let log = example_log();
    assert_eq!(log.count().unwrap(), 7);
    assert_eq!(log.errors().unwrap().count().unwrap(), 1);
    assert_eq!(log.warnings().unwrap().count().unwrap(), 1);
    assert_eq!(log.infos().unwrap().count().unwrap(), 5);
}

#[test]
fn test_errors() {
    let errors = example_log().errors().unwrap().to_vec().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].prefix(), Some("page_id 95239"));
    assert_eq!(
        errors[0].message(),
        "Failed to save reviews! Validation failed: Text can't be blank"
    );
}

#[test]
fn test_warnings() {
    let warnings = example_log().warnings().unwrap().to_vec().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].prefix(), Some("page_id 75645"));
    assert_eq!(warnings[0].message(), "Failed to find page");
}

#[test]
fn test_infos() {
    let infos = example_log().infos().unwrap().to_vec().unwrap();
    assert_eq!(infos.len(), 5);
    assert_eq!(infos[0].prefix(), Some("page_id 24323"));
    assert!(infos[0].message().starts_with("Updating page"));
}

#[test]
fn test_by_type_is_case_sensitive() {
    assert_eq!(example_log().by_type("error").unwrap().count().unwrap(), 0);
}

#[test]
fn test_since_is_strict() {
    let lines = example_log()
        .since(&at("2014-11-13T23:12:15-07:00"))
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0].full_message(),
        "[page_id 95239] Updating page and reviews"
    );
    assert!(lines.iter().all(|r| r.timestamp() != "2014-11-13T23:12:15-07:00"));
}

#[test]
fn test_since_compares_instants_across_offsets() {
    // 2014-11-14T06:12:15Z is 2014-11-13T23:12:15-07:00
    let lines = example_log().since(&at("2014-11-14T06:12:15Z")).unwrap();
    assert_eq!(lines.count().unwrap(), 3);
}

#[test]
fn test_by_message_text() {
    let lines = example_log().by_message("validation failed").unwrap().strings().unwrap();
    assert_eq!(
        lines,
        vec![
            "[2014-11-13T23:12:18-07:00] ERROR: [page_id 95239] Failed to save reviews! Validation failed: Text can't be blank"
        ]
    );
}

#[test]
fn test_by_prefix() {
    let lines = example_log().by_prefix("page_id 24323").unwrap();
    assert_eq!(lines.count().unwrap(), 3);
    assert_eq!(lines.prefixes().unwrap(), vec!["page_id 24323"]);
}

#[test]
fn test_prefixes() {
    assert_eq!(
        example_log().prefixes().unwrap(),
        vec!["page_id 24323", "page_id 75645", "page_id 95239"]
    );
}

#[test]
fn test_projections() {
    let log = example_log().by_prefix("page_id 95239").unwrap();
    assert_eq!(
        log.timestamps().unwrap(),
        vec!["2014-11-13T23:12:16-07:00", "2014-11-13T23:12:18-07:00"]
    );
    assert_eq!(
        log.messages().unwrap(),
        vec![
            "Updating page and reviews",
            "Failed to save reviews! Validation failed: Text can't be blank"
        ]
    );
}

#[test]
fn test_filtering_by_chaining() {
    let lines = example_log()
        .by_prefix("page_id 24323")
        .unwrap()
        .by_message(Regex::new(r"(?i)saved \d+ reviews").unwrap())
        .unwrap()
        .since(&at("2014-11-13T23:12:12-07:00"))
        .unwrap()
        .uniq()
        .unwrap();
    assert_eq!(full_messages(&lines), vec!["[page_id 24323] Saved 10 reviews"]);
}

#[test]
fn test_filters_commute() {
    let log = example_log();
    let prefix = "page_id 24323";
    let saved = Regex::new(r"Saved \d+").unwrap();
    let reference = at("2014-11-13T23:12:12-07:00");

    let a = log
        .by_prefix(prefix)
        .unwrap()
        .by_message(&saved)
        .unwrap()
        .since(&reference)
        .unwrap()
        .to_vec()
        .unwrap();
    let b = log
        .since(&reference)
        .unwrap()
        .by_message(&saved)
        .unwrap()
        .by_prefix(prefix)
        .unwrap()
        .to_vec()
        .unwrap();
    let c = log
        .by_message(&saved)
        .unwrap()
        .by_prefix(prefix)
        .unwrap()
        .since(&reference)
        .unwrap()
        .to_vec()
        .unwrap();

    let by_prefix = log.by_prefix(prefix).unwrap().to_vec().unwrap();
    let by_message = log.by_message(&saved).unwrap().to_vec().unwrap();
    let since = log.since(&reference).unwrap().to_vec().unwrap();
    let intersection: Vec<_> = log
        .to_vec()
        .unwrap()
        .into_iter()
        .filter(|r| by_prefix.contains(r) && by_message.contains(r) && since.contains(r))
        .collect();

    assert_eq!(a.len(), 2);
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a, intersection);
}

#[test]
fn test_uniq_keeps_first_seen_order() {
    let log = example_log();
    let once = log.uniq().unwrap();
    assert_eq!(once.len(), 6);
    assert_eq!(
        once[1].full_message(),
        "[page_id 24323] Saved 10 reviews"
    );
    assert_eq!(once[1].timestamp(), "2014-11-13T23:12:13-07:00");

    let twice = QueryClient::from_records(log.path(), LinePattern::generic(), once.clone())
        .uniq()
        .unwrap();
    assert_eq!(twice, once);
}

#[test]
fn test_no_chain_mutation() {
    let log = example_log();
    let before = log.to_vec().unwrap();

    log.by_prefix("page_id 24323")
        .unwrap()
        .by_message(Regex::new(r"(?i)saved \d+ reviews").unwrap())
        .unwrap()
        .since(&at("2014-11-13T23:12:12-07:00"))
        .unwrap()
        .uniq()
        .unwrap();

    assert_eq!(log.count().unwrap(), 7);
    assert_eq!(log.to_vec().unwrap(), before);
}

#[test]
fn test_sort_orders_by_timestamp() {
    let log = QueryClient::from_records(
        fixture("example.log"),
        LinePattern::generic(),
        example_log().to_vec().unwrap().into_iter().rev().collect(),
    );
    let sorted = log.sort().unwrap();
    assert_eq!(sorted, example_log().to_vec().unwrap());
}

#[test]
fn test_sort_agrees_with_since_across_offsets() {
    let record = |ts: &str, message: &str| LineRecord::new(ts, None, None, message);
    let log = QueryClient::from_records(
        "/unused.log",
        LinePattern::generic(),
        vec![
            record("2014-11-13T23:12:18.5Z", "later"),
            record("2014-11-13T23:12:18Z", "earlier"),
            record("2014-11-13T23:00:00-07:00", "latest"),
            record("2014-11-14T01:00:00Z", "mid"),
        ],
    );

    let sorted = log.sort().unwrap();
    let messages: Vec<_> = sorted.iter().map(LineRecord::message).collect();
    assert_eq!(messages, vec!["earlier", "later", "mid", "latest"]);

    let recent = log.since(&at("2014-11-14T02:00:00Z")).unwrap();
    assert_eq!(recent.messages().unwrap(), vec!["latest"]);

    // Everything after a record in sorted order is exactly what `since` keeps
    for (i, pivot) in sorted.iter().enumerate() {
        let after = log.since(&at(pivot.timestamp())).unwrap().sort().unwrap();
        assert_eq!(after, sorted[i + 1..].to_vec());
    }
}

#[test]
fn test_missing_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let log = QueryClient::new("absent.log", &Config::with_log_dir(dir.path()));

    let err = log.count().unwrap_err();
    assert!(matches!(err, Error::SourceNotFound { ref path } if path == &dir.path().join("absent.log")));

    // The failure sticks to this client even once the file exists
    fs::write(dir.path().join("absent.log"), "[2014-11-13T23:12:12Z] INFO: hi\n").unwrap();
    assert!(matches!(log.errors(), Err(Error::SourceNotFound { .. })));

    let fresh = QueryClient::new("absent.log", &Config::with_log_dir(dir.path()));
    assert_eq!(fresh.count().unwrap(), 1);
}

#[test]
fn test_file_read_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(
        &path,
        "[2014-11-13T23:12:12Z] INFO: up\n[2014-11-13T23:12:13Z] ERROR: down\n",
    )
    .unwrap();

    let log = QueryClient::new(&path, &Config::default());
    assert!(!log.is_parsed());
    assert_eq!(log.count().unwrap(), 2);
    assert!(log.is_parsed());

    fs::remove_file(&path).unwrap();
    assert_eq!(log.count().unwrap(), 2);
    assert_eq!(log.errors().unwrap().messages().unwrap(), vec!["down"]);
}

#[test]
fn test_since_rejects_unparsable_record_timestamp() {
    let log = QueryClient::from_records(
        "/unused.log",
        LinePattern::generic(),
        vec![LineRecord::new("2014-13-45T99:00:00Z", None, None, "bad clock")],
    );
    let err = log.since(&at("2014-11-13T23:12:12Z")).unwrap_err();
    assert!(matches!(err, Error::TimestampParse { .. }));
}

#[test]
fn test_severity_char_instance_pattern() {
    let log = QueryClient::with_pattern(
        fixture("severity_char.log"),
        &Config::default(),
        LinePattern::severity_char(),
    );
    assert_eq!(log.count().unwrap(), 4);
    assert_eq!(log.errors().unwrap().prefixes().unwrap(), vec!["page_id 95239"]);
    assert_eq!(log.by_type("WARN").unwrap().count().unwrap(), 1);
    assert_eq!(
        log.prefixes().unwrap(),
        vec!["page_id 24323", "page_id 75645", "page_id 95239"]
    );

    // Offset-less timestamps are read as UTC
    let late = log.since(&at("2014-11-13T23:12:18.5Z")).unwrap();
    assert_eq!(late.messages().unwrap(), vec!["Finished processing pages"]);
}

#[test]
fn test_config_pattern_applies_to_clients() {
    let mut config = Config::default();
    config.set_line_pattern_preset(PatternPreset::SeverityChar);

    let log = config.open(fixture("severity_char.log"));
    assert_eq!(log.line_pattern(), &LinePattern::severity_char());
    assert_eq!(log.count().unwrap(), 4);

    // The same file under the generic pattern has no matching lines
    assert!(example_log().scan_with(&LinePattern::severity_char()).unwrap().is_empty());
}

#[test]
fn test_per_call_pattern_does_not_touch_cache() {
    let log = example_log();
    assert!(log.scan_with(&LinePattern::severity_char()).unwrap().is_empty());
    assert!(!log.is_parsed());
    assert_eq!(log.count().unwrap(), 7);
}

#[test]
fn test_display_renders_loaded_records() {
    let log = example_log();
    assert_eq!(log.to_string(), "[]");

    let errors = log.errors().unwrap();
    assert_eq!(
        errors.to_string(),
        r#"["[2014-11-13T23:12:18-07:00] ERROR: [page_id 95239] Failed to save reviews! Validation failed: Text can't be blank"]"#
    );
}
