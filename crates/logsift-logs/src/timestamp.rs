use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use logsift_types::LineRecord;

use crate::error::{Error, Result};

/// Layouts tried after RFC 3339, in order
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a captured timestamp into a point in time
///
/// Accepts RFC 3339, ISO-8601 with a `+hhmm` offset, and offset-less
/// timestamps, which are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();

    let rfc3339_err = match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => return Ok(ts),
        Err(e) => e,
    };

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    Err(Error::TimestampParse {
        value: value.to_string(),
        source: rfc3339_err,
    })
}

/// Sort position of a record
///
/// Unparsable timestamps sort first, by text; the rest by instant, so
/// mixed offsets and fractional seconds order the same way `since` compares.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Instant(DateTime<Utc>),
}

impl SortKey {
    fn of(record: &LineRecord) -> Self {
        match parse_timestamp(record.timestamp()) {
            Ok(ts) => Self::Instant(ts.with_timezone(&Utc)),
            Err(_) => Self::Text(record.timestamp().to_string()),
        }
    }
}

/// Stable sort by point in time; equal instants keep their order
pub fn sort_records(records: &mut [LineRecord]) {
    records.sort_by_cached_key(SortKey::of);
}
