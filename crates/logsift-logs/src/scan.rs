use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use logsift_types::LineRecord;

use crate::error::{Error, Result};
use crate::pattern::LinePattern;

/// Parse every matching line of a log file
///
/// The file is opened, drained and closed before returning, on success and
/// on error alike. Lines that do not match are skipped.
pub fn scan_file(path: &Path, pattern: &LinePattern) -> Result<Vec<LineRecord>> {
    let file = File::open(path).map_err(|e| Error::source_io(path, e))?;
    let records = scan_reader(BufReader::new(file), pattern).map_err(|e| Error::source_io(path, e))?;

    tracing::debug!(path = %path.display(), records = records.len(), "scanned log source");
    Ok(records)
}

/// Parse every matching line from a reader
///
/// Invalid UTF-8 is replaced rather than treated as an error.
pub fn scan_reader<R: BufRead>(mut reader: R, pattern: &LinePattern) -> io::Result<Vec<LineRecord>> {
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_number = 0u64;
    let mut skipped = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);

        match pattern.parse_line(line) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                tracing::trace!(line_number, "line does not match pattern");
            }
        }
    }

    tracing::debug!(matched = records.len(), skipped, "parse pass complete");
    Ok(records)
}
