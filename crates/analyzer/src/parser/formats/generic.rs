use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::scan::find_level_keyword;
use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

/// Last-resort parser. Recognizes common timestamp shapes and level keywords
/// anywhere in the line and otherwise passes the line through untouched.
///
/// `can_parse` only accepts lines carrying some recognizable signal so the
/// format scores honestly during detection; `parse_line` accepts every
/// non-empty line, which is what makes this a usable fallback.
pub struct GenericParser;

impl LogParser for GenericParser {
    fn format(&self) -> LogFormat {
        LogFormat::Generic
    }

    fn can_parse(&self, line: &str) -> bool {
        !line.is_empty()
            && (extract_timestamp(line).is_some() || find_level_keyword(line).is_some())
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        if line.is_empty() {
            return None;
        }
        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: extract_timestamp(line),
            level: find_level_keyword(line).map(str::to_string),
            message: line.to_string(),
            metadata: BTreeMap::new(),
        })
    }
}

/// Probe for the first recognizable timestamp in the line. Shapes tried at
/// each digit run: ISO 8601 with `T` or space separator plus optional
/// fraction and zone, `MM/DD/YYYY HH:MM:SS`, and `DD-MM-YYYY HH:MM:SS`.
/// A bare 10- or 13-digit epoch is honored only at the very start.
fn extract_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let bytes = line.as_bytes();

    if let Some(ts) = leading_epoch(bytes) {
        return Some(ts);
    }

    for pos in 0..bytes.len() {
        if !bytes[pos].is_ascii_digit() {
            continue;
        }
        if pos > 0 && bytes[pos - 1].is_ascii_alphanumeric() {
            continue;
        }
        if let Some(ts) = iso_at(line, pos) {
            return Some(ts);
        }
        if let Some(ts) = slash_at(line, pos) {
            return Some(ts);
        }
        if let Some(ts) = dashed_at(line, pos) {
            return Some(ts);
        }
    }
    None
}

fn iso_at(line: &str, pos: usize) -> Option<DateTime<Utc>> {
    let s = &line.as_bytes()[pos..];
    if s.len() < 19
        || !digits(s, 0, 4)
        || s[4] != b'-'
        || !digits(s, 5, 2)
        || s[7] != b'-'
        || !digits(s, 8, 2)
        || (s[10] != b'T' && s[10] != b' ')
        || !digits(s, 11, 2)
        || s[13] != b':'
        || !digits(s, 14, 2)
        || s[16] != b':'
        || !digits(s, 17, 2)
    {
        return None;
    }

    let mut end = 19;
    if s.len() > end + 1 && (s[end] == b'.' || s[end] == b',') && s[end + 1].is_ascii_digit() {
        end += 1;
        while s.len() > end && s[end].is_ascii_digit() {
            end += 1;
        }
    }
    let mut has_zone = false;
    if s.len() > end {
        match s[end] {
            b'Z' => {
                end += 1;
                has_zone = true;
            }
            b'+' | b'-' => {
                if let Some(len) = zone_len(&s[end..]) {
                    end += len;
                    has_zone = true;
                }
            }
            _ => {}
        }
    }

    let candidate = line.get(pos..pos + end)?.replace(' ', "T").replace(',', ".");
    if has_zone {
        DateTime::parse_from_rfc3339(&candidate)
            .ok()
            .or_else(|| DateTime::parse_from_str(&candidate, "%Y-%m-%dT%H:%M:%S%.f%z").ok())
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.and_utc())
    }
}

fn slash_at(line: &str, pos: usize) -> Option<DateTime<Utc>> {
    let s = &line.as_bytes()[pos..];
    if s.len() < 19
        || !digits(s, 0, 2)
        || s[2] != b'/'
        || !digits(s, 3, 2)
        || s[5] != b'/'
        || !digits(s, 6, 4)
        || s[10] != b' '
    {
        return None;
    }
    NaiveDateTime::parse_from_str(line.get(pos..pos + 19)?, "%m/%d/%Y %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

fn dashed_at(line: &str, pos: usize) -> Option<DateTime<Utc>> {
    let s = &line.as_bytes()[pos..];
    if s.len() < 19
        || !digits(s, 0, 2)
        || s[2] != b'-'
        || !digits(s, 3, 2)
        || s[5] != b'-'
        || !digits(s, 6, 4)
        || s[10] != b' '
    {
        return None;
    }
    NaiveDateTime::parse_from_str(line.get(pos..pos + 19)?, "%d-%m-%Y %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

fn leading_epoch(bytes: &[u8]) -> Option<DateTime<Utc>> {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if len != 10 && len != 13 {
        return None;
    }
    if let Some(&next) = bytes.get(len) {
        if next.is_ascii_alphanumeric() || next == b'_' || next == b'.' {
            return None;
        }
    }
    let value: i64 = std::str::from_utf8(&bytes[..len]).ok()?.parse().ok()?;
    if len == 13 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn digits(s: &[u8], start: usize, len: usize) -> bool {
    s.len() >= start + len && s[start..start + len].iter().all(u8::is_ascii_digit)
}

/// `+hh:mm` or `+hhmm` (and the `-` forms). Anything else is message text.
fn zone_len(s: &[u8]) -> Option<usize> {
    if s.len() >= 6 && digits(s, 1, 2) && s[3] == b':' && digits(s, 4, 2) {
        return Some(6);
    }
    if s.len() >= 5 && digits(s, 1, 4) {
        return Some(5);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parses_any_nonempty_line() {
        let entry = GenericParser.parse_line("no structure here at all", 7).unwrap();
        assert_eq!(entry.line_number, 7);
        assert_eq!(entry.message, "no structure here at all");
        assert_eq!(entry.timestamp, None);
        assert_eq!(entry.level, None);
        assert!(entry.metadata.is_empty());
        assert!(GenericParser.parse_line("", 1).is_none());
    }

    #[test]
    fn test_can_parse_needs_signal() {
        let parser = GenericParser;
        assert!(parser.can_parse("2026-01-15 10:00:05 something"));
        assert!(parser.can_parse("plain text with ERROR inside"));
        assert!(!parser.can_parse("no structure here at all"));
        assert!(!parser.can_parse(""));
    }

    #[test]
    fn test_iso_space_separated() {
        let ts = extract_timestamp("2026-01-15 10:00:05 Starting worker").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T10:00:05+00:00");
    }

    #[test]
    fn test_iso_mid_line() {
        let ts = extract_timestamp("started at 2026-01-15T10:00:05Z ok").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T10:00:05+00:00");
    }

    #[test]
    fn test_iso_comma_fraction() {
        let ts = extract_timestamp("2026-01-15 10:00:05,123 oops").unwrap();
        assert_eq!(ts.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_iso_offset_without_colon() {
        let ts = extract_timestamp("2026-01-15T10:30:00+0530 req").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T05:00:00+00:00");
    }

    #[test]
    fn test_us_slash_format() {
        let ts = extract_timestamp("01/15/2026 10:00:05 error in module").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T10:00:05+00:00");
    }

    #[test]
    fn test_day_first_dashed_format() {
        let ts = extract_timestamp("15-01-2026 10:00:05 ok").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T10:00:05+00:00");
    }

    #[test]
    fn test_epoch_seconds_and_millis() {
        let ts = extract_timestamp("1700000000 server started").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        let ts = extract_timestamp("1700000000123 server started").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_epoch_only_at_line_start() {
        assert!(extract_timestamp("pid 1700000000 up").is_none());
    }

    #[test]
    fn test_embedded_digits_not_a_timestamp() {
        assert!(extract_timestamp("req-id abc2026-01-15T10:00:05Z tail").is_none());
        assert!(extract_timestamp("2026-13-40 10:00:05 nonsense").is_none());
    }

    #[test]
    fn test_trailing_dash_is_not_a_zone() {
        let ts = extract_timestamp("2026-01-15 10:00:05 - worker - up").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T10:00:05+00:00");
    }
}
