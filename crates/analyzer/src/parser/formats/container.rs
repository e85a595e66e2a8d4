use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::scan::find_level_keyword;
use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

/// Parser for container runtime log lines.
///
/// Detection keys on the CRI shape `ts stream tag msg` with stream
/// stdout/stderr and tag F/P. Parsing additionally accepts
/// `docker logs --timestamps` lines, which are just `ts msg`; those are too
/// unspecific to claim during detection.
pub struct DockerParser;

impl LogParser for DockerParser {
    fn format(&self) -> LogFormat {
        LogFormat::Docker
    }

    fn can_parse(&self, line: &str) -> bool {
        match line.split_once(' ') {
            Some((ts, rest)) => looks_like_rfc3339(ts) && split_cri(rest).is_some(),
            None => false,
        }
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let (ts_token, rest) = line.split_once(' ')?;
        if !looks_like_rfc3339(ts_token) {
            return None;
        }
        let timestamp = DateTime::parse_from_rfc3339(ts_token)
            .ok()?
            .with_timezone(&Utc);

        let mut metadata = BTreeMap::new();
        let message = match split_cri(rest) {
            Some((stream, tag, msg)) => {
                metadata.insert("stream".to_string(), stream.to_string());
                metadata.insert("tag".to_string(), tag.to_string());
                msg
            }
            None => rest,
        };

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: Some(timestamp),
            level: find_level_keyword(message).map(str::to_string),
            message: message.to_string(),
            metadata,
        })
    }
}

/// `stream tag msg` per the CRI logging contract (tag F = full, P = partial).
fn split_cri(rest: &str) -> Option<(&str, &str, &str)> {
    let (stream, rest) = rest.split_once(' ')?;
    if stream != "stdout" && stream != "stderr" {
        return None;
    }
    let (tag, msg) = rest.split_once(' ').unwrap_or((rest, ""));
    if tag != "F" && tag != "P" {
        return None;
    }
    Some((stream, tag, msg))
}

/// Cheap structural probe; chrono does the real validation.
fn looks_like_rfc3339(token: &str) -> bool {
    let b = token.as_bytes();
    if b.len() < 20
        || !b[..4].iter().all(u8::is_ascii_digit)
        || b[4] != b'-'
        || b[7] != b'-'
        || b[10] != b'T'
        || b[13] != b':'
        || b[16] != b':'
    {
        return false;
    }
    b[b.len() - 1] == b'Z' || b[19..].contains(&b'+') || b[19..].contains(&b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRI_LINE: &str = "2026-01-15T10:00:05.123456789Z stdout F Server listening on :8080";
    const CRI_ERROR_LINE: &str = "2026-01-15T10:00:06.000Z stderr F ERROR failed to connect to db";
    const DOCKER_TS_LINE: &str = "2026-01-15T10:00:05.000000000Z WARN disk usage at 91%";

    #[test]
    fn test_can_parse_cri_only() {
        let parser = DockerParser;
        assert!(parser.can_parse(CRI_LINE));
        assert!(parser.can_parse(CRI_ERROR_LINE));
        // bare `ts msg` is parseable but not claimable
        assert!(!parser.can_parse(DOCKER_TS_LINE));
        assert!(!parser.can_parse("plain text line"));
        assert!(!parser.can_parse(""));
    }

    #[test]
    fn test_parse_cri_line() {
        let entry = DockerParser.parse_line(CRI_LINE, 1).unwrap();
        assert_eq!(entry.metadata.get("stream").map(String::as_str), Some("stdout"));
        assert_eq!(entry.metadata.get("tag").map(String::as_str), Some("F"));
        assert_eq!(entry.message, "Server listening on :8080");
        assert_eq!(entry.level, None);
        assert!(entry.timestamp.is_some());
    }

    #[test]
    fn test_parse_level_from_message() {
        let entry = DockerParser.parse_line(CRI_ERROR_LINE, 1).unwrap();
        assert_eq!(entry.level.as_deref(), Some("ERROR"));
        assert_eq!(entry.metadata.get("stream").map(String::as_str), Some("stderr"));
    }

    #[test]
    fn test_parse_docker_timestamps_line() {
        let entry = DockerParser.parse_line(DOCKER_TS_LINE, 4).unwrap();
        assert!(entry.metadata.is_empty());
        assert_eq!(entry.level.as_deref(), Some("WARN"));
        assert_eq!(entry.message, "WARN disk usage at 91%");
        assert_eq!(entry.timestamp.unwrap().to_rfc3339(), "2026-01-15T10:00:05+00:00");
    }

    #[test]
    fn test_parse_partial_tag() {
        let entry = DockerParser
            .parse_line("2026-01-15T10:00:05Z stdout P partial chu", 1)
            .unwrap();
        assert_eq!(entry.metadata.get("tag").map(String::as_str), Some("P"));
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        assert!(DockerParser.parse_line("yesterday stdout F msg", 1).is_none());
    }
}
