use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

/// Parsers for common language-runtime layouts: the Python stdlib `logging`
/// default format and the Java log4j/logback default pattern.

/// `YYYY-MM-DD HH:MM:SS ...` with ` - `-separated logger, level, message.
pub struct PythonParser;

impl LogParser for PythonParser {
    fn format(&self) -> LogFormat {
        LogFormat::Python
    }

    fn can_parse(&self, line: &str) -> bool {
        let b = line.as_bytes();
        datetime_shape(b)
            && b.get(19) == Some(&b',')
            && b.get(20..23).is_some_and(|ms| ms.iter().all(u8::is_ascii_digit))
            && line.get(23..26) == Some(" - ")
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        if !self.can_parse(line) {
            return None;
        }
        let timestamp = NaiveDateTime::parse_from_str(line.get(..23)?, "%Y-%m-%d %H:%M:%S,%3f")
            .ok()?
            .and_utc();

        let mut parts = line.get(26..)?.splitn(3, " - ");
        let logger = parts.next()?;
        let level = parts.next()?;
        let message = parts.next()?;
        if logger.is_empty() || level.is_empty() {
            return None;
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("logger".to_string(), logger.to_string());

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: Some(timestamp),
            level: Some(level.to_string()),
            message: message.to_string(),
            metadata,
        })
    }
}

/// `YYYY-MM-DD HH:MM:SS.mmm [thread] LEVEL logger - message`. Log4j installs
/// sometimes emit a comma before the millis, so both separators are accepted.
pub struct JavaParser;

impl LogParser for JavaParser {
    fn format(&self) -> LogFormat {
        LogFormat::Java
    }

    fn can_parse(&self, line: &str) -> bool {
        let b = line.as_bytes();
        datetime_shape(b)
            && matches!(b.get(19), Some(&b'.') | Some(&b','))
            && b.get(20..23).is_some_and(|ms| ms.iter().all(u8::is_ascii_digit))
            && line.get(23..25) == Some(" [")
            && line.get(25..).is_some_and(|rest| rest.contains(']'))
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        if !self.can_parse(line) {
            return None;
        }
        let format = if line.as_bytes().get(19) == Some(&b'.') {
            "%Y-%m-%d %H:%M:%S.%3f"
        } else {
            "%Y-%m-%d %H:%M:%S,%3f"
        };
        let timestamp = NaiveDateTime::parse_from_str(line.get(..23)?, format)
            .ok()?
            .and_utc();

        let rest = line.get(25..)?;
        let close = rest.find(']')?;
        let thread = rest.get(..close)?;
        let rest = rest.get(close + 1..)?.trim_start();
        let (level, rest) = rest.split_once(' ')?;
        if level.is_empty() {
            return None;
        }
        // `%-5level` pads short names with trailing spaces
        let rest = rest.trim_start();
        let (logger, message) = match rest.split_once(" - ") {
            Some((logger, message)) => (Some(logger), message),
            None => (None, rest),
        };

        let mut metadata = BTreeMap::new();
        metadata.insert("thread".to_string(), thread.to_string());
        if let Some(logger) = logger {
            metadata.insert("logger".to_string(), logger.to_string());
        }

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: Some(timestamp),
            level: Some(level.to_string()),
            message: message.to_string(),
            metadata,
        })
    }
}

/// `YYYY-MM-DD HH:MM:SS` at the head of the line.
fn datetime_shape(b: &[u8]) -> bool {
    b.len() >= 19
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5].is_ascii_digit()
        && b[6].is_ascii_digit()
        && b[7] == b'-'
        && b[8].is_ascii_digit()
        && b[9].is_ascii_digit()
        && b[10] == b' '
        && b[11].is_ascii_digit()
        && b[12].is_ascii_digit()
        && b[13] == b':'
        && b[14].is_ascii_digit()
        && b[15].is_ascii_digit()
        && b[16] == b':'
        && b[17].is_ascii_digit()
        && b[18].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const PYTHON_LINE: &str = "2026-01-15 10:00:05,123 - app.db - ERROR - connection refused";
    const JAVA_LINE: &str =
        "2026-01-15 10:00:05.123 [main] INFO  com.example.Service - Request handled in 42ms";
    const LOG4J_LINE: &str =
        "2026-01-15 10:00:05,123 [pool-1-thread-2] WARN com.example.Cache - evicting 300 keys";

    // ─── Python ───

    #[test]
    fn test_python_parse() {
        let entry = PythonParser.parse_line(PYTHON_LINE, 1).unwrap();
        assert_eq!(entry.level.as_deref(), Some("ERROR"));
        assert_eq!(entry.message, "connection refused");
        assert_eq!(entry.metadata.get("logger").map(String::as_str), Some("app.db"));
        assert_eq!(entry.timestamp.unwrap().nanosecond(), 123_000_000);
    }

    #[test]
    fn test_python_message_keeps_separator() {
        let entry = PythonParser
            .parse_line("2026-01-15 10:00:05,000 - root - INFO - a - b - c", 1)
            .unwrap();
        assert_eq!(entry.message, "a - b - c");
    }

    #[test]
    fn test_python_rejects_java_shape() {
        assert!(!PythonParser.can_parse(JAVA_LINE));
        assert!(!PythonParser.can_parse("not a log line"));
    }

    // ─── Java ───

    #[test]
    fn test_java_parse_logback() {
        let entry = JavaParser.parse_line(JAVA_LINE, 1).unwrap();
        assert_eq!(entry.level.as_deref(), Some("INFO"));
        assert_eq!(entry.message, "Request handled in 42ms");
        assert_eq!(entry.metadata.get("thread").map(String::as_str), Some("main"));
        assert_eq!(
            entry.metadata.get("logger").map(String::as_str),
            Some("com.example.Service")
        );
    }

    #[test]
    fn test_java_parse_log4j_comma_millis() {
        let entry = JavaParser.parse_line(LOG4J_LINE, 1).unwrap();
        assert_eq!(entry.level.as_deref(), Some("WARN"));
        assert_eq!(
            entry.metadata.get("thread").map(String::as_str),
            Some("pool-1-thread-2")
        );
        assert_eq!(entry.timestamp.unwrap().nanosecond(), 123_000_000);
    }

    #[test]
    fn test_java_without_logger_separator() {
        let entry = JavaParser
            .parse_line("2026-01-15 10:00:05.000 [main] ERROR something broke", 1)
            .unwrap();
        assert_eq!(entry.level.as_deref(), Some("ERROR"));
        assert_eq!(entry.message, "something broke");
        assert!(!entry.metadata.contains_key("logger"));
    }

    #[test]
    fn test_java_rejects_python_shape() {
        assert!(!JavaParser.can_parse(PYTHON_LINE));
    }
}
