use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

/// Parser for klog output as emitted by Kubernetes components:
/// `Lmmdd hh:mm:ss.uuuuuu threadid file:line] msg`.
///
/// The header carries no year, so entries are pinned to the current one,
/// same as the syslog RFC 3164 handling.
pub struct KubernetesParser;

impl LogParser for KubernetesParser {
    fn format(&self) -> LogFormat {
        LogFormat::Kubernetes
    }

    fn can_parse(&self, line: &str) -> bool {
        klog_header(line).is_some()
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let header = klog_header(line)?;

        let mut metadata = BTreeMap::new();
        metadata.insert("pid".to_string(), header.pid.to_string());
        metadata.insert("location".to_string(), header.location.to_string());

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: Some(header.timestamp),
            level: Some(header.level.to_string()),
            message: header.message.to_string(),
            metadata,
        })
    }
}

struct KlogHeader<'a> {
    level: &'static str,
    timestamp: DateTime<Utc>,
    pid: &'a str,
    location: &'a str,
    message: &'a str,
}

fn klog_header(line: &str) -> Option<KlogHeader<'_>> {
    let level = match line.as_bytes().first()? {
        b'I' => "INFO",
        b'W' => "WARNING",
        b'E' => "ERROR",
        b'F' => "FATAL",
        _ => return None,
    };

    let mmdd = line.get(1..5)?;
    if !mmdd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = mmdd.get(..2)?.parse().ok()?;
    let day: u32 = mmdd.get(2..)?.parse().ok()?;
    if line.as_bytes().get(5) != Some(&b' ') {
        return None;
    }

    let rest = line.get(6..)?;
    let time_len = rest
        .bytes()
        .take_while(|&b| b.is_ascii_digit() || b == b':' || b == b'.')
        .count();
    let time = NaiveTime::parse_from_str(rest.get(..time_len)?, "%H:%M:%S%.f").ok()?;

    let after_time = rest.get(time_len..)?.trim_start();
    let (pid, after_pid) = after_time.split_once(' ')?;
    if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (location, message) = after_pid.trim_start().split_once(']')?;
    if !location.contains(':') {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(Utc::now().year(), month, day)?;
    Some(KlogHeader {
        level,
        timestamp: date.and_time(time).and_utc(),
        pid,
        location,
        message: message.trim_start(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const INFO_LINE: &str = "I0115 10:00:05.123456   12345 server.go:147] Serving on 8443";
    const ERROR_LINE: &str = "E0115 10:00:07.000001    8821 leaderelection.go:325] error retrieving resource lock";

    #[test]
    fn test_parse_info_line() {
        let entry = KubernetesParser.parse_line(INFO_LINE, 1).unwrap();
        assert_eq!(entry.level.as_deref(), Some("INFO"));
        assert_eq!(entry.message, "Serving on 8443");
        assert_eq!(entry.metadata.get("pid").map(String::as_str), Some("12345"));
        assert_eq!(
            entry.metadata.get("location").map(String::as_str),
            Some("server.go:147")
        );

        let ts = entry.timestamp.unwrap();
        assert_eq!(ts.year(), Utc::now().year());
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 15);
        assert_eq!(ts.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_error_line() {
        let entry = KubernetesParser.parse_line(ERROR_LINE, 2).unwrap();
        assert_eq!(entry.level.as_deref(), Some("ERROR"));
        assert_eq!(
            entry.metadata.get("location").map(String::as_str),
            Some("leaderelection.go:325")
        );
    }

    #[test]
    fn test_severity_letters() {
        for (line, level) in [
            ("I0101 00:00:00.000000 1 a.go:1] m", "INFO"),
            ("W0101 00:00:00.000000 1 a.go:1] m", "WARNING"),
            ("E0101 00:00:00.000000 1 a.go:1] m", "ERROR"),
            ("F0101 00:00:00.000000 1 a.go:1] m", "FATAL"),
        ] {
            let entry = KubernetesParser.parse_line(line, 1).unwrap();
            assert_eq!(entry.level.as_deref(), Some(level));
        }
    }

    #[test]
    fn test_message_keeps_later_brackets() {
        let entry = KubernetesParser
            .parse_line("I0115 10:00:05.000000 1 kube.go:9] watch [pods] closed", 1)
            .unwrap();
        assert_eq!(entry.message, "watch [pods] closed");
    }

    #[test]
    fn test_rejects_non_klog() {
        let parser = KubernetesParser;
        assert!(!parser.can_parse("INFO 0115 not klog"));
        assert!(!parser.can_parse("I01150 10:00:05.000000 1 a.go:1] m"));
        assert!(!parser.can_parse("I0115 10:00:05.000000 1 noloc] m"));
        assert!(!parser.can_parse(""));
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(KubernetesParser
            .parse_line("I1340 10:00:05.000000 1 a.go:1] m", 1)
            .is_none());
    }
}
