use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

/// Parser for syslog messages (RFC 3164 and RFC 5424).
///
/// Accepts the classic `Mmm dd hh:mm:ss host tag[pid]: msg` shape with or
/// without a leading `<PRI>`, and the versioned RFC 5424 header. Priority
/// decodes into severity (the entry level) and facility metadata.
pub struct SyslogParser;

/// Syslog severity levels (RFC 5424 §6.2.1)
const SYSLOG_SEVERITIES: [&str; 8] = [
    "emergency", "alert", "critical", "error",
    "warning", "notice", "info", "debug",
];

/// Syslog facility names (RFC 5424 §6.2.1)
const SYSLOG_FACILITIES: [&str; 24] = [
    "kern", "user", "mail", "daemon", "auth", "syslog", "lpr", "news",
    "uucp", "cron", "authpriv", "ftp", "ntp", "audit", "alert", "clock",
    "local0", "local1", "local2", "local3", "local4", "local5", "local6", "local7",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl LogParser for SyslogParser {
    fn format(&self) -> LogFormat {
        LogFormat::Syslog
    }

    fn can_parse(&self, line: &str) -> bool {
        match split_pri(line) {
            Some((_, rest)) => is_rfc5424_header(rest) || rfc3164_timestamp(rest).is_some(),
            None => rfc3164_timestamp(line).is_some(),
        }
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let (pri, rest) = match split_pri(line) {
            Some((pri, rest)) => (Some(pri), rest),
            None => (None, line),
        };

        let fields = if pri.is_some() && is_rfc5424_header(rest) {
            parse_rfc5424(rest.get(2..)?)?
        } else {
            parse_rfc3164(rest)?
        };

        let mut metadata = BTreeMap::new();
        let mut level = None;
        if let Some(pri) = pri {
            metadata.insert("priority".to_string(), pri.to_string());
            if let Some(sev) = SYSLOG_SEVERITIES.get((pri & 0x07) as usize) {
                level = Some(sev.to_string());
            }
            if let Some(fac) = SYSLOG_FACILITIES.get((pri >> 3) as usize) {
                metadata.insert("facility".to_string(), fac.to_string());
            }
        }
        if let Some(host) = fields.host {
            metadata.insert("host".to_string(), host);
        }
        if let Some(app) = fields.app {
            metadata.insert("app".to_string(), app);
        }
        if let Some(pid) = fields.pid {
            metadata.insert("pid".to_string(), pid);
        }
        if let Some(msgid) = fields.msgid {
            metadata.insert("msgid".to_string(), msgid);
        }

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: fields.timestamp,
            level,
            message: fields.message,
            metadata,
        })
    }
}

struct SyslogFields {
    timestamp: Option<DateTime<Utc>>,
    host: Option<String>,
    app: Option<String>,
    pid: Option<String>,
    msgid: Option<String>,
    message: String,
}

/// Split a leading `<PRI>` off the line. PRI is 1-3 digits, max 191.
fn split_pri(line: &str) -> Option<(u32, &str)> {
    let rest = line.strip_prefix('<')?;
    let end = rest.find('>')?;
    if end == 0 || end > 3 {
        return None;
    }
    let digits = rest.get(..end)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pri: u32 = digits.parse().ok()?;
    (pri <= 191).then_some((pri, rest.get(end + 1..)?))
}

/// RFC 5424 header after the PRI: version "1", space, then the timestamp.
fn is_rfc5424_header(rest: &str) -> bool {
    rest.starts_with("1 ")
        && rest
            .as_bytes()
            .get(2)
            .is_some_and(|b| b.is_ascii_digit() || *b == b'-')
}

/// Parse the RFC 3164 `Mmm dd hh:mm:ss` prefix (day space- or zero-padded).
/// The year is absent on the wire; the current year is assumed.
/// Returns the timestamp and the number of bytes consumed.
fn rfc3164_timestamp(text: &str) -> Option<(DateTime<Utc>, usize)> {
    let month = MONTHS.iter().position(|m| text.starts_with(m))? as u32 + 1;
    let rest = text.get(3..)?.strip_prefix(' ')?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    let day_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if day_len == 0 || day_len > 2 {
        return None;
    }
    let day: u32 = rest.get(..day_len)?.parse().ok()?;
    let rest = rest.get(day_len..)?.strip_prefix(' ')?;

    let time = NaiveTime::parse_from_str(rest.get(..8)?, "%H:%M:%S").ok()?;
    let date = NaiveDate::from_ymd_opt(Utc::now().year(), month, day)?;

    let consumed = text.len() - rest.len() + 8;
    Some((date.and_time(time).and_utc(), consumed))
}

fn parse_rfc3164(text: &str) -> Option<SyslogFields> {
    let (timestamp, consumed) = rfc3164_timestamp(text)?;
    let after_ts = text.get(consumed..)?.trim_start();

    // "hostname tag[pid]: message" or "hostname tag: message"
    let Some((host, rest)) = after_ts.split_once(' ') else {
        return Some(SyslogFields {
            timestamp: Some(timestamp),
            host: None,
            app: None,
            pid: None,
            msgid: None,
            message: after_ts.to_string(),
        });
    };

    let (tag_token, remainder) = match rest.split_once(' ') {
        Some((tag, msg)) => (tag, msg),
        None => (rest, ""),
    };

    let (app, pid, message) = match tag_token.strip_suffix(':') {
        Some(tag) => {
            let (app, pid) = match tag.split_once('[') {
                Some((app, pid_part)) => {
                    (app, pid_part.strip_suffix(']').map(str::to_string))
                }
                None => (tag, None),
            };
            (Some(app.to_string()), pid, remainder.to_string())
        }
        None => (None, None, rest.to_string()),
    };

    Some(SyslogFields {
        timestamp: Some(timestamp),
        host: Some(host.to_string()),
        app,
        pid,
        msgid: None,
        message,
    })
}

/// Parse the RFC 5424 remainder after `<PRI>1 `:
/// timestamp SP hostname SP app-name SP procid SP msgid SP structured-data [SP msg]
fn parse_rfc5424(text: &str) -> Option<SyslogFields> {
    let mut parts = text.splitn(6, ' ');
    let timestamp = parts.next()?;
    let hostname = parts.next()?;
    let app = parts.next()?;
    let procid = parts.next()?;
    let msgid = parts.next()?;
    let rest = parts.next().unwrap_or("");

    let timestamp = (timestamp != "-")
        .then(|| DateTime::parse_from_rfc3339(timestamp).ok())
        .flatten()
        .map(|dt| dt.with_timezone(&Utc));

    Some(SyslogFields {
        timestamp,
        host: nil_value(hostname),
        app: nil_value(app),
        pid: nil_value(procid),
        msgid: nil_value(msgid),
        message: skip_structured_data(rest).to_string(),
    })
}

/// RFC 5424 spells "absent" as "-".
fn nil_value(s: &str) -> Option<String> {
    (s != "-" && !s.is_empty()).then(|| s.to_string())
}

/// Skip the structured-data element(s) and return the free-text message.
fn skip_structured_data(s: &str) -> &str {
    let s = s.trim_start();
    if let Some(rest) = s.strip_prefix('-') {
        return rest.trim_start();
    }
    let mut rest = s;
    while rest.starts_with('[') {
        match rest.find(']') {
            Some(idx) => rest = rest.get(idx + 1..).unwrap_or(""),
            None => break,
        }
    }
    rest.trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const RFC3164_LINE: &str =
        "<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8";
    const RFC5424_LINE: &str = "<165>1 2003-10-11T22:14:15.003Z mymachine.example.com \
         evntslog - ID47 [exampleSDID@32473 iut=\"3\"] BOMAn application event log entry";

    #[test]
    fn test_can_parse_canonical_lines() {
        let parser = SyslogParser;
        assert!(parser.can_parse(RFC3164_LINE));
        assert!(parser.can_parse(RFC5424_LINE));
        assert!(parser.can_parse("Oct 11 22:14:15 myhost sshd[1234]: Accepted publickey"));
    }

    #[test]
    fn test_can_parse_rejects_other() {
        let parser = SyslogParser;
        assert!(!parser.can_parse("Just some plain text"));
        assert!(!parser.can_parse(r#"{"level":"info"}"#));
        assert!(!parser.can_parse("<abc>bad priority"));
        assert!(!parser.can_parse(""));
    }

    #[test]
    fn test_parse_rfc3164_line() {
        let entry = SyslogParser.parse_line(RFC3164_LINE, 1).unwrap();
        // pri=34 => facility=4 (auth), severity=2 (critical)
        assert_eq!(entry.level.as_deref(), Some("critical"));
        assert_eq!(entry.metadata.get("facility").map(String::as_str), Some("auth"));
        assert_eq!(entry.metadata.get("host").map(String::as_str), Some("mymachine"));
        assert_eq!(entry.metadata.get("app").map(String::as_str), Some("su"));
        assert!(entry.message.contains("su root"));
        let ts = entry.timestamp.unwrap();
        assert_eq!((ts.month(), ts.day()), (10, 11));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (22, 14, 15));
        assert_eq!(ts.year(), Utc::now().year());
    }

    #[test]
    fn test_parse_rfc5424_line() {
        let entry = SyslogParser.parse_line(RFC5424_LINE, 7).unwrap();
        // pri=165 => facility=20 (local4), severity=5 (notice)
        assert_eq!(entry.level.as_deref(), Some("notice"));
        assert_eq!(entry.metadata.get("facility").map(String::as_str), Some("local4"));
        assert_eq!(entry.metadata.get("app").map(String::as_str), Some("evntslog"));
        assert_eq!(entry.metadata.get("msgid").map(String::as_str), Some("ID47"));
        assert_eq!(entry.message, "BOMAn application event log entry");
        let ts = entry.timestamp.unwrap();
        assert_eq!(ts.to_rfc3339(), "2003-10-11T22:14:15.003+00:00");
        assert_eq!(entry.line_number, 7);
    }

    #[test]
    fn test_parse_without_priority() {
        let entry = SyslogParser
            .parse_line("Oct 11 22:14:15 myhost sshd[1234]: Accepted publickey", 1)
            .unwrap();
        assert_eq!(entry.level, None);
        assert_eq!(entry.metadata.get("pid").map(String::as_str), Some("1234"));
        assert_eq!(entry.metadata.get("app").map(String::as_str), Some("sshd"));
        assert_eq!(entry.message, "Accepted publickey");
        assert!(entry.timestamp.is_some());
        assert!(!entry.metadata.contains_key("priority"));
    }

    #[test]
    fn test_parse_space_padded_day() {
        let entry = SyslogParser
            .parse_line("Oct  7 02:14:15 host cron[7]: job started", 1)
            .unwrap();
        assert_eq!(entry.timestamp.unwrap().day(), 7);
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        assert!(SyslogParser.parse_line("no syslog here", 1).is_none());
        assert!(SyslogParser.parse_line("<999>Oct 11 22:14:15 h a: m", 1).is_none());
    }

    #[test]
    fn test_rfc5424_nil_timestamp() {
        let entry = SyslogParser
            .parse_line("<34>1 - host app 123 - - late boot message", 1)
            .unwrap();
        assert!(entry.timestamp.is_none());
        assert_eq!(entry.metadata.get("pid").map(String::as_str), Some("123"));
        assert_eq!(entry.message, "late boot message");
    }
}
