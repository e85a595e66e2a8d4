use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

const HTTP_METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "CONNECT",
];

/// Parser for HTTP access logs (Common Log Format and Combined Log Format).
///
/// Extracts remote host, user, timestamp, method, path, protocol, status,
/// response size, referrer, and user-agent. The level is derived from the
/// status code: 5xx ERROR, 4xx WARN, everything else INFO.
pub struct ApacheAccessParser;

impl LogParser for ApacheAccessParser {
    fn format(&self) -> LogFormat {
        LogFormat::ApacheAccess
    }

    fn can_parse(&self, line: &str) -> bool {
        // host ident authuser [date] "METHOD path proto" status bytes
        let Some(open) = line.find('[') else {
            return false;
        };
        let Some(close) = line[open..].find(']').map(|i| open + i) else {
            return false;
        };
        let date_part = &line[open + 1..close];
        if !date_part.contains('/') || !date_part.contains(':') {
            return false;
        }
        let Some(quote) = line[close..].find('"').map(|i| close + i) else {
            return false;
        };
        let request = &line[quote + 1..];
        HTTP_METHODS.iter().any(|m| {
            request.starts_with(m) && request.as_bytes().get(m.len()) == Some(&b' ')
        })
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let open = line.find('[')?;
        let close = line[open..].find(']')? + open;

        // host ident authuser before the bracket
        let mut prefix = line[..open].split_whitespace();
        let remote_host = prefix.next()?;
        let _ident = prefix.next();
        let user = prefix.next().filter(|s| *s != "-");

        let timestamp = DateTime::parse_from_str(&line[open + 1..close], "%d/%b/%Y:%H:%M:%S %z")
            .ok()
            .map(|dt| dt.with_timezone(&Utc));

        let after = line[close + 1..].trim_start();
        let request = after.strip_prefix('"')?;
        let quote_end = request.find('"')?;
        let request_line = &request[..quote_end];
        let after_request = request[quote_end + 1..].trim_start();

        let mut req_parts = request_line.splitn(3, ' ');
        let method = req_parts.next()?;
        let path = req_parts.next();
        let protocol = req_parts.next();

        let mut tail = after_request.split_whitespace();
        let status: u16 = tail.next()?.parse().ok()?;
        let bytes_sent = tail.next().filter(|s| *s != "-");

        // Combined Log Format appends "referrer" "user-agent"
        let remaining = after_request.splitn(3, ' ').nth(2).unwrap_or("");
        let (referrer, user_agent) = extract_quoted_pair(remaining);

        let level = if status >= 500 {
            "ERROR"
        } else if status >= 400 {
            "WARN"
        } else {
            "INFO"
        };

        let mut metadata = BTreeMap::new();
        metadata.insert("remote_host".to_string(), remote_host.to_string());
        metadata.insert("method".to_string(), method.to_string());
        metadata.insert("status".to_string(), status.to_string());
        if let Some(user) = user {
            metadata.insert("user".to_string(), user.to_string());
        }
        if let Some(path) = path {
            metadata.insert("path".to_string(), path.to_string());
        }
        if let Some(protocol) = protocol {
            metadata.insert("protocol".to_string(), protocol.to_string());
        }
        if let Some(bytes) = bytes_sent {
            metadata.insert("bytes".to_string(), bytes.to_string());
        }
        if let Some(referrer) = referrer {
            metadata.insert("referrer".to_string(), referrer);
        }
        if let Some(ua) = user_agent {
            metadata.insert("user_agent".to_string(), ua);
        }

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp,
            level: Some(level.to_string()),
            message: format!("{} {}", request_line, status),
            metadata,
        })
    }
}

/// Parser for Apache error logs.
///
/// Handles the 2.4 shape `[ts] [module:level] [pid N] [client A] msg` and the
/// older `[ts] [level] [client A] msg`. The level token is kept as written.
pub struct ApacheErrorParser;

impl LogParser for ApacheErrorParser {
    fn format(&self) -> LogFormat {
        LogFormat::ApacheError
    }

    fn can_parse(&self, line: &str) -> bool {
        let Some(rest) = line.strip_prefix('[') else {
            return false;
        };
        let Some(close) = rest.find(']') else {
            return false;
        };
        parse_error_timestamp(&rest[..close]).is_some() && rest[close..].contains(" [")
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let mut rest = line;
        let ts_inner = take_bracket(&mut rest)?;
        let timestamp = parse_error_timestamp(ts_inner)?;

        // 2.4 logs [module:level]; older releases log a bare [level]
        let level_inner = take_bracket(&mut rest)?;
        let (module, level) = match level_inner.split_once(':') {
            Some((module, level)) => (Some(module), level),
            None => (None, level_inner),
        };

        let mut metadata = BTreeMap::new();
        if let Some(module) = module {
            metadata.insert("module".to_string(), module.to_string());
        }

        // Optional [pid N] / [pid N:tid M] / [client ADDR] groups before the message
        loop {
            let saved = rest;
            let Some(inner) = take_bracket(&mut rest) else {
                break;
            };
            if let Some(pid_part) = inner.strip_prefix("pid ") {
                match pid_part.split_once(':') {
                    Some((pid, tid_part)) => {
                        metadata.insert("pid".to_string(), pid.to_string());
                        if let Some(tid) = tid_part.strip_prefix("tid ") {
                            metadata.insert("tid".to_string(), tid.to_string());
                        }
                    }
                    None => {
                        metadata.insert("pid".to_string(), pid_part.to_string());
                    }
                }
            } else if let Some(client) = inner.strip_prefix("client ") {
                metadata.insert("client".to_string(), client.to_string());
            } else {
                // not a header group; it belongs to the message
                rest = saved;
                break;
            }
        }

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp: Some(timestamp),
            level: Some(level.to_string()),
            message: rest.trim_start().to_string(),
            metadata,
        })
    }
}

/// `Day Mon dd hh:mm:ss(.ffffff) yyyy`, no timezone on the wire.
fn parse_error_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%a %b %d %H:%M:%S%.f %Y")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Pop a leading `[inner]` group off `rest`, skipping leading whitespace.
fn take_bracket<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let r = rest.trim_start().strip_prefix('[')?;
    let close = r.find(']')?;
    *rest = r.get(close + 1..).unwrap_or("");
    Some(&r[..close])
}

/// Extract up to two quoted values ("-" means absent), honoring escapes.
fn extract_quoted_pair(text: &str) -> (Option<String>, Option<String>) {
    let mut chars = text.chars();
    let first = next_quoted(&mut chars).filter(|v| v != "-");
    let second = next_quoted(&mut chars).filter(|v| v != "-");
    (first, second)
}

fn next_quoted(chars: &mut std::str::Chars<'_>) -> Option<String> {
    loop {
        match chars.next() {
            Some('"') => break,
            Some(_) => continue,
            None => return None,
        }
    }
    let mut val = String::new();
    let mut escaped = false;
    for c in chars.by_ref() {
        if escaped {
            val.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(val);
        } else {
            val.push(c);
        }
    }
    None
}
