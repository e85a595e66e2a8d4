use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::parser::model::{LogEntry, LogFormat};
use crate::parser::traits::LogParser;

/// Field aliases probed in order; the first hit wins.
const LEVEL_FIELDS: [&str; 4] = ["level", "lvl", "severity", "loglevel"];
const MESSAGE_FIELDS: [&str; 4] = ["message", "msg", "text", "log"];
const TIME_FIELDS: [&str; 4] = ["timestamp", "time", "ts", "@timestamp"];

/// Parser for line-delimited JSON (one object per line).
///
/// Level, message, and timestamp are pulled from the usual alias sets;
/// every other field lands in metadata, nested structures as compact JSON.
pub struct JsonlParser;

impl LogParser for JsonlParser {
    fn format(&self) -> LogFormat {
        LogFormat::Jsonl
    }

    fn can_parse(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('{') && trimmed.ends_with('}')
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let value: Value = serde_json::from_str(line.trim()).ok()?;
        let obj = value.as_object()?;

        let level = extract_string_field(obj, &LEVEL_FIELDS);
        let message = extract_string_field(obj, &MESSAGE_FIELDS)
            .unwrap_or_else(|| line.trim().to_string());
        let timestamp = extract_timestamp(obj);

        let mut metadata = BTreeMap::new();
        for (key, value) in obj {
            if LEVEL_FIELDS.contains(&key.as_str())
                || MESSAGE_FIELDS.contains(&key.as_str())
                || TIME_FIELDS.contains(&key.as_str())
            {
                continue;
            }
            let value_str = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => "null".to_string(),
                // keep nested structures as compact JSON
                Value::Object(_) | Value::Array(_) => match serde_json::to_string(value) {
                    Ok(json) => json,
                    Err(_) => continue,
                },
            };
            metadata.insert(key.clone(), value_str);
        }

        Some(LogEntry {
            line_number,
            raw_line: line.to_string(),
            timestamp,
            level,
            message,
            metadata,
        })
    }
}

fn extract_string_field(
    obj: &serde_json::Map<String, Value>,
    field_names: &[&str],
) -> Option<String> {
    for field in field_names {
        if let Some(value) = obj.get(*field) {
            let result = match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            };
            if result.is_some() {
                return result;
            }
        }
    }
    None
}

fn extract_timestamp(obj: &serde_json::Map<String, Value>) -> Option<DateTime<Utc>> {
    for field in TIME_FIELDS {
        if let Some(value) = obj.get(field) {
            let result = match value {
                Value::Number(n) => n.as_i64().and_then(epoch_to_datetime),
                Value::String(s) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|| s.parse::<i64>().ok().and_then(epoch_to_datetime)),
                _ => None,
            };
            if result.is_some() {
                return result;
            }
        }
    }
    None
}

/// Unix timestamps over 1e12 are taken as milliseconds, otherwise seconds.
fn epoch_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 1_000_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}
