use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Syslog (RFC 3164 / RFC 5424)
    Syslog,
    /// Apache/Nginx access logs (CLF / combined)
    ApacheAccess,
    /// Apache error logs
    ApacheError,
    /// Line-delimited JSON
    Jsonl,
    /// Container runtime lines (CRI or `docker logs --timestamps`)
    Docker,
    /// Python stdlib `logging` default format
    Python,
    /// Java log4j/logback default pattern
    Java,
    /// Kubernetes klog lines
    Kubernetes,
    /// Fallback: timestamp/level-keyword scan (always matches with low confidence)
    Generic,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Syslog => "syslog",
            LogFormat::ApacheAccess => "apache_access",
            LogFormat::ApacheError => "apache_error",
            LogFormat::Jsonl => "jsonl",
            LogFormat::Docker => "docker",
            LogFormat::Python => "python",
            LogFormat::Java => "java",
            LogFormat::Kubernetes => "kubernetes",
            LogFormat::Generic => "generic",
        }
    }

    /// Resolve a caller-supplied format name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "syslog" => Some(LogFormat::Syslog),
            "apache_access" => Some(LogFormat::ApacheAccess),
            "apache_error" => Some(LogFormat::ApacheError),
            "jsonl" => Some(LogFormat::Jsonl),
            "docker" => Some(LogFormat::Docker),
            "python" => Some(LogFormat::Python),
            "java" => Some(LogFormat::Java),
            "kubernetes" => Some(LogFormat::Kubernetes),
            "generic" => Some(LogFormat::Generic),
            _ => None,
        }
    }
}

/// Outcome of format auto-detection over a head sample.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub format: LogFormat,
    /// Confidence level (0.0 - 1.0): the fraction of sampled lines the
    /// format's parser recognized.
    /// - 0.0-0.5: Low confidence (might be wrong)
    /// - 0.5-0.8: Medium confidence (likely correct)
    /// - 0.8-1.0: High confidence (very likely correct)
    pub confidence: f32,
}

impl Detection {
    pub fn new(format: LogFormat, confidence: f32) -> Self {
        Self {
            format,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Fallback when no format scored, or there was nothing to sample.
    pub fn fallback() -> Self {
        Self {
            format: LogFormat::Generic,
            confidence: super::FALLBACK_CONFIDENCE,
        }
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= super::HIGH_CONFIDENCE_THRESHOLD
    }
}

/// A single parsed log line.
///
/// Entries are immutable once built. Line numbers are 1-based and strictly
/// increasing within one stream; timestamps are whatever the source carried
/// and may run backwards, so consumers must not assume monotonic time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based position in the source file
    pub line_number: u64,

    /// Original line text, trailing newline stripped
    pub raw_line: String,

    /// Normalized to UTC when the format carries one
    pub timestamp: Option<DateTime<Utc>>,

    /// Free-form severity token; formats disagree, so no closed enum
    pub level: Option<String>,

    /// Semantic payload; equals raw_line for unstructured formats
    pub message: String,

    /// Format-specific key/value pairs (host, pid, status, ...)
    /// BTreeMap keeps serialized output deterministic
    pub metadata: BTreeMap<String, String>,
}

impl LogEntry {
    /// Entry with no extracted structure beyond the line itself.
    pub fn unstructured(line_number: u64, raw_line: &str) -> Self {
        Self {
            line_number,
            raw_line: raw_line.to_string(),
            timestamp: None,
            level: None,
            message: raw_line.to_string(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Per-file metadata returned alongside the entry stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub size_bytes: u64,
    /// Line count over the whole file, independent of any read cap
    pub total_lines: u64,
    pub format: LogFormat,
    /// Decoding is lossy by substitution, so this is always "utf-8"
    pub encoding: String,
    /// Present when the format was auto-detected rather than caller-declared
    pub detection_confidence: Option<f32>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot access {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed on {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
