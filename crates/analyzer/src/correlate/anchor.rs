use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

use crate::parser::model::LogEntry;

#[derive(Debug, Error)]
pub enum CorrelateError {
    #[error("invalid anchor pattern: {0}")]
    InvalidPattern(String),
}

/// Compiled anchor pattern, applied to each entry's raw line.
///
/// Matching is case-sensitive and byte-oriented; the pattern sees the line
/// exactly as the file carried it, not the parsed message.
#[derive(Debug)]
pub struct AnchorMatcher {
    matcher: RegexMatcher,
    pattern: String,
}

impl AnchorMatcher {
    pub fn new(pattern: &str) -> Result<Self, CorrelateError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(false)
            .multi_line(false)
            .build(pattern)
            .map_err(|err| CorrelateError::InvalidPattern(err.to_string()))?;
        Ok(Self {
            matcher,
            pattern: pattern.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_anchor(&self, entry: &LogEntry) -> bool {
        self.matcher
            .is_match(entry.raw_line.as_bytes())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_raw_line() {
        let matcher = AnchorMatcher::new("ERROR").unwrap();
        assert!(matcher.is_anchor(&LogEntry::unstructured(1, "2026-01-15 ERROR boom")));
        assert!(!matcher.is_anchor(&LogEntry::unstructured(2, "2026-01-15 INFO fine")));
    }

    #[test]
    fn test_case_sensitive() {
        let matcher = AnchorMatcher::new("error").unwrap();
        assert!(!matcher.is_anchor(&LogEntry::unstructured(1, "ERROR boom")));
        assert!(matcher.is_anchor(&LogEntry::unstructured(2, "error boom")));
    }

    #[test]
    fn test_alternation() {
        let matcher = AnchorMatcher::new("timeout|refused").unwrap();
        assert!(matcher.is_anchor(&LogEntry::unstructured(1, "connection refused")));
        assert!(matcher.is_anchor(&LogEntry::unstructured(2, "read timeout after 5s")));
        assert!(!matcher.is_anchor(&LogEntry::unstructured(3, "connected")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = AnchorMatcher::new("(unclosed").unwrap_err();
        assert!(matches!(err, CorrelateError::InvalidPattern(_)));
    }
}
