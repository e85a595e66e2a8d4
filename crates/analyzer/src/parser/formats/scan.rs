//! Word-boundary level-keyword scanning.
//!
//! Pure helpers shared by the loosely structured formats (container runtime
//! lines, the generic fallback) to pull a severity token out of free text.

/// Level keywords in probe order. Longer tokens come before their prefixes
/// so WARNING wins over WARN at the same offset.
const LEVEL_KEYWORDS: &[&str] = &[
    "CRITICAL", "WARNING", "ERROR", "FATAL", "TRACE", "DEBUG", "WARN", "INFO",
];

/// Find the first level keyword in `line` (case-insensitive, word-bounded)
/// and return its canonical uppercase form.
pub(crate) fn find_level_keyword(line: &str) -> Option<&'static str> {
    let bytes = line.as_bytes();
    for pos in 0..bytes.len() {
        if pos > 0 && is_word_byte(bytes[pos - 1]) {
            continue;
        }
        for &keyword in LEVEL_KEYWORDS {
            if keyword_at(bytes, pos, keyword) {
                return Some(keyword);
            }
        }
    }
    None
}

/// Check a keyword at exact position `pos` with a word boundary after it.
fn keyword_at(bytes: &[u8], pos: usize, keyword: &str) -> bool {
    let kw = keyword.as_bytes();
    let end = pos + kw.len();
    if end > bytes.len() {
        return false;
    }
    if !bytes[pos..end].eq_ignore_ascii_case(kw) {
        return false;
    }
    end == bytes.len() || !is_word_byte(bytes[end])
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_at_start() {
        assert_eq!(find_level_keyword("ERROR disk full"), Some("ERROR"));
        assert_eq!(find_level_keyword("WARN low memory"), Some("WARN"));
        assert_eq!(find_level_keyword("INFO started"), Some("INFO"));
    }

    #[test]
    fn test_keyword_mid_line() {
        assert_eq!(
            find_level_keyword("2026-01-15 10:00:05 error: timeout"),
            Some("ERROR")
        );
    }

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(find_level_keyword("critical failure"), Some("CRITICAL"));
        assert_eq!(find_level_keyword("Fatal signal 11"), Some("FATAL"));
    }

    #[test]
    fn test_longest_token_wins() {
        assert_eq!(find_level_keyword("WARNING: retrying"), Some("WARNING"));
    }

    #[test]
    fn test_word_boundary_required() {
        assert_eq!(find_level_keyword("information desk"), None);
        assert_eq!(find_level_keyword("warning_count=5"), None);
        assert_eq!(find_level_keyword("mirrored volume"), None);
    }

    #[test]
    fn test_leftmost_match_wins() {
        assert_eq!(
            find_level_keyword("info first, ERROR second"),
            Some("INFO")
        );
    }

    #[test]
    fn test_no_keyword() {
        assert_eq!(find_level_keyword("hello world"), None);
        assert_eq!(find_level_keyword(""), None);
    }
}
