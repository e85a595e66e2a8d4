//! Boundary operations: everything external callers need is behind these
//! two functions plus the types they return.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::correlate::{correlate_entries, AnchorMatcher, CorrelateParams, CorrelationResult};
use crate::error::AnalyzeError;
use crate::parser::source::count_lines;
use crate::parser::{
    detect_format, parser_for, EntryStream, FileInfo, LogFormat, ParseError, DEFAULT_SAMPLE_SIZE,
};

/// Open a log file as a structured entry stream.
///
/// `format = None` auto-detects from a head sample and reports the score in
/// [`FileInfo::detection_confidence`]; an explicit format skips detection
/// and leaves the confidence empty. `max_lines = 0` reads the whole file.
///
/// A zero-byte file is a degenerate success: zero entries, `total_lines` of
/// zero, and the generic fallback at floor confidence. Callers that want to
/// treat it as a failure have `FileInfo::size_bytes` to decide with.
pub fn parse(
    path: &Path,
    format: Option<LogFormat>,
    max_lines: u64,
) -> Result<(FileInfo, EntryStream), AnalyzeError> {
    let metadata = fs::metadata(path).map_err(|source| ParseError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;

    let (resolved, confidence) = match format {
        Some(format) => (format, None),
        None => {
            let detection = detect_format(path, DEFAULT_SAMPLE_SIZE)?;
            (detection.format, Some(detection.confidence))
        }
    };

    let total_lines = count_lines(path)?;
    let stream = parser_for(resolved).parse_file(path, max_lines)?;

    let info = FileInfo {
        path: path.display().to_string(),
        size_bytes: metadata.len(),
        total_lines,
        format: resolved,
        encoding: "utf-8".to_string(),
        detection_confidence: confidence,
    };
    debug!(
        path = %info.path,
        format = info.format.as_str(),
        total_lines = info.total_lines,
        "parse opened"
    );
    Ok((info, stream))
}

/// Correlate around every entry whose raw line matches `pattern`.
///
/// The format is auto-detected and the whole file is streamed through the
/// engine in a single pass, so the result's `anchors_seen` is the true
/// file-wide match count even when collection was capped.
pub fn correlate(
    path: &Path,
    pattern: &str,
    params: &CorrelateParams,
) -> Result<CorrelationResult, AnalyzeError> {
    let matcher = AnchorMatcher::new(pattern)?;
    let (_, stream) = parse(path, None, 0)?;
    let result = correlate_entries(stream, &matcher, params);
    debug!(
        pattern,
        windows = result.windows.len(),
        anchors_seen = result.anchors_seen,
        "correlation finished"
    );
    Ok(result)
}
