use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use crate::parser::model::{Detection, ParseError};
use crate::parser::registry::REGISTRY;

/// Read up to `sample_size` lines from the head of the file for scoring.
/// Empty lines are kept: no parser claims them, so they weigh the
/// denominator and push mostly-blank files toward the generic fallback.
pub fn read_sample(path: &Path, sample_size: usize) -> Result<Vec<String>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut sample = Vec::new();
    let mut buf = Vec::new();

    while sample.len() < sample_size {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ParseError::Read {
                path: path.display().to_string(),
                source,
            })?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        sample.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(sample)
}

/// Score every registered format against an in-memory sample.
///
/// The scan keeps a strictly greater maximum, so equal scores resolve to the
/// earlier registry slot. An empty sample or an all-zero scan falls back to
/// generic at the floor confidence.
pub fn score_sample(sample: &[String]) -> Detection {
    if sample.is_empty() {
        return Detection::fallback();
    }

    let mut best: Option<Detection> = None;
    for slot in REGISTRY {
        let confidence = slot.parser.detect_confidence(sample);
        trace!(format = slot.name, confidence, "format score");
        match &best {
            Some(current) if confidence <= current.confidence => {}
            _ => best = Some(Detection::new(slot.format, confidence)),
        }
    }

    match best {
        Some(detection) if detection.confidence > 0.0 => detection,
        _ => Detection::fallback(),
    }
}

/// Detect the format of a file from its head sample.
pub fn detect_format(path: &Path, sample_size: usize) -> Result<Detection, ParseError> {
    let sample = read_sample(path, sample_size)?;
    let detection = score_sample(&sample);
    debug!(
        path = %path.display(),
        format = detection.format.as_str(),
        confidence = detection.confidence,
        sampled = sample.len(),
        "detected log format"
    );
    Ok(detection)
}
