use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{trace, warn};

use crate::parser::model::{LogEntry, ParseError};
use crate::parser::traits::LogParser;

/// Lazy entry iterator over one log file.
///
/// Lines are read on demand, lossily decoded, and fed to the parser; lines
/// the parser rejects are skipped without breaking the stream. The handle is
/// released as soon as the stream is exhausted or the cap is hit, not only
/// on drop, so a finished stream held by a long-lived caller does not pin
/// the file open.
pub struct EntryStream {
    reader: Option<BufReader<File>>,
    parser: &'static dyn LogParser,
    path: String,
    line_number: u64,
    /// Raw-line cap; 0 means unbounded.
    max_lines: u64,
    buf: Vec<u8>,
}

impl std::fmt::Debug for EntryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStream")
            .field("path", &self.path)
            .field("line_number", &self.line_number)
            .field("max_lines", &self.max_lines)
            .finish_non_exhaustive()
    }
}

impl EntryStream {
    pub(crate) fn open(
        path: &Path,
        parser: &'static dyn LogParser,
        max_lines: u64,
    ) -> Result<Self, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::FileAccess {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            reader: Some(BufReader::new(file)),
            parser,
            path: path.display().to_string(),
            line_number: 0,
            max_lines,
            buf: Vec::new(),
        })
    }

    /// Physical lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> u64 {
        self.line_number
    }
}

impl Iterator for EntryStream {
    type Item = LogEntry;

    fn next(&mut self) -> Option<LogEntry> {
        loop {
            let reader = self.reader.as_mut()?;
            if self.max_lines > 0 && self.line_number >= self.max_lines {
                trace!(path = %self.path, cap = self.max_lines, "line cap reached");
                self.reader = None;
                return None;
            }

            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        path = %self.path,
                        line = self.line_number + 1,
                        error = %err,
                        "read failed, stopping stream"
                    );
                    self.reader = None;
                    return None;
                }
            }

            self.line_number += 1;
            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
            }
            if self.buf.is_empty() {
                continue;
            }

            let line = String::from_utf8_lossy(&self.buf);
            match self.parser.parse_line(&line, self.line_number) {
                Some(entry) => return Some(entry),
                None => {
                    trace!(path = %self.path, line = self.line_number, "unparsed line skipped");
                }
            }
        }
    }
}

/// Count physical lines in a file; a final line without a trailing newline
/// still counts.
pub(crate) fn count_lines(path: &Path) -> Result<u64, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut lines = 0u64;
    let mut last = b'\n';

    loop {
        let chunk = reader.fill_buf().map_err(|source| ParseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if chunk.is_empty() {
            break;
        }
        lines += chunk.iter().filter(|&&b| b == b'\n').count() as u64;
        last = chunk[chunk.len() - 1];
        let len = chunk.len();
        reader.consume(len);
    }
    if last != b'\n' {
        lines += 1;
    }
    Ok(lines)
}
