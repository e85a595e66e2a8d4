use std::path::Path;

use super::model::{LogEntry, LogFormat, ParseError};
use super::source::EntryStream;

pub trait LogParser: Send + Sync {
    fn format(&self) -> LogFormat;

    /// Cheap structural check: does this line look like the format?
    /// Must never panic; anything malformed or empty is simply `false`.
    fn can_parse(&self, line: &str) -> bool;

    /// Parse one line into a structured entry. `None` means the line does
    /// not fit the format; such lines are skipped, never errors.
    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogEntry>;

    /// Fraction of sample lines `can_parse` accepts. Empty sample scores 0.
    /// Overridable so a format can weigh its sample differently.
    fn detect_confidence(&self, sample: &[String]) -> f32 {
        if sample.is_empty() {
            return 0.0;
        }
        let hits = sample.iter().filter(|line| self.can_parse(line)).count();
        hits as f32 / sample.len() as f32
    }
}

impl dyn LogParser {
    /// Lazily parse a file, reading at most `max_lines` raw lines (0 = no
    /// cap). Empty lines and lines the parser rejects are skipped. The
    /// receiver is `'static` because the stream outlives the call; registry
    /// parsers satisfy this.
    pub fn parse_file(
        &'static self,
        path: &Path,
        max_lines: u64,
    ) -> Result<EntryStream, ParseError> {
        EntryStream::open(path, self, max_lines)
    }
}
