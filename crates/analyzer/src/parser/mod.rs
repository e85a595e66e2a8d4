//! Log parsing: the entry model, per-format parsers, the static registry,
//! confidence-based format detection, and the lazy file stream.

pub mod detect;
pub mod formats;
pub mod model;
pub mod registry;
pub mod source;
pub mod traits;

/// Raw lines read per file when the caller does not set a cap.
pub const DEFAULT_MAX_LINES: u64 = 10_000;

/// Lines sampled from the head of a file for format detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Confidence reported when no format recognized the sample.
pub const FALLBACK_CONFIDENCE: f32 = 0.1;

/// At or above this score a detection is trusted without review.
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.8;

pub use detect::{detect_format, read_sample, score_sample};
pub use model::{Detection, FileInfo, LogEntry, LogFormat, ParseError};
pub use registry::{parser_by_name, parser_for, Registered, REGISTRY};
pub use source::EntryStream;
pub use traits::LogParser;
