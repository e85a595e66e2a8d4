//! Time-window correlation around anchor events.
//!
//! An anchor is any entry whose raw line matches the caller's pattern. Each
//! windowed anchor collects the timestamped entries that fell within
//! `window_before` seconds before it and `window_after` seconds after it,
//! subject to per-window and per-pass caps.

use serde::{Deserialize, Serialize};

pub mod anchor;
pub mod batch;
pub mod engine;
pub mod window;

pub const DEFAULT_WINDOW_BEFORE_SECS: u64 = 60;
pub const DEFAULT_WINDOW_AFTER_SECS: u64 = 30;
pub const DEFAULT_MAX_ANCHORS: usize = 10;
pub const DEFAULT_MAX_PRECURSORS: usize = 50;
pub const DEFAULT_MAX_FOLLOWUPS: usize = 50;

/// Knobs for one correlation pass. Offsets of zero are legal and produce
/// windows that only ever contain the anchor's own instant, which the
/// strict anchor-exclusion then empties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelateParams {
    pub window_before_secs: u64,
    pub window_after_secs: u64,
    /// Windows opened per pass; matches beyond it are counted, not collected
    pub max_anchors: usize,
    pub max_precursors: usize,
    pub max_followups: usize,
}

impl Default for CorrelateParams {
    fn default() -> Self {
        Self {
            window_before_secs: DEFAULT_WINDOW_BEFORE_SECS,
            window_after_secs: DEFAULT_WINDOW_AFTER_SECS,
            max_anchors: DEFAULT_MAX_ANCHORS,
            max_precursors: DEFAULT_MAX_PRECURSORS,
            max_followups: DEFAULT_MAX_FOLLOWUPS,
        }
    }
}

pub use anchor::{AnchorMatcher, CorrelateError};
pub use batch::correlate_slice;
pub use engine::{correlate_entries, StreamingCorrelator};
pub use window::{CorrelationResult, CorrelationWindow};
