use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::model::LogEntry;

/// One anchor hit and the entries that fell inside its time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationWindow {
    pub anchor: LogEntry,
    /// anchor timestamp - window_before
    pub window_start: DateTime<Utc>,
    /// anchor timestamp + window_after
    pub window_end: DateTime<Utc>,
    /// Most recent first: precursors[0] is the closest event before the anchor
    pub precursors: Vec<LogEntry>,
    /// Stream order
    pub followups: Vec<LogEntry>,
    pub precursors_truncated: bool,
    pub followups_truncated: bool,
}

/// Outcome of one correlation pass over an entry stream.
///
/// `anchors_seen` counts every pattern match in the pass, so a capped result
/// still reports how much was actually out there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Ordered by (anchor timestamp, anchor line number)
    pub windows: Vec<CorrelationWindow>,
    pub anchors_seen: u64,
    pub anchors_windowed: u64,
    pub anchors_skipped_no_timestamp: u64,
    pub anchor_cap_reached: bool,
}
