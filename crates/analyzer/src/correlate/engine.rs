use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::correlate::anchor::AnchorMatcher;
use crate::correlate::window::{CorrelationResult, CorrelationWindow};
use crate::correlate::CorrelateParams;
use crate::parser::model::LogEntry;

/// Single-pass, bounded-memory correlator.
///
/// Feed entries in stream order through [`process`](Self::process), which
/// returns windows the stream has moved past, then drain the rest with
/// [`finish`](Self::finish). Memory stays proportional to the precursor pool
/// spanning `window_before` plus the open windows and their caps, never the
/// file.
///
/// Timestamps are taken as they come: out-of-order entries still land in the
/// pool and in open windows, they just may fall outside every window's range.
pub struct StreamingCorrelator<'a> {
    matcher: &'a AnchorMatcher,
    params: &'a CorrelateParams,
    before: Duration,
    after: Duration,
    /// Timestamped entries only, evicted once older than `current - before`
    pool: VecDeque<LogEntry>,
    open: Vec<CorrelationWindow>,
    anchors_seen: u64,
    anchors_windowed: u64,
    anchors_skipped_no_timestamp: u64,
    anchor_cap_reached: bool,
}

impl<'a> StreamingCorrelator<'a> {
    pub fn new(matcher: &'a AnchorMatcher, params: &'a CorrelateParams) -> Self {
        Self {
            matcher,
            params,
            before: offset_seconds(params.window_before_secs),
            after: offset_seconds(params.window_after_secs),
            pool: VecDeque::new(),
            open: Vec::new(),
            anchors_seen: 0,
            anchors_windowed: 0,
            anchors_skipped_no_timestamp: 0,
            anchor_cap_reached: false,
        }
    }

    /// Advance the pass by one entry. Returned windows are complete: the
    /// stream has moved past their end and nothing can join them anymore.
    pub fn process(&mut self, entry: LogEntry) -> Vec<CorrelationWindow> {
        let mut closed = Vec::new();

        if let Some(ts) = entry.timestamp {
            if self.open.iter().any(|w| w.window_end < ts) {
                for window in std::mem::take(&mut self.open) {
                    if window.window_end < ts {
                        debug!(anchor_line = window.anchor.line_number, "window closed");
                        closed.push(window);
                    } else {
                        self.open.push(window);
                    }
                }
            }
            if let Some(cutoff) = ts.checked_sub_signed(self.before) {
                while matches!(self.pool.front(), Some(front)
                    if matches!(front.timestamp, Some(t) if t < cutoff))
                {
                    self.pool.pop_front();
                }
            }
        }

        if self.matcher.is_anchor(&entry) {
            self.anchors_seen += 1;
            match entry.timestamp {
                None => {
                    self.anchors_skipped_no_timestamp += 1;
                    trace!(line = entry.line_number, "anchor without timestamp skipped");
                }
                Some(anchor_ts) => {
                    if self.anchors_windowed >= self.params.max_anchors as u64 {
                        self.anchor_cap_reached = true;
                        trace!(line = entry.line_number, "anchor cap reached, match not windowed");
                    } else {
                        self.open_window(&entry, anchor_ts);
                    }
                }
            }
        }

        if let Some(ts) = entry.timestamp {
            for window in &mut self.open {
                let Some(anchor_ts) = window.anchor.timestamp else {
                    continue;
                };
                // strict lower bound keeps an anchor out of its own lists
                if anchor_ts < ts && ts <= window.window_end {
                    if window.followups.len() >= self.params.max_followups {
                        window.followups_truncated = true;
                    } else {
                        window.followups.push(entry.clone());
                    }
                }
            }
            self.pool.push_back(entry);
        }

        closed
    }

    /// Close out every still-open window. The pass is over afterwards; the
    /// counters stay readable.
    pub fn finish(&mut self) -> Vec<CorrelationWindow> {
        self.pool.clear();
        std::mem::take(&mut self.open)
    }

    fn open_window(&mut self, anchor: &LogEntry, anchor_ts: DateTime<Utc>) {
        let window_start = anchor_ts
            .checked_sub_signed(self.before)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let window_end = anchor_ts
            .checked_add_signed(self.after)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut precursors = Vec::new();
        let mut truncated = false;
        for candidate in self.pool.iter().rev() {
            let Some(t) = candidate.timestamp else {
                continue;
            };
            if t >= anchor_ts || t < window_start {
                continue;
            }
            if precursors.len() >= self.params.max_precursors {
                truncated = true;
                break;
            }
            precursors.push(candidate.clone());
        }

        debug!(
            line = anchor.line_number,
            start = %window_start,
            end = %window_end,
            precursors = precursors.len(),
            "window opened"
        );
        self.anchors_windowed += 1;
        self.open.push(CorrelationWindow {
            anchor: anchor.clone(),
            window_start,
            window_end,
            precursors,
            followups: Vec::new(),
            precursors_truncated: truncated,
            followups_truncated: false,
        });
    }

    pub fn anchors_seen(&self) -> u64 {
        self.anchors_seen
    }

    pub fn anchors_windowed(&self) -> u64 {
        self.anchors_windowed
    }

    pub fn anchors_skipped_no_timestamp(&self) -> u64 {
        self.anchors_skipped_no_timestamp
    }

    pub fn anchor_cap_reached(&self) -> bool {
        self.anchor_cap_reached
    }
}

fn offset_seconds(secs: u64) -> Duration {
    Duration::try_seconds(secs.min(i64::MAX as u64) as i64).unwrap_or(Duration::MAX)
}

/// Run a full correlation pass over an entry stream.
///
/// The stream is always consumed to the end so `anchors_seen` is the true
/// file-wide count even when the window cap cut collection short. Windows
/// come back ordered by (anchor timestamp, anchor line number).
pub fn correlate_entries<I>(
    entries: I,
    matcher: &AnchorMatcher,
    params: &CorrelateParams,
) -> CorrelationResult
where
    I: IntoIterator<Item = LogEntry>,
{
    let mut engine = StreamingCorrelator::new(matcher, params);
    let mut windows = Vec::new();
    for entry in entries {
        windows.extend(engine.process(entry));
    }
    windows.extend(engine.finish());
    windows.sort_by(|a, b| {
        (a.anchor.timestamp, a.anchor.line_number).cmp(&(b.anchor.timestamp, b.anchor.line_number))
    });

    CorrelationResult {
        windows,
        anchors_seen: engine.anchors_seen(),
        anchors_windowed: engine.anchors_windowed(),
        anchors_skipped_no_timestamp: engine.anchors_skipped_no_timestamp(),
        anchor_cap_reached: engine.anchor_cap_reached(),
    }
}
