use chrono::{DateTime, Duration, Utc};

use crate::correlate::anchor::AnchorMatcher;
use crate::correlate::window::{CorrelationResult, CorrelationWindow};
use crate::correlate::CorrelateParams;
use crate::parser::model::LogEntry;

/// Correlate over a fully materialized slice.
///
/// Index scans replace the streaming pool: backwards from each anchor for
/// precursors, forwards for follow-ons. On chronologically ordered input the
/// result is identical to [`correlate_entries`](crate::correlate::engine::correlate_entries);
/// the tests below hold the two together. The backward/forward scans stop at
/// the window edge, which is what makes ordering a requirement here.
pub fn correlate_slice(
    entries: &[LogEntry],
    matcher: &AnchorMatcher,
    params: &CorrelateParams,
) -> CorrelationResult {
    let before = Duration::try_seconds(params.window_before_secs.min(i64::MAX as u64) as i64)
        .unwrap_or(Duration::MAX);
    let after = Duration::try_seconds(params.window_after_secs.min(i64::MAX as u64) as i64)
        .unwrap_or(Duration::MAX);

    let mut windows = Vec::new();
    let mut anchors_seen = 0u64;
    let mut anchors_windowed = 0u64;
    let mut anchors_skipped_no_timestamp = 0u64;
    let mut anchor_cap_reached = false;

    for (idx, anchor) in entries.iter().enumerate() {
        if !matcher.is_anchor(anchor) {
            continue;
        }
        anchors_seen += 1;
        let Some(anchor_ts) = anchor.timestamp else {
            anchors_skipped_no_timestamp += 1;
            continue;
        };
        if anchors_windowed >= params.max_anchors as u64 {
            anchor_cap_reached = true;
            continue;
        }

        let window_start = anchor_ts
            .checked_sub_signed(before)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let window_end = anchor_ts
            .checked_add_signed(after)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut precursors = Vec::new();
        let mut precursors_truncated = false;
        for candidate in entries[..idx].iter().rev() {
            let Some(t) = candidate.timestamp else {
                continue;
            };
            if t < window_start {
                break;
            }
            if t >= anchor_ts {
                continue;
            }
            if precursors.len() >= params.max_precursors {
                precursors_truncated = true;
                break;
            }
            precursors.push(candidate.clone());
        }

        let mut followups = Vec::new();
        let mut followups_truncated = false;
        for candidate in entries[idx + 1..].iter() {
            let Some(t) = candidate.timestamp else {
                continue;
            };
            if t > window_end {
                break;
            }
            if t <= anchor_ts {
                continue;
            }
            if followups.len() >= params.max_followups {
                followups_truncated = true;
                break;
            }
            followups.push(candidate.clone());
        }

        anchors_windowed += 1;
        windows.push(CorrelationWindow {
            anchor: anchor.clone(),
            window_start,
            window_end,
            precursors,
            followups,
            precursors_truncated,
            followups_truncated,
        });
    }

    windows.sort_by(|a, b| {
        (a.anchor.timestamp, a.anchor.line_number).cmp(&(b.anchor.timestamp, b.anchor.line_number))
    });

    CorrelationResult {
        windows,
        anchors_seen,
        anchors_windowed,
        anchors_skipped_no_timestamp,
        anchor_cap_reached,
    }
}
