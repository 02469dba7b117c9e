//! Session flow statistics.

use super::{EventConsumer, EventCursor};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Wall-clock shape of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFlow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_ms: i64,
    /// All records in the log, timestamped or not
    pub message_count: usize,
    /// `duration_ms / message_count`
    pub avg_gap_ms: i64,
}

/// Consumer producing an optional [`SessionFlow`].
///
/// Yields `None` unless at least two records carry a timestamp.
#[derive(Debug, Default)]
pub struct FlowTracker {
    min_ts: Option<DateTime<Utc>>,
    max_ts: Option<DateTime<Utc>>,
    timestamped: usize,
    message_count: usize,
}

impl FlowTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventConsumer for FlowTracker {
    type Output = Option<SessionFlow>;

    fn observe(&mut self, cursor: &EventCursor<'_>) {
        self.message_count += 1;
        if let Some(ts) = cursor.event.timestamp {
            self.timestamped += 1;
            self.min_ts = Some(self.min_ts.map_or(ts, |current| current.min(ts)));
            self.max_ts = Some(self.max_ts.map_or(ts, |current| current.max(ts)));
        }
    }

    fn finish(self) -> Option<SessionFlow> {
        if self.timestamped < 2 {
            return None;
        }
        let (start, end) = (self.min_ts?, self.max_ts?);
        let duration_ms = end.signed_duration_since(start).num_milliseconds();
        Some(SessionFlow {
            start,
            end,
            duration_ms,
            message_count: self.message_count,
            avg_gap_ms: duration_ms / self.message_count as i64,
        })
    }
}
