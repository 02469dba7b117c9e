//! Timeline aggregation
//!
//! Buckets timestamped assistant activity into fixed-width intervals measured
//! from the first timestamped assistant event:
//!
//! - **activity**: tool invocations per bucket (default 2 minutes)
//! - **intensity**: literal `?` and `!` characters in assistant text per
//!   bucket (default 1 minute)
//!
//! Each series spans its own first to last populated bucket, with empty
//! buckets in between kept explicitly. A series spanning more than
//! [`MAX_BUCKETS`] buckets keeps only its populated buckets and logs a
//! warning. The two series are independent and can have different lengths. Events without a timestamp are not placed on
//! the timeline; events timestamped before the session start land in the
//! first bucket.

use super::tools::OrderedCounter;
use super::{EventConsumer, EventCursor};
use crate::config::TimelineConfig;
use crate::types::Content;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Largest span, in buckets, that a series fills densely.
pub const MAX_BUCKETS: u64 = 10_000;

/// Tool activity within one bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityBucket {
    pub index: u64,
    /// Minutes since session start at which the bucket begins
    pub start_minutes: u64,
    /// Tool name multiset, first-seen order within the bucket
    pub tools: OrderedCounter<String>,
}

impl ActivityBucket {
    pub fn total(&self) -> usize {
        self.tools.total()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Signal strength within one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntensityBucket {
    pub index: u64,
    pub start_minutes: u64,
    pub score: u64,
}

/// Output of a timeline pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeline {
    pub activity_bucket_minutes: u64,
    pub intensity_bucket_minutes: u64,
    pub session_start: Option<DateTime<Utc>>,
    pub activity: Vec<ActivityBucket>,
    pub intensity: Vec<IntensityBucket>,
    /// Timestamped tool invocations in emission order
    pub tool_order: Vec<String>,
}

impl Timeline {
    pub fn total_tool_uses(&self) -> usize {
        self.tool_order.len()
    }

    /// Start of the last activity bucket, in minutes (0 without activity).
    pub fn active_span_minutes(&self) -> u64 {
        self.activity.last().map(|b| b.start_minutes).unwrap_or(0)
    }

    /// Tool uses per minute of active span; `None` when the span is zero.
    pub fn tools_per_minute(&self) -> Option<f64> {
        match self.active_span_minutes() {
            0 => None,
            span => Some(self.total_tool_uses() as f64 / span as f64),
        }
    }

    /// Adjacent pairs over the timestamped tool order.
    pub fn transitions(&self) -> OrderedCounter<(String, String)> {
        let mut counter = OrderedCounter::new();
        for pair in self.tool_order.windows(2) {
            counter.add((pair[0].clone(), pair[1].clone()));
        }
        counter
    }

    pub fn unique_transitions(&self) -> usize {
        self.transitions().len()
    }

    /// Highest intensity score of any bucket (0 when there is none).
    pub fn peak_intensity(&self) -> u64 {
        self.intensity.iter().map(|b| b.score).max().unwrap_or(0)
    }
}

/// Sum of literal `?` and `!` characters.
pub fn intensity_score(text: &str) -> u64 {
    text.chars().filter(|c| matches!(c, '?' | '!')).count() as u64
}

/// Consumer producing a [`Timeline`].
#[derive(Debug)]
pub struct TimelineAggregator {
    activity_width_secs: i64,
    intensity_width_secs: i64,
    start: Option<DateTime<Utc>>,
    activity: BTreeMap<u64, OrderedCounter<String>>,
    intensity: BTreeMap<u64, u64>,
    tool_order: Vec<String>,
}

impl TimelineAggregator {
    /// Widths are taken as-is; zero widths are rejected by
    /// [`Config::validate`](crate::Config::validate) and clamped to one
    /// minute here.
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            activity_width_secs: i64::from(config.activity_bucket_minutes.max(1)) * 60,
            intensity_width_secs: i64::from(config.intensity_bucket_minutes.max(1)) * 60,
            start: None,
            activity: BTreeMap::new(),
            intensity: BTreeMap::new(),
            tool_order: Vec::new(),
        }
    }

    fn bucket(elapsed_secs: i64, width_secs: i64) -> u64 {
        (elapsed_secs.max(0) / width_secs) as u64
    }
}

impl EventConsumer for TimelineAggregator {
    type Output = Timeline;

    fn observe(&mut self, cursor: &EventCursor<'_>) {
        let event = cursor.event;
        let Some(timestamp) = event.timestamp.filter(|_| event.is_assistant()) else {
            return;
        };
        let start = *self.start.get_or_insert(timestamp);
        let elapsed = timestamp.signed_duration_since(start).num_seconds();

        let activity_idx = Self::bucket(elapsed, self.activity_width_secs);
        let intensity_idx = Self::bucket(elapsed, self.intensity_width_secs);

        for content in &event.payload {
            match content {
                Content::ToolInvocation { name, .. } => {
                    self.activity
                        .entry(activity_idx)
                        .or_default()
                        .add(name.clone());
                    self.tool_order.push(name.clone());
                }
                Content::Text { body } => {
                    let score = intensity_score(body);
                    if score > 0 {
                        *self.intensity.entry(intensity_idx).or_insert(0) += score;
                    }
                }
            }
        }
    }

    fn finish(mut self) -> Timeline {
        let activity_minutes = self.activity_width_secs as u64 / 60;
        let intensity_minutes = self.intensity_width_secs as u64 / 60;

        let activity = series_indices(&self.activity, "activity")
            .into_iter()
            .map(|index| ActivityBucket {
                index,
                start_minutes: index * activity_minutes,
                tools: self.activity.remove(&index).unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        let intensity = series_indices(&self.intensity, "intensity")
            .into_iter()
            .map(|index| IntensityBucket {
                index,
                start_minutes: index * intensity_minutes,
                score: self.intensity.get(&index).copied().unwrap_or(0),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            activity_buckets = activity.len(),
            intensity_buckets = intensity.len(),
            tool_uses = self.tool_order.len(),
            activity_minutes,
            intensity_minutes,
            "Timeline pass complete"
        );

        Timeline {
            activity_bucket_minutes: activity_minutes,
            intensity_bucket_minutes: intensity_minutes,
            session_start: self.start,
            activity,
            intensity,
            tool_order: self.tool_order,
        }
    }
}

/// Indices to emit for one series: dense within the cap, populated only past it.
fn series_indices<V>(series: &BTreeMap<u64, V>, name: &str) -> Vec<u64> {
    let (Some(&first), Some(&last)) = (series.keys().next(), series.keys().next_back()) else {
        return Vec::new();
    };
    let span = last - first + 1;
    if span <= MAX_BUCKETS {
        return (first..=last).collect();
    }
    tracing::warn!(
        series = name,
        span,
        max = MAX_BUCKETS,
        "Timeline span exceeds bucket cap, keeping populated buckets only"
    );
    series.keys().copied().collect()
}
