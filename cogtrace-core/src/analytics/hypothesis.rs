//! Hypothesis cycle tracking
//!
//! Links a hypothesis-forming utterance to the tool call that tests it and,
//! when the log shows one, the environment's answer.
//!
//! ```text
//!            text with hypothesis phrase
//!   ┌──────┐ ─────────────────────────► ┌──────┐
//!   │ Idle │                            │ Open │ ◄─┐ new hypothesis phrase:
//!   └──────┘ ◄───────────────────────── └──────┘ ──┘ previous one is discarded
//!        Bash / Write / Read invocation:
//!        cycle closed and emitted
//! ```
//!
//! Only the most recent unresolved hypothesis is tracked. A hypothesis that
//! is replaced before being tested is counted in
//! [`HypothesisSummary::superseded`] but never emitted, and a hypothesis
//! still open when the stream ends is dropped.

use super::{EventConsumer, EventCursor};
use crate::types::{Content, EventKind};
use serde::Serialize;

/// Case-folded phrases that open a cycle.
pub const HYPOTHESIS_PHRASES: &[&str] = &["what if", "i wonder", "maybe if", "could it be"];

/// Tools that count as testing a hypothesis.
pub const TEST_TOOLS: &[&str] = &["Bash", "Write", "Read"];

/// Characters of the utterance kept as the hypothesis text.
const HYPOTHESIS_CHARS: usize = 200;

/// What happened after the testing tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The next event was a user turn carrying the result
    Completed,
    /// No result was observed
    Unresolved,
}

/// A closed hypothesis cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HypothesisCycle {
    /// First 200 characters of the utterance in its original case; matching
    /// itself is case-insensitive
    pub hypothesis_text: String,
    /// Index of the event holding the hypothesis utterance
    pub formed_at: usize,
    pub tested: bool,
    pub test_tool: Option<String>,
    pub result: CycleOutcome,
}

/// Output of a hypothesis pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HypothesisSummary {
    /// Closed cycles, in closing order
    pub cycles: Vec<HypothesisCycle>,
    /// Hypotheses discarded because a newer one replaced them while open
    pub superseded: usize,
    /// Whether a hypothesis was still open at end of stream (not emitted)
    pub left_open: bool,
}

impl HypothesisSummary {
    pub fn formed(&self) -> usize {
        self.cycles.len()
    }

    pub fn tested(&self) -> usize {
        self.cycles.iter().filter(|c| c.tested).count()
    }

    pub fn completed(&self) -> usize {
        self.cycles
            .iter()
            .filter(|c| c.result == CycleOutcome::Completed)
            .count()
    }

    /// Tested cycles over closed cycles; `None` when no cycle closed.
    pub fn completion_rate(&self) -> Option<f64> {
        ratio(self.tested(), self.formed())
    }

    /// Cycles with an observed result over closed cycles; `None` when no
    /// cycle closed.
    pub fn resolution_rate(&self) -> Option<f64> {
        ratio(self.completed(), self.formed())
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

#[derive(Debug, Default)]
enum TrackerState {
    #[default]
    Idle,
    Open(HypothesisCycle),
}

/// Consumer producing a [`HypothesisSummary`].
#[derive(Debug, Default)]
pub struct HypothesisCycleTracker {
    state: TrackerState,
    summary: HypothesisSummary,
}

impl HypothesisCycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_hypothesis(text: &str) -> bool {
        let folded = text.to_lowercase();
        HYPOTHESIS_PHRASES.iter().any(|p| folded.contains(p))
    }

    fn open(&mut self, body: &str, index: usize) {
        if matches!(self.state, TrackerState::Open(_)) {
            self.summary.superseded += 1;
        }
        self.state = TrackerState::Open(HypothesisCycle {
            hypothesis_text: body.chars().take(HYPOTHESIS_CHARS).collect(),
            formed_at: index,
            tested: false,
            test_tool: None,
            result: CycleOutcome::Unresolved,
        });
    }

    fn close(&mut self, tool: &str, cursor: &EventCursor<'_>) {
        if let TrackerState::Open(mut cycle) = std::mem::take(&mut self.state) {
            cycle.tested = true;
            cycle.test_tool = Some(tool.to_string());
            if cursor.next.map(|e| e.kind) == Some(EventKind::User) {
                cycle.result = CycleOutcome::Completed;
            }
            self.summary.cycles.push(cycle);
        }
    }
}

impl EventConsumer for HypothesisCycleTracker {
    type Output = HypothesisSummary;

    fn observe(&mut self, cursor: &EventCursor<'_>) {
        if !cursor.event.is_assistant() {
            return;
        }
        for content in &cursor.event.payload {
            match content {
                Content::Text { body } => {
                    if Self::is_hypothesis(body) {
                        self.open(body, cursor.index);
                    }
                }
                Content::ToolInvocation { name, .. } => {
                    let is_open = matches!(self.state, TrackerState::Open(_));
                    if is_open && TEST_TOOLS.contains(&name.as_str()) {
                        self.close(name, cursor);
                    }
                }
            }
        }
    }

    fn finish(mut self) -> HypothesisSummary {
        self.summary.left_open = matches!(self.state, TrackerState::Open(_));
        tracing::debug!(
            closed = self.summary.formed(),
            superseded = self.summary.superseded,
            left_open = self.summary.left_open,
            "Hypothesis pass complete"
        );
        self.summary
    }
}
