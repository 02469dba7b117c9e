//! Tool sequence tracking
//!
//! Records every assistant tool invocation in emission order across the
//! whole stream. Sequence continuity spans event boundaries: the tool before
//! the first call of an event is the last call of the previous assistant
//! event.
//!
//! ## Statistics Produced
//!
//! | Statistic | Description |
//! |-----------|-------------|
//! | `counts` | Invocations per tool name |
//! | `sequence` | Tool names in emission order |
//! | `transitions` | Counts of adjacent `(previous, next)` pairs |
//! | `file_operations` | Invocations whose arguments name a file |
//!
//! Invariants: `counts.total() == sequence.len()`, and
//! `transitions.total() == sequence.len() - 1` for a non-empty sequence.

use super::{EventConsumer, EventCursor};
use crate::types::Content;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Argument keys that carry a file path, checked in order.
const PATH_KEYS: &[&str] = &["file_path", "filePath", "notebook_path", "path"];

/// Pairs that count as "read before modify".
const READ_BEFORE_MODIFY: &[(&str, &str)] = &[("Read", "Write"), ("Read", "Edit")];

/// Characters of preceding text kept as the stated reasoning for a tool call.
const REASONING_CHARS: usize = 200;

// ============================================
// OrderedCounter
// ============================================

/// Counter that remembers first-seen order.
///
/// Ranking ties are broken by first-seen order, which keeps reports stable
/// across runs.
#[derive(Debug, Clone)]
pub struct OrderedCounter<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for OrderedCounter<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> OrderedCounter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// Top `n` entries by count descending, ties in first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(K, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

impl<K: Serialize> Serialize for OrderedCounter<K> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

// ============================================
// ToolStats
// ============================================

/// One invocation that touched a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOperation {
    pub tool: String,
    pub path: String,
    /// Position of the invocation in [`ToolStats::sequence`]
    pub position: usize,
}

/// Tool usage statistics for one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolStats {
    pub counts: OrderedCounter<String>,
    pub sequence: Vec<String>,
    pub transitions: OrderedCounter<(String, String)>,
    pub file_operations: Vec<FileOperation>,
}

impl ToolStats {
    pub fn total_invocations(&self) -> usize {
        self.sequence.len()
    }

    pub fn count(&self, tool: &str) -> usize {
        self.counts.get(&tool.to_string())
    }

    pub fn transition_count(&self, from: &str, to: &str) -> usize {
        self.transitions.get(&(from.to_string(), to.to_string()))
    }

    pub fn top_tools(&self, n: usize) -> Vec<(String, usize)> {
        self.counts.most_common(n)
    }

    pub fn top_transitions(&self, n: usize) -> Vec<((String, String), usize)> {
        self.transitions.most_common(n)
    }

    pub fn unique_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Number of adjacent `(Read, Write)` and `(Read, Edit)` pairs.
    pub fn read_before_modify_count(&self) -> usize {
        READ_BEFORE_MODIFY
            .iter()
            .map(|(from, to)| self.transition_count(from, to))
            .sum()
    }

    /// Tools that touched files, in first-seen order.
    pub fn resource_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for op in &self.file_operations {
            if !kinds.contains(&op.tool.as_str()) {
                kinds.push(&op.tool);
            }
        }
        kinds
    }

    /// Most touched paths for one tool, ties in first-seen order.
    pub fn operations_per_resource(&self, tool: &str, n: usize) -> Vec<(String, usize)> {
        let mut paths = OrderedCounter::new();
        for op in self.file_operations.iter().filter(|op| op.tool == tool) {
            paths.add(op.path.clone());
        }
        paths.most_common(n)
    }

    /// Distinct markdown files written during the session.
    pub fn documentation_files(&self) -> Vec<&str> {
        let mut docs: Vec<&str> = Vec::new();
        for op in &self.file_operations {
            if op.tool == "Write" && op.path.contains(".md") && !docs.contains(&op.path.as_str())
            {
                docs.push(&op.path);
            }
        }
        docs
    }
}

/// Extract a file path from tool arguments.
///
/// Handles `file_path` (Read/Edit/Write), `filePath` (some tools),
/// `notebook_path` and a bare `path`.
fn extract_file_path(arguments: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    PATH_KEYS
        .iter()
        .find_map(|key| arguments.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

/// Consumer producing [`ToolStats`].
#[derive(Debug, Default)]
pub struct ToolSequenceTracker {
    stats: ToolStats,
}

impl ToolSequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, name: &str, arguments: &serde_json::Map<String, serde_json::Value>) {
        let stats = &mut self.stats;
        let name = name.to_string();

        stats.counts.add(name.clone());
        if let Some(prev) = stats.sequence.last() {
            stats.transitions.add((prev.clone(), name.clone()));
        }
        if let Some(path) = extract_file_path(arguments) {
            stats.file_operations.push(FileOperation {
                tool: name.clone(),
                path,
                position: stats.sequence.len(),
            });
        }
        stats.sequence.push(name);
    }
}

impl EventConsumer for ToolSequenceTracker {
    type Output = ToolStats;

    fn observe(&mut self, cursor: &EventCursor<'_>) {
        if !cursor.event.is_assistant() {
            return;
        }
        for content in &cursor.event.payload {
            if let Content::ToolInvocation { name, arguments } = content {
                self.record(name, arguments);
            }
        }
    }

    fn finish(self) -> ToolStats {
        tracing::debug!(
            invocations = self.stats.total_invocations(),
            distinct_tools = self.stats.counts.len(),
            "Tool sequence pass complete"
        );
        self.stats
    }
}

// ============================================
// Tool decisions
// ============================================

/// Why the assistant reached for a tool, as far as the log says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDecision {
    pub tool: String,
    /// Tail of the text item immediately before the call, empty if none
    pub reasoning: String,
    /// The `description` argument, when the tool takes one
    pub description: Option<String>,
    pub event_index: usize,
}

impl ToolDecision {
    pub fn has_reasoning(&self) -> bool {
        !self.reasoning.trim().is_empty()
    }
}

/// Consumer collecting a [`ToolDecision`] per invocation.
#[derive(Debug, Default)]
pub struct ToolDecisionLog {
    decisions: Vec<ToolDecision>,
}

impl ToolDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tail_chars(text: &str, n: usize) -> &str {
    let skip = text.chars().count().saturating_sub(n);
    match text.char_indices().nth(skip) {
        Some((i, _)) => &text[i..],
        None => "",
    }
}

impl EventConsumer for ToolDecisionLog {
    type Output = Vec<ToolDecision>;

    fn observe(&mut self, cursor: &EventCursor<'_>) {
        if !cursor.event.is_assistant() {
            return;
        }
        let payload = &cursor.event.payload;
        for (i, content) in payload.iter().enumerate() {
            let Content::ToolInvocation { name, arguments } = content else {
                continue;
            };
            let reasoning = i
                .checked_sub(1)
                .and_then(|prev| payload[prev].as_text())
                .map(|text| tail_chars(text, REASONING_CHARS).to_string())
                .unwrap_or_default();
            let description = arguments
                .get("description")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            self.decisions.push(ToolDecision {
                tool: name.clone(),
                reasoning,
                description,
                event_index: cursor.index,
            });
        }
    }

    fn finish(self) -> Vec<ToolDecision> {
        self.decisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::run_pass;
    use crate::types::{Event, EventKind};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;

    fn assistant_tools(names: &[&str]) -> Event {
        Event::assistant(names.iter().map(|n| Content::tool(*n)).collect())
    }

    fn track(events: &[Event]) -> ToolStats {
        run_pass(ToolSequenceTracker::new(), events)
    }

    #[test]
    fn test_transitions_span_event_boundaries() {
        let events = vec![
            assistant_tools(&["Read", "Grep"]),
            Event::user(),
            assistant_tools(&["Edit"]),
        ];
        let stats = track(&events);

        assert_eq!(stats.sequence, vec!["Read", "Grep", "Edit"]);
        assert_eq!(stats.transition_count("Read", "Grep"), 1);
        assert_eq!(stats.transition_count("Grep", "Edit"), 1);
        assert_eq!(stats.transitions.total(), 2);
    }

    #[test]
    fn test_user_tool_calls_are_ignored() {
        let event = Event::new(EventKind::User, None, vec![Content::tool("Read")]);
        let stats = track(&[event]);
        assert_eq!(stats.total_invocations(), 0);
        assert!(stats.top_tools(5).is_empty());
    }

    #[test]
    fn test_top_tools_ties_by_first_seen() {
        let events = vec![assistant_tools(&["Bash", "Read", "Read", "Bash", "Edit"])];
        let stats = track(&events);
        assert_eq!(
            stats.top_tools(3),
            vec![
                ("Bash".to_string(), 2),
                ("Read".to_string(), 2),
                ("Edit".to_string(), 1)
            ]
        );
        assert_eq!(stats.top_tools(1).len(), 1);
    }

    #[test]
    fn test_counts_and_transitions_invariants_hold_for_random_sequences() {
        const TOOLS: &[&str] = &["Read", "Write", "Edit", "Bash", "Grep"];
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let len = rng.gen_range(0..40);
            let names: Vec<&str> = (0..len)
                .map(|_| TOOLS[rng.gen_range(0..TOOLS.len())])
                .collect();

            // Spread the sequence over several events to exercise continuity
            let mut events = Vec::new();
            for chunk in names.chunks(3) {
                events.push(assistant_tools(chunk));
                events.push(Event::user());
            }
            let stats = track(&events);

            assert_eq!(stats.counts.total(), stats.sequence.len());
            assert_eq!(
                stats.transitions.total(),
                stats.sequence.len().saturating_sub(1)
            );

            let direct = names
                .windows(2)
                .filter(|w| w[0] == "Read" && (w[1] == "Write" || w[1] == "Edit"))
                .count();
            assert_eq!(stats.read_before_modify_count(), direct);
        }
    }

    #[test]
    fn test_alternating_read_write_top_transition() {
        let n = 9;
        let events: Vec<Event> = (0..n)
            .map(|i| assistant_tools(&[if i % 2 == 0 { "Read" } else { "Write" }]))
            .collect();
        let stats = track(&events);

        let top = stats.top_transitions(1);
        assert_eq!(top, vec![(("Read".to_string(), "Write".to_string()), 4)]);
        assert_eq!(stats.transitions.total(), n - 1);
    }

    #[test]
    fn test_file_operations_and_documentation_files() {
        let events = vec![Event::assistant(vec![
            Content::tool_with("Read", json!({"file_path": "/src/lib.rs"})),
            Content::tool_with("Write", json!({"file_path": "/docs/NOTES.md", "content": "x"})),
            Content::tool_with("Write", json!({"file_path": "/docs/NOTES.md", "content": "y"})),
            Content::tool_with("Bash", json!({"command": "ls"})),
            Content::tool_with("Edit", json!({"filePath": "/src/lib.rs"})),
            Content::tool_with("Read", json!({"file_path": "/src/lib.rs"})),
            Content::tool_with("Read", json!({"file_path": "/src/main.rs"})),
        ])];
        let stats = track(&events);

        assert_eq!(stats.file_operations.len(), 6);
        assert_eq!(stats.file_operations[3].tool, "Edit");
        assert_eq!(stats.file_operations[3].position, 4);
        assert_eq!(stats.resource_kinds(), vec!["Read", "Write", "Edit"]);
        assert_eq!(
            stats.operations_per_resource("Read", 5),
            vec![("/src/lib.rs".to_string(), 2), ("/src/main.rs".to_string(), 1)]
        );
        assert_eq!(stats.documentation_files(), vec!["/docs/NOTES.md"]);
        assert_eq!(stats.read_before_modify_count(), 1);
    }

    #[test]
    fn test_tool_decisions_capture_preceding_text() {
        let long = format!("{}END", "a".repeat(300));
        let events = vec![
            Event::assistant(vec![
                Content::text("I'll check the config first."),
                Content::tool_with("Read", json!({"file_path": "/etc/app.toml"})),
                Content::tool_with("Bash", json!({"command": "ls", "description": "List files"})),
            ]),
            Event::assistant(vec![Content::text(long), Content::tool("Grep")]),
        ];
        let decisions = run_pass(ToolDecisionLog::new(), &events);

        assert_eq!(decisions.len(), 3);
        assert_eq!(decisions[0].reasoning, "I'll check the config first.");
        assert!(decisions[0].has_reasoning());
        assert_eq!(decisions[1].reasoning, "");
        assert_eq!(decisions[1].description.as_deref(), Some("List files"));
        assert_eq!(decisions[2].reasoning.chars().count(), REASONING_CHARS);
        assert!(decisions[2].reasoning.ends_with("END"));
        assert_eq!(decisions[2].event_index, 1);
    }

    #[test]
    fn test_tail_chars_is_char_safe() {
        assert_eq!(tail_chars("héllo", 3), "llo");
        assert_eq!(tail_chars("hé", 10), "hé");
        assert_eq!(tail_chars("", 3), "");
    }
}
