//! Core domain types for cogtrace
//!
//! These types are the normalized form of one session log. Every analysis
//! pass consumes the same `&[Event]` slice in record order.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | One parsed log record (an assistant turn, a user turn, or anything else) |
//! | **Content item** | One element of an event's payload: free text or a tool invocation |
//! | **Tool** | An executable capability invoked by the assistant (Bash, Read, Edit, ...) |
//!
//! Events are immutable once created and live for a single analysis pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Event kind
// ============================================

/// Who produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A turn produced by the assistant
    Assistant,
    /// A turn produced by the environment (human prompt or tool result)
    User,
    /// Any other record (summaries, snapshots, system notices)
    ///
    /// Kept so that event indices line up with record positions.
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Assistant => "assistant",
            EventKind::User => "user",
            EventKind::Other => "other",
        }
    }

    /// Map a raw `type` field to a kind. Unknown or missing types are `Other`.
    pub fn from_record_type(record_type: Option<&str>) -> Self {
        match record_type {
            Some("assistant") => EventKind::Assistant,
            Some("user") => EventKind::User,
            _ => EventKind::Other,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Content
// ============================================

/// One element of an event payload.
///
/// Order within a payload is significant: the text immediately before a
/// tool invocation is treated as the reasoning for that invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Free text written by the author of the event
    Text { body: String },
    /// A tool call with its arguments
    ToolInvocation {
        name: String,
        arguments: serde_json::Map<String, serde_json::Value>,
    },
}

impl Content {
    /// Convenience constructor for text content.
    pub fn text(body: impl Into<String>) -> Self {
        Content::Text { body: body.into() }
    }

    /// Convenience constructor for a tool invocation without arguments.
    pub fn tool(name: impl Into<String>) -> Self {
        Content::ToolInvocation {
            name: name.into(),
            arguments: serde_json::Map::new(),
        }
    }

    /// Convenience constructor for a tool invocation with JSON object arguments.
    ///
    /// Non-object values are treated as "no arguments".
    pub fn tool_with(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        let arguments = match arguments {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Content::ToolInvocation {
            name: name.into(),
            arguments,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text { body } => Some(body),
            Content::ToolInvocation { .. } => None,
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Content::ToolInvocation { name, .. } => Some(name),
            Content::Text { .. } => None,
        }
    }
}

// ============================================
// Event
// ============================================

/// A single normalized log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// When the record was emitted, if the log carried a timestamp
    pub timestamp: Option<DateTime<Utc>>,
    pub payload: Vec<Content>,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: Option<DateTime<Utc>>, payload: Vec<Content>) -> Self {
        Self {
            kind,
            timestamp,
            payload,
        }
    }

    pub fn assistant(payload: Vec<Content>) -> Self {
        Self::new(EventKind::Assistant, None, payload)
    }

    pub fn user() -> Self {
        Self::new(EventKind::User, None, Vec::new())
    }

    /// Builder-style timestamp setter, mostly for tests and fixtures.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_assistant(&self) -> bool {
        self.kind == EventKind::Assistant
    }

    /// Text bodies of this event, in payload order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.payload.iter().filter_map(Content::as_text)
    }

    /// Tool names invoked by this event, in payload order.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.payload.iter().filter_map(Content::tool_name)
    }
}
