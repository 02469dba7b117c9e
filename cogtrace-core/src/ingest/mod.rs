//! Ingestion layer for session logs
//!
//! Turns a newline-delimited JSON session log into an ordered `Vec<Event>`.
//! The whole file is read before analysis starts; the file handle is released
//! before this module returns.
//!
//! ## Error Handling
//!
//! - **Blank lines** are skipped without comment.
//! - **Malformed lines** (invalid UTF-8, invalid JSON, non-object, malformed
//!   assistant content, unparseable timestamps) abort the load with
//!   [`Error::Load`] by default.
//! - With [`LoadOptions::lenient`], malformed lines are logged, recorded in
//!   [`LoadedSession::skipped`], and the load continues.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cogtrace_core::ingest::{load_session, LoadOptions};
//!
//! let session = load_session("session.jsonl".as_ref(), &LoadOptions::default())
//!     .expect("failed to load session");
//! println!("Loaded {} events", session.events.len());
//! ```

mod record;

use crate::error::{Error, Result};
use crate::types::Event;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Options controlling how strictly a session log is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Skip and count malformed lines instead of failing the whole load
    pub lenient: bool,
}

impl LoadOptions {
    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

/// A line that was skipped in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number in the source file
    pub line: usize,
    pub reason: String,
}

/// Result of loading a session log.
#[derive(Debug, Default)]
pub struct LoadedSession {
    /// Events in record order
    pub events: Vec<Event>,
    /// Lines skipped in lenient mode (always empty in strict mode)
    pub skipped: Vec<SkippedLine>,
}

impl LoadedSession {
    /// True when no usable records were found.
    ///
    /// An empty session is valid input; every statistic degrades to zero or
    /// "undefined".
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Load a session log from disk.
pub fn load_session(path: &Path, options: &LoadOptions) -> Result<LoadedSession> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {}: {}", path.display(), e),
        ))
    })?;

    let session = read_events(BufReader::new(file), options)?;

    tracing::info!(
        path = %path.display(),
        events = session.events.len(),
        skipped = session.skipped.len(),
        "Loaded session log"
    );

    Ok(session)
}

/// Read events from any buffered reader of JSONL text.
pub fn read_events<R: BufRead>(reader: R, options: &LoadOptions) -> Result<LoadedSession> {
    let mut session = LoadedSession::default();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let mut bytes = bytes?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        let decoded = String::from_utf8(bytes)
            .map_err(|e| format!("invalid UTF-8: {}", e.utf8_error()))
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    record::decode_line(&line).map(Some)
                }
            });

        match decoded {
            Ok(Some(event)) => session.events.push(event),
            Ok(None) => {}
            Err(reason) if options.lenient => {
                tracing::warn!(line = line_number, %reason, "Skipping malformed record");
                session.skipped.push(SkippedLine {
                    line: line_number,
                    reason,
                });
            }
            Err(reason) => return Err(Error::load(line_number, reason)),
        }
    }

    Ok(session)
}
