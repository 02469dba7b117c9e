//! # cogtrace-core
//!
//! Core library for cogtrace - behavioural analysis of recorded assistant
//! session logs.
//!
//! This library provides:
//! - Domain types for events and their content
//! - Loading of newline-delimited JSON session logs
//! - A single-pass analytics engine: lexical pattern classification, tool
//!   sequence statistics, hypothesis cycle tracking and timelines
//! - Report assembly, configuration management and logging
//!
//! ## Architecture
//!
//! Data flows one way:
//! - **Ingest:** log lines become an ordered `Vec<Event>`
//! - **Analytics:** independent consumers observe the events in one pass
//! - **Report:** consumer outputs are condensed into a [`SessionReport`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use cogtrace_core::{load_session, Config, LoadOptions, SessionAnalyzer, SessionReport};
//!
//! let config = Config::load().expect("failed to load config");
//! let session = load_session("session.jsonl".as_ref(), &LoadOptions::default())
//!     .expect("failed to load session");
//!
//! let analyzer = SessionAnalyzer::from_config(&config).expect("invalid pattern catalog");
//! let analysis = analyzer.analyze(&session.events);
//! let report = SessionReport::assemble(&analysis, &config.report, session.skipped);
//! println!("{}", report.to_json().unwrap());
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{SessionAnalysis, SessionAnalyzer};
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{load_session, LoadOptions, LoadedSession};
pub use report::SessionReport;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod types;
