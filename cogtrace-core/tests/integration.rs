//! Integration tests for the cogtrace load-analyze-report pipeline
//!
//! These tests use fixture files in `tests/fixtures/claude-code/` to verify
//! the end-to-end flow from a JSONL session log to a `SessionReport`.

use chrono::{TimeZone, Utc};
use cogtrace_core::analytics::{run_pass, CycleOutcome, ToolSequenceTracker};
use cogtrace_core::config::ReportConfig;
use cogtrace_core::ingest::{load_session, read_events, LoadOptions};
use cogtrace_core::types::{Content, EventKind};
use cogtrace_core::{Config, Error, SessionAnalyzer, SessionReport};
use std::io::Write;
use std::path::PathBuf;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/claude-code")
        .join(name)
}

fn load_exploration() -> Vec<cogtrace_core::Event> {
    load_session(
        &fixture_path("exploration-session.jsonl"),
        &LoadOptions::default(),
    )
    .expect("fixture should load")
    .events
}

// ============================================
// Loading
// ============================================

#[test]
fn test_load_keeps_record_positions() {
    let events = load_exploration();

    assert_eq!(events.len(), 11);
    assert_eq!(events[0].kind, EventKind::Other);
    assert!(events[0].timestamp.is_none());
    assert_eq!(events[1].kind, EventKind::User);
    assert_eq!(
        events[1].payload,
        vec![Content::text("The cache test is flaky, can you look?")]
    );
    assert_eq!(
        events[2].timestamp,
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 30).unwrap())
    );

    // thinking blocks are dropped, tool_result blocks too
    let names: Vec<_> = events[4].tool_names().collect();
    assert_eq!(names, vec!["Grep", "Read"]);
    assert_eq!(events[4].payload.len(), 3);
    assert!(events[3].payload.is_empty());
}

#[test]
fn test_strict_load_fails_on_malformed_line() {
    let err = load_session(
        &fixture_path("malformed-session.jsonl"),
        &LoadOptions::default(),
    )
    .unwrap_err();

    match err {
        Error::Load { line, .. } => assert_eq!(line, 3),
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[test]
fn test_lenient_load_skips_malformed_line() {
    let session = load_session(
        &fixture_path("malformed-session.jsonl"),
        &LoadOptions::lenient(),
    )
    .unwrap();

    assert_eq!(session.events.len(), 3);
    assert_eq!(session.skipped.len(), 1);
    assert_eq!(session.skipped[0].line, 3);

    let tools = run_pass(ToolSequenceTracker::new(), &session.events);
    assert_eq!(tools.sequence, vec!["Read", "Write"]);
    assert_eq!(tools.read_before_modify_count(), 1);
}

#[test]
fn test_blank_only_log_is_empty_not_an_error() {
    let session = load_session(
        &fixture_path("empty-session.jsonl"),
        &LoadOptions::default(),
    )
    .unwrap();
    assert!(session.is_empty());

    let analysis = SessionAnalyzer::new().unwrap().analyze(&session.events);
    let report = SessionReport::assemble(&analysis, &ReportConfig::default(), session.skipped);
    assert_eq!(report.event_count, 0);
    assert_eq!(report.hypotheses.completion_rate, None);
    assert!(report.timeline.activity.is_empty());
    assert!(report.timeline.intensity.is_empty());
}

// ============================================
// Full analysis
// ============================================

#[test]
fn test_exploration_session_tool_statistics() {
    let analysis = SessionAnalyzer::new().unwrap().analyze(&load_exploration());
    let tools = &analysis.tools;

    assert_eq!(
        tools.sequence,
        vec!["Read", "Grep", "Read", "Edit", "Bash", "Write"]
    );
    assert_eq!(tools.counts.total(), tools.sequence.len());
    assert_eq!(tools.transitions.total(), tools.sequence.len() - 1);
    assert_eq!(tools.top_tools(1), vec![("Read".to_string(), 2)]);
    assert_eq!(tools.unique_transitions(), 5);
    assert_eq!(tools.read_before_modify_count(), 1);

    assert_eq!(tools.resource_kinds(), vec!["Read", "Grep", "Edit", "Write"]);
    assert_eq!(
        tools.operations_per_resource("Read", 5),
        vec![
            ("/repo/tests/cache_test.rs".to_string(), 1),
            ("/repo/src/cache.rs".to_string(), 1),
        ]
    );
    assert_eq!(tools.documentation_files(), vec!["/repo/NOTES.md"]);
}

#[test]
fn test_exploration_session_hypotheses() {
    let analysis = SessionAnalyzer::new().unwrap().analyze(&load_exploration());
    let hypotheses = &analysis.hypotheses;

    assert_eq!(hypotheses.formed(), 2);
    assert_eq!(hypotheses.cycles[0].formed_at, 2);
    assert_eq!(hypotheses.cycles[0].test_tool.as_deref(), Some("Read"));
    assert_eq!(hypotheses.cycles[1].formed_at, 6);
    assert_eq!(hypotheses.cycles[1].test_tool.as_deref(), Some("Bash"));
    assert!(hypotheses
        .cycles
        .iter()
        .all(|c| c.tested && c.result == CycleOutcome::Completed));
    assert_eq!(hypotheses.completion_rate(), Some(1.0));
    assert!(!hypotheses.left_open);
}

#[test]
fn test_exploration_session_patterns() {
    let analysis = SessionAnalyzer::new().unwrap().analyze(&load_exploration());

    assert_eq!(analysis.cognitive.count("hypothesis_formation"), 2);
    assert_eq!(analysis.cognitive.count("experimentation"), 2);
    assert_eq!(analysis.cognitive.count("pattern_recognition"), 1);
    assert_eq!(analysis.cognitive.total(), 5);

    assert_eq!(analysis.coarse.count("excitement"), 1);
    // "?", "what if" and "could i" (inside "could it be") in one text
    assert_eq!(analysis.coarse.count("question"), 3);

    let learning = analysis.learning.get("learning_moment");
    assert_eq!(learning.len(), 1);
    assert_eq!(learning[0].indicator, "now i (understand|know)");
    assert_eq!(
        learning[0].source_timestamp,
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 10, 6, 0).unwrap())
    );
}

#[test]
fn test_exploration_session_timeline_and_flow() {
    let analysis = SessionAnalyzer::new().unwrap().analyze(&load_exploration());
    let timeline = &analysis.timeline;

    let activity: Vec<(u64, usize)> = timeline
        .activity
        .iter()
        .map(|b| (b.start_minutes, b.total()))
        .collect();
    assert_eq!(activity, vec![(0, 3), (2, 2), (4, 1)]);

    let intensity: Vec<(u64, u64)> = timeline
        .intensity
        .iter()
        .map(|b| (b.start_minutes, b.score))
        .collect();
    assert_eq!(intensity, vec![(2, 2), (3, 0), (4, 0), (5, 1)]);

    assert_eq!(timeline.tools_per_minute(), Some(1.5));
    assert_eq!(timeline.peak_intensity(), 2);

    let flow = analysis.flow.as_ref().unwrap();
    assert_eq!(flow.duration_ms, 365_000);
    assert_eq!(flow.message_count, 11);
    assert_eq!(flow.avg_gap_ms, 365_000 / 11);
}

#[test]
fn test_exploration_session_report() {
    let analysis = SessionAnalyzer::new().unwrap().analyze(&load_exploration());
    let report = SessionReport::assemble(&analysis, &ReportConfig::default(), vec![]);

    let ranked: Vec<_> = report
        .patterns
        .categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        ranked,
        vec!["hypothesis_formation", "experimentation", "pattern_recognition"]
    );
    assert_eq!(report.insights.experimental_tendency, 4);
    assert_eq!(report.insights.learning_velocity, 1);
    assert_eq!(report.decisions.total, 6);
    assert_eq!(report.decisions.with_reasoning, 4);
    assert_eq!(report.decisions.with_description, 1);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["tools"]["total_invocations"], 6);
    assert_eq!(json["hypotheses"]["completion_rate"], 1.0);
    assert_eq!(json["timeline"]["summary"]["peak_intensity"], 2);
}

// ============================================
// Configuration
// ============================================

#[test]
fn test_config_file_drives_analysis() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[timeline]
activity_bucket_minutes = 10

[[patterns.categories]]
name = "timekeeping"
radius = 10
regexes = ["clock|timezone"]
"#
    )
    .unwrap();

    let config = Config::load_from(file.path()).unwrap();
    let analysis = SessionAnalyzer::from_config(&config)
        .unwrap()
        .analyze(&load_exploration());

    assert_eq!(analysis.timeline.activity.len(), 1);
    assert_eq!(analysis.timeline.activity[0].total(), 6);
    // one match per indicator per text unit
    assert_eq!(analysis.cognitive.count("timekeeping"), 2);
}

#[test]
fn test_read_events_from_memory() {
    let log = concat!(
        r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Read","input":{}}]}}"#,
        "\n",
        r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Write","input":{}}]}}"#,
        "\n",
    );
    let session = read_events(log.as_bytes(), &LoadOptions::default()).unwrap();
    let tools = run_pass(ToolSequenceTracker::new(), &session.events);
    assert_eq!(
        tools.top_transitions(1),
        vec![(("Read".to_string(), "Write".to_string()), 1)]
    );
}
