//! Analytics engine for cogtrace
//!
//! Every analysis is an [`EventConsumer`]: it observes events one at a time
//! and yields its output when the stream ends. Consumers are independent of
//! each other and never mutate the events they see.
//!
//! | Consumer | Module | Output |
//! |----------|--------|--------|
//! | [`PatternScan`] | [`classifier`] | [`PatternMatches`] |
//! | [`ToolSequenceTracker`] | [`tools`] | [`ToolStats`] |
//! | [`ToolDecisionLog`] | [`tools`] | `Vec<ToolDecision>` |
//! | [`HypothesisCycleTracker`] | [`hypothesis`] | [`HypothesisSummary`] |
//! | [`TimelineAggregator`] | [`timeline`] | [`Timeline`] |
//! | [`FlowTracker`] | [`flow`] | `Option<SessionFlow>` |
//!
//! [`SessionAnalyzer`] feeds all of them from a single pass over the stream.
//! [`run_pass`] drives one consumer on its own.

pub mod catalog;
pub mod classifier;
pub mod flow;
pub mod hypothesis;
pub mod timeline;
pub mod tools;

pub use catalog::{CategorySpec, IndicatorSpec, Matcher, PatternCatalog};
pub use classifier::{CategoryMatches, Classifier, Match, PatternMatches, PatternScan};
pub use flow::{FlowTracker, SessionFlow};
pub use hypothesis::{CycleOutcome, HypothesisCycle, HypothesisCycleTracker, HypothesisSummary};
pub use timeline::{ActivityBucket, IntensityBucket, Timeline, TimelineAggregator};
pub use tools::{
    FileOperation, OrderedCounter, ToolDecision, ToolDecisionLog, ToolSequenceTracker, ToolStats,
};

use crate::config::{Config, TimelineConfig};
use crate::types::Event;
use crate::Result;

// ============================================
// Consumer seam
// ============================================

/// Position of a consumer within the stream.
///
/// `next` is the one-event look-ahead used to observe the environment's
/// answer to a tool call.
#[derive(Debug, Clone, Copy)]
pub struct EventCursor<'a> {
    pub index: usize,
    pub event: &'a Event,
    pub next: Option<&'a Event>,
}

/// A single-pass analysis over an event stream.
pub trait EventConsumer {
    type Output;

    /// See one event. Called once per event, in stream order.
    fn observe(&mut self, cursor: &EventCursor<'_>);

    /// End of stream.
    fn finish(self) -> Self::Output;
}

fn cursors(events: &[Event]) -> impl Iterator<Item = EventCursor<'_>> {
    events.iter().enumerate().map(move |(index, event)| EventCursor {
        index,
        event,
        next: events.get(index + 1),
    })
}

/// Drive one consumer over `events`.
pub fn run_pass<C: EventConsumer>(mut consumer: C, events: &[Event]) -> C::Output {
    for cursor in cursors(events) {
        consumer.observe(&cursor);
    }
    consumer.finish()
}

// ============================================
// SessionAnalyzer
// ============================================

/// Everything one pass over a session produces.
#[derive(Debug, Clone)]
pub struct SessionAnalysis {
    pub event_count: usize,
    pub cognitive: PatternMatches,
    pub coarse: PatternMatches,
    pub learning: PatternMatches,
    pub tools: ToolStats,
    pub decisions: Vec<ToolDecision>,
    pub hypotheses: HypothesisSummary,
    pub timeline: Timeline,
    pub flow: Option<SessionFlow>,
}

/// Runs every consumer over a session in one pass.
///
/// Catalogs are compiled at construction, so a malformed pattern fails
/// before any event is read.
#[derive(Debug)]
pub struct SessionAnalyzer {
    cognitive: Classifier,
    coarse: Classifier,
    learning: Classifier,
    timeline: TimelineConfig,
}

impl SessionAnalyzer {
    /// Analyzer with the built-in catalogs and default bucket widths.
    pub fn new() -> Result<Self> {
        Self::from_config(&Config::default())
    }

    /// Analyzer with user categories appended to the cognitive catalog and
    /// bucket widths from `[timeline]`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let analyzer = Self {
            cognitive: Classifier::new(PatternCatalog::cognitive_with(
                &config.patterns.categories,
            )?),
            coarse: Classifier::new(PatternCatalog::coarse()?),
            learning: Classifier::new(PatternCatalog::learning()?),
            timeline: config.timeline.clone(),
        };
        tracing::debug!(
            cognitive_categories = analyzer.cognitive.catalog().len(),
            user_categories = config.patterns.categories.len(),
            "Session analyzer ready"
        );
        Ok(analyzer)
    }

    pub fn cognitive(&self) -> &Classifier {
        &self.cognitive
    }

    pub fn coarse(&self) -> &Classifier {
        &self.coarse
    }

    pub fn learning(&self) -> &Classifier {
        &self.learning
    }

    pub fn analyze(&self, events: &[Event]) -> SessionAnalysis {
        let mut cognitive = self.cognitive.scan();
        let mut coarse = self.coarse.scan();
        let mut learning = self.learning.scan();
        let mut tools = ToolSequenceTracker::new();
        let mut decisions = ToolDecisionLog::new();
        let mut hypotheses = HypothesisCycleTracker::new();
        let mut timeline = TimelineAggregator::new(&self.timeline);
        let mut flow = FlowTracker::new();

        for cursor in cursors(events) {
            cognitive.observe(&cursor);
            coarse.observe(&cursor);
            learning.observe(&cursor);
            tools.observe(&cursor);
            decisions.observe(&cursor);
            hypotheses.observe(&cursor);
            timeline.observe(&cursor);
            flow.observe(&cursor);
        }

        let analysis = SessionAnalysis {
            event_count: events.len(),
            cognitive: cognitive.finish(),
            coarse: coarse.finish(),
            learning: learning.finish(),
            tools: tools.finish(),
            decisions: decisions.finish(),
            hypotheses: hypotheses.finish(),
            timeline: timeline.finish(),
            flow: flow.finish(),
        };

        tracing::info!(
            events = analysis.event_count,
            tool_invocations = analysis.tools.total_invocations(),
            cognitive_matches = analysis.cognitive.total(),
            hypothesis_cycles = analysis.hypotheses.formed(),
            "Session analyzed"
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryConfig;
    use crate::types::{Content, EventKind};

    fn session() -> Vec<Event> {
        vec![
            Event::assistant(vec![
                Content::text("I wonder if the config is stale. Let me try reading it."),
                Content::tool_with("Read", serde_json::json!({"file_path": "/app/config.toml"})),
            ]),
            Event::user(),
            Event::new(EventKind::Other, None, vec![]),
            Event::assistant(vec![
                Content::text("Wow, I see the problem now!"),
                Content::tool_with("Edit", serde_json::json!({"file_path": "/app/config.toml"})),
            ]),
        ]
    }

    /// Counts how often it was called, to check the driver.
    struct Counting(Vec<(usize, bool)>);

    impl EventConsumer for Counting {
        type Output = Vec<(usize, bool)>;

        fn observe(&mut self, cursor: &EventCursor<'_>) {
            self.0.push((cursor.index, cursor.next.is_some()));
        }

        fn finish(self) -> Self::Output {
            self.0
        }
    }

    #[test]
    fn test_run_pass_visits_every_event_with_look_ahead() {
        let seen = run_pass(Counting(Vec::new()), &session());
        assert_eq!(seen, vec![(0, true), (1, true), (2, true), (3, false)]);
        assert!(run_pass(Counting(Vec::new()), &[]).is_empty());
    }

    #[test]
    fn test_analyze_combines_all_consumers() {
        let analyzer = SessionAnalyzer::new().unwrap();
        let analysis = analyzer.analyze(&session());

        assert_eq!(analysis.event_count, 4);
        assert_eq!(analysis.tools.sequence, vec!["Read", "Edit"]);
        assert_eq!(analysis.tools.read_before_modify_count(), 1);
        assert_eq!(analysis.decisions.len(), 2);
        assert_eq!(analysis.hypotheses.formed(), 1);
        assert_eq!(
            analysis.hypotheses.cycles[0].result,
            CycleOutcome::Completed
        );
        assert!(analysis.cognitive.count("hypothesis_formation") >= 1);
        assert_eq!(analysis.coarse.count("excitement"), 1);
        assert_eq!(analysis.learning.count("learning_moment"), 1);
        assert!(analysis.flow.is_none());
        assert!(analysis.timeline.activity.is_empty());
    }

    #[test]
    fn test_analyze_matches_individual_passes() {
        let analyzer = SessionAnalyzer::new().unwrap();
        let events = session();
        let analysis = analyzer.analyze(&events);

        let tools = run_pass(ToolSequenceTracker::new(), &events);
        let cognitive = run_pass(analyzer.cognitive().scan(), &events);
        assert_eq!(analysis.tools.sequence, tools.sequence);
        assert_eq!(analysis.cognitive.total(), cognitive.total());
    }

    #[test]
    fn test_user_categories_extend_cognitive_catalog() {
        let mut config = Config::default();
        config.patterns.categories.push(CategoryConfig {
            name: "caching".to_string(),
            radius: 20,
            substrings: vec!["stale".to_string()],
            regexes: vec![],
        });
        let analyzer = SessionAnalyzer::from_config(&config).unwrap();
        let analysis = analyzer.analyze(&session());
        assert_eq!(analysis.cognitive.count("caching"), 1);
    }

    #[test]
    fn test_malformed_user_pattern_fails_before_analysis() {
        let mut config = Config::default();
        config.patterns.categories.push(CategoryConfig {
            name: "broken".to_string(),
            radius: 50,
            substrings: vec![],
            regexes: vec!["(unclosed".to_string()],
        });
        let err = SessionAnalyzer::from_config(&config).unwrap_err();
        assert!(matches!(err, crate::Error::Pattern { .. }));
    }
}
