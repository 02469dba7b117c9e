//! Report assembly
//!
//! Condenses a [`SessionAnalysis`] into the summary statistics the binaries
//! print. The report is plain data: text renderers format it, and
//! `--format json` serializes it as-is.

use crate::analytics::{
    ActivityBucket, CategoryMatches, IntensityBucket, OrderedCounter, PatternMatches,
    SessionAnalysis, SessionFlow,
};
use crate::config::ReportConfig;
use crate::ingest::SkippedLine;
use serde::Serialize;

/// A name with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub count: usize,
}

/// A tool transition with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEntry {
    pub from: String,
    pub to: String,
    pub count: usize,
}

fn ranked(items: Vec<(String, usize)>) -> Vec<Ranked> {
    items
        .into_iter()
        .map(|(name, count)| Ranked { name, count })
        .collect()
}

fn transitions(items: Vec<((String, String), usize)>) -> Vec<TransitionEntry> {
    items
        .into_iter()
        .map(|((from, to), count)| TransitionEntry { from, to, count })
        .collect()
}

// ============================================
// Sections
// ============================================

/// Files touched by one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceOperations {
    pub tool: String,
    pub files: Vec<Ranked>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSection {
    pub total_invocations: usize,
    pub distinct_tools: usize,
    pub top_tools: Vec<Ranked>,
    pub top_transitions: Vec<TransitionEntry>,
    pub unique_transitions: usize,
    pub file_operations: Vec<ResourceOperations>,
}

/// One category's count, share and first examples.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
    /// Percent of all matches in the same catalog
    pub share: Option<f64>,
    pub examples: Vec<String>,
}

impl CategorySummary {
    fn from_matches(all: &PatternMatches, category: &CategoryMatches, samples: usize) -> Self {
        Self {
            name: category.name.clone(),
            count: category.count(),
            share: all.share(&category.name),
            examples: category
                .matches
                .iter()
                .take(samples)
                .map(|m| m.context.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternSection {
    pub total_matches: usize,
    /// Non-empty categories by count, descending
    pub categories: Vec<CategorySummary>,
}

impl PatternSection {
    fn from_matches(matches: &PatternMatches, samples: usize) -> Self {
        Self {
            total_matches: matches.total(),
            categories: matches
                .by_frequency()
                .into_iter()
                .map(|c| CategorySummary::from_matches(matches, c, samples))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.get(name).map(|c| c.count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningSection {
    pub count: usize,
    pub moments: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HypothesisSection {
    pub formed: usize,
    pub tested: usize,
    pub completed: usize,
    pub superseded: usize,
    pub left_open: bool,
    pub completion_rate: Option<f64>,
    pub resolution_rate: Option<f64>,
}

/// Behavioural counts drawn from several consumers.
#[derive(Debug, Clone, Serialize)]
pub struct InsightSection {
    pub documentation_files: Vec<String>,
    pub read_before_modify: usize,
    pub questions: usize,
    pub excitement: usize,
    /// experimentation + hypothesis_formation matches
    pub experimental_tendency: usize,
    pub learning_velocity: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSummary {
    pub active_span_minutes: u64,
    pub total_tool_uses: usize,
    pub tools_per_minute: Option<f64>,
    pub unique_transitions: usize,
    pub peak_intensity: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityRow {
    pub start_minutes: u64,
    pub total: usize,
    pub tools: Vec<Ranked>,
}

impl From<&ActivityBucket> for ActivityRow {
    fn from(bucket: &ActivityBucket) -> Self {
        Self {
            start_minutes: bucket.start_minutes,
            total: bucket.total(),
            tools: bucket
                .tools
                .iter()
                .map(|(name, count)| Ranked {
                    name: name.clone(),
                    count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSection {
    pub activity_bucket_minutes: u64,
    pub intensity_bucket_minutes: u64,
    pub activity: Vec<ActivityRow>,
    pub intensity: Vec<IntensityBucket>,
    /// Most common transitions in timestamped order
    pub flows: Vec<TransitionEntry>,
    pub summary: TimelineSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionSection {
    pub total: usize,
    pub with_reasoning: usize,
    pub with_description: usize,
}

// ============================================
// SessionReport
// ============================================

/// Everything the binaries report about one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub event_count: usize,
    pub skipped_lines: Vec<SkippedLine>,
    pub tools: ToolSection,
    pub coarse: PatternSection,
    pub patterns: PatternSection,
    pub learning: LearningSection,
    pub hypotheses: HypothesisSection,
    pub insights: InsightSection,
    pub timeline: TimelineSection,
    pub flow: Option<SessionFlow>,
    pub decisions: DecisionSection,
}

impl SessionReport {
    pub fn assemble(
        analysis: &SessionAnalysis,
        config: &ReportConfig,
        skipped_lines: Vec<SkippedLine>,
    ) -> Self {
        let top_n = config.top_n;
        let tools = &analysis.tools;

        let file_operations = tools
            .resource_kinds()
            .into_iter()
            .map(|tool| ResourceOperations {
                tool: tool.to_string(),
                files: ranked(tools.operations_per_resource(tool, top_n)),
            })
            .collect();

        let coarse = PatternSection::from_matches(&analysis.coarse, config.sample_count);
        let patterns = PatternSection::from_matches(&analysis.cognitive, config.sample_count);

        let learning = LearningSection {
            count: analysis.learning.total(),
            moments: analysis
                .learning
                .categories()
                .iter()
                .flat_map(|c| c.matches.iter())
                .take(config.learning_samples)
                .map(|m| m.context.clone())
                .collect(),
        };

        let hypotheses = &analysis.hypotheses;
        let hypotheses = HypothesisSection {
            formed: hypotheses.formed(),
            tested: hypotheses.tested(),
            completed: hypotheses.completed(),
            superseded: hypotheses.superseded,
            left_open: hypotheses.left_open,
            completion_rate: hypotheses.completion_rate(),
            resolution_rate: hypotheses.resolution_rate(),
        };

        let insights = InsightSection {
            documentation_files: tools
                .documentation_files()
                .into_iter()
                .map(String::from)
                .collect(),
            read_before_modify: tools.read_before_modify_count(),
            questions: analysis.coarse.count("question"),
            excitement: analysis.coarse.count("excitement"),
            experimental_tendency: analysis.cognitive.count("experimentation")
                + analysis.cognitive.count("hypothesis_formation"),
            learning_velocity: learning.count,
        };

        let timeline = &analysis.timeline;
        let timeline_flows: OrderedCounter<(String, String)> = timeline.transitions();
        let timeline = TimelineSection {
            activity_bucket_minutes: timeline.activity_bucket_minutes,
            intensity_bucket_minutes: timeline.intensity_bucket_minutes,
            activity: timeline.activity.iter().map(ActivityRow::from).collect(),
            intensity: timeline.intensity.clone(),
            flows: transitions(timeline_flows.most_common(top_n)),
            summary: TimelineSummary {
                active_span_minutes: timeline.active_span_minutes(),
                total_tool_uses: timeline.total_tool_uses(),
                tools_per_minute: timeline.tools_per_minute(),
                unique_transitions: timeline_flows.len(),
                peak_intensity: timeline.peak_intensity(),
            },
        };

        let decisions = DecisionSection {
            total: analysis.decisions.len(),
            with_reasoning: analysis
                .decisions
                .iter()
                .filter(|d| d.has_reasoning())
                .count(),
            with_description: analysis
                .decisions
                .iter()
                .filter(|d| d.description.is_some())
                .count(),
        };

        Self {
            event_count: analysis.event_count,
            skipped_lines,
            tools: ToolSection {
                total_invocations: tools.total_invocations(),
                distinct_tools: tools.counts.len(),
                top_tools: ranked(tools.top_tools(top_n)),
                top_transitions: transitions(tools.top_transitions(top_n)),
                unique_transitions: tools.unique_transitions(),
                file_operations,
            },
            coarse,
            patterns,
            learning,
            hypotheses,
            insights,
            timeline,
            flow: analysis.flow.clone(),
            decisions,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
