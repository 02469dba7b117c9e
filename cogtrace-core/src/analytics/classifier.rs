//! Multi-label lexical classifier
//!
//! Every indicator of every category is tested independently against the
//! case-folded text. A single text unit can match several categories and
//! several indicators within one category; each (indicator, text) pair
//! yields at most one [`Match`], anchored at the indicator's earliest hit.

use super::catalog::PatternCatalog;
use super::{EventConsumer, EventCursor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Range;

/// One indicator hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub category: String,
    /// Indicator id (the pattern as written in the catalog)
    pub indicator: String,
    /// Excerpt of the folded text around the match, trimmed
    pub context: String,
    pub source_timestamp: Option<DateTime<Utc>>,
}

/// Scans text against a [`PatternCatalog`].
#[derive(Debug)]
pub struct Classifier {
    catalog: PatternCatalog,
}

impl Classifier {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Classify a text unit. Total over all inputs; `""` yields no matches.
    pub fn classify(&self, text: &str) -> Vec<Match> {
        self.classify_at(text, None)
    }

    /// Classify a text unit and stamp each match with the source timestamp.
    pub fn classify_at(&self, text: &str, timestamp: Option<DateTime<Utc>>) -> Vec<Match> {
        if text.is_empty() {
            return Vec::new();
        }

        let folded = text.to_lowercase();
        let mut matches = Vec::new();

        for category in self.catalog.categories() {
            for matcher in category.matchers() {
                if let Some(range) = matcher.find(&folded) {
                    matches.push(Match {
                        category: category.name().to_string(),
                        indicator: matcher.id().to_string(),
                        context: context_window(&folded, range, category.radius())
                            .trim()
                            .to_string(),
                        source_timestamp: timestamp,
                    });
                }
            }
        }

        matches
    }

    /// Start an accumulation pass over assistant text.
    pub fn scan(&self) -> PatternScan<'_> {
        PatternScan {
            classifier: self,
            matches: PatternMatches::for_catalog(&self.catalog),
        }
    }
}

/// Slice `text` to `radius` characters either side of `range`, clamped to
/// the text bounds.
pub(crate) fn context_window(text: &str, range: Range<usize>, radius: usize) -> &str {
    let start = text[..range.start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(range.start);
    let end = text[range.end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| range.end + i)
        .unwrap_or(text.len());
    &text[start..end]
}

// ============================================
// Accumulated matches
// ============================================

/// Matches of one category, in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryMatches {
    pub name: String,
    pub matches: Vec<Match>,
}

impl CategoryMatches {
    pub fn count(&self) -> usize {
        self.matches.len()
    }
}

/// Category → ordered matches, with categories in catalog order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternMatches {
    categories: Vec<CategoryMatches>,
}

impl PatternMatches {
    pub fn for_catalog(catalog: &PatternCatalog) -> Self {
        Self {
            categories: catalog
                .categories()
                .iter()
                .map(|c| CategoryMatches {
                    name: c.name().to_string(),
                    matches: Vec::new(),
                })
                .collect(),
        }
    }

    /// Append matches, routing each to its category.
    pub fn extend(&mut self, matches: impl IntoIterator<Item = Match>) {
        for m in matches {
            match self.categories.iter_mut().find(|c| c.name == m.category) {
                Some(category) => category.matches.push(m),
                None => self.categories.push(CategoryMatches {
                    name: m.category.clone(),
                    matches: vec![m],
                }),
            }
        }
    }

    pub fn categories(&self) -> &[CategoryMatches] {
        &self.categories
    }

    pub fn get(&self, category: &str) -> &[Match] {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.matches.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, category: &str) -> usize {
        self.get(category).len()
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(CategoryMatches::count).sum()
    }

    /// Non-empty categories by match count, descending; ties keep catalog order.
    pub fn by_frequency(&self) -> Vec<&CategoryMatches> {
        let mut ranked: Vec<_> = self.categories.iter().filter(|c| c.count() > 0).collect();
        ranked.sort_by(|a, b| b.count().cmp(&a.count()));
        ranked
    }

    /// Percentage of all matches that fall in `category`.
    ///
    /// `None` when nothing matched at all.
    pub fn share(&self, category: &str) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.count(category) as f64 / total as f64 * 100.0)
    }
}

/// Consumer that classifies every assistant text unit.
pub struct PatternScan<'a> {
    classifier: &'a Classifier,
    matches: PatternMatches,
}

impl EventConsumer for PatternScan<'_> {
    type Output = PatternMatches;

    fn observe(&mut self, cursor: &EventCursor<'_>) {
        if !cursor.event.is_assistant() {
            return;
        }
        for text in cursor.event.texts() {
            let found = self.classifier.classify_at(text, cursor.event.timestamp);
            self.matches.extend(found);
        }
    }

    fn finish(self) -> PatternMatches {
        self.matches
    }
}
