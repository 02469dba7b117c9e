//! Pattern catalog
//!
//! A catalog is declarative data: named categories, each holding an ordered
//! list of lexical indicators. Indicators are compiled once when the catalog
//! is built; a malformed indicator is a configuration error at that point and
//! never surfaces during classification.
//!
//! ## Built-in catalogs
//!
//! | Catalog | Categories | Context radius |
//! |---------|------------|----------------|
//! | [`PatternCatalog::cognitive`] | hypothesis_formation, metacognition, experimentation, pattern_recognition, reflection, collaboration | 50 |
//! | [`PatternCatalog::coarse`] | excitement, question | 50 |
//! | [`PatternCatalog::learning`] | learning_moment | 100 |
//!
//! Indicators are matched against case-folded text, so substrings are
//! folded at construction and regexes are compiled case-insensitive.

use crate::config::CategoryConfig;
use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

/// Default symmetric context radius, in characters.
pub const DEFAULT_RADIUS: usize = 50;

/// Context radius for learning-moment phrases.
pub const LEARNING_RADIUS: usize = 100;

// ============================================
// Matchers
// ============================================

/// A single lexical indicator.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Identifier reported with every match (the pattern as written).
    fn id(&self) -> &str;

    /// Byte range of the earliest match in already case-folded text.
    fn find(&self, folded: &str) -> Option<Range<usize>>;
}

/// Plain substring indicator.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    source: String,
    needle: String,
}

impl SubstringMatcher {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            needle: source.to_lowercase(),
        }
    }
}

impl Matcher for SubstringMatcher {
    fn id(&self) -> &str {
        &self.source
    }

    fn find(&self, folded: &str) -> Option<Range<usize>> {
        folded
            .find(&self.needle)
            .map(|start| start..start + self.needle.len())
    }
}

/// Regular-expression indicator.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    source: String,
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source).case_insensitive(true).build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }
}

impl Matcher for RegexMatcher {
    fn id(&self) -> &str {
        &self.source
    }

    fn find(&self, folded: &str) -> Option<Range<usize>> {
        self.regex.find(folded).map(|m| m.range())
    }
}

// ============================================
// Declarative specs
// ============================================

/// How an indicator should be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorSpec {
    Substring(String),
    Regex(String),
}

impl IndicatorSpec {
    fn source(&self) -> &str {
        match self {
            IndicatorSpec::Substring(s) | IndicatorSpec::Regex(s) => s,
        }
    }
}

/// A category before compilation.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub name: String,
    /// Characters of context kept on each side of a match
    pub radius: usize,
    pub indicators: Vec<IndicatorSpec>,
}

impl From<&CategoryConfig> for CategorySpec {
    fn from(config: &CategoryConfig) -> Self {
        let indicators = config
            .substrings
            .iter()
            .cloned()
            .map(IndicatorSpec::Substring)
            .chain(config.regexes.iter().cloned().map(IndicatorSpec::Regex))
            .collect();
        Self {
            name: config.name.clone(),
            radius: config.radius,
            indicators,
        }
    }
}

/// Compact form used for the built-in tables.
enum Builtin {
    Sub(&'static str),
    Re(&'static str),
}

use Builtin::{Re, Sub};

struct BuiltinCategory {
    name: &'static str,
    radius: usize,
    indicators: &'static [Builtin],
}

const COGNITIVE: &[BuiltinCategory] = &[
    BuiltinCategory {
        name: "hypothesis_formation",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("what if"),
            Sub("maybe"),
            Sub("could be"),
            Sub("might be"),
            Sub("wondering if"),
            Sub("i wonder"),
            Sub("hypothesis"),
            Sub("theory"),
            Sub("guess"),
        ],
    },
    BuiltinCategory {
        name: "metacognition",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("thinking about"),
            Sub("realize"),
            Sub("notice"),
            Sub("aware"),
            Re(r"understand.*myself"),
            Sub("my own"),
            Sub("i'm feeling"),
        ],
    },
    BuiltinCategory {
        name: "experimentation",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("let me try"),
            Sub("test"),
            Sub("experiment"),
            Sub("see what happens"),
            Sub("find out"),
            Sub("explore"),
            Sub("investigate"),
        ],
    },
    BuiltinCategory {
        name: "pattern_recognition",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("pattern"),
            Sub("similar"),
            Sub("like"),
            Sub("reminds me"),
            Sub("connection"),
            Sub("relationship"),
            Sub("parallel"),
        ],
    },
    BuiltinCategory {
        name: "reflection",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("looking back"),
            Sub("in retrospect"),
            Re(r"what.*learned"),
            Sub("insight"),
            Sub("realization"),
            Sub("profound"),
        ],
    },
    BuiltinCategory {
        name: "collaboration",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("should i"),
            Sub("what do you"),
            Sub("would you like"),
            Sub("ready?"),
            Sub("does that"),
            Sub("make sense"),
        ],
    },
];

const COARSE: &[BuiltinCategory] = &[
    BuiltinCategory {
        name: "excitement",
        radius: DEFAULT_RADIUS,
        indicators: &[
            Sub("excited"),
            Sub("fascinating"),
            Sub("wow"),
            Sub("oh shit"),
            Sub("remarkable"),
            Sub("profound"),
        ],
    },
    BuiltinCategory {
        name: "question",
        radius: DEFAULT_RADIUS,
        indicators: &[Sub("?"), Sub("should i"), Sub("what if"), Sub("could i")],
    },
];

const LEARNING: &[BuiltinCategory] = &[BuiltinCategory {
    name: "learning_moment",
    radius: LEARNING_RADIUS,
    indicators: &[
        Re(r"i (just )?learned"),
        Sub("i discovered"),
        Sub("i found out"),
        Re(r"now i (understand|know)"),
        Sub("this teaches me"),
        Sub("key insight"),
        Sub("aha"),
        Sub("oh!"),
        Sub("i see"),
        Sub("that's interesting"),
    ],
}];

fn builtin_specs(table: &[BuiltinCategory]) -> Vec<CategorySpec> {
    table
        .iter()
        .map(|category| CategorySpec {
            name: category.name.to_string(),
            radius: category.radius,
            indicators: category
                .indicators
                .iter()
                .map(|indicator| match indicator {
                    Sub(s) => IndicatorSpec::Substring(s.to_string()),
                    Re(s) => IndicatorSpec::Regex(s.to_string()),
                })
                .collect(),
        })
        .collect()
}

// ============================================
// Compiled catalog
// ============================================

/// A compiled category.
#[derive(Debug)]
pub struct Category {
    name: String,
    radius: usize,
    matchers: Vec<Box<dyn Matcher>>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn matchers(&self) -> &[Box<dyn Matcher>] {
        &self.matchers
    }
}

/// Registry of compiled categories, in declaration order.
#[derive(Debug)]
pub struct PatternCatalog {
    categories: Vec<Category>,
}

impl PatternCatalog {
    /// Compile a catalog from specs.
    ///
    /// Fails on an empty or duplicate category name, a category without
    /// indicators, an empty indicator, or a regex that does not compile.
    pub fn new(specs: Vec<CategorySpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(specs.len());

        for spec in specs {
            let invalid = |indicator: &str, message: &str| Error::Pattern {
                category: spec.name.clone(),
                indicator: indicator.to_string(),
                message: message.to_string(),
            };

            if spec.name.trim().is_empty() {
                return Err(invalid("", "category name is empty"));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(invalid("", "duplicate category name"));
            }
            if spec.indicators.is_empty() {
                return Err(invalid("", "category has no indicators"));
            }

            let mut matchers: Vec<Box<dyn Matcher>> = Vec::with_capacity(spec.indicators.len());
            for indicator in &spec.indicators {
                if indicator.source().is_empty() {
                    return Err(invalid("", "indicator is empty"));
                }
                match indicator {
                    IndicatorSpec::Substring(s) => matchers.push(Box::new(SubstringMatcher::new(s))),
                    IndicatorSpec::Regex(s) => {
                        let matcher =
                            RegexMatcher::new(s).map_err(|e| invalid(s, &e.to_string()))?;
                        matchers.push(Box::new(matcher));
                    }
                }
            }

            categories.push(Category {
                name: spec.name,
                radius: spec.radius,
                matchers,
            });
        }

        tracing::debug!(categories = categories.len(), "Compiled pattern catalog");

        Ok(Self { categories })
    }

    /// Cognitive-state categories used for the insights report.
    pub fn cognitive() -> Result<Self> {
        Self::new(builtin_specs(COGNITIVE))
    }

    /// Cognitive categories followed by user-configured extras.
    pub fn cognitive_with(extra: &[CategoryConfig]) -> Result<Self> {
        let mut specs = builtin_specs(COGNITIVE);
        specs.extend(extra.iter().map(CategorySpec::from));
        Self::new(specs)
    }

    /// Two-way excitement/question split used for coarse reporting.
    pub fn coarse() -> Result<Self> {
        Self::new(builtin_specs(COARSE))
    }

    /// Explicit learning-moment phrases.
    pub fn learning() -> Result<Self> {
        Self::new(builtin_specs(LEARNING))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, indicators: Vec<IndicatorSpec>) -> CategorySpec {
        CategorySpec {
            name: name.to_string(),
            radius: DEFAULT_RADIUS,
            indicators,
        }
    }

    #[test]
    fn test_builtin_catalogs_compile() {
        let cognitive = PatternCatalog::cognitive().unwrap();
        assert_eq!(
            cognitive.category_names(),
            vec![
                "hypothesis_formation",
                "metacognition",
                "experimentation",
                "pattern_recognition",
                "reflection",
                "collaboration",
            ]
        );
        assert_eq!(
            PatternCatalog::coarse().unwrap().category_names(),
            vec!["excitement", "question"]
        );
        let learning = PatternCatalog::learning().unwrap();
        assert_eq!(learning.categories()[0].radius(), LEARNING_RADIUS);
    }

    #[test]
    fn test_invalid_regex_fails_at_construction() {
        let err = PatternCatalog::new(vec![spec(
            "broken",
            vec![IndicatorSpec::Regex("(unclosed".to_string())],
        )])
        .unwrap_err();

        match err {
            Error::Pattern {
                category,
                indicator,
                ..
            } => {
                assert_eq!(category, "broken");
                assert_eq!(indicator, "(unclosed");
            }
            other => panic!("expected pattern error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_duplicate_entries_rejected() {
        assert!(PatternCatalog::new(vec![spec(
            "empty_indicator",
            vec![IndicatorSpec::Substring(String::new())]
        )])
        .is_err());
        assert!(PatternCatalog::new(vec![spec("no_indicators", vec![])]).is_err());
        assert!(PatternCatalog::new(vec![spec(
            " ",
            vec![IndicatorSpec::Substring("x".to_string())]
        )])
        .is_err());

        let dup = || spec("dup", vec![IndicatorSpec::Substring("x".to_string())]);
        assert!(PatternCatalog::new(vec![dup(), dup()]).is_err());
    }

    #[test]
    fn test_substring_matcher_folds_needle() {
        let matcher = SubstringMatcher::new("Key Insight");
        assert_eq!(matcher.id(), "Key Insight");
        assert_eq!(matcher.find("a key insight here"), Some(2..13));
        assert_eq!(matcher.find("nothing"), None);
    }

    #[test]
    fn test_regex_matcher_reports_earliest_match() {
        let matcher = RegexMatcher::new(r"now i (understand|know)").unwrap();
        let text = "ok. now i know. and now i understand.";
        assert_eq!(matcher.find(text), Some(4..14));
    }

    #[test]
    fn test_extra_categories_from_config() {
        let extra = CategoryConfig {
            name: "frustration".to_string(),
            radius: 20,
            substrings: vec!["ugh".to_string()],
            regexes: vec![r"not again\b".to_string()],
        };
        let catalog = PatternCatalog::cognitive_with(&[extra]).unwrap();
        let last = catalog.categories().last().unwrap();
        assert_eq!(last.name(), "frustration");
        assert_eq!(last.radius(), 20);
        assert_eq!(last.matchers().len(), 2);
    }
}
