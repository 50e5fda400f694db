//! Highlighter configuration.

use serde::{Deserialize, Serialize};

use crate::error::{HighlightError, Result};
use crate::matcher::MatchStrategy;
use crate::weight::{ExponentialSnippetWeigher, SnippetWeigher, SumSnippetWeigher};

/// How snippets are chosen and in which order they are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightOrder {
    /// Best snippets, highest score first.
    #[default]
    ScoreOrdered,
    /// Best snippets, in the order they appear in the source.
    SourceOrdered,
    /// The first snippets of the source, chosen greedily.
    SourceOrderedGreedy,
}

/// How snippet windows are cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmenterKind {
    /// One snippet for the whole value.
    Whole,
    /// Windows of `fragment_chars` characters snapped to whitespace.
    #[default]
    CharScanning,
    /// Windows of up to `max_sentences` whole sentences.
    Sentence,
}

/// How snippets are scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetWeigherKind {
    /// Sum of the hit weights.
    Sum,
    /// Exponential weighing that discounts repeated sources.
    Exponential {
        /// Base of the exponent.
        base: f32,
    },
}

impl Default for SnippetWeigherKind {
    fn default() -> Self {
        SnippetWeigherKind::Exponential { base: 1.1 }
    }
}

impl SnippetWeigherKind {
    /// Build the weigher.
    pub fn weigher(self) -> Box<dyn SnippetWeigher> {
        match self {
            SnippetWeigherKind::Sum => Box::new(SumSnippetWeigher),
            SnippetWeigherKind::Exponential { base } => {
                Box::new(ExponentialSnippetWeigher::new(base))
            }
        }
    }
}

/// Configuration for highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Text inserted before each hit.
    pub pre_tag: String,
    /// Text inserted after each hit.
    pub post_tag: String,
    /// Maximum number of snippets to return.
    pub max_snippets: usize,
    /// Size of a char-scanning window in characters.
    pub fragment_chars: usize,
    /// How many characters a window bound may move to reach whitespace.
    pub max_scan: usize,
    /// Maximum number of sentences in a sentence window.
    pub max_sentences: usize,
    /// Snippet choice and output order.
    pub order: HighlightOrder,
    /// Snippet window strategy.
    pub segmenter: SegmenterKind,
    /// Snippet scoring.
    pub snippet_weigher: SnippetWeigherKind,
    /// Pattern matching strategy.
    pub match_strategy: MatchStrategy,
    /// Offset gap between the values of a multi-valued field.
    pub offset_gap: u32,
    /// Whether snippet text may span several values.
    pub merge_sources: bool,
    /// Separator put between values when text spans several of them.
    pub merge_separator: String,
    /// Hits weighing less than this are ignored.
    pub min_hit_weight: f32,
    /// Hits at a position before this one are boosted.
    pub boost_before: u32,
    /// Factor applied to boosted hits.
    pub boost_factor: f32,
    /// Characters of leading text to return when nothing matches; zero
    /// returns nothing.
    pub no_match_size: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            pre_tag: "<em>".to_string(),
            post_tag: "</em>".to_string(),
            max_snippets: 1,
            fragment_chars: 100,
            max_scan: 20,
            max_sentences: 1,
            order: HighlightOrder::default(),
            segmenter: SegmenterKind::default(),
            snippet_weigher: SnippetWeigherKind::default(),
            match_strategy: MatchStrategy::default(),
            offset_gap: 1,
            merge_sources: true,
            merge_separator: " ".to_string(),
            min_hit_weight: 0.0,
            boost_before: 0,
            boost_factor: 1.0,
            no_match_size: 0,
        }
    }
}

impl HighlightConfig {
    /// Create a new highlight configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: HighlightConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.segmenter == SegmenterKind::CharScanning && self.fragment_chars == 0 {
            return Err(HighlightError::invalid_argument(
                "fragment_chars must be positive",
            ));
        }
        if !self.min_hit_weight.is_finite() {
            return Err(HighlightError::invalid_argument(
                "min_hit_weight must be finite",
            ));
        }
        if !self.boost_factor.is_finite() || self.boost_factor < 0.0 {
            return Err(HighlightError::invalid_argument(format!(
                "boost_factor must be a non-negative number, got {}",
                self.boost_factor
            )));
        }
        if let SnippetWeigherKind::Exponential { base } = self.snippet_weigher {
            if !base.is_finite() || base <= 0.0 {
                return Err(HighlightError::invalid_argument(format!(
                    "exponential base must be positive, got {base}"
                )));
            }
        }
        Ok(())
    }

    /// Set the tags wrapped around each hit.
    pub fn tags<S: Into<String>, T: Into<String>>(mut self, pre_tag: S, post_tag: T) -> Self {
        self.pre_tag = pre_tag.into();
        self.post_tag = post_tag.into();
        self
    }

    /// Set the maximum number of snippets.
    pub fn max_snippets(mut self, max_snippets: usize) -> Self {
        self.max_snippets = max_snippets;
        self
    }

    /// Set the window size and how far its bounds may move.
    pub fn fragment_chars(mut self, fragment_chars: usize, max_scan: usize) -> Self {
        self.fragment_chars = fragment_chars;
        self.max_scan = max_scan;
        self
    }

    /// Set the maximum number of sentences in a sentence window.
    pub fn max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    /// Set the snippet choice and output order.
    pub fn order(mut self, order: HighlightOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the window strategy.
    pub fn segmenter(mut self, segmenter: SegmenterKind) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Set the snippet scoring.
    pub fn snippet_weigher(mut self, snippet_weigher: SnippetWeigherKind) -> Self {
        self.snippet_weigher = snippet_weigher;
        self
    }

    /// Set the pattern matching strategy.
    pub fn match_strategy(mut self, match_strategy: MatchStrategy) -> Self {
        self.match_strategy = match_strategy;
        self
    }

    /// Set the gap between the values of a multi-valued field.
    pub fn offset_gap(mut self, offset_gap: u32) -> Self {
        self.offset_gap = offset_gap;
        self
    }

    /// Let snippet text span several values, joined with `separator`.
    pub fn merge_sources<S: Into<String>>(mut self, separator: S) -> Self {
        self.merge_sources = true;
        self.merge_separator = separator.into();
        self
    }

    /// Keep snippet text inside one value.
    pub fn no_merge_sources(mut self) -> Self {
        self.merge_sources = false;
        self
    }

    /// Ignore hits weighing less than `min_hit_weight`.
    pub fn min_hit_weight(mut self, min_hit_weight: f32) -> Self {
        self.min_hit_weight = min_hit_weight;
        self
    }

    /// Multiply the weight of hits before `position` by `factor`.
    pub fn boost_before(mut self, position: u32, factor: f32) -> Self {
        self.boost_before = position;
        self.boost_factor = factor;
        self
    }

    /// Return a leading fragment of `no_match_size` characters when nothing
    /// matches.
    pub fn no_match_size(mut self, no_match_size: usize) -> Self {
        self.no_match_size = no_match_size;
        self
    }
}
