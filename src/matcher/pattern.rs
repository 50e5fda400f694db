//! Compiled patterns.

use log::debug;

use crate::automaton::parser::{parse_literal, parse_regex, parse_wildcard};
use crate::automaton::Automaton;
use crate::error::Result;
use crate::matcher::automaton_hits::AutomatonHitEnum;
use crate::matcher::MatchStrategy;
use crate::weight::ConstantHitWeigher;

/// A compiled pattern ready to scan text.
///
/// The forward automaton never accepts the empty string, so every hit covers
/// at least one code point. Patterns scanned in two passes also carry the
/// reversed `(pattern).*` automaton.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    forward: Automaton,
    backward: Option<Automaton>,
}

impl Pattern {
    /// Compile a regular expression from the supported subset.
    ///
    /// ```
    /// use sarissa_highlight::matcher::Pattern;
    ///
    /// let pattern = Pattern::regex("qu(i|a)ck").unwrap();
    /// assert!(!pattern.is_two_pass());
    /// assert!(Pattern::regex(".*ck").unwrap().is_two_pass());
    /// ```
    pub fn regex(pattern: &str) -> Result<Self> {
        Self::from_automaton(pattern, parse_regex(pattern, false)?, MatchStrategy::Auto)
    }

    /// Compile a case-insensitive regular expression.
    pub fn regex_case_insensitive(pattern: &str) -> Result<Self> {
        Self::from_automaton(pattern, parse_regex(pattern, true)?, MatchStrategy::Auto)
    }

    /// Compile a wildcard pattern (`*` and `?`).
    pub fn wildcard(pattern: &str) -> Result<Self> {
        Self::from_automaton(pattern, parse_wildcard(pattern)?, MatchStrategy::Auto)
    }

    /// Compile a literal string.
    pub fn literal(text: &str, case_insensitive: bool) -> Result<Self> {
        Self::from_automaton(
            text,
            parse_literal(text, case_insensitive)?,
            MatchStrategy::Auto,
        )
    }

    /// Wrap an already built automaton.
    pub fn from_automaton<S: Into<String>>(
        source: S,
        automaton: Automaton,
        strategy: MatchStrategy,
    ) -> Result<Self> {
        let source = source.into();
        let forward = automaton.without_empty();
        let two_pass = match strategy {
            MatchStrategy::Auto => forward.has_unconstrained_prefix(),
            MatchStrategy::ForwardOnly => false,
            MatchStrategy::TwoPass => true,
        };
        let backward = if two_pass {
            Some(forward.concat_any_star()?.reverse()?)
        } else {
            None
        };
        debug!(
            "compiled pattern {:?}: {} states, {} scan",
            source,
            forward.num_states(),
            if two_pass { "two-pass" } else { "forward-only" }
        );
        Ok(Pattern {
            source,
            forward,
            backward,
        })
    }

    /// Recompile with a different match strategy.
    pub fn with_strategy(self, strategy: MatchStrategy) -> Result<Self> {
        Self::from_automaton(self.source, self.forward, strategy)
    }

    /// Replace the backward automaton, bypassing its construction.
    #[cfg(test)]
    pub(crate) fn with_backward(mut self, backward: Automaton) -> Self {
        self.backward = Some(backward);
        self
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether text is scanned in two passes.
    pub fn is_two_pass(&self) -> bool {
        self.backward.is_some()
    }

    /// The forward automaton.
    pub fn forward(&self) -> &Automaton {
        &self.forward
    }

    /// The reversed `(pattern).*` automaton, when scanning in two passes.
    pub fn backward(&self) -> Option<&Automaton> {
        self.backward.as_ref()
    }

    /// Scan `text`, weighing every hit 1.
    pub fn hits<'a>(
        &'a self,
        text: &'a str,
    ) -> AutomatonHitEnum<'a, ConstantHitWeigher, ConstantHitWeigher> {
        AutomatonHitEnum::new(
            self,
            text,
            ConstantHitWeigher::default(),
            ConstantHitWeigher::default(),
        )
    }
}
