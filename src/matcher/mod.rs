//! Hits from running a compiled pattern over raw text.
//!
//! [`Pattern`] wraps a compiled automaton; [`AutomatonHitEnum`] scans a text
//! with it and yields a hit for every match. Matches never overlap: at each
//! scan start the longest match wins and the next scan starts where it ended.

pub mod automaton_hits;
pub mod pattern;

use serde::{Deserialize, Serialize};

pub use self::automaton_hits::AutomatonHitEnum;
pub use self::pattern::Pattern;

/// How a pattern scans text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Two-pass when the pattern has an unconstrained prefix, forward-only
    /// otherwise.
    #[default]
    Auto,
    /// Try a match at every start offset. Quadratic for patterns like `.*x`.
    ForwardOnly,
    /// Find all legal start offsets in one backward sweep first, then only
    /// try matches there.
    TwoPass,
}
