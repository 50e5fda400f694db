//! # Sarissa Highlight
//!
//! Snippet extraction and highlighting for search results.
//!
//! ## Features
//!
//! - Pull-based hit enums with a k-way merge
//! - Regex and wildcard patterns compiled to code-point automata, scanned in
//!   two passes when a pattern starts with an unbounded wildcard
//! - Char-window, sentence and whole-value segmenters
//! - Score-based and source-order snippet choosers
//! - Sum and exponential snippet weighing
//! - Multi-valued fields

pub mod automaton;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod highlighter;
pub mod hit;
pub mod hit_enum;
pub mod matcher;
pub mod segment;
pub mod snippet;
pub mod weight;

pub mod prelude {
    pub use crate::config::{HighlightConfig, HighlightOrder, SegmenterKind, SnippetWeigherKind};
    pub use crate::error::{HighlightError, Result};
    pub use crate::highlighter::{HighlightedSnippet, Highlighter};
    pub use crate::hit::Hit;
    pub use crate::hit_enum::{HitEnum, HitOrdering};
    pub use crate::matcher::Pattern;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
