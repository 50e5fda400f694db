//! Command line argument parsing for the highlighter CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{HighlightOrder, SegmenterKind};
use crate::matcher::MatchStrategy;

/// sarissa-highlight - Find and mark the best snippets of a text
#[derive(Parser, Debug, Clone)]
#[command(name = "sarissa-highlight")]
#[command(about = "Find and mark the best snippets of a text")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sarissa Contributors")]
#[command(long_about = None)]
pub struct HighlightArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HighlightArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Highlight terms or patterns in a text
    Highlight(HighlightCommandArgs),

    /// Print the effective configuration as JSON
    #[command(name = "show-config")]
    ShowConfig(ConfigArgs),
}

/// Configuration shared by the commands
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (JSON); flags override its values
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of snippets
    #[arg(short = 'n', long)]
    pub max_snippets: Option<usize>,

    /// Snippet window size in characters
    #[arg(long)]
    pub fragment_chars: Option<usize>,

    /// How far window bounds may move to reach whitespace
    #[arg(long)]
    pub max_scan: Option<usize>,

    /// Snippet choice and output order
    #[arg(long)]
    pub order: Option<OrderArg>,

    /// Snippet window strategy
    #[arg(long)]
    pub segmenter: Option<SegmenterArg>,

    /// Pattern matching strategy
    #[arg(long)]
    pub strategy: Option<StrategyArg>,

    /// Text inserted before each hit
    #[arg(long)]
    pub pre_tag: Option<String>,

    /// Text inserted after each hit
    #[arg(long)]
    pub post_tag: Option<String>,

    /// Characters of leading text to print when nothing matches
    #[arg(long)]
    pub no_match_size: Option<usize>,
}

/// Arguments for highlighting
#[derive(Parser, Debug, Clone)]
pub struct HighlightCommandArgs {
    /// Input file; reads standard input when absent or "-"
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Term to highlight, optionally weighted as TERM:WEIGHT
    #[arg(short, long = "term", value_name = "TERM[:WEIGHT]")]
    pub terms: Vec<String>,

    /// Regular expression to highlight
    #[arg(short, long = "regex", value_name = "PATTERN", conflicts_with = "terms")]
    pub regexes: Vec<String>,

    /// Wildcard pattern (* and ?) to highlight
    #[arg(short, long = "wildcard", value_name = "PATTERN", conflicts_with = "terms")]
    pub wildcards: Vec<String>,

    /// Match regular expressions case-insensitively
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Treat every input line as a separate value
    #[arg(long)]
    pub lines: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Snippet order for the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// Best snippets, highest score first
    Score,
    /// Best snippets, in text order
    Source,
    /// First snippets of the text
    Greedy,
}

impl From<OrderArg> for HighlightOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Score => HighlightOrder::ScoreOrdered,
            OrderArg::Source => HighlightOrder::SourceOrdered,
            OrderArg::Greedy => HighlightOrder::SourceOrderedGreedy,
        }
    }
}

/// Segmenter for the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterArg {
    /// Whole value
    Whole,
    /// Character window
    Chars,
    /// Sentences
    Sentence,
}

impl From<SegmenterArg> for SegmenterKind {
    fn from(segmenter: SegmenterArg) -> Self {
        match segmenter {
            SegmenterArg::Whole => SegmenterKind::Whole,
            SegmenterArg::Chars => SegmenterKind::CharScanning,
            SegmenterArg::Sentence => SegmenterKind::Sentence,
        }
    }
}

/// Matching strategy for the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Auto,
    Forward,
    TwoPass,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Auto => MatchStrategy::Auto,
            StrategyArg::Forward => MatchStrategy::ForwardOnly,
            StrategyArg::TwoPass => MatchStrategy::TwoPass,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
