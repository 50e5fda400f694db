//! Pattern syntax compiled to automata.
//!
//! Regular expressions are parsed by `regex-syntax` into its high-level IR
//! and compiled here into a code-point NFA. Every construct of the regex
//! crate's syntax is accepted except look-around assertions (`^`, `$`, `\b`):
//! hits are found anywhere in the text. `.` also matches `\n`.
//!
//! Wildcards (`*` any run of code points, `?` exactly one, `\` escapes the
//! next character) and literals are rewritten to regular expressions first.

use regex_syntax::ParserBuilder;
use regex_syntax::hir::{Class, Hir, HirKind};

use crate::automaton::{Automaton, Nfa};
use crate::error::{HighlightError, Result};

/// Deepest nesting of groups, classes and repetitions a pattern may use.
pub const MAX_NESTING: u32 = 64;

/// Repetition counts above this are rejected.
pub const MAX_REPETITION: u32 = 1000;

/// Compilation gives up past this many NFA states.
pub const MAX_NFA_STATES: usize = 50_000;

fn invalid(msg: impl std::fmt::Display) -> HighlightError {
    HighlightError::invalid_argument(format!("invalid pattern: {msg}"))
}

struct Compiler {
    nfa: Nfa,
}

impl Compiler {
    fn state(&mut self) -> Result<usize> {
        if self.nfa.num_states() >= MAX_NFA_STATES {
            return Err(invalid(format!(
                "needs more than {MAX_NFA_STATES} automaton states"
            )));
        }
        Ok(self.nfa.add_state())
    }

    /// Compile `hir` into a fragment, returning its entry and exit states.
    fn compile(&mut self, hir: &Hir) -> Result<(usize, usize)> {
        match hir.kind() {
            HirKind::Empty => {
                let state = self.state()?;
                Ok((state, state))
            }
            HirKind::Literal(literal) => {
                let text = std::str::from_utf8(&literal.0).map_err(invalid)?;
                let start = self.state()?;
                let mut current = start;
                for c in text.chars() {
                    let next = self.state()?;
                    self.nfa.add_edge(current, u32::from(c), u32::from(c), next);
                    current = next;
                }
                Ok((start, current))
            }
            HirKind::Class(Class::Unicode(class)) => {
                let (start, end) = (self.state()?, self.state()?);
                for range in class.ranges() {
                    self.nfa
                        .add_edge(start, u32::from(range.start()), u32::from(range.end()), end);
                }
                Ok((start, end))
            }
            HirKind::Class(Class::Bytes(class)) => {
                if class.ranges().iter().any(|range| !range.end().is_ascii()) {
                    return Err(invalid("non-ASCII byte classes are not supported"));
                }
                let (start, end) = (self.state()?, self.state()?);
                for range in class.ranges() {
                    self.nfa
                        .add_edge(start, u32::from(range.start()), u32::from(range.end()), end);
                }
                Ok((start, end))
            }
            HirKind::Look(look) => Err(invalid(format!(
                "assertion {look:?} is not supported"
            ))),
            HirKind::Capture(capture) => self.compile(&capture.sub),
            HirKind::Concat(items) => {
                let start = self.state()?;
                let mut current = start;
                for item in items {
                    let (item_start, item_end) = self.compile(item)?;
                    self.nfa.add_epsilon(current, item_start);
                    current = item_end;
                }
                Ok((start, current))
            }
            HirKind::Alternation(branches) => {
                let (start, end) = (self.state()?, self.state()?);
                for branch in branches {
                    let (branch_start, branch_end) = self.compile(branch)?;
                    self.nfa.add_epsilon(start, branch_start);
                    self.nfa.add_epsilon(branch_end, end);
                }
                Ok((start, end))
            }
            HirKind::Repetition(repetition) => {
                let (min, max) = (repetition.min, repetition.max);
                if min > MAX_REPETITION || max.is_some_and(|max| max > MAX_REPETITION) {
                    return Err(invalid(format!(
                        "repetition count above {MAX_REPETITION}"
                    )));
                }
                let start = self.state()?;
                let mut current = start;
                for _ in 0..min {
                    let (copy_start, copy_end) = self.compile(&repetition.sub)?;
                    self.nfa.add_epsilon(current, copy_start);
                    current = copy_end;
                }
                match max {
                    None => {
                        let (copy_start, copy_end) = self.compile(&repetition.sub)?;
                        let hub = self.state()?;
                        self.nfa.add_epsilon(current, hub);
                        self.nfa.add_epsilon(hub, copy_start);
                        self.nfa.add_epsilon(copy_end, hub);
                        Ok((start, hub))
                    }
                    Some(max) => {
                        let end = self.state()?;
                        for _ in min..max {
                            let (copy_start, copy_end) = self.compile(&repetition.sub)?;
                            self.nfa.add_epsilon(current, end);
                            self.nfa.add_epsilon(current, copy_start);
                            current = copy_end;
                        }
                        self.nfa.add_epsilon(current, end);
                        Ok((start, end))
                    }
                }
            }
        }
    }
}

fn to_automaton(hir: &Hir) -> Result<Automaton> {
    let mut compiler = Compiler { nfa: Nfa::new() };
    let (start, end) = compiler.compile(hir)?;
    let mut nfa = compiler.nfa;
    nfa.set_start(start);
    nfa.set_accept(end);
    nfa.determinize()
}

/// Compile a regular expression.
pub fn parse_regex(pattern: &str, case_insensitive: bool) -> Result<Automaton> {
    let hir = ParserBuilder::new()
        .nest_limit(MAX_NESTING)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .parse(pattern)
        .map_err(invalid)?;
    to_automaton(&hir)
}

/// Compile a wildcard pattern.
pub fn parse_wildcard(pattern: &str) -> Result<Automaton> {
    let mut regex = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' => {
                let escaped = chars.next().ok_or_else(|| invalid("trailing '\\'"))?;
                regex.push_str(&regex_syntax::escape(escaped.encode_utf8(&mut [0; 4])));
            }
            c => regex.push_str(&regex_syntax::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    parse_regex(&regex, false)
}

/// Compile a literal string.
pub fn parse_literal(text: &str, case_insensitive: bool) -> Result<Automaton> {
    parse_regex(&regex_syntax::escape(text), case_insensitive)
}
