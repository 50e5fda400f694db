//! Scanning text with a compiled pattern.

use bit_vec::BitVec;
use log::trace;

use crate::automaton::Automaton;
use crate::error::{HighlightError, Result};
use crate::hit::Hit;
use crate::hit_enum::HitEnum;
use crate::matcher::Pattern;
use crate::weight::HitWeigher;

/// Yields a hit for every match of a pattern in a text.
///
/// From each scan start the forward automaton is stepped one code point at a
/// time until it dies or the text ends, and the last accepting offset ends
/// the match. Without a match the scan start moves one code point on.
///
/// For two-pass patterns the reversed `(pattern).*` automaton is first run
/// backward over the whole text, marking every offset at which a match
/// starts. The forward scan then jumps straight from one marked offset to the
/// next, which keeps patterns like `.*x` linear per pass instead of
/// quadratic. Both scans produce the same hits.
///
/// Hits are ordered by position and by offsets alike. Their position is the
/// ordinal of the match.
pub struct AutomatonHitEnum<'a, Q, C> {
    pattern: &'a Pattern,
    text: &'a str,
    starts: Option<BitVec>,
    next_start: usize,
    position: u32,
    query_weigher: Q,
    corpus_weigher: C,
    source: i32,
    exhausted: bool,
}

impl<'a, Q: HitWeigher, C: HitWeigher> AutomatonHitEnum<'a, Q, C> {
    /// Scan `text` with `pattern`. Hit weights are the product of the two
    /// weighers; the corpus weigher is skipped when the query weight is zero.
    pub fn new(pattern: &'a Pattern, text: &'a str, query_weigher: Q, corpus_weigher: C) -> Self {
        let starts = pattern
            .backward()
            .map(|backward| mark_match_starts(backward, text));
        AutomatonHitEnum {
            pattern,
            text,
            starts,
            next_start: 0,
            position: 0,
            query_weigher,
            corpus_weigher,
            source: 0,
            exhausted: false,
        }
    }

    /// Attribute hits to `source` instead of 0.
    pub fn with_source(mut self, source: i32) -> Self {
        self.source = source;
        self
    }

    /// End of the longest non-empty match starting at `start`.
    fn longest_match(&self, start: usize) -> Option<usize> {
        let automaton = self.pattern.forward();
        let mut state = automaton.initial();
        let mut last_match = None;
        for (i, c) in self.text[start..].char_indices() {
            match automaton.step(state, c) {
                Some(next) => state = next,
                None => break,
            }
            if automaton.is_accept(state) {
                last_match = Some(start + i + c.len_utf8());
            }
        }
        last_match
    }

    fn next_marked_start(&self, starts: &BitVec) -> Option<usize> {
        (self.next_start..self.text.len()).find(|&i| starts.get(i) == Some(true))
    }
}

/// Run the reversed `(pattern).*` automaton from the end of `text` to its
/// start, marking every offset from which some prefix of the remaining text
/// matches the pattern.
fn mark_match_starts(backward: &Automaton, text: &str) -> BitVec {
    let mut starts = BitVec::from_elem(text.len() + 1, false);
    let mut state = backward.initial();
    let mut marked = 0usize;
    for (i, c) in text.char_indices().rev() {
        match backward.step(state, c) {
            Some(next) => state = next,
            None => break,
        }
        if backward.is_accept(state) {
            starts.set(i, true);
            marked += 1;
        }
    }
    trace!("backward pass marked {marked} match starts in {} bytes", text.len());
    starts
}

impl<Q: HitWeigher, C: HitWeigher> HitEnum for AutomatonHitEnum<'_, Q, C> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let start = match &self.starts {
                Some(starts) => match self.next_marked_start(starts) {
                    Some(start) => start,
                    None => break,
                },
                None => self.next_start,
            };
            if start >= self.text.len() {
                break;
            }

            let Some(end) = self.longest_match(start) else {
                if self.starts.is_some() {
                    return Err(HighlightError::internal(format!(
                        "pattern {:?} has no match at marked start {start}",
                        self.pattern.source()
                    )));
                }
                let width = self.text[start..].chars().next().map_or(1, char::len_utf8);
                self.next_start = start + width;
                continue;
            };

            self.next_start = end;
            let position = self.position;
            self.position += 1;
            let (start, end) = (start as u32, end as u32);
            let query_weight = self.query_weigher.weigh(position, start, end);
            let corpus_weight = if query_weight == 0.0 {
                0.0
            } else {
                self.corpus_weigher.weigh(position, start, end)
            };
            return Ok(Some(Hit::with_weights(
                position,
                start,
                end,
                query_weight,
                corpus_weight,
                self.source,
            )));
        }
        self.exhausted = true;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_enum::collect_hits;
    use crate::matcher::MatchStrategy;
    use crate::weight::ConstantHitWeigher;

    fn spans(pattern: &Pattern, text: &str) -> Vec<(u32, u32)> {
        let mut hits = pattern.hits(text);
        collect_hits(&mut hits)
            .unwrap()
            .iter()
            .map(|h| (h.start_offset, h.end_offset))
            .collect()
    }

    fn both(pattern: &str) -> (Pattern, Pattern) {
        let forward = Pattern::regex(pattern)
            .unwrap()
            .with_strategy(MatchStrategy::ForwardOnly)
            .unwrap();
        let two_pass = Pattern::regex(pattern)
            .unwrap()
            .with_strategy(MatchStrategy::TwoPass)
            .unwrap();
        (forward, two_pass)
    }

    #[test]
    fn test_longest_match_first() {
        let pattern = Pattern::regex("ab|abcd|c").unwrap();
        assert_eq!(spans(&pattern, "xabcdabc"), vec![(1, 5), (5, 7), (7, 8)]);
    }

    #[test]
    fn test_match_runs_to_end_of_text() {
        let pattern = Pattern::regex("do.*").unwrap();
        let text = "the lazy dog.";
        assert_eq!(spans(&pattern, text), vec![(9, 13)]);
    }

    #[test]
    fn test_leading_wildcard_both_strategies() {
        let text = "The quick brown fox jumped over the lazy dog.";
        for pattern in [".*o", "[a-z]+o[a-z]*", ".+ the", "l.*y|q.*k"] {
            let (forward, two_pass) = both(pattern);
            assert!(two_pass.is_two_pass());
            assert_eq!(spans(&forward, text), spans(&two_pass, text), "{pattern}");
        }
        let (forward, _) = both(".*o");
        assert_eq!(spans(&forward, text), vec![(0, 43)]);
    }

    #[test]
    fn test_unicode_offsets() {
        let pattern = Pattern::regex("r.sum.").unwrap();
        let text = "mon résumé, ton résumé";
        let found = spans(&pattern, text);
        assert_eq!(found.len(), 2);
        let (start, end) = found[0];
        assert_eq!(&text[start as usize..end as usize], "résumé");
    }

    #[test]
    fn test_weights_and_source() {
        let pattern = Pattern::regex("o").unwrap();
        let query = |position: u32, _: u32, _: u32| -> f32 {
            if position == 0 { 0.0 } else { 2.0 }
        };
        let mut hits =
            AutomatonHitEnum::new(&pattern, "foo", query, ConstantHitWeigher(3.0)).with_source(9);
        let first = hits.next_hit().unwrap().unwrap();
        assert_eq!(first.weight(), 0.0);
        assert_eq!(first.corpus_weight, 0.0);
        let second = hits.next_hit().unwrap().unwrap();
        assert_eq!(second.weight(), 6.0);
        assert_eq!(second.position, 1);
        assert_eq!(second.source, 9);
        assert!(hits.next_hit().unwrap().is_none());
        assert!(hits.next_hit().unwrap().is_none());
    }

    #[test]
    fn test_inconsistent_backward_pass_is_internal_error() {
        // marks every offset, but "lazy" only starts at 4
        let every_start = crate::automaton::parser::parse_regex(".+", false).unwrap();
        let pattern = Pattern::regex("lazy").unwrap().with_backward(every_start);
        let mut hits = pattern.hits("the lazy dog");

        let err = hits.next_hit().unwrap_err();
        match err {
            HighlightError::Internal(msg) => assert!(msg.contains("marked start 0")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_no_match() {
        let (forward, two_pass) = both(".*zebra");
        assert!(spans(&forward, "no stripes here").is_empty());
        assert!(spans(&two_pass, "no stripes here").is_empty());
        assert!(spans(&forward, "").is_empty());
    }
}
