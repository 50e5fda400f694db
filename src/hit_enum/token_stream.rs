//! Hits from tokenizing the text on the fly.
//!
//! The text is split on Unicode word boundaries (UAX #29); every word is
//! lowercased and weighed, and words with a positive weight become hits. This
//! is the hit source to use when neither postings nor term vectors are
//! available for a field.

use unicode_segmentation::{UWordBoundIndices, UnicodeSegmentation};

use crate::error::Result;
use crate::hit::Hit;
use crate::hit_enum::HitEnum;
use crate::weight::{TermSourceFinder, TermWeigher};

/// Tokenizes text and yields a hit for every word with a positive weight.
///
/// Hits come out in position order, which for a single token stream is also
/// offset order.
pub struct TokenStreamHitEnum<'a> {
    words: UWordBoundIndices<'a>,
    weigher: &'a dyn TermWeigher,
    source_finder: &'a dyn TermSourceFinder,
    position: u32,
    term: String,
}

impl<'a> TokenStreamHitEnum<'a> {
    /// Tokenize `text`, weighing words with `weigher` and attributing them with
    /// `source_finder`.
    pub fn new(
        text: &'a str,
        weigher: &'a dyn TermWeigher,
        source_finder: &'a dyn TermSourceFinder,
    ) -> Self {
        TokenStreamHitEnum {
            words: text.split_word_bound_indices(),
            weigher,
            source_finder,
            position: 0,
            term: String::new(),
        }
    }
}

impl HitEnum for TokenStreamHitEnum<'_> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        for (offset, word) in self.words.by_ref() {
            if !word.chars().any(char::is_alphanumeric) {
                continue;
            }
            let position = self.position;
            self.position += 1;

            self.term.clear();
            self.term.extend(word.chars().flat_map(char::to_lowercase));
            let weight = self.weigher.weigh(&self.term);
            if weight > 0.0 {
                let start = offset as u32;
                let end = (offset + word.len()) as u32;
                let source = self.source_finder.source(&self.term);
                return Ok(Some(Hit::new(position, start, end, weight, source)));
            }
        }
        Ok(None)
    }
}
