//! Snippets and snippet choosers.
//!
//! A [`Snippet`] is a chosen [`Segment`] of the source together with the hits
//! it highlights. Choosers group an ordered stream of hits into candidate
//! snippets with the help of a [`Segmenter`](crate::segment::Segmenter) and
//! pick the ones to return.

pub mod chooser;

use serde::Serialize;

use crate::error::{HighlightError, Result};
use crate::hit::Hit;
use crate::segment::Segment;

pub use self::chooser::{
    ScoreBasedSnippetChooser, SnippetChooser, SnippetOrder, SourceOrderSnippetChooser,
};

/// A chosen window of the source with the hits inside it.
///
/// The hits are sorted by offsets and all lie inside the segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    segment: Segment,
    hits: Vec<Hit>,
    score: f32,
}

impl Snippet {
    /// Create a snippet covering `start_offset..end_offset`.
    ///
    /// Fails if the range is inverted or a hit sticks out of it.
    pub fn new(start_offset: u32, end_offset: u32, hits: Vec<Hit>, score: f32) -> Result<Self> {
        let segment = Segment::new(start_offset, end_offset)?;
        if let Some(hit) = hits.iter().find(|hit| !segment.contains(hit)) {
            return Err(HighlightError::invalid_argument(format!(
                "hit {}..{} lies outside snippet {start_offset}..{end_offset}",
                hit.start_offset, hit.end_offset
            )));
        }
        Ok(Self::from_parts(segment, hits, score))
    }

    /// Create a snippet from a segment known to contain the hits.
    pub(crate) fn from_parts(segment: Segment, mut hits: Vec<Hit>, score: f32) -> Self {
        debug_assert!(hits.iter().all(|hit| segment.contains(hit)));
        hits.sort_by(Hit::cmp_offsets);
        Snippet {
            segment,
            hits,
            score,
        }
    }

    /// The window of the source covered by the snippet.
    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Offset of the first byte of the snippet.
    pub fn start_offset(&self) -> u32 {
        self.segment.start_offset()
    }

    /// Offset just past the last byte of the snippet.
    pub fn end_offset(&self) -> u32 {
        self.segment.end_offset()
    }

    /// Hits inside the snippet, sorted by offsets.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Score given by the snippet weigher.
    pub fn score(&self) -> f32 {
        self.score
    }
}
