//! Snippet windows.
//!
//! A [`Segmenter`] decides whether a run of hits fits in one snippet and,
//! once the snippet is chosen, where exactly its bounds go. Bounds are picked
//! late, through a [`Memo`], because the clamps imposed by neighbouring
//! snippets are only known after every snippet has been chosen.

pub mod boundary;
pub mod char_scanning;
pub mod multi;
pub mod whole;

use serde::{Deserialize, Serialize};

use crate::error::{HighlightError, Result};
use crate::hit::Hit;

pub use self::boundary::BoundarySegmenter;
pub use self::char_scanning::CharScanningSegmenter;
pub use self::multi::MultiSegmenter;
pub use self::whole::WholeSourceSegmenter;

/// A half-open byte range `[start_offset, end_offset)` of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    start_offset: u32,
    end_offset: u32,
}

impl Segment {
    /// Create a segment, rejecting one that ends before it starts.
    pub fn new(start_offset: u32, end_offset: u32) -> Result<Self> {
        if end_offset < start_offset {
            return Err(HighlightError::invalid_argument(format!(
                "segment ends at {end_offset} before it starts at {start_offset}"
            )));
        }
        Ok(Segment {
            start_offset,
            end_offset,
        })
    }

    /// Create a segment from bounds the caller has already ordered.
    pub(crate) fn ordered(start_offset: u32, end_offset: u32) -> Self {
        debug_assert!(start_offset <= end_offset);
        Segment {
            start_offset,
            end_offset: end_offset.max(start_offset),
        }
    }

    /// First byte of the segment.
    pub fn start_offset(&self) -> u32 {
        self.start_offset
    }

    /// One past the last byte of the segment.
    pub fn end_offset(&self) -> u32 {
        self.end_offset
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end_offset - self.start_offset
    }

    /// Whether the segment is empty.
    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Whether `hit` lies entirely inside the segment.
    pub fn contains(&self, hit: &Hit) -> bool {
        self.start_offset <= hit.start_offset && hit.end_offset <= self.end_offset
    }

    /// Whether the two segments share at least one byte.
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.start_offset < other.end_offset && other.start_offset < self.end_offset
    }
}

/// Decides snippet windows.
pub trait Segmenter {
    /// Whether hits spanning `max_start_offset..min_end_offset` fit in one
    /// snippet.
    fn acceptable(&self, max_start_offset: u32, min_end_offset: u32) -> bool;

    /// Remember a hit span so its final bounds can be picked later.
    fn memo(&self, max_start_offset: u32, min_end_offset: u32) -> Box<dyn Memo + '_>;
}

/// A remembered hit span.
pub trait Memo {
    /// Pick the final bounds of the snippet. The result contains the
    /// remembered hit span and, unless the segmenter has fixed bounds, stays
    /// within `min_start_offset..max_end_offset`.
    fn pick_bounds(&self, min_start_offset: u32, max_end_offset: u32) -> Segment;
}
