//! Windows aligned to externally defined boundaries, such as sentences.

use unicode_segmentation::UnicodeSegmentation;

use crate::segment::{Memo, Segment, Segmenter};

/// Snippets made of whole runs between boundary offsets.
///
/// The boundaries split the text into units (sentences by default). A hit
/// span is acceptable when it covers at most `max_units` units, and the
/// chosen bounds are the boundaries around the units it covers. When a clamp
/// cuts into a unit the closest boundary inside the clamps is used, or the
/// clamp itself when there is none.
#[derive(Debug, Clone)]
pub struct BoundarySegmenter {
    boundaries: Vec<u32>,
    max_units: usize,
}

impl BoundarySegmenter {
    /// Segmenter over a text `len` bytes long with the given boundary
    /// offsets. Offsets past the end are dropped; the start and the end of
    /// the text are always boundaries.
    pub fn new(mut boundaries: Vec<u32>, len: u32, max_units: usize) -> Self {
        boundaries.retain(|&boundary| boundary <= len);
        boundaries.push(0);
        boundaries.push(len);
        boundaries.sort_unstable();
        boundaries.dedup();
        BoundarySegmenter {
            boundaries,
            max_units: max_units.max(1),
        }
    }

    /// Segmenter over the Unicode sentences of `text`.
    pub fn sentences(text: &str, max_sentences: usize) -> Self {
        let boundaries = text
            .split_sentence_bound_indices()
            .map(|(offset, _)| offset as u32)
            .collect();
        Self::new(boundaries, text.len() as u32, max_sentences)
    }

    fn len(&self) -> u32 {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Index of the unit containing the byte at `offset`.
    fn unit_starting(&self, offset: u32) -> usize {
        self.boundaries
            .partition_point(|&boundary| boundary <= offset)
            .saturating_sub(1)
    }

    /// Index of the unit containing the byte before `offset`.
    fn unit_ending(&self, offset: u32) -> usize {
        self.boundaries
            .partition_point(|&boundary| boundary < offset)
            .saturating_sub(1)
    }

    fn units_spanned(&self, max_start_offset: u32, min_end_offset: u32) -> usize {
        let first = self.unit_starting(max_start_offset);
        if min_end_offset <= max_start_offset {
            return 1;
        }
        let last = self.unit_ending(min_end_offset);
        last.saturating_sub(first) + 1
    }
}

impl Segmenter for BoundarySegmenter {
    fn acceptable(&self, max_start_offset: u32, min_end_offset: u32) -> bool {
        min_end_offset >= max_start_offset
            && min_end_offset <= self.len()
            && self.units_spanned(max_start_offset, min_end_offset) <= self.max_units
    }

    fn memo(&self, max_start_offset: u32, min_end_offset: u32) -> Box<dyn Memo + '_> {
        Box::new(BoundaryMemo {
            segmenter: self,
            max_start_offset,
            min_end_offset,
        })
    }
}

struct BoundaryMemo<'a> {
    segmenter: &'a BoundarySegmenter,
    max_start_offset: u32,
    min_end_offset: u32,
}

impl Memo for BoundaryMemo<'_> {
    fn pick_bounds(&self, min_start_offset: u32, max_end_offset: u32) -> Segment {
        let boundaries = &self.segmenter.boundaries;
        let min_start_offset = min_start_offset.min(self.max_start_offset);
        let max_end_offset = max_end_offset.max(self.min_end_offset);

        let first = self.segmenter.unit_starting(self.max_start_offset);
        let start = boundaries[first..]
            .iter()
            .copied()
            .find(|&boundary| boundary >= min_start_offset)
            .filter(|&boundary| boundary <= self.max_start_offset)
            .unwrap_or(min_start_offset);

        let last = if self.min_end_offset > self.max_start_offset {
            self.segmenter.unit_ending(self.min_end_offset)
        } else {
            first
        };
        let end = boundaries[..=(last + 1).min(boundaries.len() - 1)]
            .iter()
            .rev()
            .copied()
            .find(|&boundary| boundary <= max_end_offset)
            .filter(|&boundary| boundary >= self.min_end_offset)
            .unwrap_or(max_end_offset);

        Segment::ordered(start, end)
    }
}
