//! One snippet for the whole source.

use crate::segment::{Memo, Segment, Segmenter};

/// Every hit fits; the snippet is always the entire source.
#[derive(Debug, Clone, Copy)]
pub struct WholeSourceSegmenter {
    len: u32,
}

impl WholeSourceSegmenter {
    /// Segmenter for a source `len` bytes long.
    pub fn new(len: u32) -> Self {
        WholeSourceSegmenter { len }
    }
}

impl Segmenter for WholeSourceSegmenter {
    fn acceptable(&self, _max_start_offset: u32, _min_end_offset: u32) -> bool {
        true
    }

    fn memo(&self, _max_start_offset: u32, _min_end_offset: u32) -> Box<dyn Memo + '_> {
        Box::new(*self)
    }
}

impl Memo for WholeSourceSegmenter {
    fn pick_bounds(&self, _min_start_offset: u32, _max_end_offset: u32) -> Segment {
        Segment::ordered(0, self.len)
    }
}
