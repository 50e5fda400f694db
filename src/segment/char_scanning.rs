//! Fixed-size windows snapped to whitespace.

use crate::segment::{Memo, Segment, Segmenter};

/// Accepts hit spans of at most `max_chars` characters and grows the chosen
/// span to roughly `max_chars`, centred on the hits.
///
/// Each bound first moves outward by half of the unused budget, then keeps
/// moving outward, at most `max_scan` characters, until it sits next to
/// whitespace, so snippets start and end on word boundaries. If no
/// whitespace turns up within `max_scan` the unsnapped bound is used.
#[derive(Debug, Clone, Copy)]
pub struct CharScanningSegmenter<'a> {
    text: &'a str,
    max_chars: usize,
    max_scan: usize,
}

impl<'a> CharScanningSegmenter<'a> {
    /// Segmenter over `text` with the given window size and scan distance,
    /// both in characters.
    pub fn new(text: &'a str, max_chars: usize, max_scan: usize) -> Self {
        CharScanningSegmenter {
            text,
            max_chars,
            max_scan,
        }
    }

    /// Number of characters in `start..end`, or `None` if the range is not a
    /// valid slice of the text.
    fn chars_between(&self, start: u32, end: u32) -> Option<usize> {
        self.text
            .get(start as usize..end as usize)
            .map(|slice| slice.chars().count())
    }

    /// A fragment from the start of the text of about `max_chars` characters,
    /// ending at whitespace when there is some within `max_scan` characters of
    /// the cut. Used when a field has no hits but should still show something.
    pub fn leading_fragment(&self) -> Segment {
        let end = self
            .text
            .char_indices()
            .nth(self.max_chars)
            .map_or(self.text.len(), |(i, _)| i);
        if end == self.text.len() {
            return Segment::ordered(0, end as u32);
        }
        let snapped = self.text[..end]
            .char_indices()
            .rev()
            .take(self.max_scan)
            .find(|(_, c)| c.is_whitespace())
            .map_or(end, |(i, _)| i);
        Segment::ordered(0, snapped as u32)
    }

    /// Move `expand` characters back from `from`, not past `floor`, then snap
    /// back to just after whitespace.
    fn find_start(&self, from: usize, floor: usize, expand: usize) -> usize {
        let floor = floor.min(from);
        let start = self.text[floor..from]
            .char_indices()
            .rev()
            .take(expand)
            .last()
            .map_or(from, |(i, _)| floor + i);

        let mut candidate = start;
        for _ in 0..=self.max_scan {
            if candidate == floor {
                return candidate;
            }
            match self.text[floor..candidate].chars().next_back() {
                Some(previous) if previous.is_whitespace() => return candidate,
                Some(previous) => candidate -= previous.len_utf8(),
                None => return candidate,
            }
        }
        start
    }

    /// Move `expand` characters forward from `from`, not past `ceiling`, then
    /// snap forward to the next whitespace.
    fn find_end(&self, from: usize, ceiling: usize, expand: usize) -> usize {
        let ceiling = ceiling.clamp(from, self.text.len().max(from));
        let after = &self.text[from..ceiling];
        let end = from
            + after
                .char_indices()
                .nth(expand)
                .map_or(after.len(), |(i, _)| i);

        let mut candidate = end;
        for _ in 0..=self.max_scan {
            if candidate == ceiling {
                return candidate;
            }
            match self.text[candidate..ceiling].chars().next() {
                Some(next) if next.is_whitespace() => return candidate,
                Some(next) => candidate += next.len_utf8(),
                None => return candidate,
            }
        }
        end
    }
}

impl Segmenter for CharScanningSegmenter<'_> {
    fn acceptable(&self, max_start_offset: u32, min_end_offset: u32) -> bool {
        if min_end_offset < max_start_offset {
            return false;
        }
        let bytes = (min_end_offset - max_start_offset) as usize;
        if bytes <= self.max_chars {
            return self.text.is_char_boundary(max_start_offset as usize)
                && self.text.is_char_boundary(min_end_offset as usize);
        }
        // a char is at most four bytes
        if bytes > self.max_chars.saturating_mul(4) {
            return false;
        }
        self.chars_between(max_start_offset, min_end_offset)
            .is_some_and(|chars| chars <= self.max_chars)
    }

    fn memo(&self, max_start_offset: u32, min_end_offset: u32) -> Box<dyn Memo + '_> {
        Box::new(CharScanningMemo {
            segmenter: *self,
            max_start_offset,
            min_end_offset,
        })
    }
}

struct CharScanningMemo<'a> {
    segmenter: CharScanningSegmenter<'a>,
    max_start_offset: u32,
    min_end_offset: u32,
}

impl Memo for CharScanningMemo<'_> {
    fn pick_bounds(&self, min_start_offset: u32, max_end_offset: u32) -> Segment {
        let segmenter = &self.segmenter;
        let span = segmenter
            .chars_between(self.max_start_offset, self.min_end_offset)
            .unwrap_or(segmenter.max_chars);
        let expand = segmenter.max_chars.saturating_sub(span) / 2;
        let start = segmenter.find_start(
            self.max_start_offset as usize,
            min_start_offset as usize,
            expand,
        );
        let end = segmenter.find_end(
            self.min_end_offset as usize,
            max_end_offset as usize,
            expand,
        );
        Segment::ordered(start as u32, end as u32)
    }
}
