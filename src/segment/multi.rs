//! Segmenting the values of a multi-valued field.

use crate::segment::{Memo, Segment, Segmenter};

struct Value<'a> {
    segmenter: Box<dyn Segmenter + 'a>,
    start: u32,
    len: u32,
}

impl Value<'_> {
    fn end(&self) -> u32 {
        self.start.saturating_add(self.len)
    }
}

/// Segments the concatenated values of a multi-valued field, delegating to a
/// segmenter per value.
///
/// Offsets are those of the concatenation built by
/// [`ConcatHitEnum`](crate::hit_enum::ConcatHitEnum) with the same offset
/// gap. A snippet never crosses from one value into the next.
pub struct MultiSegmenter<'a> {
    values: Vec<Value<'a>>,
    offset_gap: u32,
    next_start: u32,
}

impl<'a> MultiSegmenter<'a> {
    /// Create a segmenter with no values yet.
    pub fn new(offset_gap: u32) -> Self {
        MultiSegmenter {
            values: Vec::new(),
            offset_gap,
            next_start: 0,
        }
    }

    /// Append the segmenter of the next value, whose text is `value_len`
    /// bytes long. Offsets saturate at `u32::MAX`.
    pub fn push<S: Segmenter + 'a>(&mut self, segmenter: S, value_len: u32) {
        let start = self.next_start;
        self.values.push(Value {
            segmenter: Box::new(segmenter),
            start,
            len: value_len,
        });
        self.next_start = start
            .saturating_add(value_len)
            .saturating_add(self.offset_gap);
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was pushed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value whose text contains `offset`.
    fn value_at(&self, offset: u32) -> Option<&Value<'a>> {
        let index = self
            .values
            .partition_point(|value| value.start <= offset)
            .checked_sub(1)?;
        let value = &self.values[index];
        (offset < value.end() || (offset == value.start && value.len == 0)).then_some(value)
    }
}

impl Segmenter for MultiSegmenter<'_> {
    fn acceptable(&self, max_start_offset: u32, min_end_offset: u32) -> bool {
        let Some(value) = self.value_at(max_start_offset) else {
            return false;
        };
        min_end_offset <= value.end()
            && value
                .segmenter
                .acceptable(max_start_offset - value.start, min_end_offset - value.start)
    }

    fn memo(&self, max_start_offset: u32, min_end_offset: u32) -> Box<dyn Memo + '_> {
        match self.value_at(max_start_offset) {
            Some(value) if min_end_offset <= value.end() => Box::new(ValueMemo {
                inner: value
                    .segmenter
                    .memo(max_start_offset - value.start, min_end_offset - value.start),
                start: value.start,
                len: value.len,
            }),
            _ => Box::new(FixedMemo(Segment::ordered(
                max_start_offset,
                min_end_offset.max(max_start_offset),
            ))),
        }
    }
}

struct ValueMemo<'a> {
    inner: Box<dyn Memo + 'a>,
    start: u32,
    len: u32,
}

impl Memo for ValueMemo<'_> {
    fn pick_bounds(&self, min_start_offset: u32, max_end_offset: u32) -> Segment {
        let min_start = min_start_offset.saturating_sub(self.start).min(self.len);
        let max_end = max_end_offset.saturating_sub(self.start).min(self.len);
        let local = self.inner.pick_bounds(min_start, max_end);
        let end = local.end_offset().min(self.len);
        Segment::ordered(
            self.start.saturating_add(local.start_offset().min(end)),
            self.start.saturating_add(end),
        )
    }
}

/// Bounds of a span no value could take.
struct FixedMemo(Segment);

impl Memo for FixedMemo {
    fn pick_bounds(&self, _min_start_offset: u32, _max_end_offset: u32) -> Segment {
        self.0
    }
}
