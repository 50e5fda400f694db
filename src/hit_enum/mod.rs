//! Pull-based cursors over hits.
//!
//! A [`HitEnum`] yields hits one at a time in a declared [`HitOrdering`]. Once
//! it reports exhaustion it stays exhausted. Enums compose: per-term enums are
//! merged by [`MergingHitEnum`], per-value enums of a multi-valued field are
//! chained by [`ConcatHitEnum`], and wrappers filter, boost or merge
//! overlapping hits on the way through.

pub mod heap;
pub mod merging;
pub mod token_stream;
pub mod wrappers;

use std::collections::VecDeque;

use crate::error::{HighlightError, Result};
use crate::hit::Hit;

pub use self::merging::MergingHitEnum;
pub use self::token_stream::TokenStreamHitEnum;
pub use self::wrappers::{OverlapMergingHitEnum, PositionBoostingHitEnum, WeightFilteredHitEnum};

/// An ordered, pull-based cursor over hits.
///
/// `next_hit` returns the next hit, or `None` once the enum is exhausted.
/// After the first `None` every further call must return `None` as well.
/// Errors are reserved for failures of the collaborators that feed hits in
/// (postings, field loading) and for broken internal invariants.
pub trait HitEnum {
    /// Advance to the next hit.
    fn next_hit(&mut self) -> Result<Option<Hit>>;
}

impl<T: HitEnum + ?Sized> HitEnum for Box<T> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        (**self).next_hit()
    }
}

impl<T: HitEnum + ?Sized> HitEnum for &mut T {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        (**self).next_hit()
    }
}

/// The order in which an enum produces its hits.
///
/// Position order and offset order coincide for plain token streams but not
/// for synonyms, overlapping patterns or multi-valued fields, so consumers
/// declare which one they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOrdering {
    /// Ordered by token position.
    Position,
    /// Ordered by start offset, then end offset.
    Offsets,
}

impl HitOrdering {
    /// Strict "comes before" predicate for this ordering.
    pub fn less_than(self, a: &Hit, b: &Hit) -> bool {
        match self {
            HitOrdering::Position => a.position < b.position,
            HitOrdering::Offsets => a.cmp_offsets(b).is_lt(),
        }
    }
}

/// An enum with no hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyHitEnum;

impl HitEnum for EmptyHitEnum {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        Ok(None)
    }
}

/// Replays a recorded list of hits.
///
/// Used for hits that were materialized up front, e.g. from postings or term
/// vectors, and to buffer hits that have to be read twice.
#[derive(Debug, Default, Clone)]
pub struct VecHitEnum {
    hits: VecDeque<Hit>,
}

impl VecHitEnum {
    /// Create an enum over the given hits, in the given order.
    pub fn new(hits: Vec<Hit>) -> Self {
        VecHitEnum { hits: hits.into() }
    }

    /// Create an enum over the given hits after sorting them by `ordering`.
    pub fn sorted(mut hits: Vec<Hit>, ordering: HitOrdering) -> Self {
        match ordering {
            HitOrdering::Position => hits.sort_by_key(|hit| hit.position),
            HitOrdering::Offsets => hits.sort_by(Hit::cmp_offsets),
        }
        Self::new(hits)
    }

    /// Drain another enum into memory.
    pub fn record<E: HitEnum + ?Sized>(source: &mut E) -> Result<Self> {
        let mut hits = VecDeque::new();
        while let Some(hit) = source.next_hit()? {
            hits.push_back(hit);
        }
        Ok(VecHitEnum { hits })
    }

    /// Number of hits left.
    pub fn remaining(&self) -> usize {
        self.hits.len()
    }
}

impl HitEnum for VecHitEnum {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        Ok(self.hits.pop_front())
    }
}

/// Wraps an enum so the first hit can be inspected before it is consumed.
pub struct PeekableHitEnum<E> {
    inner: E,
    peeked: Option<Option<Hit>>,
}

impl<E: HitEnum> PeekableHitEnum<E> {
    /// Wrap an enum.
    pub fn new(inner: E) -> Self {
        PeekableHitEnum {
            inner,
            peeked: None,
        }
    }

    /// Look at the next hit without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Hit>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.inner.next_hit()?);
        }
        Ok(self.peeked.as_ref().and_then(Option::as_ref))
    }
}

impl<E: HitEnum> HitEnum for PeekableHitEnum<E> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        match self.peeked.take() {
            Some(peeked) => Ok(peeked),
            None => self.inner.next_hit(),
        }
    }
}

/// Chains the enums of the values of a multi-valued field.
///
/// Each value is highlighted on its own with value-local offsets and
/// positions. The concatenation shifts offsets by the lengths of the
/// preceding values plus an offset gap between values, and positions past
/// the last position seen in the preceding values.
pub struct ConcatHitEnum<'a> {
    parts: VecDeque<(Box<dyn HitEnum + 'a>, u32)>,
    offset_gap: u32,
    offset_base: u32,
    position_base: u32,
    next_position_base: u32,
}

impl<'a> ConcatHitEnum<'a> {
    /// Create an empty concatenation with the given gap between values.
    pub fn new(offset_gap: u32) -> Self {
        ConcatHitEnum {
            parts: VecDeque::new(),
            offset_gap,
            offset_base: 0,
            position_base: 0,
            next_position_base: 0,
        }
    }

    /// Append the enum of the next value, whose text is `value_len` bytes long.
    pub fn push<E: HitEnum + 'a>(&mut self, hits: E, value_len: u32) {
        self.parts.push_back((Box::new(hits), value_len));
    }
}

impl HitEnum for ConcatHitEnum<'_> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        while let Some((current, value_len)) = self.parts.front_mut() {
            if let Some(mut hit) = current.next_hit()? {
                let base = self.offset_base;
                hit.start_offset = shifted(hit.start_offset, base)?;
                hit.end_offset = shifted(hit.end_offset, base)?;
                hit.position = hit.position.saturating_add(self.position_base);
                self.next_position_base = self
                    .next_position_base
                    .max(hit.position.saturating_add(1));
                return Ok(Some(hit));
            }
            let value_len = *value_len;
            self.parts.pop_front();
            if !self.parts.is_empty() {
                self.offset_base = shifted(value_len, self.offset_base)
                    .and_then(|end| shifted(self.offset_gap, end))?;
            }
            self.position_base = self.next_position_base;
        }
        Ok(None)
    }
}

fn shifted(offset: u32, base: u32) -> Result<u32> {
    offset.checked_add(base).ok_or_else(|| {
        HighlightError::invalid_argument(format!(
            "offset {offset} shifted by {base} does not fit in u32"
        ))
    })
}

/// Drain an enum into a vector. Mostly useful in tests.
pub fn collect_hits<E: HitEnum + ?Sized>(hits: &mut E) -> Result<Vec<Hit>> {
    let mut out = Vec::new();
    while let Some(hit) = hits.next_hit()? {
        out.push(hit);
    }
    Ok(out)
}
