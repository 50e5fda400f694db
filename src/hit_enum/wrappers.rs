//! Hit enums that wrap another enum and adjust its hits on the way through.

use crate::error::Result;
use crate::hit::{combine_sources, Hit};
use crate::hit_enum::HitEnum;

/// Drops hits whose weight is below a cutoff.
pub struct WeightFilteredHitEnum<E> {
    inner: E,
    cutoff: f32,
}

impl<E: HitEnum> WeightFilteredHitEnum<E> {
    /// Keep only hits with `weight() >= cutoff`.
    pub fn new(inner: E, cutoff: f32) -> Self {
        WeightFilteredHitEnum { inner, cutoff }
    }
}

impl<E: HitEnum> HitEnum for WeightFilteredHitEnum<E> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        while let Some(hit) = self.inner.next_hit()? {
            if hit.weight() >= self.cutoff {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }
}

/// Boosts hits near the start of the text.
///
/// Hits with a position before `before_position` get their query weight
/// multiplied by `factor`. Leading text is often a summary, so matches there
/// make better snippets.
pub struct PositionBoostingHitEnum<E> {
    inner: E,
    before_position: u32,
    factor: f32,
}

impl<E: HitEnum> PositionBoostingHitEnum<E> {
    /// Multiply the weight of hits positioned before `before_position` by `factor`.
    pub fn new(inner: E, before_position: u32, factor: f32) -> Self {
        PositionBoostingHitEnum {
            inner,
            before_position,
            factor,
        }
    }
}

impl<E: HitEnum> HitEnum for PositionBoostingHitEnum<E> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        Ok(self.inner.next_hit()?.map(|mut hit| {
            if hit.position < self.before_position {
                hit.query_weight *= self.factor;
            }
            hit
        }))
    }
}

/// Merges hits whose offsets overlap into a single hit.
///
/// The wrapped enum must be ordered by offsets. A merged hit spans both
/// inputs, keeps the earliest position and the larger weight, and combines
/// the sources with [`combine_sources`]. The output never contains two
/// overlapping hits.
pub struct OverlapMergingHitEnum<E> {
    inner: E,
    pending: Option<Hit>,
}

impl<E: HitEnum> OverlapMergingHitEnum<E> {
    /// Wrap an offset-ordered enum.
    pub fn new(inner: E) -> Self {
        OverlapMergingHitEnum {
            inner,
            pending: None,
        }
    }
}

fn merge_overlapping(a: Hit, b: Hit) -> Hit {
    let (query_weight, corpus_weight) = if b.weight() > a.weight() {
        (b.query_weight, b.corpus_weight)
    } else {
        (a.query_weight, a.corpus_weight)
    };
    Hit::with_weights(
        a.position.min(b.position),
        a.start_offset.min(b.start_offset),
        a.end_offset.max(b.end_offset),
        query_weight,
        corpus_weight,
        combine_sources(a.source, b.source),
    )
}

impl<E: HitEnum> HitEnum for OverlapMergingHitEnum<E> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        let mut current = match self.pending.take() {
            Some(hit) => hit,
            None => match self.inner.next_hit()? {
                Some(hit) => hit,
                None => return Ok(None),
            },
        };
        while let Some(next) = self.inner.next_hit()? {
            if next.start_offset < current.end_offset {
                current = merge_overlapping(current, next);
            } else {
                self.pending = Some(next);
                break;
            }
        }
        Ok(Some(current))
    }
}
