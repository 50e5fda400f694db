//! Choosing snippets from a stream of hits.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hit::Hit;
use crate::hit_enum::HitEnum;
use crate::segment::{Memo, Segment, Segmenter};
use crate::snippet::Snippet;
use crate::weight::SnippetWeigher;

/// Picks up to `max` non-overlapping snippets.
pub trait SnippetChooser {
    /// Consume `hits`, ordered by offsets, and return at most `max`
    /// snippets whose segments never overlap.
    fn choose(
        &self,
        segmenter: &dyn Segmenter,
        hits: &mut dyn HitEnum,
        max: usize,
    ) -> Result<Vec<Snippet>>;
}

/// The order snippets are returned in by [`ScoreBasedSnippetChooser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetOrder {
    /// Highest score first.
    #[default]
    Score,
    /// Order of appearance in the source.
    Source,
}

/// A closed group of hits waiting for its final bounds.
struct Candidate<'s> {
    hits: Vec<Hit>,
    max_start: u32,
    min_end: u32,
    memo: Box<dyn Memo + 's>,
    score: f32,
}

impl Candidate<'_> {
    fn intersects(&self, other: &Candidate<'_>) -> bool {
        self.max_start < other.min_end && other.max_start < self.min_end
    }
}

/// Groups consecutive hits as long as the segmenter accepts their span.
struct Grouper<'s, 'h> {
    segmenter: &'s dyn Segmenter,
    hits: &'h mut dyn HitEnum,
    pending: Option<Hit>,
    dropped: usize,
}

impl<'s, 'h> Grouper<'s, 'h> {
    fn new(segmenter: &'s dyn Segmenter, hits: &'h mut dyn HitEnum) -> Self {
        Grouper {
            segmenter,
            hits,
            pending: None,
            dropped: 0,
        }
    }

    fn next_hit(&mut self) -> Result<Option<Hit>> {
        match self.pending.take() {
            Some(hit) => Ok(Some(hit)),
            None => self.hits.next_hit(),
        }
    }

    /// Start offset of the hit that closed the last group, if any.
    fn upcoming_start(&self) -> Option<u32> {
        self.pending.map(|hit| hit.start_offset)
    }

    /// The next group, scored with `weigher`. Hits that do not fit in a
    /// snippet even on their own are dropped.
    fn next_group(&mut self, weigher: &dyn SnippetWeigher) -> Result<Option<Candidate<'s>>> {
        let first = loop {
            let Some(hit) = self.next_hit()? else {
                return Ok(None);
            };
            if self.segmenter.acceptable(hit.start_offset, hit.end_offset) {
                break hit;
            }
            trace!(
                "dropping hit {}..{} that fits no snippet",
                hit.start_offset, hit.end_offset
            );
            self.dropped += 1;
        };

        let mut max_start = first.start_offset;
        let mut min_end = first.end_offset;
        let mut hits = vec![first];
        while let Some(hit) = self.hits.next_hit()? {
            let start = max_start.min(hit.start_offset);
            let end = min_end.max(hit.end_offset);
            if !self.segmenter.acceptable(start, end) {
                self.pending = Some(hit);
                break;
            }
            max_start = start;
            min_end = end;
            hits.push(hit);
        }

        let score = weigher.weigh(&hits);
        Ok(Some(Candidate {
            memo: self.segmenter.memo(max_start, min_end),
            hits,
            max_start,
            min_end,
            score,
        }))
    }
}

/// Turn candidates sorted by offsets into snippets. Each snippet is kept
/// clear of its neighbours: it may not start before the previous snippet
/// ends, nor end after the next candidate's hits start.
fn bound_snippets(candidates: Vec<Candidate<'_>>, ceiling: u32) -> Vec<Snippet> {
    let next_starts: Vec<u32> = candidates
        .iter()
        .skip(1)
        .map(|candidate| candidate.max_start)
        .chain(std::iter::once(ceiling))
        .collect();

    let mut previous_end = 0;
    let mut snippets = Vec::with_capacity(candidates.len());
    for (candidate, next_start) in candidates.into_iter().zip(next_starts) {
        let min_start = previous_end.min(candidate.max_start);
        let max_end = next_start.max(candidate.min_end);
        let picked = candidate.memo.pick_bounds(min_start, max_end);
        let start = picked.start_offset().clamp(min_start, candidate.max_start);
        let end = picked.end_offset().clamp(candidate.min_end, max_end);
        previous_end = end;
        snippets.push(Snippet::from_parts(
            Segment::ordered(start, end),
            candidate.hits,
            candidate.score,
        ));
    }
    snippets
}

/// Greedy chooser returning snippets in source order.
///
/// Groups are closed as soon as the next hit no longer fits and are never
/// reconsidered. Reading stops once `max` snippets are found, so this is the
/// cheapest chooser but not the one finding the best snippets.
#[derive(Debug, Clone)]
pub struct SourceOrderSnippetChooser<W> {
    weigher: W,
}

impl<W: SnippetWeigher> SourceOrderSnippetChooser<W> {
    /// Create a chooser that scores its snippets with `weigher`.
    pub fn new(weigher: W) -> Self {
        SourceOrderSnippetChooser { weigher }
    }
}

impl<W: SnippetWeigher> SnippetChooser for SourceOrderSnippetChooser<W> {
    fn choose(
        &self,
        segmenter: &dyn Segmenter,
        hits: &mut dyn HitEnum,
        max: usize,
    ) -> Result<Vec<Snippet>> {
        if max == 0 {
            return Ok(Vec::new());
        }
        let mut grouper = Grouper::new(segmenter, hits);
        let mut chosen: Vec<Candidate<'_>> = Vec::new();
        while chosen.len() < max {
            let Some(candidate) = grouper.next_group(&self.weigher)? else {
                break;
            };
            if chosen.last().is_some_and(|last| last.intersects(&candidate)) {
                trace!(
                    "skipping group {}..{} overlapping the previous one",
                    candidate.max_start, candidate.min_end
                );
                continue;
            }
            chosen.push(candidate);
        }
        let ceiling = grouper.upcoming_start().unwrap_or(u32::MAX);
        debug!(
            "chose {} snippets in source order, dropped {} hits",
            chosen.len(),
            grouper.dropped
        );
        Ok(bound_snippets(chosen, ceiling))
    }
}

/// Chooser returning the best scoring snippets.
///
/// Every group of the hit stream is scored. The best ones are kept, highest
/// score first, skipping any group whose hits overlap a group already kept.
/// The survivors are returned by score or in source order.
#[derive(Debug, Clone)]
pub struct ScoreBasedSnippetChooser<W> {
    weigher: W,
    order: SnippetOrder,
}

impl<W: SnippetWeigher> ScoreBasedSnippetChooser<W> {
    /// Create a chooser that scores snippets with `weigher` and returns them
    /// in `order`.
    pub fn new(weigher: W, order: SnippetOrder) -> Self {
        ScoreBasedSnippetChooser { weigher, order }
    }
}

impl<W: SnippetWeigher> SnippetChooser for ScoreBasedSnippetChooser<W> {
    fn choose(
        &self,
        segmenter: &dyn Segmenter,
        hits: &mut dyn HitEnum,
        max: usize,
    ) -> Result<Vec<Snippet>> {
        if max == 0 {
            return Ok(Vec::new());
        }
        let mut grouper = Grouper::new(segmenter, hits);
        let mut candidates = Vec::new();
        while let Some(candidate) = grouper.next_group(&self.weigher)? {
            candidates.push(candidate);
        }
        let total = candidates.len();

        // stable, so equal scores keep source order
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut chosen: Vec<Candidate<'_>> = Vec::with_capacity(max.min(total));
        let mut discarded = 0usize;
        for candidate in candidates {
            if chosen.len() == max {
                break;
            }
            if chosen.iter().any(|kept| kept.intersects(&candidate)) {
                discarded += 1;
                continue;
            }
            chosen.push(candidate);
        }
        debug!(
            "chose {} of {total} candidate snippets, {discarded} lost to overlap, dropped {} hits",
            chosen.len(),
            grouper.dropped
        );

        chosen.sort_by_key(|candidate| candidate.max_start);
        let mut snippets = bound_snippets(chosen, u32::MAX);
        if self.order == SnippetOrder::Score {
            snippets.sort_by(|a, b| b.score().total_cmp(&a.score()));
        }
        Ok(snippets)
    }
}
