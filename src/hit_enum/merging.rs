//! K-way merge of individually ordered hit enums.

use log::trace;

use crate::error::Result;
use crate::hit::Hit;
use crate::hit_enum::heap::ArrayHeap;
use crate::hit_enum::{HitEnum, HitOrdering};

/// One source in the merge heap: the source enum and its current hit.
struct Entry<E> {
    current: Hit,
    source: E,
}

/// Merges enums that are each ordered by `less_than` into one enum ordered by
/// the same predicate.
///
/// Sources are advanced once at construction; exhausted sources are dropped
/// and the rest are heapified. Each step advances the previous top in place
/// and re-sifts it, or pops it once it runs dry. Ties are broken by heap
/// structure: deterministic, but callers must not rely on their order.
pub struct MergingHitEnum<E, F> {
    heap: ArrayHeap<Entry<E>>,
    less_than: F,
    started: bool,
}

impl<E, F> MergingHitEnum<E, F>
where
    E: HitEnum,
    F: Fn(&Hit, &Hit) -> bool,
{
    /// Merge `sources`, each of which must already be ordered by `less_than`.
    pub fn new(sources: Vec<E>, less_than: F) -> Result<Self> {
        let source_count = sources.len();
        let mut entries = Vec::with_capacity(source_count);
        for mut source in sources {
            if let Some(current) = source.next_hit()? {
                entries.push(Entry { current, source });
            }
        }
        trace!(
            "merging {} of {} hit sources",
            entries.len(),
            source_count
        );
        let heap = ArrayHeap::heapify(entries, &|a: &Entry<E>, b: &Entry<E>| {
            less_than(&a.current, &b.current)
        });
        Ok(MergingHitEnum {
            heap,
            less_than,
            started: false,
        })
    }
}

impl<E: HitEnum> MergingHitEnum<E, fn(&Hit, &Hit) -> bool> {
    /// Merge `sources` that are ordered by one of the standard orderings.
    pub fn with_ordering(sources: Vec<E>, ordering: HitOrdering) -> Result<Self> {
        let less_than: fn(&Hit, &Hit) -> bool = match ordering {
            HitOrdering::Position => |a, b| HitOrdering::Position.less_than(a, b),
            HitOrdering::Offsets => |a, b| HitOrdering::Offsets.less_than(a, b),
        };
        Self::new(sources, less_than)
    }
}

impl<E, F> HitEnum for MergingHitEnum<E, F>
where
    E: HitEnum,
    F: Fn(&Hit, &Hit) -> bool,
{
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        let less_than = &self.less_than;
        let entry_less = |a: &Entry<E>, b: &Entry<E>| less_than(&a.current, &b.current);

        if !self.started {
            self.started = true;
        } else if let Some(top) = self.heap.top_mut() {
            match top.source.next_hit()? {
                Some(next) => {
                    top.current = next;
                    self.heap.update_top(&entry_less);
                }
                None => {
                    self.heap.pop(&entry_less);
                }
            }
        }
        Ok(self.heap.top().map(|entry| entry.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_enum::{collect_hits, EmptyHitEnum, VecHitEnum};

    fn hit(position: u32, start: u32, end: u32) -> Hit {
        Hit::new(position, start, end, 1.0, 0)
    }

    #[test]
    fn test_merge_by_position() {
        let sources = vec![
            VecHitEnum::new(vec![hit(0, 0, 3), hit(4, 20, 23)]),
            VecHitEnum::new(vec![]),
            VecHitEnum::new(vec![hit(1, 4, 9), hit(2, 10, 14), hit(7, 40, 44)]),
            VecHitEnum::new(vec![hit(3, 15, 19)]),
        ];
        let mut merged = MergingHitEnum::with_ordering(sources, HitOrdering::Position).unwrap();
        let positions: Vec<u32> = collect_hits(&mut merged)
            .unwrap()
            .iter()
            .map(|h| h.position)
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 7]);
        assert!(merged.next_hit().unwrap().is_none());
        assert!(merged.next_hit().unwrap().is_none());
    }

    #[test]
    fn test_merge_with_custom_predicate() {
        // Descending by end offset.
        let sources = vec![
            VecHitEnum::new(vec![hit(0, 8, 9), hit(0, 1, 2)]),
            VecHitEnum::new(vec![hit(0, 5, 6)]),
        ];
        let mut merged =
            MergingHitEnum::new(sources, |a: &Hit, b: &Hit| a.end_offset > b.end_offset).unwrap();
        let ends: Vec<u32> = collect_hits(&mut merged)
            .unwrap()
            .iter()
            .map(|h| h.end_offset)
            .collect();
        assert_eq!(ends, vec![9, 6, 2]);
    }

    #[test]
    fn test_merge_nothing() {
        let mut merged =
            MergingHitEnum::with_ordering(vec![EmptyHitEnum, EmptyHitEnum], HitOrdering::Offsets)
                .unwrap();
        assert!(merged.next_hit().unwrap().is_none());

        let mut merged =
            MergingHitEnum::with_ordering(Vec::<EmptyHitEnum>::new(), HitOrdering::Offsets)
                .unwrap();
        assert!(merged.next_hit().unwrap().is_none());
    }
}
