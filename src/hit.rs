//! The [`Hit`] value type.
//!
//! A hit is one occurrence of a matched term in the source text: its position
//! in the token stream, its byte offsets, its weight and the id of the query
//! source that produced it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single matched-term occurrence.
///
/// Offsets are byte offsets into the UTF-8 source text and always satisfy
/// `start_offset <= end_offset`. The weight of a hit is the product of its
/// query weight (how much the query cares about the term) and its corpus
/// weight (how rare the term is).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Position in the token stream.
    pub position: u32,
    /// Byte offset of the first byte of the hit.
    pub start_offset: u32,
    /// Byte offset one past the last byte of the hit.
    pub end_offset: u32,
    /// Weight contributed by the query.
    pub query_weight: f32,
    /// Weight contributed by the corpus.
    pub corpus_weight: f32,
    /// Opaque grouping key of the query clause that produced the hit. Only
    /// ever compared for equality; collisions are tolerated.
    pub source: i32,
}

impl Hit {
    /// Create a hit with the given weight as its query weight and a corpus
    /// weight of one.
    pub fn new(position: u32, start_offset: u32, end_offset: u32, weight: f32, source: i32) -> Self {
        Self::with_weights(position, start_offset, end_offset, weight, 1.0, source)
    }

    /// Create a hit with separate query and corpus weights.
    pub fn with_weights(
        position: u32,
        start_offset: u32,
        end_offset: u32,
        query_weight: f32,
        corpus_weight: f32,
        source: i32,
    ) -> Self {
        debug_assert!(
            start_offset <= end_offset,
            "hit ends ({end_offset}) before it starts ({start_offset})"
        );
        Hit {
            position,
            start_offset,
            end_offset,
            query_weight,
            corpus_weight,
            source,
        }
    }

    /// Combined weight of the hit.
    pub fn weight(&self) -> f32 {
        self.corpus_weight * self.query_weight
    }

    /// Length of the hit in bytes.
    pub fn len(&self) -> u32 {
        self.end_offset - self.start_offset
    }

    /// Whether the hit covers no text.
    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Whether the offset ranges of the two hits intersect.
    pub fn overlaps(&self, other: &Hit) -> bool {
        self.start_offset < other.end_offset && other.start_offset < self.end_offset
    }

    /// Order two hits by start offset, then end offset.
    pub fn cmp_offsets(&self, other: &Hit) -> Ordering {
        self.start_offset
            .cmp(&other.start_offset)
            .then(self.end_offset.cmp(&other.end_offset))
    }
}

/// Combine the sources of two hits that were merged into one.
///
/// Equal sources stay as they are; differing sources are hash-combined. The
/// result is deterministic in its inputs but may collide with other sources.
pub fn combine_sources(a: i32, b: i32) -> i32 {
    if a == b {
        a
    } else {
        a.wrapping_mul(31).wrapping_add(b)
    }
}
