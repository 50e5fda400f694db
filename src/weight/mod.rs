//! Weighing of terms, hits and snippets.
//!
//! Term weighers turn a matched term into a number, hit weighers do the same
//! from nothing but a hit's position and offsets, and snippet weighers score a
//! whole snippet from its hits. Term and hit weighers compose: constants,
//! caches, lazy products and exact-match lookups.

pub mod snippet;
pub mod term;

pub use self::snippet::{ExponentialSnippetWeigher, SnippetWeigher, SumSnippetWeigher};
pub use self::term::{
    CachingTermWeigher, ConstantTermWeigher, ExactMatchTermWeigher, MultiplyingTermWeigher,
};

/// Weighs a matched term.
pub trait TermWeigher: Send + Sync {
    /// Weight of `term`. Zero means the term is not interesting.
    fn weigh(&self, term: &str) -> f32;
}

impl<T: TermWeigher + ?Sized> TermWeigher for Box<T> {
    fn weigh(&self, term: &str) -> f32 {
        (**self).weigh(term)
    }
}

impl<T: TermWeigher + ?Sized> TermWeigher for std::sync::Arc<T> {
    fn weigh(&self, term: &str) -> f32 {
        (**self).weigh(term)
    }
}

/// Weighs a hit knowing only where it is.
pub trait HitWeigher {
    /// Weight of the hit at `position` spanning `start_offset..end_offset`.
    fn weigh(&self, position: u32, start_offset: u32, end_offset: u32) -> f32;
}

impl<F> HitWeigher for F
where
    F: Fn(u32, u32, u32) -> f32,
{
    fn weigh(&self, position: u32, start_offset: u32, end_offset: u32) -> f32 {
        self(position, start_offset, end_offset)
    }
}

/// A hit weigher that always returns the same weight.
#[derive(Debug, Clone, Copy)]
pub struct ConstantHitWeigher(pub f32);

impl Default for ConstantHitWeigher {
    fn default() -> Self {
        ConstantHitWeigher(1.0)
    }
}

impl HitWeigher for ConstantHitWeigher {
    fn weigh(&self, _position: u32, _start_offset: u32, _end_offset: u32) -> f32 {
        self.0
    }
}

/// Finds the source id of a matched term.
pub trait TermSourceFinder: Send + Sync {
    /// Source id of `term`.
    fn source(&self, term: &str) -> i32;
}

/// Uses a hash of the term's bytes as its source, so hits of the same term
/// group together.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashingTermSourceFinder;

impl TermSourceFinder for HashingTermSourceFinder {
    fn source(&self, term: &str) -> i32 {
        term.bytes()
            .fold(0i32, |hash, byte| hash.wrapping_mul(31).wrapping_add(i32::from(byte)))
    }
}

/// Gives every term the same source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantTermSourceFinder(pub i32);

impl TermSourceFinder for ConstantTermSourceFinder {
    fn source(&self, _term: &str) -> i32 {
        self.0
    }
}
