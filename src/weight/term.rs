//! Term weigher implementations.

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::weight::TermWeigher;

/// Gives every term the same weight.
#[derive(Debug, Clone, Copy)]
pub struct ConstantTermWeigher(pub f32);

impl Default for ConstantTermWeigher {
    fn default() -> Self {
        ConstantTermWeigher(1.0)
    }
}

impl TermWeigher for ConstantTermWeigher {
    fn weigh(&self, _term: &str) -> f32 {
        self.0
    }
}

/// Looks terms up in a table, falling back to a default weight.
#[derive(Debug, Clone, Default)]
pub struct ExactMatchTermWeigher {
    weights: AHashMap<String, f32>,
    default_weight: f32,
}

impl ExactMatchTermWeigher {
    /// Create a weigher over `weights` returning `default_weight` for misses.
    pub fn new(weights: AHashMap<String, f32>, default_weight: f32) -> Self {
        ExactMatchTermWeigher {
            weights,
            default_weight,
        }
    }

    /// Add or replace the weight of a term.
    pub fn with_term<S: Into<String>>(mut self, term: S, weight: f32) -> Self {
        self.weights.insert(term.into(), weight);
        self
    }

    /// Number of terms in the table.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl TermWeigher for ExactMatchTermWeigher {
    fn weigh(&self, term: &str) -> f32 {
        self.weights
            .get(term)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

/// Multiplies the weights of two weighers.
///
/// The second weigher is only consulted when the first returns a nonzero
/// weight, so an expensive corpus lookup can sit behind a cheap query-term
/// check.
#[derive(Debug, Clone)]
pub struct MultiplyingTermWeigher<A, B> {
    first: A,
    second: B,
}

impl<A: TermWeigher, B: TermWeigher> MultiplyingTermWeigher<A, B> {
    /// Multiply `first` by `second`, skipping `second` when `first` is zero.
    pub fn new(first: A, second: B) -> Self {
        MultiplyingTermWeigher { first, second }
    }
}

impl<A: TermWeigher, B: TermWeigher> TermWeigher for MultiplyingTermWeigher<A, B> {
    fn weigh(&self, term: &str) -> f32 {
        let first = self.first.weigh(term);
        if first == 0.0 {
            return 0.0;
        }
        first * self.second.weigh(term)
    }
}

/// Caches the weights computed by another weigher.
///
/// Keys are owned copies of the term, so callers can weigh terms out of a
/// reused buffer. Negative weights are never cached. The cache sits behind a
/// lock, so one instance can be shared across threads.
#[derive(Debug)]
pub struct CachingTermWeigher<W> {
    inner: W,
    cache: RwLock<AHashMap<Box<str>, f32>>,
}

impl<W: TermWeigher> CachingTermWeigher<W> {
    /// Cache the weights of `inner`.
    pub fn new(inner: W) -> Self {
        CachingTermWeigher {
            inner,
            cache: RwLock::new(AHashMap::new()),
        }
    }

    /// Number of cached terms.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}

impl<W: TermWeigher> TermWeigher for CachingTermWeigher<W> {
    fn weigh(&self, term: &str) -> f32 {
        if let Some(weight) = self.cache.read().get(term) {
            return *weight;
        }
        let weight = self.inner.weigh(term);
        if weight >= 0.0 {
            self.cache.write().insert(Box::from(term), weight);
        }
        weight
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Counts how often it is asked and answers from a closure.
    struct CountingWeigher<F> {
        calls: Arc<AtomicUsize>,
        weigh: F,
    }

    impl<F: Fn(&str) -> f32 + Send + Sync> TermWeigher for CountingWeigher<F> {
        fn weigh(&self, term: &str) -> f32 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.weigh)(term)
        }
    }

    #[test]
    fn test_exact_match() {
        let weigher = ExactMatchTermWeigher::default()
            .with_term("lazy", 10.0)
            .with_term("brown", 1.0);
        assert_eq!(weigher.weigh("lazy"), 10.0);
        assert_eq!(weigher.weigh("fox"), 0.0);
        assert_eq!(weigher.len(), 2);

        let weigher = ExactMatchTermWeigher::new(AHashMap::new(), 0.25);
        assert!(weigher.is_empty());
        assert_eq!(weigher.weigh("fox"), 0.25);
    }

    #[test]
    fn test_multiplying_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let second = CountingWeigher {
            calls: Arc::clone(&calls),
            weigh: |_: &str| 3.0,
        };
        let weigher = MultiplyingTermWeigher::new(
            ExactMatchTermWeigher::default().with_term("fox", 2.0),
            second,
        );

        assert_eq!(weigher.weigh("dog"), 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(weigher.weigh("fox"), 6.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_caching_skips_negative_weights() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = CountingWeigher {
            calls: Arc::clone(&calls),
            weigh: |term: &str| if term == "unknown" { -1.0 } else { term.len() as f32 },
        };
        let weigher = CachingTermWeigher::new(inner);

        let mut buffer = String::from("fox");
        assert_eq!(weigher.weigh(&buffer), 3.0);
        buffer.clear();
        buffer.push_str("fox");
        assert_eq!(weigher.weigh(&buffer), 3.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(weigher.weigh("unknown"), -1.0);
        assert_eq!(weigher.weigh("unknown"), -1.0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(weigher.cached(), 1);
    }

    #[test]
    fn test_caching_shared_across_threads() {
        let weigher = Arc::new(CachingTermWeigher::new(ConstantTermWeigher(2.0)));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let weigher = Arc::clone(&weigher);
                std::thread::spawn(move || weigher.weigh(&format!("term{}", i % 2)))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2.0);
        }
        assert_eq!(weigher.cached(), 2);
    }
}
