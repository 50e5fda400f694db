//! Snippet weighers.

use crate::hit::Hit;

/// Scores a snippet from the hits it contains.
pub trait SnippetWeigher: Send + Sync {
    /// Score of a snippet containing `hits`.
    fn weigh(&self, hits: &[Hit]) -> f32;
}

impl<T: SnippetWeigher + ?Sized> SnippetWeigher for Box<T> {
    fn weigh(&self, hits: &[Hit]) -> f32 {
        (**self).weigh(hits)
    }
}

/// Sums the weights of the hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumSnippetWeigher;

impl SnippetWeigher for SumSnippetWeigher {
    fn weigh(&self, hits: &[Hit]) -> f32 {
        hits.iter().map(Hit::weight).sum()
    }
}

/// Discounts hits that repeat a source already seen in the snippet.
///
/// Hits are grouped by source. A group of `count` hits whose weights sum to
/// `sum` contributes `base^count * sum / count`, so a snippet matching many
/// distinct sources beats one matching the same source over and over. A lone
/// hit of weight `w` contributes `base * w`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialSnippetWeigher {
    base: f32,
}

impl ExponentialSnippetWeigher {
    /// Create a weigher with the given base.
    pub fn new(base: f32) -> Self {
        ExponentialSnippetWeigher { base }
    }

    /// The base of the exponent.
    pub fn base(&self) -> f32 {
        self.base
    }
}

impl Default for ExponentialSnippetWeigher {
    fn default() -> Self {
        ExponentialSnippetWeigher::new(1.1)
    }
}

impl SnippetWeigher for ExponentialSnippetWeigher {
    fn weigh(&self, hits: &[Hit]) -> f32 {
        match hits {
            [] => 0.0,
            [hit] => self.base * hit.weight(),
            _ => {
                // (source, count, sum) in order of first appearance
                let mut groups: Vec<(i32, u32, f32)> = Vec::new();
                for hit in hits {
                    match groups.iter_mut().find(|(source, _, _)| *source == hit.source) {
                        Some((_, count, sum)) => {
                            *count += 1;
                            *sum += hit.weight();
                        }
                        None => groups.push((hit.source, 1, hit.weight())),
                    }
                }
                groups
                    .iter()
                    .map(|&(_, count, sum)| self.base.powi(count as i32) * sum / count as f32)
                    .sum()
            }
        }
    }
}
