//! The highlighting pipeline for one field.
//!
//! [`Highlighter`] ties the pieces together: hits from a token stream, from
//! compiled patterns or from the caller, merged overlaps, filtering and
//! boosting, a segmenter per value, a snippet chooser and the formatter.

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{HighlightConfig, HighlightOrder, SegmenterKind};
use crate::error::{HighlightError, Result};
use crate::extract::{
    MergingMultiSourceExtracter, NonMergingMultiSourceExtracter, SourceExtracter,
};
use crate::format::SnippetFormatter;
use crate::hit::Hit;
use crate::hit_enum::{
    ConcatHitEnum, HitEnum, HitOrdering, MergingHitEnum, OverlapMergingHitEnum, PeekableHitEnum,
    PositionBoostingHitEnum, TokenStreamHitEnum, WeightFilteredHitEnum,
};
use crate::matcher::{AutomatonHitEnum, MatchStrategy, Pattern};
use crate::segment::{
    BoundarySegmenter, CharScanningSegmenter, MultiSegmenter, WholeSourceSegmenter,
};
use crate::snippet::{
    ScoreBasedSnippetChooser, Snippet, SnippetChooser, SnippetOrder, SourceOrderSnippetChooser,
};
use crate::weight::{
    CachingTermWeigher, ConstantHitWeigher, ExactMatchTermWeigher, HashingTermSourceFinder,
    TermSourceFinder, TermWeigher,
};

/// A rendered snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightedSnippet {
    /// Snippet text with every hit wrapped in the configured tags.
    pub text: String,
    /// Score given by the snippet weigher; zero for a no-match fragment.
    pub score: f32,
    /// Start of the snippet in the concatenated field values.
    pub start_offset: u32,
    /// End of the snippet in the concatenated field values.
    pub end_offset: u32,
}

/// Highlights the values of a field.
///
/// # Examples
///
/// ```
/// use sarissa_highlight::config::HighlightConfig;
/// use sarissa_highlight::highlighter::Highlighter;
///
/// let highlighter = Highlighter::new(HighlightConfig::new().fragment_chars(20, 10));
/// let values = ["The quick brown fox jumped over the lazy dog."];
/// let snippets = highlighter.highlight_terms(&values, &[("lazy", 1.0)]).unwrap();
/// assert_eq!(snippets[0].text, "over the <em>lazy</em> dog.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    /// Create a highlighter.
    pub fn new(config: HighlightConfig) -> Self {
        Highlighter { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Highlight the words of `values` found in `terms`, matched
    /// case-insensitively and weighed by the weight paired with them.
    pub fn highlight_terms<S: AsRef<str>, T: AsRef<str>>(
        &self,
        values: &[S],
        terms: &[(T, f32)],
    ) -> Result<Vec<HighlightedSnippet>> {
        let weights: AHashMap<String, f32> = terms
            .iter()
            .map(|(term, weight)| (term.as_ref().to_lowercase(), *weight))
            .collect();
        let weigher = CachingTermWeigher::new(ExactMatchTermWeigher::new(weights, 0.0));
        self.highlight_with_weigher(values, &weigher, &HashingTermSourceFinder)
    }

    /// Highlight the words of `values`, lowercased and weighed by `weigher`.
    pub fn highlight_with_weigher<S: AsRef<str>>(
        &self,
        values: &[S],
        weigher: &dyn TermWeigher,
        source_finder: &dyn TermSourceFinder,
    ) -> Result<Vec<HighlightedSnippet>> {
        let lengths = value_lengths(values, self.config.offset_gap)?;
        let mut hits = ConcatHitEnum::new(self.config.offset_gap);
        for (value, len) in values.iter().zip(&lengths) {
            hits.push(
                TokenStreamHitEnum::new(value.as_ref(), weigher, source_finder),
                *len,
            );
        }
        self.highlight_hits(values, hits)
    }

    /// Highlight the matches of `patterns` in `values`, each match weighing
    /// the weight paired with its pattern.
    pub fn highlight_patterns<S: AsRef<str>>(
        &self,
        values: &[S],
        patterns: &[(Pattern, f32)],
    ) -> Result<Vec<HighlightedSnippet>> {
        let recompiled;
        let patterns = match self.config.match_strategy {
            MatchStrategy::Auto => patterns,
            strategy => {
                recompiled = patterns
                    .iter()
                    .map(|(pattern, weight)| {
                        let pattern = pattern.clone().with_strategy(strategy)?;
                        Ok((pattern, *weight))
                    })
                    .collect::<Result<Vec<_>>>()?;
                recompiled.as_slice()
            }
        };

        let lengths = value_lengths(values, self.config.offset_gap)?;
        let finder = HashingTermSourceFinder;
        let mut hits = ConcatHitEnum::new(self.config.offset_gap);
        for (value, len) in values.iter().zip(&lengths) {
            let sources = patterns
                .iter()
                .map(|(pattern, weight)| {
                    AutomatonHitEnum::new(
                        pattern,
                        value.as_ref(),
                        ConstantHitWeigher(*weight),
                        ConstantHitWeigher::default(),
                    )
                    .with_source(finder.source(pattern.source()))
                })
                .collect();
            hits.push(MergingHitEnum::with_ordering(sources, HitOrdering::Offsets)?, *len);
        }
        self.highlight_hits(values, hits)
    }

    /// Highlight `values` with hits supplied by the caller.
    ///
    /// The hits must be ordered by offsets, which refer to the values laid
    /// end to end with the configured offset gap between them. A hit out of
    /// order, or one not lying on character boundaries of a single value,
    /// fails with [`HighlightError::InvalidArgument`].
    pub fn highlight_hits<S: AsRef<str>, E: HitEnum>(
        &self,
        values: &[S],
        hits: E,
    ) -> Result<Vec<HighlightedSnippet>> {
        let config = &self.config;
        if config.max_snippets == 0 || values.is_empty() {
            return Ok(Vec::new());
        }
        let lengths = value_lengths(values, config.offset_gap)?;
        let hits = ValueCheckingHitEnum::new(values, config.offset_gap, hits);
        let hits = OverlapMergingHitEnum::new(hits);
        let hits = PositionBoostingHitEnum::new(hits, config.boost_before, config.boost_factor);
        let hits = WeightFilteredHitEnum::new(hits, config.min_hit_weight);
        let mut hits = PeekableHitEnum::new(hits);

        // values are only segmented once there is something to highlight
        if hits.peek()?.is_none() {
            debug!("no hits in {} values", values.len());
            return self.no_match_fragment(values);
        }

        let mut segmenter = MultiSegmenter::new(config.offset_gap);
        for (value, &len) in values.iter().zip(&lengths) {
            let value = value.as_ref();
            match config.segmenter {
                SegmenterKind::Whole => segmenter.push(WholeSourceSegmenter::new(len), len),
                SegmenterKind::CharScanning => segmenter.push(
                    CharScanningSegmenter::new(value, config.fragment_chars, config.max_scan),
                    len,
                ),
                SegmenterKind::Sentence => segmenter.push(
                    BoundarySegmenter::sentences(value, config.max_sentences),
                    len,
                ),
            }
        }

        let weigher = config.snippet_weigher.weigher();
        let chooser: Box<dyn SnippetChooser> = match config.order {
            HighlightOrder::ScoreOrdered => {
                Box::new(ScoreBasedSnippetChooser::new(weigher, SnippetOrder::Score))
            }
            HighlightOrder::SourceOrdered => {
                Box::new(ScoreBasedSnippetChooser::new(weigher, SnippetOrder::Source))
            }
            HighlightOrder::SourceOrderedGreedy => {
                Box::new(SourceOrderSnippetChooser::new(weigher))
            }
        };
        let snippets = chooser.choose(&segmenter, &mut hits, config.max_snippets)?;
        debug!(
            "highlighted {} snippets in {} values",
            snippets.len(),
            values.len()
        );

        let extracter = self.extracter(values);
        let formatter = SnippetFormatter::new(
            extracter.as_ref(),
            config.pre_tag.as_str(),
            config.post_tag.as_str(),
        );
        snippets
            .iter()
            .map(|snippet| render(&formatter, snippet))
            .collect()
    }

    fn extracter<'a, S: AsRef<str>>(&self, values: &'a [S]) -> Box<dyn SourceExtracter + 'a> {
        if self.config.merge_sources {
            Box::new(MergingMultiSourceExtracter::from_values(
                values,
                self.config.offset_gap,
                self.config.merge_separator.as_str(),
            ))
        } else {
            Box::new(NonMergingMultiSourceExtracter::from_values(
                values,
                self.config.offset_gap,
            ))
        }
    }

    /// The leading fragment of the first value, when configured.
    fn no_match_fragment<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<HighlightedSnippet>> {
        let config = &self.config;
        let Some(first) = values.first() else {
            return Ok(Vec::new());
        };
        let first: &str = first.as_ref();
        if config.no_match_size == 0 || first.is_empty() {
            return Ok(Vec::new());
        }
        let segment =
            CharScanningSegmenter::new(first, config.no_match_size, config.max_scan)
                .leading_fragment();
        let text = &first[segment.start_offset() as usize..segment.end_offset() as usize];
        Ok(vec![HighlightedSnippet {
            text: text.to_string(),
            score: 0.0,
            start_offset: segment.start_offset(),
            end_offset: segment.end_offset(),
        }])
    }
}

fn render(formatter: &SnippetFormatter<'_>, snippet: &Snippet) -> Result<HighlightedSnippet> {
    Ok(HighlightedSnippet {
        text: formatter.format(snippet)?,
        score: snippet.score(),
        start_offset: snippet.start_offset(),
        end_offset: snippet.end_offset(),
    })
}

/// Byte lengths of the values, checking their concatenation with
/// `offset_gap` between values fits in `u32` offsets.
fn value_lengths<S: AsRef<str>>(values: &[S], offset_gap: u32) -> Result<Vec<u32>> {
    let gaps = (values.len().saturating_sub(1) as u64).saturating_mul(u64::from(offset_gap));
    let total = values
        .iter()
        .map(|value| value.as_ref().len() as u64)
        .fold(gaps, u64::saturating_add);
    if total > u64::from(u32::MAX) {
        return Err(HighlightError::invalid_argument(format!(
            "{} field values with an offset gap of {offset_gap} span more than {} bytes",
            values.len(),
            u32::MAX
        )));
    }
    // every length is below the total
    Ok(values.iter().map(|value| value.as_ref().len() as u32).collect())
}

/// Checks caller supplied hits before they reach the segmenters.
struct ValueCheckingHitEnum<'a, E> {
    inner: E,
    // start offset and text of each value
    values: Vec<(u32, &'a str)>,
    last: Option<Hit>,
}

impl<'a, E: HitEnum> ValueCheckingHitEnum<'a, E> {
    /// `values` must have passed [`value_lengths`] with the same gap.
    fn new<S: AsRef<str>>(values: &'a [S], offset_gap: u32, inner: E) -> Self {
        let mut start = 0u32;
        let values = values
            .iter()
            .map(|value| {
                let value = value.as_ref();
                let entry = (start, value);
                start = start
                    .saturating_add(value.len() as u32)
                    .saturating_add(offset_gap);
                entry
            })
            .collect();
        ValueCheckingHitEnum {
            inner,
            values,
            last: None,
        }
    }

    fn in_one_value(&self, hit: &Hit) -> bool {
        let Some(index) = self
            .values
            .partition_point(|(start, _)| *start <= hit.start_offset)
            .checked_sub(1)
        else {
            return false;
        };
        let (start, text) = self.values[index];
        let Some(end) = hit.end_offset.checked_sub(start) else {
            return false;
        };
        let begin = (hit.start_offset - start) as usize;
        text.get(begin..end as usize).is_some()
    }
}

impl<E: HitEnum> HitEnum for ValueCheckingHitEnum<'_, E> {
    fn next_hit(&mut self) -> Result<Option<Hit>> {
        let Some(hit) = self.inner.next_hit()? else {
            return Ok(None);
        };
        if self
            .last
            .is_some_and(|last| HitOrdering::Offsets.less_than(&hit, &last))
        {
            return Err(HighlightError::invalid_argument(format!(
                "hit {}..{} is out of offset order",
                hit.start_offset, hit.end_offset
            )));
        }
        if !self.in_one_value(&hit) {
            return Err(HighlightError::invalid_argument(format!(
                "hit {}..{} does not lie on character boundaries of one value",
                hit.start_offset, hit.end_offset
            )));
        }
        self.last = Some(hit);
        Ok(Some(hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnippetWeigherKind;
    use crate::hit::Hit;
    use crate::hit_enum::VecHitEnum;

    const TEXT: &str = "The quick brown fox jumped over the lazy dog.";

    fn narrow() -> HighlightConfig {
        HighlightConfig::new().fragment_chars(20, 10)
    }

    #[test]
    fn test_single_term() {
        let highlighter = Highlighter::new(narrow());
        let snippets = highlighter.highlight_terms(&[TEXT], &[("lazy", 1.0)]).unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "over the <em>lazy</em> dog.");
        assert_eq!((snippets[0].start_offset, snippets[0].end_offset), (27, 45));
        assert!((snippets[0].score - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_terms_match_case_insensitively() {
        let highlighter = Highlighter::new(HighlightConfig::new());
        let snippets = highlighter.highlight_terms(&[TEXT], &[("THE", 1.0)]).unwrap();
        assert_eq!(
            snippets[0].text,
            "<em>The</em> quick brown fox jumped over <em>the</em> lazy dog."
        );
    }

    #[test]
    fn test_orders() {
        let terms = [("lazy", 10.0), ("brown", 1.0)];
        let highlighter = Highlighter::new(narrow().max_snippets(2));
        let snippets = highlighter.highlight_terms(&[TEXT], &terms).unwrap();
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].text.contains("<em>lazy</em>"));
        assert!(snippets[1].text.contains("<em>brown</em>"));

        let highlighter =
            Highlighter::new(narrow().max_snippets(2).order(HighlightOrder::SourceOrdered));
        let snippets = highlighter.highlight_terms(&[TEXT], &terms).unwrap();
        assert!(snippets[0].text.contains("<em>brown</em>"));
        assert!(snippets[1].text.contains("<em>lazy</em>"));

        let highlighter = Highlighter::new(
            narrow()
                .max_snippets(1)
                .order(HighlightOrder::SourceOrderedGreedy),
        );
        let snippets = highlighter.highlight_terms(&[TEXT], &terms).unwrap();
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].text.contains("<em>brown</em>"));
    }

    #[test]
    fn test_patterns() {
        let highlighter = Highlighter::new(narrow().snippet_weigher(SnippetWeigherKind::Sum));
        let patterns = [
            (Pattern::regex("l[a-z]+y").unwrap(), 2.0),
            (Pattern::wildcard("d?g").unwrap(), 1.0),
        ];
        let snippets = highlighter.highlight_patterns(&[TEXT], &patterns).unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "over the <em>lazy</em> <em>dog</em>.");
        assert_eq!(snippets[0].score, 3.0);

        let highlighter = Highlighter::new(narrow().match_strategy(MatchStrategy::TwoPass));
        let snippets = highlighter
            .highlight_patterns(&[TEXT], &[(Pattern::regex("l[a-z]+y").unwrap(), 1.0)])
            .unwrap();
        assert_eq!(snippets[0].text, "over the <em>lazy</em> dog.");
    }

    #[test]
    fn test_multi_valued_field() {
        let values = ["first value", "the lazy dog"];
        let highlighter = Highlighter::new(narrow().max_snippets(3));
        let snippets = highlighter
            .highlight_terms(&values, &[("value", 1.0), ("dog", 1.0)])
            .unwrap();
        assert_eq!(snippets.len(), 2);
        let mut texts: Vec<&str> = snippets.iter().map(|s| s.text.as_str()).collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["first <em>value</em>", "the lazy <em>dog</em>"]);

        let highlighter = Highlighter::new(narrow().max_snippets(3).no_merge_sources());
        let snippets = highlighter
            .highlight_terms(&values, &[("value", 1.0), ("dog", 1.0)])
            .unwrap();
        assert_eq!(snippets.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let highlighter = Highlighter::new(narrow());
        assert!(highlighter.highlight_terms(&[TEXT], &[("cat", 1.0)]).unwrap().is_empty());

        let highlighter = Highlighter::new(narrow().no_match_size(12));
        let snippets = highlighter.highlight_terms(&[TEXT], &[("cat", 1.0)]).unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "The quick");
        assert_eq!(snippets[0].score, 0.0);

        let empty: [&str; 0] = [];
        assert!(highlighter.highlight_terms(&empty, &[("cat", 1.0)]).unwrap().is_empty());
    }

    #[test]
    fn test_filter_and_boost() {
        let terms = [("quick", 1.0), ("lazy", 1.0)];
        let highlighter = Highlighter::new(narrow().min_hit_weight(2.0));
        assert!(highlighter.highlight_terms(&[TEXT], &terms).unwrap().is_empty());

        // "quick" is at position 1
        let highlighter = Highlighter::new(narrow().boost_before(2, 3.0));
        let snippets = highlighter.highlight_terms(&[TEXT], &terms).unwrap();
        assert!(snippets[0].text.contains("<em>quick</em>"));
    }

    #[test]
    fn test_caller_supplied_hits() {
        let highlighter = Highlighter::new(HighlightConfig::new().segmenter(SegmenterKind::Whole));
        let hits = VecHitEnum::new(vec![Hit::new(0, 4, 9, 1.0, 0), Hit::new(1, 6, 15, 1.0, 1)]);
        let snippets = highlighter.highlight_hits(&[TEXT], hits).unwrap();
        assert_eq!(
            snippets[0].text,
            "The <em>quick brown</em> fox jumped over the lazy dog."
        );
    }

    #[test]
    fn test_sentence_segmenter() {
        let text = "The fox ran. The dog slept. A cat watched.";
        let highlighter = Highlighter::new(
            HighlightConfig::new()
                .segmenter(SegmenterKind::Sentence)
                .max_snippets(2)
                .order(HighlightOrder::SourceOrdered),
        );
        let snippets = highlighter
            .highlight_terms(&[text], &[("dog", 1.0), ("cat", 1.0)])
            .unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].text, "The <em>dog</em> slept. ");
        assert_eq!(snippets[1].text, "A <em>cat</em> watched.");
    }

    #[test]
    fn test_max_zero() {
        let highlighter = Highlighter::new(narrow().max_snippets(0).no_match_size(10));
        assert!(highlighter.highlight_terms(&[TEXT], &[("lazy", 1.0)]).unwrap().is_empty());
    }

    #[test]
    fn test_hits_must_lie_on_char_boundaries_of_one_value() {
        let highlighter = Highlighter::new(HighlightConfig::new().fragment_chars(20, 5));
        let values = ["ééé ééé"];
        let snippets = highlighter
            .highlight_hits(&values, VecHitEnum::new(vec![Hit::new(0, 0, 2, 1.0, 0)]))
            .unwrap();
        assert_eq!(snippets[0].text, "<em>é</em>éé ééé");

        for hit in [
            Hit::new(0, 1, 2, 1.0, 0),
            Hit::new(0, 4, 2, 1.0, 0),
            Hit::new(0, 10, 20, 1.0, 0),
        ] {
            let err = highlighter
                .highlight_hits(&values, VecHitEnum::new(vec![hit]))
                .unwrap_err();
            assert!(matches!(err, HighlightError::InvalidArgument(_)), "{hit:?}");
        }

        // across the gap between two values, and inside it
        let values = ["foo", "bar"];
        for hit in [Hit::new(0, 2, 5, 1.0, 0), Hit::new(0, 3, 4, 1.0, 0)] {
            let err = highlighter
                .highlight_hits(&values, VecHitEnum::new(vec![hit]))
                .unwrap_err();
            assert!(matches!(err, HighlightError::InvalidArgument(_)), "{hit:?}");
        }
    }

    #[test]
    fn test_hits_out_of_order_are_rejected() {
        let highlighter = Highlighter::new(HighlightConfig::new());
        let hits = VecHitEnum::new(vec![Hit::new(0, 10, 15, 1.0, 0), Hit::new(1, 4, 9, 1.0, 0)]);
        let err = highlighter.highlight_hits(&[TEXT], hits).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidArgument(_)));
    }

    #[test]
    fn test_offset_gap_overflowing_u32() {
        let config = HighlightConfig::from_json(r#"{"offset_gap": 4294967295}"#).unwrap();
        let highlighter = Highlighter::new(config);
        let err = highlighter
            .highlight_terms(&["foo", "bar", "baz"], &[("baz", 1.0)])
            .unwrap_err();
        assert!(matches!(err, HighlightError::InvalidArgument(_)));

        // no gap is needed for a single value
        let snippets = highlighter.highlight_terms(&["foo baz"], &[("baz", 1.0)]).unwrap();
        assert_eq!(snippets[0].text, "foo <em>baz</em>");
    }
}
