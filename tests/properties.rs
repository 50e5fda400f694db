use ahash::AHashMap;

use proptest::prelude::*;

use sarissa_highlight::config::{HighlightConfig, HighlightOrder, SegmenterKind};
use sarissa_highlight::extract::StringSourceExtracter;
use sarissa_highlight::format::SnippetFormatter;
use sarissa_highlight::highlighter::Highlighter;
use sarissa_highlight::hit::Hit;
use sarissa_highlight::hit_enum::{
    HitOrdering, MergingHitEnum, TokenStreamHitEnum, VecHitEnum, collect_hits,
};
use sarissa_highlight::matcher::{MatchStrategy, Pattern};
use sarissa_highlight::segment::{
    BoundarySegmenter, CharScanningSegmenter, MultiSegmenter, WholeSourceSegmenter,
};
use sarissa_highlight::snippet::{
    ScoreBasedSnippetChooser, Snippet, SnippetChooser, SnippetOrder, SourceOrderSnippetChooser,
};
use sarissa_highlight::weight::{
    ExactMatchTermWeigher, ExponentialSnippetWeigher, HashingTermSourceFinder, SnippetWeigher,
    SumSnippetWeigher,
};

const PATTERNS: &[&str] = &[
    ".*x",
    "a.*x",
    "x",
    "ab*",
    "[ab]+x?",
    "a|bx",
    "(ab)*x",
    ".*é.",
    "b.?a",
];

const WORDS: &[&str] = &["the", "quick", "brown", "fox", "lazy", "dog", "jumped"];

fn hit_strategy() -> impl Strategy<Value = Hit> {
    (0u32..50, 0u32..200, 1u32..10, 0u32..5, 0i32..4).prop_map(
        |(position, start, len, weight, source)| {
            Hit::new(position, start, start + len, weight as f32, source)
        },
    )
}

fn key(hit: &Hit) -> (u32, u32, u32, i32, u32) {
    (
        hit.start_offset,
        hit.end_offset,
        hit.position,
        hit.source,
        hit.weight().to_bits(),
    )
}

fn spans(pattern: &Pattern, text: &str) -> Vec<(u32, u32)> {
    let mut hits = pattern.hits(text);
    collect_hits(&mut hits)
        .unwrap()
        .iter()
        .map(|h| (h.start_offset, h.end_offset))
        .collect()
}

fn check_snippets(snippets: &[Snippet], max: usize) {
    assert!(snippets.len() <= max);
    for (i, a) in snippets.iter().enumerate() {
        for hit in a.hits() {
            assert!(a.segment().contains(hit), "{hit:?} outside {:?}", a.segment());
        }
        for b in &snippets[i + 1..] {
            assert!(
                !a.segment().overlaps(&b.segment()),
                "{:?} overlaps {:?}",
                a.segment(),
                b.segment()
            );
        }
    }
}

const SEGMENTERS: [SegmenterKind; 3] = [
    SegmenterKind::Whole,
    SegmenterKind::CharScanning,
    SegmenterKind::Sentence,
];

const ORDERS: [HighlightOrder; 3] = [
    HighlightOrder::ScoreOrdered,
    HighlightOrder::SourceOrdered,
    HighlightOrder::SourceOrderedGreedy,
];

fn value_starts(values: &[String], gap: u32) -> Vec<u32> {
    let mut next = 0;
    values
        .iter()
        .map(|value| {
            let start = next;
            next += value.len() as u32 + gap;
            start
        })
        .collect()
}

/// Hits on character boundaries of the values, in offset order. They may be
/// empty or overlap each other.
fn hits_in_values(
    values: &[String],
    starts: &[u32],
    raw: &[(usize, usize, usize, u32)],
) -> Vec<Hit> {
    let hits = raw
        .iter()
        .enumerate()
        .map(|(position, &(value, a, b, weight))| {
            let value = value % values.len();
            let text = &values[value];
            let bounds: Vec<usize> = text
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .collect();
            let (a, b) = (bounds[a % bounds.len()], bounds[b % bounds.len()]);
            Hit::new(
                position as u32,
                starts[value] + a.min(b) as u32,
                starts[value] + a.max(b) as u32,
                weight as f32,
                (position % 3) as i32,
            )
        })
        .collect();
    let mut sorted = VecHitEnum::sorted(hits, HitOrdering::Offsets);
    collect_hits(&mut sorted).unwrap()
}

fn segmenter_over<'a>(
    values: &'a [String],
    gap: u32,
    kind: SegmenterKind,
    fragment_chars: usize,
    max_scan: usize,
) -> MultiSegmenter<'a> {
    let mut segmenter = MultiSegmenter::new(gap);
    for value in values {
        let len = value.len() as u32;
        match kind {
            SegmenterKind::Whole => segmenter.push(WholeSourceSegmenter::new(len), len),
            SegmenterKind::CharScanning => segmenter.push(
                CharScanningSegmenter::new(value, fragment_chars, max_scan),
                len,
            ),
            SegmenterKind::Sentence => {
                segmenter.push(BoundarySegmenter::sentences(value, max_scan % 3 + 1), len)
            }
        }
    }
    segmenter
}

proptest! {
    #[test]
    fn merged_hits_are_sorted_and_complete(
        sources in prop::collection::vec(prop::collection::vec(hit_strategy(), 0..20), 0..6),
        by_position in any::<bool>(),
    ) {
        let ordering = if by_position { HitOrdering::Position } else { HitOrdering::Offsets };
        let enums: Vec<VecHitEnum> = sources
            .iter()
            .map(|hits| VecHitEnum::sorted(hits.clone(), ordering))
            .collect();
        let mut merged = MergingHitEnum::with_ordering(enums, ordering).unwrap();
        let merged = collect_hits(&mut merged).unwrap();

        for pair in merged.windows(2) {
            prop_assert!(!ordering.less_than(&pair[1], &pair[0]));
        }

        let mut expected: Vec<_> = sources.iter().flatten().map(key).collect();
        let mut actual: Vec<_> = merged.iter().map(key).collect();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn two_pass_matches_forward_scan(
        text in "[abxé ]{0,40}",
        pattern in prop::sample::select(PATTERNS),
    ) {
        let forward = Pattern::regex(pattern)
            .unwrap()
            .with_strategy(MatchStrategy::ForwardOnly)
            .unwrap();
        let two_pass = Pattern::regex(pattern)
            .unwrap()
            .with_strategy(MatchStrategy::TwoPass)
            .unwrap();
        prop_assert_eq!(spans(&forward, &text), spans(&two_pass, &text));
    }

    #[test]
    fn chosen_snippets_never_overlap_and_contain_their_hits(
        words in prop::collection::vec(prop::sample::select(WORDS), 1..60),
        fragment_chars in 3usize..40,
        max_scan in 0usize..10,
        max in 1usize..5,
        chooser_kind in 0u8..3,
    ) {
        let text = words.join(" ");
        let weigher = ExactMatchTermWeigher::new(AHashMap::new(), 0.0)
            .with_term("fox", 2.0)
            .with_term("dog", 1.0)
            .with_term("lazy", 0.5);
        let finder = HashingTermSourceFinder;
        let mut hits = TokenStreamHitEnum::new(&text, &weigher, &finder);
        let segmenter = CharScanningSegmenter::new(&text, fragment_chars, max_scan);

        let snippets = match chooser_kind {
            0 => ScoreBasedSnippetChooser::new(SumSnippetWeigher, SnippetOrder::Score)
                .choose(&segmenter, &mut hits, max),
            1 => ScoreBasedSnippetChooser::new(ExponentialSnippetWeigher::default(), SnippetOrder::Source)
                .choose(&segmenter, &mut hits, max),
            _ => SourceOrderSnippetChooser::new(SumSnippetWeigher)
                .choose(&segmenter, &mut hits, max),
        }
        .unwrap();
        check_snippets(&snippets, max);
    }

    #[test]
    fn arbitrary_hits_over_values_never_overlap(
        values in prop::collection::vec("[abé .]{0,24}", 1..4),
        raw in prop::collection::vec((0usize..8, 0usize..64, 0usize..64, 0u32..5), 0..24),
        gap in 0u32..3,
        segmenter_kind in 0usize..3,
        chooser_kind in 0usize..3,
        fragment_chars in 1usize..30,
        max_scan in 0usize..6,
        max in 1usize..5,
        merge in any::<bool>(),
    ) {
        let starts = value_starts(&values, gap);
        let hits = hits_in_values(&values, &starts, &raw);
        let kind = SEGMENTERS[segmenter_kind];
        let segmenter = segmenter_over(&values, gap, kind, fragment_chars, max_scan);

        let mut replay = VecHitEnum::new(hits.clone());
        let snippets = match chooser_kind {
            0 => ScoreBasedSnippetChooser::new(SumSnippetWeigher, SnippetOrder::Score)
                .choose(&segmenter, &mut replay, max),
            1 => ScoreBasedSnippetChooser::new(ExponentialSnippetWeigher::default(), SnippetOrder::Source)
                .choose(&segmenter, &mut replay, max),
            _ => SourceOrderSnippetChooser::new(SumSnippetWeigher)
                .choose(&segmenter, &mut replay, max),
        }
        .unwrap();
        check_snippets(&snippets, max);
        for snippet in &snippets {
            let segment = snippet.segment();
            prop_assert!(
                starts.iter().zip(&values).any(|(&start, value)| {
                    start <= segment.start_offset()
                        && segment.end_offset() <= start + value.len() as u32
                }),
                "{:?} is not inside one value",
                segment
            );
        }

        let mut config = HighlightConfig::new()
            .segmenter(kind)
            .order(ORDERS[chooser_kind])
            .fragment_chars(fragment_chars, max_scan)
            .max_sentences(max_scan % 3 + 1)
            .max_snippets(max)
            .offset_gap(gap);
        if !merge {
            config = config.no_merge_sources();
        }
        let highlighted = Highlighter::new(config)
            .highlight_hits(values.as_slice(), VecHitEnum::new(hits))
            .unwrap();
        prop_assert!(highlighted.len() <= max);
        for (i, a) in highlighted.iter().enumerate() {
            prop_assert!(a.start_offset <= a.end_offset);
            for b in &highlighted[i + 1..] {
                prop_assert!(
                    a.end_offset <= b.start_offset || b.end_offset <= a.start_offset,
                    "{:?} overlaps {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn exponential_weigher_boundaries(base in 0.1f32..10.0, weight in 0.0f32..100.0) {
        let weigher = ExponentialSnippetWeigher::new(base);
        prop_assert_eq!(weigher.weigh(&[]), 0.0);
        let hit = Hit::new(0, 0, 1, weight, 7);
        prop_assert_eq!(weigher.weigh(&[hit]), base * weight);
    }

    #[test]
    fn formatting_without_hits_returns_source_text(text in "\\PC{0,40}") {
        let extracter = StringSourceExtracter::new(&text);
        let formatter = SnippetFormatter::new(&extracter, "<em>", "</em>");
        let snippet = Snippet::new(0, text.len() as u32, Vec::new(), 0.0).unwrap();
        prop_assert_eq!(formatter.format(&snippet).unwrap(), text);
    }
}
