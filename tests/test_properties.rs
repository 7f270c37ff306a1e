//! Property tests for ordering, stability, and determinism guarantees.

use proptest::prelude::*;

use outline_oxide::extract::{RawLine, RawPage, TextLine};
use outline_oxide::layout::{FontSizeClassifier, HeadingClassifier, HeadingLevel};
use outline_oxide::pipeline::OutlinePipeline;
use outline_oxide::ranking::rank_sections;
use outline_oxide::sections::{segment_document, Section};
use outline_oxide::ExtractionConfig;

/// A small pool of well-separated font sizes, indexed by strategy choice.
const SIZE_POOL: [f32; 3] = [20.0, 14.0, 10.0];

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z]{2,8}"
}

fn arb_text(max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_word(), 1..=max_words).prop_map(|words| words.join(" "))
}

prop_compose! {
    fn arb_threshold_line()(
        text in arb_text(4),
        size_idx in 0usize..3,
        y in 0.0f32..800.0,
    ) -> (String, f32, f32) {
        (text, SIZE_POOL[size_idx], y)
    }
}

proptest! {
    /// With at most three distinct sizes, every line's level equals the
    /// rank of its size among the sorted distinct sizes.
    #[test]
    fn threshold_mode_levels_match_size_rank(
        raw_lines in prop::collection::vec(arb_threshold_line(), 1..20),
    ) {
        let lines: Vec<TextLine> = raw_lines
            .iter()
            .map(|(text, size, y)| TextLine::new(text.clone(), *size, *y, 1))
            .collect();

        let mut distinct: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
        distinct.sort_by(|a, b| b.partial_cmp(a).unwrap());
        distinct.dedup();
        prop_assert!(distinct.len() <= 3);

        let levels = FontSizeClassifier::new().classify(&lines).unwrap();
        for (line, level) in lines.iter().zip(levels.iter()) {
            let rank = distinct
                .iter()
                .position(|&s| (s - line.font_size).abs() < 0.1)
                .unwrap();
            prop_assert_eq!(*level, HeadingLevel::from_rank(rank));
        }
    }

    /// Permuting ranker input never changes the score ordering, and ties
    /// keep their input order within each run.
    #[test]
    fn ranking_is_a_stable_total_order(
        texts in prop::collection::vec(arb_text(6), 1..12),
        rotation in 0usize..12,
        query in arb_text(4),
    ) {
        let sections: Vec<Section> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Section {
                document: "d".to_string(),
                page: 1,
                title: format!("s{i}"),
                text: text.clone(),
            })
            .collect();

        let mut permuted = sections.clone();
        let permuted_len = permuted.len();
        permuted.rotate_left(rotation % permuted_len);

        let ranked_a = rank_sections(sections.clone(), &query, None);
        let ranked_b = rank_sections(permuted.clone(), &query, None);

        // Scores descend in both runs
        for pair in ranked_a.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }

        // The score multiset is permutation-invariant
        let mut scores_a: Vec<f32> = ranked_a.iter().map(|r| r.score).collect();
        let mut scores_b: Vec<f32> = ranked_b.iter().map(|r| r.score).collect();
        scores_a.sort_by(|a, b| a.partial_cmp(b).unwrap());
        scores_b.sort_by(|a, b| a.partial_cmp(b).unwrap());
        prop_assert_eq!(scores_a, scores_b);

        // Within each run, exact-score ties preserve input order
        for (run, input) in [(&ranked_a, &sections), (&ranked_b, &permuted)] {
            let position = |title: &str| {
                input.iter().position(|s| s.title == title).unwrap()
            };
            for pair in run.windows(2) {
                if pair[0].score == pair[1].score {
                    prop_assert!(
                        position(&pair[0].section.title) < position(&pair[1].section.title)
                    );
                }
            }
        }
    }

    /// Repeated runs over identical input produce byte-identical output,
    /// including when the font-clustering path and its RNG are exercised.
    #[test]
    fn extraction_is_idempotent(
        size_indices in prop::collection::vec(0usize..5, 4..24),
        words in prop::collection::vec(arb_text(3), 4..24),
    ) {
        let pool = [24.0f32, 18.0, 14.0, 11.0, 9.0];
        let pages: Vec<RawPage> = vec![RawPage::new(
            size_indices
                .iter()
                .zip(words.iter())
                .enumerate()
                .map(|(i, (&s, w))| RawLine::solid(w.clone(), pool[s], i as f32 * 14.0))
                .collect(),
        )];

        let pipeline = OutlinePipeline::new();
        let first = serde_json::to_string(&pipeline.extract(&pages).unwrap()).unwrap();
        let second = serde_json::to_string(&pipeline.extract(&pages).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Section segmentation partitions each page's anchored region with no
    /// gaps and no overlaps.
    #[test]
    fn segmentation_partitions_each_page(
        raw_lines in prop::collection::vec((arb_text(16), 0usize..3, 0.0f32..800.0), 1..20),
        page_breaks in prop::collection::vec(any::<bool>(), 1..20),
    ) {
        let config = ExtractionConfig::default();
        let mut page = 1u32;
        let mut lines = Vec::new();
        for ((text, size_idx, y), brk) in raw_lines.iter().zip(page_breaks.iter()) {
            if *brk {
                page += 1;
            }
            lines.push(TextLine::new(text.clone(), SIZE_POOL[*size_idx], *y, page));
        }

        let sections = segment_document("doc", &lines, &config);

        for page_num in 1..=page {
            let page_lines: Vec<&TextLine> =
                lines.iter().filter(|l| l.page == page_num).collect();
            if page_lines.is_empty() {
                continue;
            }
            let max_font = page_lines
                .iter()
                .map(|l| l.font_size)
                .fold(f32::MIN, f32::max);
            let first_anchor = page_lines.iter().position(|l| {
                l.font_size >= max_font - config.heading_font_tolerance
                    && l.word_count <= config.heading_max_words
            });

            let joined: String = sections
                .iter()
                .filter(|s| s.page == page_num)
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            match first_anchor {
                Some(start) => {
                    let expected = page_lines[start..]
                        .iter()
                        .map(|l| l.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    prop_assert_eq!(joined, expected);
                },
                None => prop_assert!(joined.is_empty()),
            }
        }
    }
}
