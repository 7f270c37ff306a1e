//! Relevance ranking of sections against a persona/task query.
//!
//! Scores every section against a free-text query and returns a total
//! order, best first. Scoring runs through the embedding backend when one
//! is available; otherwise, or when the backend fails, a lexical Jaccard
//! fallback over case-folded word tokens takes over. The sort is stable:
//! sections with equal scores keep their input order.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::embedding::{cosine_similarity, Embedder};
use crate::error::Result;
use crate::sections::Section;
use crate::utils::safe_float_cmp;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\w+").expect("static word pattern compiles");
}

/// Case-folded word tokens of a text, in order of appearance.
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A persona and its job-to-be-done, the two halves of a relevance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaQuery {
    /// Who is asking
    pub persona: String,
    /// What they need to get done
    pub task: String,
}

impl PersonaQuery {
    /// Create a query from its parts.
    pub fn new(persona: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            task: task.into(),
        }
    }

    /// Render the canonical query string fed to the ranker.
    pub fn query_string(&self) -> String {
        format!("{}. Task: {}", self.persona, self.task)
    }
}

/// A section together with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSection {
    /// The scored section
    pub section: Section,
    /// Relevance score; comparable only within one ranking call
    pub score: f32,
}

/// Score and totally order sections against a query, best first.
///
/// With an embedding backend, scores are cosine similarities between the
/// query vector and each section's `"<title> - <text>"` vector. Without
/// one, or if the backend errors, scoring falls back to lexical overlap.
/// Equal scores preserve input order.
pub fn rank_sections(
    sections: Vec<Section>,
    query: &str,
    embedder: Option<&dyn Embedder>,
) -> Vec<ScoredSection> {
    let scores = match embedder {
        Some(backend) => match embedding_scores(&sections, query, backend) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("embedding backend unavailable ({e}); using lexical fallback");
                lexical_scores(&sections, query)
            },
        },
        None => {
            log::debug!("no embedding backend configured; using lexical fallback");
            lexical_scores(&sections, query)
        },
    };

    let mut ranked: Vec<ScoredSection> = sections
        .into_iter()
        .zip(scores)
        .map(|(section, score)| ScoredSection { section, score })
        .collect();
    // Stable sort: exact-score ties keep their original relative order
    ranked.sort_by(|a, b| safe_float_cmp(b.score, a.score));
    ranked
}

fn embedding_scores(sections: &[Section], query: &str, backend: &dyn Embedder) -> Result<Vec<f32>> {
    let query_vec = backend.embed(query)?;
    let texts: Vec<String> = sections
        .iter()
        .map(|s| format!("{} - {}", s.title, s.text))
        .collect();
    let section_vecs = backend.embed_batch(&texts)?;
    Ok(section_vecs
        .iter()
        .map(|v| cosine_similarity(&query_vec, v))
        .collect())
}

fn lexical_scores(sections: &[Section], query: &str) -> Vec<f32> {
    let query_tokens: BTreeSet<String> = word_tokens(query).into_iter().collect();
    sections
        .iter()
        .map(|s| {
            let section_tokens: BTreeSet<String> = word_tokens(&s.text).into_iter().collect();
            jaccard(&query_tokens, &section_tokens)
        })
        .collect()
}

/// Jaccard similarity of two token sets; 0.0 when both are empty.
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::error::Error;

    fn section(title: &str, text: &str) -> Section {
        Section {
            document: "doc.pdf".to_string(),
            page: 1,
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            4
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Embedding("model not loaded".to_string()))
        }
    }

    #[test]
    fn test_word_tokens_case_folded() {
        assert_eq!(word_tokens("Revenue GREW, fast!"), vec!["revenue", "grew", "fast"]);
        assert!(word_tokens("...").is_empty());
    }

    #[test]
    fn test_query_string_format() {
        let query = PersonaQuery::new("Investment analyst", "find revenue drivers");
        assert_eq!(
            query.query_string(),
            "Investment analyst. Task: find revenue drivers"
        );
    }

    #[test]
    fn test_lexical_overlap_outranks_no_overlap() {
        let sections = vec![
            section("Weather", "it rained"),
            section("Revenue", "revenue grew"),
        ];

        let ranked = rank_sections(sections, "revenue insights", None);
        assert_eq!(ranked[0].section.title, "Revenue");
        assert!(ranked[0].score > 0.0);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let sections = vec![
            section("First", "nothing in common"),
            section("Second", "also nothing shared"),
            section("Third", "still zero overlap"),
        ];

        let ranked = rank_sections(sections, "quarterly revenue", None);
        let titles: Vec<&str> = ranked.iter().map(|r| r.section.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_embedding_strategy_ranks_by_similarity() {
        let embedder = HashingEmbedder::default();
        let sections = vec![
            section("Weather", "it rained all week"),
            section("Revenue", "revenue grew this quarter"),
        ];

        let ranked = rank_sections(sections, "revenue insights", Some(&embedder));
        assert_eq!(ranked[0].section.title, "Revenue");
    }

    #[test]
    fn test_failing_backend_falls_back_to_lexical() {
        let sections = vec![
            section("Weather", "it rained"),
            section("Revenue", "revenue grew"),
        ];

        let ranked = rank_sections(sections, "revenue insights", Some(&FailingEmbedder));
        assert_eq!(ranked[0].section.title, "Revenue");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_empty_sections() {
        let ranked = rank_sections(Vec::new(), "anything", None);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_jaccard_counts_shared_fraction() {
        let a: BTreeSet<String> = ["revenue", "insights"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let b: BTreeSet<String> = ["revenue", "grew"].iter().map(|s| s.to_string()).collect();
        // one shared token of three total
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }
}
