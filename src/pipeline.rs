//! Document pipelines with per-document failure isolation.
//!
//! Two entry points wrap the component flow:
//!
//! ```text
//! RawPage[]
//!     ↓
//! [extract_lines]  (spans → TextLine[])
//!     ↓
//! [HeadingClassifier]  (typographic or semantic variant)
//!     ↓
//! [title selection + outline assembly]  →  DocumentOutline
//! ```
//!
//! and, in parallel for relevance work:
//!
//! ```text
//! RawPage[] → [extract_lines] → [segment_document] → Section[]
//!     ↓
//! [rank_sections]  (embedding or lexical)  →  PersonaInsights
//! ```
//!
//! Batch operations isolate failures at the document boundary: one
//! unreadable or degenerate document becomes a structured failure record
//! (or a logged skip) and its siblings continue.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::extract::{extract_lines, RawPage, TextLine};
use crate::layout::heading_detector::{FontSizeClassifier, HeadingClassifier};
use crate::layout::semantic::SemanticClassifier;
use crate::outline::{assemble_plain, assemble_semantic, DocumentOutline};
use crate::ranking::{rank_sections, PersonaQuery, ScoredSection};
use crate::sections::{segment_document, Section};

/// Outline extraction pipeline.
///
/// Without an embedding backend the typographic classifier runs
/// (threshold or font-clustering mode, chosen per document). Attaching a
/// backend with [`OutlinePipeline::with_embedder`] switches the whole
/// pipeline to the semantic variant: semantic classification, top-of-page
/// title selection, and `(page, text)` outline ordering.
pub struct OutlinePipeline<'a> {
    config: ExtractionConfig,
    embedder: Option<&'a dyn Embedder>,
}

impl Default for OutlinePipeline<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> OutlinePipeline<'a> {
    /// Create a typographic pipeline with default thresholds.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            embedder: None,
        }
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self {
            config,
            embedder: None,
        }
    }

    /// Attach an embedding backend, switching to the semantic variant.
    pub fn with_embedder(mut self, embedder: &'a dyn Embedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Extract the outline of one document.
    ///
    /// A zero-line document is not an error: it yields the sentinel title
    /// and an empty outline.
    pub fn extract(&self, pages: &[RawPage]) -> Result<DocumentOutline> {
        let lines = extract_lines(pages);
        if lines.is_empty() {
            log::info!("empty document, returning sentinel outline");
            return Ok(DocumentOutline::unknown());
        }

        match self.embedder {
            Some(embedder) => {
                // The semantic variant drops very short lines before any
                // other processing
                let lines: Vec<TextLine> = lines
                    .into_iter()
                    .filter(|l| l.text.chars().count() >= self.config.min_line_chars)
                    .collect();
                if lines.is_empty() {
                    return Ok(DocumentOutline::unknown());
                }
                let classifier = SemanticClassifier::with_config(embedder, self.config.clone());
                let levels = classifier.classify(&lines)?;
                Ok(assemble_semantic(&lines, &levels, &self.config))
            },
            None => {
                let classifier = FontSizeClassifier::with_config(self.config.clone());
                let levels = classifier.classify(&lines)?;
                Ok(assemble_plain(&lines, &levels))
            },
        }
    }

    /// Extract outlines for a batch of documents.
    ///
    /// Each item pairs a document id with its loaded pages, or with the
    /// load error the caller hit. Every failure (unreadable input or a
    /// pipeline error) becomes a failure record; the batch always runs to
    /// completion.
    pub fn extract_batch<I>(&self, documents: I) -> Vec<DocumentRecord>
    where
        I: IntoIterator<Item = (String, Result<Vec<RawPage>>)>,
    {
        documents
            .into_iter()
            .map(|(document, pages)| {
                let status = match pages.and_then(|p| self.extract(&p)) {
                    Ok(outline) => {
                        log::info!("processed {document}: {} outline entries", outline.outline.len());
                        DocumentStatus::Extracted { outline }
                    },
                    Err(e) => {
                        log::error!("failed to process {document}: {e}");
                        DocumentStatus::Failed {
                            error: e.to_string(),
                        }
                    },
                };
                DocumentRecord { document, status }
            })
            .collect()
    }
}

/// Per-document outcome of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document identifier as supplied by the caller
    pub document: String,
    /// Outline or failure description
    #[serde(flatten)]
    pub status: DocumentStatus,
}

/// Outcome payload: the extracted outline, or an error description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Extraction succeeded
    Extracted {
        /// The outline result
        #[serde(flatten)]
        outline: DocumentOutline,
    },
    /// Extraction failed; the document was skipped
    Failed {
        /// Human-readable failure description
        error: String,
    },
}

/// Persona-driven section ranking pipeline.
///
/// Pools sections across documents, ranks them against the persona/task
/// query, and produces the insight report. Ranking runs through the
/// embedding backend when one is attached, otherwise through the lexical
/// fallback.
pub struct InsightPipeline<'a> {
    config: ExtractionConfig,
    embedder: Option<&'a dyn Embedder>,
    top_k: usize,
}

impl Default for InsightPipeline<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> InsightPipeline<'a> {
    /// Create a pipeline with default thresholds and a top-10 report.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            embedder: None,
            top_k: 10,
        }
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self {
            config,
            embedder: None,
            top_k: 10,
        }
    }

    /// Attach an embedding backend.
    pub fn with_embedder(mut self, embedder: &'a dyn Embedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set how many sections the report keeps.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Pool sections across documents.
    ///
    /// Returns every input document id (for report metadata) alongside the
    /// pooled sections. A document whose pages failed to load is logged
    /// and contributes no sections; the rest of the batch continues.
    pub fn collect_sections<I>(&self, documents: I) -> (Vec<String>, Vec<Section>)
    where
        I: IntoIterator<Item = (String, Result<Vec<RawPage>>)>,
    {
        let mut names = Vec::new();
        let mut sections = Vec::new();
        for (document, pages) in documents {
            match pages {
                Ok(pages) => {
                    let lines = extract_lines(&pages);
                    sections.extend(segment_document(&document, &lines, &self.config));
                },
                Err(e) => log::error!("skipping {document}: {e}"),
            }
            names.push(document);
        }
        (names, sections)
    }

    /// Rank pooled sections against the query, best first.
    pub fn rank<I>(&self, documents: I, query: &PersonaQuery) -> Vec<ScoredSection>
    where
        I: IntoIterator<Item = (String, Result<Vec<RawPage>>)>,
    {
        let (_, sections) = self.collect_sections(documents);
        rank_sections(sections, &query.query_string(), self.embedder)
    }

    /// Produce the full insight report for a document batch.
    pub fn run<I>(&self, documents: I, query: &PersonaQuery) -> PersonaInsights
    where
        I: IntoIterator<Item = (String, Result<Vec<RawPage>>)>,
    {
        let (names, sections) = self.collect_sections(documents);
        let ranked = rank_sections(sections, &query.query_string(), self.embedder);
        PersonaInsights::from_ranked(names, query, &ranked, self.top_k)
    }
}

/// The persona insight report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInsights {
    /// Batch and query context
    pub metadata: InsightMetadata,
    /// Top-ranked sections with 1-based importance ranks
    pub sections: Vec<RankedSectionRef>,
    /// The same top sections carrying their full text
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Context block of an insight report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightMetadata {
    /// Every document id in the batch, including failed loads
    pub documents: Vec<String>,
    /// The persona half of the query
    pub persona: String,
    /// The task half of the query
    pub job_to_be_done: String,
}

/// A ranked section reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSectionRef {
    /// Source document id
    pub document: String,
    /// 1-based page number
    pub page: u32,
    /// Section title
    pub title: String,
    /// 1-based rank within the truncated report
    pub importance_rank: usize,
}

/// A ranked section's text payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Source document id
    pub document: String,
    /// 1-based page number
    pub page: u32,
    /// Full section text; summarization is a downstream concern
    pub refined_text: String,
    /// 1-based rank within the truncated report
    pub importance_rank: usize,
}

impl PersonaInsights {
    /// Build a report from a ranked section list.
    pub fn from_ranked(
        documents: Vec<String>,
        query: &PersonaQuery,
        ranked: &[ScoredSection],
        top_k: usize,
    ) -> Self {
        let mut sections = Vec::new();
        let mut subsection_analysis = Vec::new();
        for (i, scored) in ranked.iter().take(top_k).enumerate() {
            let rank = i + 1;
            sections.push(RankedSectionRef {
                document: scored.section.document.clone(),
                page: scored.section.page,
                title: scored.section.title.clone(),
                importance_rank: rank,
            });
            subsection_analysis.push(SubsectionAnalysis {
                document: scored.section.document.clone(),
                page: scored.section.page,
                refined_text: scored.section.text.clone(),
                importance_rank: rank,
            });
        }

        Self {
            metadata: InsightMetadata {
                documents,
                persona: query.persona.clone(),
                job_to_be_done: query.task.clone(),
            },
            sections,
            subsection_analysis,
        }
    }
}

/// Group a ranked list by document, keeping the first `limit` sections of
/// each document in rank order. Documents appear in order of their best
/// section.
pub fn top_sections_per_document(
    ranked: &[ScoredSection],
    limit: usize,
) -> IndexMap<String, Vec<Section>> {
    let mut grouped: IndexMap<String, Vec<Section>> = IndexMap::new();
    for scored in ranked {
        let entry = grouped.entry(scored.section.document.clone()).or_default();
        if entry.len() < limit {
            entry.push(scored.section.clone());
        }
    }
    grouped
}
