//! # Outline Oxide
//!
//! Document outline extraction and persona-driven section ranking.
//!
//! The crate consumes plain line records from an external layout engine
//! (per page, each line's span texts, span font sizes, and top-Y
//! coordinate) and produces two artifacts:
//!
//! - **Outline**: the document title plus leveled headings (H1–H3) with
//!   page references, via typographic classification (font-size thresholds
//!   or seeded k-means over sizes) or semantic-augmented classification
//!   (typography fused with text embeddings).
//! - **Ranked sections**: page-scoped sections ordered by relevance to a
//!   free-text persona/task query, via embedding cosine similarity or a
//!   lexical Jaccard fallback.
//!
//! Parsing documents, serving results, and loading embedding models are
//! the caller's concern. The embedding backend enters as an explicitly
//! constructed [`embedding::Embedder`] so tests can inject a stub.
//!
//! ## Quick Start
//!
//! ```
//! use outline_oxide::extract::{RawLine, RawPage};
//! use outline_oxide::pipeline::OutlinePipeline;
//!
//! let pages = vec![RawPage::new(vec![
//!     RawLine::solid("Annual Report", 24.0, 10.0),
//!     RawLine::solid("Revenue", 18.0, 60.0),
//!     RawLine::solid("Revenue grew strongly.", 10.0, 90.0),
//! ])];
//!
//! let outline = OutlinePipeline::new().extract(&pages)?;
//! assert_eq!(outline.title, "Annual Report");
//! # Ok::<(), outline_oxide::error::Error>(())
//! ```
//!
//! ## Determinism
//!
//! Repeated runs on identical input produce identical output: clustering
//! uses a fixed-seed RNG with ordered restarts, and every sort breaks ties
//! deterministically.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Line extraction
pub mod extract;

// Embedding capability
pub mod embedding;

// Layout analysis and heading classification
pub mod layout;

// Section segmentation
pub mod sections;

// Relevance ranking
pub mod ranking;

// Outline assembly
pub mod outline;

// Document pipelines
pub mod pipeline;

// Re-exports
pub use config::ExtractionConfig;
pub use embedding::{cosine_similarity, Embedder, HashingEmbedder};
pub use error::{Error, Result};
pub use extract::{extract_lines, RawLine, RawPage, RawSpan, TextLine};
pub use layout::{FontSizeClassifier, HeadingClassifier, HeadingLevel, SemanticClassifier};
pub use outline::{DocumentOutline, OutlineEntry, UNKNOWN_TITLE};
pub use pipeline::{
    top_sections_per_document, DocumentRecord, DocumentStatus, InsightPipeline, OutlinePipeline,
    PersonaInsights,
};
pub use ranking::{rank_sections, PersonaQuery, ScoredSection};
pub use sections::{segment_document, Section};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all
    /// other values, so sorting operations never panic on NaN.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}
