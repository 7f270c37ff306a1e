//! Error types for the outline extraction and ranking core.
//!
//! This module defines all error types that can occur while classifying
//! headings, segmenting sections, and ranking them against a query.

/// Result type alias for extraction and ranking operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Clustering was asked for more groups than the input can support
    #[error("Degenerate clustering input: {distinct} distinct point(s) for {requested} cluster(s)")]
    ClusteringDegenerate {
        /// Number of pairwise-distinct feature points available
        distinct: usize,
        /// Number of clusters requested
        requested: usize,
    },

    /// The embedding backend failed or returned unusable vectors
    #[error("Embedding backend error: {0}")]
    Embedding(String),

    /// A document handle could not be read or decoded by the caller
    #[error("Malformed document input: {0}")]
    MalformedInput(String),
}
