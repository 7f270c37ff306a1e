//! Semantic-augmented heading classification.
//!
//! Fuses typography with text embeddings so stylistically similar headings
//! land on a consistent level even when their font sizes drift. Candidate
//! lines pass an eligibility filter, then each contributes the feature
//! vector `[font_size, y/1000, cap_ratio]` concatenated with its text
//! embedding. Seeded k-means groups the candidates and the groups are
//! ranked into H1–H3 by mean font size.

use ndarray::Array2;

use crate::config::ExtractionConfig;
use crate::embedding::{check_dimensions, Embedder};
use crate::error::{Error, Result};
use crate::extract::TextLine;
use crate::layout::clustering::{KMeans, KMeansFit};
use crate::layout::heading_detector::{HeadingClassifier, HeadingLevel};
use crate::utils::safe_float_cmp;

/// Heading classifier over typography plus text embeddings.
///
/// Holds a borrowed embedding backend; the backend is read-only shared
/// state and one instance serves any number of documents.
pub struct SemanticClassifier<'a> {
    embedder: &'a dyn Embedder,
    config: ExtractionConfig,
}

impl<'a> SemanticClassifier<'a> {
    /// Create a classifier with default thresholds.
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            config: ExtractionConfig::default(),
        }
    }

    /// Create a classifier with explicit configuration.
    pub fn with_config(embedder: &'a dyn Embedder, config: ExtractionConfig) -> Self {
        Self { embedder, config }
    }

    /// Eligibility filter for heading candidates.
    fn is_candidate(&self, line: &TextLine) -> bool {
        line.font_size >= self.config.candidate_min_font_size
            && line.word_count <= self.config.candidate_max_words
            && !line.ends_with_punct
    }

    /// Cluster the candidate feature matrix, retrying once at the reduced
    /// cluster count when the feature space is degenerate.
    fn cluster_candidates(&self, features: &Array2<f32>) -> Result<KMeansFit> {
        let kmeans = |k: usize| {
            KMeans::new(k)
                .with_seed(self.config.kmeans_seed)
                .with_restarts(self.config.kmeans_restarts)
                .with_max_iter(self.config.kmeans_max_iter)
        };

        match kmeans(self.config.semantic_clusters).fit(features) {
            Ok(fit) => Ok(fit),
            Err(Error::ClusteringDegenerate { distinct, requested }) => {
                log::warn!(
                    "semantic features degenerate ({distinct} distinct for {requested}); \
                     retrying with {} cluster(s)",
                    self.config.fallback_clusters
                );
                kmeans(self.config.fallback_clusters).fit(features)
            },
            Err(e) => Err(e),
        }
    }
}

impl HeadingClassifier for SemanticClassifier<'_> {
    fn classify(&self, lines: &[TextLine]) -> Result<Vec<Option<HeadingLevel>>> {
        let mut levels = vec![None; lines.len()];

        let candidates: Vec<usize> = (0..lines.len())
            .filter(|&i| self.is_candidate(&lines[i]))
            .collect();
        if candidates.is_empty() {
            log::debug!("no heading candidates among {} line(s)", lines.len());
            return Ok(levels);
        }

        let texts: Vec<String> = candidates.iter().map(|&i| lines[i].text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        let dims = self.embedder.dimensions();
        check_dimensions(&embeddings, dims)?;

        let mut features = Array2::<f32>::zeros((candidates.len(), 3 + dims));
        for (row, (&i, embedding)) in candidates.iter().zip(embeddings.iter()).enumerate() {
            let line = &lines[i];
            features[[row, 0]] = line.font_size;
            features[[row, 1]] = line.y / 1000.0;
            features[[row, 2]] = line.cap_ratio;
            for (col, &v) in embedding.iter().enumerate() {
                features[[row, 3 + col]] = v;
            }
        }

        let fit = self.cluster_candidates(&features)?;

        // Rank clusters into levels by mean candidate font size, largest
        // first; the cluster count never exceeds 3, so every candidate
        // receives a level
        let font_sizes: Vec<f32> = candidates.iter().map(|&i| lines[i].font_size).collect();
        let means = fit.cluster_means(&font_sizes);
        let mut ranked: Vec<usize> = (0..fit.cluster_count()).collect();
        ranked.sort_by(|a, b| safe_float_cmp(means[*b], means[*a]));
        let mut level_of = vec![None; fit.cluster_count()];
        for (rank, &cluster) in ranked.iter().enumerate() {
            level_of[cluster] = HeadingLevel::from_rank(rank);
        }

        for (row, &i) in candidates.iter().enumerate() {
            levels[i] = level_of[fit.labels[row]];
        }
        Ok(levels)
    }
}
