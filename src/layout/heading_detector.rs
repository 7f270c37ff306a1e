//! Heading level classification from line typography.
//!
//! Classifies each extracted line as H1, H2, H3, or body text. Two
//! typography-only strategies share this module, selected by the number of
//! distinct font sizes in the document:
//!
//! - **Threshold mode** (at most 3 distinct sizes): the sorted distinct
//!   sizes themselves become the level thresholds.
//! - **Font-clustering mode** (more than 3): seeded k-means partitions the
//!   1-dimensional size multiset and the resulting centroids, ranked
//!   descending, define the levels, capped at H3.
//!
//! The semantic strategy lives in [`crate::layout::semantic`]; all
//! strategies implement [`HeadingClassifier`].

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::extract::TextLine;
use crate::layout::clustering::KMeans;
use crate::utils::safe_float_cmp;

/// Hierarchical rank of a heading, H1 most prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Main heading (largest)
    H1,
    /// Section heading
    H2,
    /// Subsection heading (smallest retained)
    H3,
}

impl HeadingLevel {
    /// Level for a 0-based prominence rank; ranks past H3 are non-heading.
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(HeadingLevel::H1),
            1 => Some(HeadingLevel::H2),
            2 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    /// 0-based prominence rank (0 = H1).
    pub fn rank(&self) -> usize {
        match self {
            HeadingLevel::H1 => 0,
            HeadingLevel::H2 => 1,
            HeadingLevel::H3 => 2,
        }
    }

    /// Display label, `"H1"` through `"H3"`.
    pub fn label(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

/// A heading classification strategy.
///
/// Returns one entry per input line: the assigned level, or `None` for body
/// text. Strategies are interchangeable; pipelines select a variant and the
/// rest of the flow is identical.
pub trait HeadingClassifier {
    /// Classify every line of a document.
    fn classify(&self, lines: &[TextLine]) -> Result<Vec<Option<HeadingLevel>>>;
}

/// Typography-only classifier over line font sizes.
///
/// Picks threshold mode or font-clustering mode per document based on the
/// distinct-size count.
#[derive(Debug, Clone, Default)]
pub struct FontSizeClassifier {
    config: ExtractionConfig,
}

impl FontSizeClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with explicit configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    fn classify_by_thresholds(
        &self,
        lines: &[TextLine],
        thresholds: &[f32],
    ) -> Vec<Option<HeadingLevel>> {
        lines
            .iter()
            .map(|line| {
                threshold_level(line.font_size, thresholds, self.config.threshold_tolerance)
            })
            .collect()
    }

    fn classify_by_clusters(
        &self,
        lines: &[TextLine],
        distinct_count: usize,
    ) -> Result<Vec<Option<HeadingLevel>>> {
        let k = self.config.max_font_clusters.min(distinct_count);
        let sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
        let data =
            Array2::from_shape_vec((sizes.len(), 1), sizes).expect("shape matches size count");

        // distinct_count exceeds k here, so the fit cannot be degenerate
        let fit = KMeans::new(k)
            .with_seed(self.config.kmeans_seed)
            .with_restarts(self.config.kmeans_restarts)
            .with_max_iter(self.config.kmeans_max_iter)
            .fit(&data)?;

        let mut centers: Vec<f32> = fit.centroids.column(0).iter().copied().collect();
        centers.sort_by(|a, b| safe_float_cmp(*b, *a));

        Ok(lines
            .iter()
            .map(|line| centroid_level(line.font_size, &centers, self.config.centroid_tolerance))
            .collect())
    }
}

impl HeadingClassifier for FontSizeClassifier {
    fn classify(&self, lines: &[TextLine]) -> Result<Vec<Option<HeadingLevel>>> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let distinct = distinct_sizes(lines);
        if distinct.len() <= 3 {
            log::debug!("threshold mode over {} distinct size(s)", distinct.len());
            Ok(self.classify_by_thresholds(lines, &distinct))
        } else {
            log::debug!("font-clustering mode over {} distinct size(s)", distinct.len());
            self.classify_by_clusters(lines, distinct.len())
        }
    }
}

/// Distinct font sizes in descending order.
fn distinct_sizes(lines: &[TextLine]) -> Vec<f32> {
    let mut sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
    sizes.sort_by(|a, b| safe_float_cmp(*b, *a));
    sizes.dedup_by(|a, b| a == b);
    sizes
}

/// Level for a size against descending thresholds: the first threshold the
/// size clears (within tolerance) wins. No match means body text.
fn threshold_level(size: f32, thresholds: &[f32], tolerance: f32) -> Option<HeadingLevel> {
    thresholds
        .iter()
        .position(|&t| size >= t - tolerance)
        .and_then(HeadingLevel::from_rank)
}

/// Level for a size against descending cluster centers: the nearest center
/// claims the line, but only within `tolerance` and only if that center
/// ranks H1–H3. Ties go to the more prominent center.
fn centroid_level(size: f32, ranked_centers: &[f32], tolerance: f32) -> Option<HeadingLevel> {
    let mut nearest: Option<(usize, f32)> = None;
    for (rank, &center) in ranked_centers.iter().enumerate() {
        let dist = (size - center).abs();
        if nearest.map_or(true, |(_, best)| dist < best) {
            nearest = Some((rank, dist));
        }
    }
    match nearest {
        Some((rank, dist)) if dist <= tolerance => HeadingLevel::from_rank(rank),
        _ => None,
    }
}
