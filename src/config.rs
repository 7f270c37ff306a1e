//! Configuration for outline extraction and section ranking.

/// Tunable thresholds for line filtering, heading detection, and clustering.
///
/// The defaults reproduce the behavior the algorithms were calibrated
/// against; most callers use [`ExtractionConfig::default`] unchanged.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Minimum font size for a line to be a heading candidate.
    pub candidate_min_font_size: f32,

    /// Maximum word count for a heading candidate.
    pub candidate_max_words: usize,

    /// Minimum character count for a line to enter the semantic pipeline.
    pub min_line_chars: usize,

    /// Maximum word count for heading-like lines in section segmentation
    /// and semantic title selection.
    pub heading_max_words: usize,

    /// Page-one lines above this Y coordinate are title candidates.
    pub title_y_limit: f32,

    /// A line is heading-like when its font size is within this many points
    /// of the page maximum.
    pub heading_font_tolerance: f32,

    /// Tolerance applied when matching a font size against a sorted
    /// threshold in threshold mode.
    pub threshold_tolerance: f32,

    /// Maximum distance between a font size and a cluster centroid for the
    /// line to take that cluster's level.
    pub centroid_tolerance: f32,

    /// Upper bound on cluster count in font-clustering mode.
    pub max_font_clusters: usize,

    /// Cluster count for the semantic feature space.
    pub semantic_clusters: usize,

    /// Reduced cluster count retried once when the semantic feature space
    /// is degenerate.
    pub fallback_clusters: usize,

    /// Seed for the clustering RNG. Fixed so repeated runs on identical
    /// input produce identical output.
    pub kmeans_seed: u64,

    /// Number of independent k-means restarts; the lowest-inertia run wins.
    pub kmeans_restarts: usize,

    /// Iteration cap per k-means run.
    pub kmeans_max_iter: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create a configuration with default thresholds.
    pub fn new() -> Self {
        Self {
            candidate_min_font_size: 8.0,
            candidate_max_words: 15,
            min_line_chars: 4,
            heading_max_words: 12,
            title_y_limit: 250.0,
            heading_font_tolerance: 1.0,
            threshold_tolerance: 0.1,
            centroid_tolerance: 0.5,
            max_font_clusters: 4,
            semantic_clusters: 3,
            fallback_clusters: 2,
            kmeans_seed: 42,
            kmeans_restarts: 10,
            kmeans_max_iter: 300,
        }
    }

    /// Set the clustering RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.kmeans_seed = seed;
        self
    }

    /// Set the minimum font size for heading candidates.
    pub fn with_candidate_min_font_size(mut self, size: f32) -> Self {
        self.candidate_min_font_size = size;
        self
    }

    /// Set the Y limit under which page-one lines are title candidates.
    pub fn with_title_y_limit(mut self, limit: f32) -> Self {
        self.title_y_limit = limit;
        self
    }

    /// Set the heading-like font tolerance used by section segmentation.
    pub fn with_heading_font_tolerance(mut self, tolerance: f32) -> Self {
        self.heading_font_tolerance = tolerance;
        self
    }

    /// Set the number of k-means restarts.
    pub fn with_kmeans_restarts(mut self, restarts: usize) -> Self {
        self.kmeans_restarts = restarts;
        self
    }
}
