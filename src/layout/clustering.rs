//! Deterministic k-means clustering for typographic feature analysis.
//!
//! This module implements seeded k-means over [`ndarray`] feature matrices.
//! It backs both heading-classification strategies: 1-dimensional font-size
//! partitioning, and the semantic feature space of typography plus text
//! embeddings.
//!
//! Determinism is a hard requirement: repeated runs on identical input must
//! produce identical clusters. All randomness flows from one fixed-seed RNG,
//! restarts run in a fixed order, and ties resolve to the lower index.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Error, Result};

/// Seeded k-means with multiple restarts.
///
/// Each restart draws pairwise-distinct starting centroids from the data,
/// iterates assignment/update to convergence, and the restart with the
/// lowest inertia wins. Restarts that end with an empty cluster are
/// penalized so a well-formed run is preferred when one exists.
#[derive(Debug, Clone)]
pub struct KMeans {
    clusters: usize,
    seed: u64,
    restarts: usize,
    max_iter: usize,
}

/// Result of a k-means fit: final centroids and per-row cluster labels.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster centroids, one row per cluster
    pub centroids: Array2<f32>,
    /// Cluster id assigned to each input row
    pub labels: Vec<usize>,
    /// Sum of squared distances from rows to their centroids
    pub inertia: f32,
}

impl KMeans {
    /// Create a k-means instance for the given cluster count.
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            seed: 42,
            restarts: 10,
            max_iter: 300,
        }
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Set the iteration cap per restart.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Fit the clustering to a feature matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClusteringDegenerate`] when the matrix holds fewer
    /// pairwise-distinct rows than the requested cluster count. Callers that
    /// can operate at a reduced cluster count retry once with fewer
    /// clusters.
    pub fn fit(&self, data: &Array2<f32>) -> Result<KMeansFit> {
        let distinct = count_distinct_rows(data);
        if self.clusters == 0 || distinct < self.clusters {
            return Err(Error::ClusteringDegenerate {
                distinct,
                requested: self.clusters,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best = self.run_once(data, &mut rng);
        for _ in 1..self.restarts {
            let fit = self.run_once(data, &mut rng);
            if fit.inertia < best.inertia {
                best = fit;
            }
        }

        log::debug!(
            "k-means: {} row(s) into {} cluster(s), inertia {:.4}",
            data.nrows(),
            self.clusters,
            best.inertia
        );
        Ok(best)
    }

    /// One assignment/update run from a fresh starting configuration.
    fn run_once(&self, data: &Array2<f32>, rng: &mut StdRng) -> KMeansFit {
        let n = data.nrows();
        let dims = data.ncols();
        let k = self.clusters;

        // Start from k pairwise-distinct data rows so no cluster begins
        // empty. The distinct-row precheck in fit() guarantees k exist.
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        let mut chosen: Vec<usize> = Vec::with_capacity(k);
        for &i in &order {
            if chosen.iter().all(|&c| !rows_equal(data.row(c), data.row(i))) {
                chosen.push(i);
                if chosen.len() == k {
                    break;
                }
            }
        }

        let mut centroids = Array2::<f32>::zeros((k, dims));
        for (c, &i) in chosen.iter().enumerate() {
            centroids.row_mut(c).assign(&data.row(i));
        }

        // usize::MAX forces every label to register as changed on pass one
        let mut labels = vec![usize::MAX; n];
        for _ in 0..self.max_iter {
            let mut changed = false;
            for (i, row) in data.rows().into_iter().enumerate() {
                let nearest = nearest_centroid(&centroids, row);
                if labels[i] != nearest {
                    labels[i] = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut sums = Array2::<f32>::zeros((k, dims));
            let mut counts = vec![0usize; k];
            for (i, row) in data.rows().into_iter().enumerate() {
                let mut target = sums.row_mut(labels[i]);
                target += &row;
                counts[labels[i]] += 1;
            }
            for c in 0..k {
                // An emptied cluster keeps its previous centroid; the
                // restart penalty below handles runs that never recover
                if counts[c] > 0 {
                    let mean = sums.row(c).mapv(|v| v / counts[c] as f32);
                    centroids.row_mut(c).assign(&mean);
                }
            }
        }

        let mut counts = vec![0usize; k];
        let mut inertia = 0.0f32;
        for (i, row) in data.rows().into_iter().enumerate() {
            counts[labels[i]] += 1;
            inertia += squared_distance(centroids.row(labels[i]), row);
        }
        if counts.contains(&0) {
            inertia = f32::INFINITY;
        }

        KMeansFit {
            centroids,
            labels,
            inertia,
        }
    }
}

impl KMeansFit {
    /// Number of clusters in the fit.
    pub fn cluster_count(&self) -> usize {
        self.centroids.nrows()
    }

    /// Per-cluster mean of an external scalar, indexed by cluster id.
    ///
    /// Used to rank clusters by mean font size. A cluster with no members
    /// yields negative infinity so it ranks below every real cluster.
    pub fn cluster_means(&self, values: &[f32]) -> Vec<f32> {
        let k = self.cluster_count();
        let mut sums = vec![0.0f32; k];
        let mut counts = vec![0usize; k];
        for (&label, &value) in self.labels.iter().zip(values.iter()) {
            sums[label] += value;
            counts[label] += 1;
        }
        (0..k)
            .map(|c| {
                if counts[c] == 0 {
                    f32::NEG_INFINITY
                } else {
                    sums[c] / counts[c] as f32
                }
            })
            .collect()
    }
}

/// Index of the nearest centroid by squared distance; ties go to the lower
/// cluster index.
fn nearest_centroid(centroids: &Array2<f32>, point: ArrayView1<f32>) -> usize {
    let mut best = 0usize;
    let mut best_dist = f32::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(centroid, point);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

fn squared_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

fn rows_equal(a: ArrayView1<f32>, b: ArrayView1<f32>) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Number of pairwise-distinct rows. Quadratic, fine at document scale.
fn count_distinct_rows(data: &Array2<f32>) -> usize {
    let mut distinct: Vec<usize> = Vec::new();
    for i in 0..data.nrows() {
        if distinct.iter().all(|&j| !rows_equal(data.row(j), data.row(i))) {
            distinct.push(i);
        }
    }
    distinct.len()
}
