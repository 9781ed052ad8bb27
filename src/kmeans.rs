//! Multi-start k-means on top of `kmeans_colors`.
//!
//! `get_kmeans` is run once per initialization with seeds `seed`, `seed + 1`, ...
//! and the run with the lowest score is kept, so results are reproducible for a
//! given seed.

use kmeans_colors::{Calculate, Kmeans, get_kmeans};

/// Parameters for a multi-start k-means fit.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansRuns {
    /// Number of clusters to produce.
    pub n_clusters: usize,
    /// Number of independent runs; the best one is kept.
    pub n_init: usize,
    /// Upper bound on iterations per run.
    pub max_iter: usize,
    /// Score change below which a run is considered converged.
    pub converge: f32,
    pub seed: u64,
}

impl KMeansRuns {
    /// Returns the lowest-score run, or `None` when `n_init` is zero.
    ///
    /// Callers must ensure `1 <= n_clusters <= samples.len()`.
    pub fn fit<C: Calculate + Clone>(&self, samples: &[C]) -> Option<Kmeans<C>> {
        (0..self.n_init as u64)
            .map(|run| {
                get_kmeans(
                    self.n_clusters,
                    self.max_iter,
                    self.converge,
                    false,
                    samples,
                    self.seed.wrapping_add(run),
                )
            })
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Number of samples assigned to each centroid, indexed like `result.centroids`.
pub fn cluster_sizes<C>(result: &Kmeans<C>) -> Vec<usize> {
    let mut sizes = vec![0; result.centroids.len()];
    for &idx in &result.indices {
        sizes[idx as usize] += 1;
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    fn runs(n_clusters: usize) -> KMeansRuns {
        KMeansRuns {
            n_clusters,
            n_init: 10,
            max_iter: 50,
            converge: 0.0025,
            seed: 42,
        }
    }

    fn two_groups() -> Vec<Srgb> {
        let mut samples = vec![Srgb::new(0.9, 0.1, 0.1); 30];
        samples.extend(vec![Srgb::new(0.1, 0.2, 0.8); 20]);
        samples
    }

    #[test]
    fn test_separates_groups() {
        let samples = two_groups();
        let result = runs(2).fit(&samples).unwrap();

        assert_eq!(result.indices.len(), samples.len());
        assert!(result.indices[..30].iter().all(|&i| i == result.indices[0]));
        assert!(result.indices[30..].iter().all(|&i| i == result.indices[30]));
        assert_ne!(result.indices[0], result.indices[30]);

        let mut sizes = cluster_sizes(&result);
        sizes.sort();
        assert_eq!(sizes, vec![20, 30]);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let samples = two_groups();
        let a = runs(3).fit(&samples).unwrap();
        let b = runs(3).fit(&samples).unwrap();
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_no_runs() {
        let samples = two_groups();
        let none = KMeansRuns {
            n_init: 0,
            ..runs(2)
        };
        assert!(none.fit(&samples).is_none());
    }
}
