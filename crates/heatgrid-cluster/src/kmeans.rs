//! K-means clustering with k-means++ initialization and restarts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{ClusterError, ClusterResult};

/// K-means configuration.
#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    n_init: usize,
    max_iter: usize,
    /// Relative tolerance on centroid movement, scaled by the mean
    /// per-dimension variance of the data.
    tol: f64,
    seed: Option<u64>,
}

/// Result of the best k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster of each input point, numbered by first appearance.
    pub labels: Vec<usize>,
    /// Centroid of each cluster, indexed by label.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from points to their centroid.
    pub inertia: f64,
    /// Lloyd iterations taken by the winning run.
    pub iterations: usize,
}

impl KMeansFit {
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            n_init: 5,
            max_iter: 300,
            tol: 1e-4,
            seed: None,
        }
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol.max(0.0);
        self
    }

    /// Fix the random seed for reproducible results.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Partition `points` into exactly `n_clusters` non-empty clusters.
    pub fn fit(&self, points: &[Vec<f64>]) -> ClusterResult<KMeansFit> {
        self.validate(points)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let tol = self.tol * mean_variance(points);

        let mut best: Option<KMeansFit> = None;
        for run in 0..self.n_init {
            let initial = kmeans_plusplus(points, self.n_clusters, &mut rng);
            let fit = lloyd(points, initial, self.max_iter, tol);
            debug!(run, inertia = fit.inertia, iterations = fit.iterations, "k-means run finished");
            if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        let best = best.ok_or(ClusterError::EmptyInput)?;
        Ok(canonicalize(best))
    }

    fn validate(&self, points: &[Vec<f64>]) -> ClusterResult<()> {
        if self.n_clusters == 0 {
            return Err(ClusterError::ZeroClusters);
        }
        let first = points.first().ok_or(ClusterError::EmptyInput)?;
        if self.n_clusters > points.len() {
            return Err(ClusterError::TooManyClusters {
                requested: self.n_clusters,
                available: points.len(),
            });
        }
        let expected = first.len();
        if let Some((row, p)) = points.iter().enumerate().find(|(_, p)| p.len() != expected) {
            return Err(ClusterError::RaggedInput {
                row,
                expected,
                found: p.len(),
            });
        }
        Ok(())
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of and squared distance to the nearest centroid; ties go to the
/// lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn mean_variance(points: &[Vec<f64>]) -> f64 {
    let dims = points.first().map_or(0, Vec::len);
    if dims == 0 {
        return 0.0;
    }
    let n = points.len() as f64;
    let total: f64 = (0..dims)
        .map(|d| {
            let mean = points.iter().map(|p| p[d]).sum::<f64>() / n;
            points.iter().map(|p| (p[d] - mean).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / dims as f64
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn kmeans_plusplus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())].clone());

    while centroids.len() < k {
        let distances: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = distances.iter().sum();

        if total <= 0.0 {
            // Every point coincides with a centroid.
            centroids.push(points[rng.random_range(0..points.len())].clone());
            continue;
        }

        let mut threshold = rng.random::<f64>() * total;
        let mut chosen = distances.iter().rposition(|d| *d > 0.0).unwrap_or(0);
        for (i, d) in distances.iter().enumerate() {
            threshold -= d;
            if threshold <= 0.0 && *d > 0.0 {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen].clone());
    }

    centroids
}

/// Give every empty cluster the point farthest from its own centroid,
/// taken from a cluster that can spare it.
fn reseed_empty(
    points: &[Vec<f64>],
    centroids: &mut [Vec<f64>],
    labels: &mut [usize],
    distances: &mut [f64],
) {
    let mut counts = vec![0usize; centroids.len()];
    for &l in labels.iter() {
        counts[l] += 1;
    }

    for c in 0..centroids.len() {
        if counts[c] > 0 {
            continue;
        }
        let donor = (0..points.len())
            .filter(|&i| counts[labels[i]] > 1)
            .max_by(|&a, &b| distances[a].total_cmp(&distances[b]));
        if let Some(i) = donor {
            counts[labels[i]] -= 1;
            counts[c] = 1;
            labels[i] = c;
            distances[i] = 0.0;
            centroids[c] = points[i].clone();
        }
    }
}

fn assign(
    points: &[Vec<f64>],
    centroids: &mut [Vec<f64>],
) -> (Vec<usize>, Vec<f64>) {
    let (mut labels, mut distances): (Vec<usize>, Vec<f64>) =
        points.iter().map(|p| nearest(p, centroids)).unzip();
    reseed_empty(points, centroids, &mut labels, &mut distances);
    (labels, distances)
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iter: usize, tol: f64) -> KMeansFit {
    let k = centroids.len();
    let dims = points[0].len();
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;
        let (labels, _) = assign(points, &mut centroids);

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &l) in points.iter().zip(&labels) {
            counts[l] += 1;
            for (s, v) in sums[l].iter_mut().zip(p) {
                *s += v;
            }
        }

        let mut shift = 0.0;
        for (c, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            if count == 0 {
                continue;
            }
            let mean: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
            shift += squared_distance(&centroids[c], &mean);
            centroids[c] = mean;
        }

        if shift <= tol {
            break;
        }
    }

    let (labels, distances) = assign(points, &mut centroids);
    KMeansFit {
        labels,
        centroids,
        inertia: distances.iter().sum(),
        iterations,
    }
}

/// Renumber clusters by first appearance in input order.
fn canonicalize(fit: KMeansFit) -> KMeansFit {
    let mut mapping = vec![usize::MAX; fit.centroids.len()];
    let mut next = 0;
    for &l in &fit.labels {
        if mapping[l] == usize::MAX {
            mapping[l] = next;
            next += 1;
        }
    }

    let mut centroids = vec![Vec::new(); next];
    for (old, centroid) in fit.centroids.into_iter().enumerate() {
        if mapping[old] != usize::MAX {
            centroids[mapping[old]] = centroid;
        }
    }

    KMeansFit {
        labels: fit.labels.iter().map(|&l| mapping[l]).collect(),
        centroids,
        inertia: fit.inertia,
        iterations: fit.iterations,
    }
}
