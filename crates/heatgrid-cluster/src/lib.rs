//! heatgrid-cluster — grouping similar metrics.
//!
//! Each metric is one point in time-sample space. `KMeans` partitions the
//! points, keeping the lowest-inertia run over several k-means++
//! initializations; `order_by_cluster` then lays the metrics out so that
//! members of a cluster are contiguous.
//!
//! # Algorithm
//!
//! ```text
//! for run in 0..n_init:
//!     centroids = kmeans++(points)
//!     repeat until centroid shift <= tol or max_iter:
//!         assign each point to its nearest centroid
//!         reseed empty clusters with the farthest point
//!         move centroids to cluster means
//!     keep run if inertia < best
//! relabel clusters by first appearance
//! ```

pub mod error;
pub mod kmeans;
pub mod order;

pub use error::{ClusterError, ClusterResult};
pub use kmeans::{KMeans, KMeansFit};
pub use order::{ClusterOrder, display_label, order_by_cluster};
