//! Clustering error types.

use thiserror::Error;

pub type ClusterResult<T> = Result<T, ClusterError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("n_clusters must be at least 1")]
    ZeroClusters,

    #[error("requested {requested} clusters but only {available} points are available")]
    TooManyClusters { requested: usize, available: usize },

    #[error("no points to cluster")]
    EmptyInput,

    #[error("point {row} has {found} dimensions, expected {expected}")]
    RaggedInput {
        row: usize,
        expected: usize,
        found: usize,
    },
}
