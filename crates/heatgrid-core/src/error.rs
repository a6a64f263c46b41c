//! Error types shared across heatgrid crates.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for metrics source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while talking to a metrics source.
///
/// During matrix assembly these are caught per context and never abort
/// the whole run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("unknown context: {0}")]
    UnknownContext(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("missing configuration: {0}")]
    Config(String),
}

/// Terminal conditions surfaced to the caller of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no contexts matched pattern {pattern:?}")]
    NoContextsMatched { pattern: String },

    #[error("no usable metrics remain after normalization and pruning")]
    NoUsableMetrics,

    #[error("requested {requested} clusters but only {available} metrics are available")]
    TooManyClusters { requested: usize, available: usize },

    #[error("metrics source error: {0}")]
    Source(#[from] SourceError),
}

impl PipelineError {
    /// Whether the error comes from the data itself rather than from a
    /// malformed request or an unreachable source.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            PipelineError::NoContextsMatched { .. }
                | PipelineError::NoUsableMetrics
                | PipelineError::TooManyClusters { .. }
        )
    }
}
