//! heatgrid-matrix — building the metrics × time matrix.
//!
//! # Architecture
//!
//! ```text
//! select_contexts()      ← regex, prefix-anchored
//!   ↓
//! assemble()             ← concurrent fetch, per-context timeout, skip on failure
//!   ├── resample()       → common freq grid
//!   └── outer_join()     → MetricMatrix (time × column)
//!   ↓
//! prepare()
//!   ├── normalize()      → min-max to [0, 1], constant columns → missing
//!   ├── fill_gaps()      → forward fill, then backward fill
//!   └── drop_empty_columns()
//!   ↓
//! dense_rows()           → one complete row per metric, for clustering
//! ```

pub mod assemble;
pub mod fill;
pub mod matrix;
pub mod normalize;
pub mod resample;
pub mod select;

pub use assemble::{Assembly, AssemblyOptions, ContextFailure, assemble};
pub use fill::{fill_gaps, forward_backward_fill};
pub use matrix::MetricMatrix;
pub use normalize::{min_max_scale, normalize};
pub use resample::resample;
pub use select::{ContextFilter, select_contexts};

use tracing::debug;

/// What `prepare()` removed or blanked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// Columns blanked by normalization (constant or empty).
    pub degenerate: Vec<String>,
    /// Columns dropped because they stayed entirely missing.
    pub dropped: Vec<String>,
}

/// Normalize, gap-fill and prune a freshly assembled matrix.
pub fn prepare(matrix: &mut MetricMatrix) -> PrepareReport {
    let degenerate = normalize(matrix);
    fill_gaps(matrix);
    let dropped = matrix.drop_empty_columns();
    debug!(
        degenerate = degenerate.len(),
        dropped = dropped.len(),
        remaining = matrix.num_columns(),
        "matrix prepared"
    );
    PrepareReport {
        degenerate,
        dropped,
    }
}
