//! heatgrid-core — shared types for the clustered heatmap pipeline.
//!
//! Holds the per-context `TimeSeriesTable`, the pipeline result
//! `ClusteredHeatmap`, the `heatgrid.toml` configuration and the error
//! taxonomy shared by every other crate.

pub mod config;
pub mod error;
pub mod freq;
pub mod types;

pub use config::HeatgridConfig;
pub use error::{PipelineError, PipelineResult, SourceError, SourceResult};
pub use freq::{freq_secs, parse_duration};
pub use types::*;
