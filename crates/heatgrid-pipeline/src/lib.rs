//! heatgrid-pipeline — one request from contexts to an ordered heatmap.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run(params)
//!   ├── list_contexts() + select_contexts()   → matched contexts
//!   ├── assemble()                            → MetricMatrix (+ skipped contexts)
//!   ├── prepare()                             → normalized, filled, pruned
//!   ├── KMeans::fit(dense_rows())             → cluster labels
//!   └── order_by_cluster()                    → ClusteredHeatmap
//! ```
//!
//! Per-context fetch errors stop at assembly; everything that leaves
//! `run()` as an error is a terminal condition for the caller to display.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use heatgrid_cluster::{ClusterError, KMeans, order_by_cluster};
use heatgrid_core::{
    ClusteredHeatmap, HeatgridConfig, HeatmapParams, HeatmapRow, PipelineError, PipelineResult,
    freq_secs,
};
use heatgrid_matrix::{AssemblyOptions, assemble, prepare, select_contexts};
use heatgrid_source::MetricsSource;

/// Knobs that are not part of an individual request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: Option<u64>,
    pub fetch_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&HeatgridConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &HeatgridConfig) -> Self {
        Self {
            n_init: config.cluster.n_init,
            max_iter: config.cluster.max_iter,
            seed: config.cluster.seed,
            fetch_timeout: config.fetch_timeout(),
            max_concurrency: config.netdata.max_concurrency,
        }
    }
}

/// The clustered heatmap pipeline over a metrics source.
pub struct Pipeline<S> {
    source: Arc<S>,
    options: PipelineOptions,
}

impl<S> Clone for Pipeline<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            options: self.options.clone(),
        }
    }
}

impl<S: MetricsSource + 'static> Pipeline<S> {
    pub fn new(source: Arc<S>, options: PipelineOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Contexts of the space/room matching `params.contexts_regex`.
    pub async fn matched_contexts(&self, params: &HeatmapParams) -> PipelineResult<Vec<String>> {
        let available = self
            .source
            .list_contexts(&params.space_id, &params.room_id)
            .await?;
        let matched = select_contexts(&available, &params.contexts_regex)?;
        info!(
            available = available.len(),
            matched = matched.len(),
            pattern = %params.contexts_regex,
            "contexts selected"
        );
        Ok(matched)
    }

    /// Run the full pipeline for one request.
    pub async fn run(&self, params: &HeatmapParams) -> PipelineResult<ClusteredHeatmap> {
        let freq = validate(params)?;

        let contexts = self.matched_contexts(params).await?;
        if contexts.is_empty() {
            return Err(PipelineError::NoContextsMatched {
                pattern: params.contexts_regex.clone(),
            });
        }

        let options = AssemblyOptions {
            space_id: params.space_id.clone(),
            room_id: params.room_id.clone(),
            after: params.after,
            before: params.before,
            freq_secs: freq,
            fetch_timeout: self.options.fetch_timeout,
            max_concurrency: self.options.max_concurrency,
        };
        let mut assembly = assemble(Arc::clone(&self.source), &contexts, &options).await;
        let failed_contexts = assembly.failed_contexts();

        prepare(&mut assembly.matrix);
        let (metrics, points): (Vec<String>, Vec<Vec<f64>>) =
            assembly.matrix.dense_rows().into_iter().unzip();
        if metrics.is_empty() {
            return Err(PipelineError::NoUsableMetrics);
        }
        if params.n_clusters > metrics.len() {
            return Err(PipelineError::TooManyClusters {
                requested: params.n_clusters,
                available: metrics.len(),
            });
        }

        let fit = KMeans::new(params.n_clusters)
            .with_n_init(self.options.n_init)
            .with_max_iter(self.options.max_iter)
            .with_seed(self.options.seed)
            .fit(&points)
            .map_err(cluster_error)?;

        let order = order_by_cluster(&metrics, &fit.labels);
        let rows: Vec<HeatmapRow> = order
            .indices
            .iter()
            .zip(order.metrics)
            .zip(order.clusters.iter().zip(order.labels))
            .map(|((&i, metric), (&cluster, label))| HeatmapRow {
                metric,
                cluster,
                label,
                values: points[i].clone(),
            })
            .collect();

        info!(
            metrics = rows.len(),
            clusters = fit.n_clusters(),
            inertia = fit.inertia,
            failed = failed_contexts.len(),
            "heatmap clustered"
        );

        Ok(ClusteredHeatmap {
            times: assembly.matrix.times().to_vec(),
            rows,
            n_clusters: fit.n_clusters(),
            contexts,
            failed_contexts,
        })
    }
}

/// Check request parameters; returns the frequency in seconds.
fn validate(params: &HeatmapParams) -> PipelineResult<i64> {
    if params.n_clusters == 0 {
        return Err(PipelineError::InvalidParameter(
            "n_clusters must be at least 1".into(),
        ));
    }
    if params.after >= params.before {
        return Err(PipelineError::InvalidParameter(format!(
            "after ({}) must be earlier than before ({})",
            params.after, params.before
        )));
    }
    freq_secs(&params.freq)
}

fn cluster_error(e: ClusterError) -> PipelineError {
    match e {
        ClusterError::TooManyClusters {
            requested,
            available,
        } => PipelineError::TooManyClusters {
            requested,
            available,
        },
        ClusterError::EmptyInput => PipelineError::NoUsableMetrics,
        other => PipelineError::InvalidParameter(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> HeatmapParams {
        HeatmapParams {
            space_id: "space".into(),
            room_id: "room".into(),
            contexts_regex: "system".into(),
            after: -60,
            before: 0,
            freq: "10s".into(),
            n_clusters: 2,
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        assert_eq!(validate(&params()).unwrap(), 10);
    }

    #[test]
    fn validate_rejects_zero_clusters() {
        let mut p = params();
        p.n_clusters = 0;
        assert!(matches!(validate(&p), Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let mut p = params();
        p.after = 0;
        p.before = -60;
        assert!(matches!(validate(&p), Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn validate_rejects_bad_freq() {
        let mut p = params();
        p.freq = "often".into();
        assert!(matches!(validate(&p), Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn cluster_errors_map_to_pipeline_errors() {
        assert!(matches!(
            cluster_error(ClusterError::TooManyClusters {
                requested: 3,
                available: 2
            }),
            PipelineError::TooManyClusters {
                requested: 3,
                available: 2
            }
        ));
        assert!(matches!(
            cluster_error(ClusterError::EmptyInput),
            PipelineError::NoUsableMetrics
        ));
        assert!(matches!(
            cluster_error(ClusterError::ZeroClusters),
            PipelineError::InvalidParameter(_)
        ));
    }

    #[test]
    fn options_follow_config() {
        let mut config = HeatgridConfig::default();
        config.cluster.seed = Some(5);
        config.netdata.max_concurrency = 3;
        let options = PipelineOptions::from_config(&config);
        assert_eq!(options.seed, Some(5));
        assert_eq!(options.max_concurrency, 3);
        assert_eq!(options.n_init, 5);
    }
}
