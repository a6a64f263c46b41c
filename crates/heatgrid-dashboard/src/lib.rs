//! heatgrid-dashboard — server-rendered web UI and JSON API.
//!
//! The page is a parameter form over the configured defaults; submitting it
//! reruns the pipeline and renders the heatmap inline.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `/` | Form + heatmap |
//! | `/heatmap.svg` | Heatmap image |
//! | `/api/v1/contexts` | Matched contexts (JSON) |
//! | `/api/v1/heatmap` | Clustered heatmap (JSON) |

pub mod api;
pub mod pages;
pub mod query;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

use heatgrid_core::{HeatgridConfig, HeatmapParams, PipelineError};
use heatgrid_pipeline::Pipeline;
use heatgrid_render::RenderOptions;
use heatgrid_source::MetricsSource;

/// Shared state for dashboard handlers.
pub struct DashboardState<S> {
    pub pipeline: Pipeline<S>,
    /// Parameters used for any field the request leaves out.
    pub defaults: HeatmapParams,
    pub render: RenderOptions,
}

impl<S> Clone for DashboardState<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            defaults: self.defaults.clone(),
            render: self.render,
        }
    }
}

impl<S: MetricsSource + 'static> DashboardState<S> {
    pub fn new(pipeline: Pipeline<S>, config: &HeatgridConfig) -> Self {
        Self {
            pipeline,
            defaults: config.params(),
            render: RenderOptions {
                fig_w: config.render.fig_w,
                fig_h: config.render.fig_h,
            },
        }
    }
}

/// Build the dashboard router.
pub fn dashboard_router<S: MetricsSource + 'static>(state: DashboardState<S>) -> Router {
    Router::new()
        .route("/", get(pages::index::<S>))
        .route("/heatmap.svg", get(pages::heatmap_svg::<S>))
        .route("/api/v1/contexts", get(api::contexts::<S>))
        .route("/api/v1/heatmap", get(api::heatmap::<S>))
        .with_state(state)
}

/// HTTP status for a pipeline failure.
pub(crate) fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        PipelineError::Source(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
