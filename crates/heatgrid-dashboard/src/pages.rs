//! Dashboard page handlers.

use askama::Template;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::warn;

use heatgrid_core::HeatmapParams;
use heatgrid_render::render_svg;
use heatgrid_source::MetricsSource;

use crate::query::HeatmapQuery;
use crate::{DashboardState, status_for};

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        format!("<pre>Template error: {e}</pre>")
    }))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    params: HeatmapParams,
    fig_w: u32,
    fig_h: u32,
    svg: Option<String>,
    error: Option<String>,
    n_rows: usize,
    contexts: Vec<String>,
    failed_contexts: Vec<String>,
}

pub async fn index<S: MetricsSource + 'static>(
    State(state): State<DashboardState<S>>,
    Query(query): Query<HeatmapQuery>,
) -> Html<String> {
    let (params, options) = match query.resolve(&state.defaults, state.render) {
        Ok(resolved) => resolved,
        Err(error) => {
            return render(IndexTemplate {
                params: state.defaults.clone(),
                fig_w: state.render.fig_w,
                fig_h: state.render.fig_h,
                svg: None,
                error: Some(error),
                n_rows: 0,
                contexts: Vec::new(),
                failed_contexts: Vec::new(),
            });
        }
    };

    let mut page = IndexTemplate {
        params,
        fig_w: options.fig_w,
        fig_h: options.fig_h,
        svg: None,
        error: None,
        n_rows: 0,
        contexts: Vec::new(),
        failed_contexts: Vec::new(),
    };

    match state.pipeline.run(&page.params).await {
        Ok(heatmap) => {
            page.svg = Some(render_svg(&heatmap, options));
            page.n_rows = heatmap.rows.len();
            page.contexts = heatmap.contexts;
            page.failed_contexts = heatmap.failed_contexts;
        }
        Err(e) => {
            warn!(error = %e, "heatmap request failed");
            page.error = Some(e.to_string());
        }
    }

    render(page)
}

/// GET /heatmap.svg
pub async fn heatmap_svg<S: MetricsSource + 'static>(
    State(state): State<DashboardState<S>>,
    Query(query): Query<HeatmapQuery>,
) -> Response {
    let (params, options) = match query.resolve(&state.defaults, state.render) {
        Ok(resolved) => resolved,
        Err(error) => return (StatusCode::BAD_REQUEST, error).into_response(),
    };

    match state.pipeline.run(&params).await {
        Ok(heatmap) => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            render_svg(&heatmap, options),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "heatmap request failed");
            (status_for(&e), e.to_string()).into_response()
        }
    }
}
