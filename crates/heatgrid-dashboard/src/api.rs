//! JSON API handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use heatgrid_source::MetricsSource;

use crate::query::HeatmapQuery;
use crate::{DashboardState, status_for};

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

/// GET /api/v1/contexts
pub async fn contexts<S: MetricsSource + 'static>(
    State(state): State<DashboardState<S>>,
    Query(query): Query<HeatmapQuery>,
) -> Response {
    let (params, _) = match query.resolve(&state.defaults, state.render) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e, StatusCode::BAD_REQUEST),
    };
    match state.pipeline.matched_contexts(&params).await {
        Ok(contexts) => ApiResponse::ok(contexts).into_response(),
        Err(e) => error_response(&e.to_string(), status_for(&e)),
    }
}

/// GET /api/v1/heatmap
pub async fn heatmap<S: MetricsSource + 'static>(
    State(state): State<DashboardState<S>>,
    Query(query): Query<HeatmapQuery>,
) -> Response {
    let (params, _) = match query.resolve(&state.defaults, state.render) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e, StatusCode::BAD_REQUEST),
    };
    match state.pipeline.run(&params).await {
        Ok(heatmap) => ApiResponse::ok(heatmap).into_response(),
        Err(e) => error_response(&e.to_string(), status_for(&e)),
    }
}
