use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use signal_optimizer::{
    loader, optimize_now, FailureReport, OptimizationRequest, OptimizerError,
};
use tracing::warn;

use crate::AppState;

/// Optimize a full request document
pub async fn optimize(State(state): State<AppState>, body: Bytes) -> Response {
    match loader::parse_request_slice(&body) {
        Ok(request) => run(&state, request),
        Err(e) => reject(e),
    }
}

/// Optimize observations for the intersection named in the path
pub async fn optimize_intersection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    match loader::parse_request_slice(&body) {
        Ok(mut request) => {
            request.intersection_id = id;
            run(&state, request)
        }
        Err(e) => reject(e),
    }
}

fn run(state: &AppState, request: OptimizationRequest) -> Response {
    let outcome = optimize_now(&request, &state.config);
    (StatusCode::OK, Json(outcome)).into_response()
}

fn reject(err: OptimizerError) -> Response {
    warn!("Rejected optimization request: {}", err);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(FailureReport::from(&err)),
    )
        .into_response()
}
