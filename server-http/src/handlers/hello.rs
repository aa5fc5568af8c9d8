use crate::error::ApiError;
use crate::models::{HelloParams, LookupResponse, MetricsResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use bench_core::HelloMode;
use tracing::info;

/// GET /hello/:mode?sleep=N&log=bool
pub async fn hello(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Query(params): Query<HelloParams>,
) -> Result<String, ApiError> {
    let mode: HelloMode = mode.parse()?;
    if params.log {
        info!(
            "{}: thread={:?}, sleep={}s",
            mode.endpoint_tag(),
            std::thread::current().id(),
            params.sleep
        );
    }

    let interrupt = state.hello.interrupt();
    let body = state.hello.hello(mode, params.sleep, &interrupt).await?;
    Ok(body)
}

/// GET /cache/:key
pub async fn lookup(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    let value = state.hello.lookup(&key).await?.into_option();
    Ok(Json(LookupResponse {
        found: value.is_some(),
        value,
    }))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        hello_requests: state.hello.hello_requests().into_iter().collect(),
    })
}
