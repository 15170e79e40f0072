use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    aggregate,
    error::{AppError, AppResult},
    models::UpstreamTarget,
    AppState,
};

// ── GET / ─────────────────────────────────────────────────────────────────────

pub async fn aggregate_greetings(State(state): State<AppState>) -> AppResult<Response> {
    let start = Instant::now();
    let targets = UpstreamTarget::for_names(&state.upstream_host, &state.target_names);

    let greetings = aggregate::aggregate(
        &state.upstream,
        &targets,
        state.upstream_timeout,
        aggregate::merge,
    )
    .await
    .map_err(|e| {
        error!(upstream = %e.target(), error = %e, "Aggregation failed");
        AppError::from(e)
    })?;

    let body = greetings
        .to_pretty_json()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(
        fields = greetings.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Aggregated greetings"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
