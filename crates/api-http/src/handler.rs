//! Route handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;
use uuid::Uuid;

use oratio_core::AppError;

use crate::error::{busy_response, to_http_error};
use crate::state::AppState;
use crate::types::{ErrorBody, EvaluateRequest, HealthResponse};

/// POST /evaluate
///
/// Order matters: configuration and validation failures answer before the
/// queue is consulted, and the admission check happens before `enqueue` so a
/// saturated system rejects instead of stacking work it cannot serve.
#[tracing::instrument(
    skip(state, request),
    fields(request_id = %Uuid::new_v4(), transcript_len = request.transcript.len())
)]
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> axum::response::Response {
    let Some(service) = state.evaluation.as_ref() else {
        warn!("Evaluation requested but no provider API key is configured");
        return to_http_error(AppError::Config(
            "The AI evaluation service is not properly configured. Please add a GEMINI_API_KEY to your environment variables.".to_string(),
        ))
        .into_response();
    };

    if request.transcript.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::plain("No transcript provided")),
        )
            .into_response();
    }

    // Backpressure at the edge: only waiting tasks count, the executing one
    // has already been admitted.
    let queue_length = service.queue_length();
    if queue_length > state.config.admission_threshold {
        warn!(
            queue_length = queue_length,
            threshold = state.config.admission_threshold,
            "Admission rejected: evaluation backlog too deep"
        );
        return busy_response().into_response();
    }

    let outcome = tokio::time::timeout(
        state.config.request_timeout,
        service.evaluate(&request.transcript, request.topic.as_deref()),
    )
    .await;

    match outcome {
        Ok(Ok(evaluation)) => (StatusCode::OK, Json(evaluation)).into_response(),
        Ok(Err(error)) => to_http_error(error).into_response(),
        Err(_elapsed) => {
            // The queued task keeps running to settlement; only this caller
            // stops waiting.
            warn!("Evaluation timed out at the edge, task continues in the queue");
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(ErrorBody::busy(
                    "The evaluation is taking longer than expected due to high demand. Your request has been queued - please try again in a few moments.",
                )),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.evaluation.as_ref() {
        Some(service) => Json(HealthResponse {
            status: "ok",
            queue_length: service.queue_length(),
            active_count: service.active_count(),
        }),
        None => Json(HealthResponse {
            status: "unconfigured",
            queue_length: 0,
            active_count: 0,
        }),
    }
}
