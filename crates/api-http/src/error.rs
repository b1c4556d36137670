//! Application-error to HTTP mapping

use axum::http::StatusCode;
use axum::Json;

use oratio_core::application::retry;
use oratio_core::domain::DomainError;
use oratio_core::AppError;

use crate::types::ErrorBody;

const BUSY_MESSAGE: &str =
    "The evaluation service is currently busy. Your request has been queued - please try again in a few moments.";
const UNAVAILABLE_MESSAGE: &str =
    "The evaluation service is temporarily unavailable due to high demand. Please try again shortly.";

/// Map an application error onto a status code and wire body.
pub fn to_http_error(error: AppError) -> (StatusCode, Json<ErrorBody>) {
    match error {
        AppError::Domain(DomainError::EmptyTranscript) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::plain("No transcript provided")),
        ),
        AppError::Domain(other) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::plain(other.to_string())),
        ),
        AppError::Validation(message) => {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::plain(message)))
        }
        AppError::Config(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::typed(
                "Gemini API key not set",
                "MISSING_API_KEY",
                message,
            )),
        ),
        AppError::Busy(message) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody::busy(message)),
        ),
        AppError::Provider(provider_error) => {
            let message = provider_error.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("api key")
                || lowered.contains("authentication")
                || lowered.contains("auth")
            {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorBody::typed(
                        "API authentication error",
                        "API_KEY_ERROR",
                        "There was a problem with the AI service authentication. Please check your API key configuration.",
                    )),
                )
            } else if retry::is_retryable(&provider_error) {
                // Retries are already exhausted by the time this surfaces;
                // the client sees a backlog, not the raw provider error.
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorBody::busy(UNAVAILABLE_MESSAGE)),
                )
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::plain("Failed to evaluate transcript").with_message(message)),
                )
            }
        }
        AppError::Serialization(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::plain("Failed to evaluate transcript").with_message(err.to_string())),
        ),
        AppError::Internal(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::plain("Internal error").with_message(message)),
        ),
    }
}

/// The standard backlog rejection used by the admission check and timeouts.
pub fn busy_response() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorBody::busy(BUSY_MESSAGE)),
    )
}
