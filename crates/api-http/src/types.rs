//! Wire types for the HTTP surface

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Error body returned on every non-2xx response.
///
/// `inQueue: true` tells the client this is a backlog condition worth
/// retrying; `errorType` distinguishes configuration failures from the
/// transient ones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_queue: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn plain(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            in_queue: None,
            error_type: None,
            message: None,
        }
    }

    /// A backlog condition the client should retry.
    pub fn busy(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            in_queue: Some(true),
            error_type: None,
            message: None,
        }
    }

    pub fn typed(
        error: impl Into<String>,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            in_queue: None,
            error_type: Some(error_type.into()),
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub queue_length: usize,
    pub active_count: usize,
}
