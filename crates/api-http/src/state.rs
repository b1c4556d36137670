use std::sync::Arc;
use std::time::Duration;

use oratio_core::application::EvaluationService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// None when the provider API key is missing; handlers answer with a
    /// configuration error without ever touching the queue.
    pub evaluation: Option<Arc<EvaluationService>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(evaluation: Option<Arc<EvaluationService>>, config: ApiConfig) -> Self {
        Self { evaluation, config }
    }
}

/// Edge policy knobs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Reject new evaluations once more than this many tasks are waiting.
    pub admission_threshold: usize,
    /// Outer bound on one evaluation request, queue wait and retries included.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admission_threshold: 5,
            request_timeout: Duration::from_secs(60),
        }
    }
}
