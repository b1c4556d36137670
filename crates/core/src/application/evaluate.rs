// Evaluate Use Case

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::request_queue::RequestQueue;
use crate::application::retry;
use crate::domain::{parse_evaluation, DomainError, EvaluationResult};
use crate::error::{AppError, Result};
use crate::port::EvaluationProvider;

/// Message returned to callers when the system is saturated or the provider
/// is throttling us.
const BUSY_MESSAGE: &str =
    "The evaluation service is currently busy. Please try again in a few moments.";

/// Runs transcript evaluations through the shared request queue.
///
/// Owns nothing global: the queue and provider are injected, and one instance
/// is wired up per process by the composition root.
pub struct EvaluationService {
    queue: RequestQueue<String>,
    provider: Arc<dyn EvaluationProvider>,
}

impl EvaluationService {
    pub fn new(queue: RequestQueue<String>, provider: Arc<dyn EvaluationProvider>) -> Self {
        Self { queue, provider }
    }

    /// Evaluation calls waiting for dispatch. The HTTP layer reads this
    /// before submitting to decide whether to admit the request at all.
    pub fn queue_length(&self) -> usize {
        self.queue.queue_length()
    }

    /// Evaluation calls currently executing.
    pub fn active_count(&self) -> usize {
        self.queue.active_count()
    }

    /// Evaluate a transcript against an optional assigned topic.
    ///
    /// The provider call goes through the queue (strict serialization plus
    /// backoff retries); the raw text that comes back is shaped into a
    /// validated [`EvaluationResult`]. Unusable responses map to
    /// [`AppError::Busy`] so callers report "try again" instead of a hard
    /// failure.
    pub async fn evaluate(
        &self,
        transcript: &str,
        topic: Option<&str>,
    ) -> Result<EvaluationResult> {
        if transcript.trim().is_empty() {
            return Err(AppError::Domain(DomainError::EmptyTranscript));
        }

        let provider = Arc::clone(&self.provider);
        let transcript_owned = transcript.to_string();
        let topic_owned = topic.map(str::to_string);

        let raw = self
            .queue
            .enqueue(move || {
                let provider = Arc::clone(&provider);
                let transcript = transcript_owned.clone();
                let topic = topic_owned.clone();
                async move { provider.evaluate(&transcript, topic.as_deref()).await }
            })
            .await?;

        match parse_evaluation(&raw) {
            Ok(evaluation) => {
                info!(
                    overall_score = evaluation.overall_score,
                    "Evaluation completed"
                );
                Ok(evaluation)
            }
            Err(error) => {
                // A 200 whose body still talks about quotas is the provider
                // throttling us; either way an unusable body is a transient
                // condition for the caller, not a hard failure.
                if retry::matches_transient_phrase(&raw) {
                    warn!("Provider response carries rate-limit phrasing, reporting busy");
                } else {
                    warn!(error = %error, "Evaluation response failed validation, reporting busy");
                }
                Err(AppError::Busy(BUSY_MESSAGE.to_string()))
            }
        }
    }
}
