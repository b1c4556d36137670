// Evaluation Provider Port
// Abstraction over the generative AI service that scores transcripts

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the generative provider
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never reached the provider (DNS, TLS, connection reset).
    #[error("provider transport error: {0}")]
    Transport(String),

    /// The provider answered but the body was unusable.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// The dispatched task was torn down before it could settle.
    #[error("evaluation task was canceled before settling")]
    Canceled,
}

impl ProviderError {
    /// HTTP-like status code, when the provider produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Evaluation Provider trait
///
/// Implementations:
/// - GeminiClient: calls the hosted generateContent API
/// - mocks::MockEvaluationProvider: scripted responses for tests
#[async_trait]
pub trait EvaluationProvider: Send + Sync {
    /// Evaluate a transcript (with an optional assigned topic) and return the
    /// provider's raw text response.
    ///
    /// # Errors
    /// - ProviderError::Http for non-success statuses (429 and friends included)
    /// - ProviderError::Transport when the provider was unreachable
    /// - ProviderError::InvalidResponse when the body had no usable text
    async fn evaluate(&self, transcript: &str, topic: Option<&str>)
        -> Result<String, ProviderError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock provider behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always return this body
        Succeed(String),
        /// Always fail with this error
        Fail(ProviderError),
        /// Fail with the error for the first `failures` calls, then succeed
        FailThenSucceed {
            error: ProviderError,
            failures: usize,
            body: String,
        },
    }

    /// Mock Evaluation Provider for testing
    pub struct MockEvaluationProvider {
        behavior: MockBehavior,
        delay: Option<Duration>,
        call_count: AtomicUsize,
    }

    impl MockEvaluationProvider {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                delay: None,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn new_success(body: impl Into<String>) -> Self {
            Self::new(MockBehavior::Succeed(body.into()))
        }

        pub fn new_fail(error: ProviderError) -> Self {
            Self::new(MockBehavior::Fail(error))
        }

        /// Sleep this long inside every call (for concurrency tests)
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EvaluationProvider for MockEvaluationProvider {
        async fn evaluate(
            &self,
            _transcript: &str,
            _topic: Option<&str>,
        ) -> Result<String, ProviderError> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match &self.behavior {
                MockBehavior::Succeed(body) => Ok(body.clone()),
                MockBehavior::Fail(error) => Err(error.clone()),
                MockBehavior::FailThenSucceed {
                    error,
                    failures,
                    body,
                } => {
                    if call < *failures {
                        Err(error.clone())
                    } else {
                        Ok(body.clone())
                    }
                }
            }
        }
    }
}
