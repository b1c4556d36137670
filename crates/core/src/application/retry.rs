// Retry logic for queued provider calls

use std::time::Duration;

use tracing::warn;

use crate::port::ProviderError;

/// Message fragments that mark a transient, retry-worthy provider failure.
/// Matched case-insensitively against the error text.
const RETRYABLE_MESSAGE_PATTERNS: &[&str] = &[
    "rate limit",
    "too many requests",
    "quota exceeded",
    "resource exhausted",
    "try again later",
    "service unavailable",
];

/// HTTP status codes that indicate a temporary condition.
const RETRYABLE_STATUS_CODES: &[u16] = &[408, 429, 500, 502, 503, 504];

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after this backoff delay
    Retry(Duration),
    /// Do not retry, fail the task with the observed error
    Fail,
}

/// Retry policy for one queued task
///
/// A task is retried only while both hold:
/// - the error classifies as transient (message pattern or status code)
/// - fewer than `max_retries` retries have been attempted
pub struct RetryPolicy {
    base_delay: Duration,
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    /// Decide what to do after a failed attempt.
    ///
    /// `attempt` is the number of retries already performed: 0 after the
    /// initial invocation fails, so the delays run base, 2*base, 4*base.
    pub fn decide(&self, error: &ProviderError, attempt: u32) -> RetryDecision {
        if !is_retryable(error) {
            return RetryDecision::Fail;
        }

        if attempt >= self.max_retries {
            warn!(
                attempt = attempt,
                max_retries = self.max_retries,
                "Max retry attempts reached"
            );
            return RetryDecision::Fail;
        }

        RetryDecision::Retry(self.base_delay * 2u32.pow(attempt))
    }
}

/// True when the error should trigger a retry attempt.
pub fn is_retryable(error: &ProviderError) -> bool {
    if let Some(status) = error.status() {
        if RETRYABLE_STATUS_CODES.contains(&status) {
            return true;
        }
    }
    matches_transient_phrase(&error.to_string())
}

/// True when the text carries rate-limit/quota phrasing (case-insensitive).
///
/// Also used on provider response bodies: a 200 that still talks about quotas
/// is the provider throttling us mid-response.
pub fn matches_transient_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    RETRYABLE_MESSAGE_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1000), 3)
    }

    #[test]
    fn retryable_message_patterns_match_case_insensitively() {
        for message in [
            "Rate Limit exceeded",
            "429 Too Many Requests",
            "Quota exceeded for this project",
            "RESOURCE EXHAUSTED",
            "please try again later",
            "Service Unavailable",
        ] {
            let error = ProviderError::Transport(message.to_string());
            assert!(is_retryable(&error), "expected retryable: {}", message);
        }
    }

    #[test]
    fn retryable_status_codes_match() {
        for status in [408, 429, 500, 502, 503, 504] {
            let error = ProviderError::Http {
                status,
                message: "opaque".to_string(),
            };
            assert!(is_retryable(&error), "expected retryable status {}", status);
        }
    }

    #[test]
    fn terminal_errors_do_not_match() {
        let error = ProviderError::Transport("Invalid argument".to_string());
        assert!(!is_retryable(&error));

        let error = ProviderError::Http {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(!is_retryable(&error));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let error = ProviderError::Transport("rate limit".to_string());
        assert_eq!(
            policy().decide(&error, 0),
            RetryDecision::Retry(Duration::from_millis(1000))
        );
        assert_eq!(
            policy().decide(&error, 1),
            RetryDecision::Retry(Duration::from_millis(2000))
        );
        assert_eq!(
            policy().decide(&error, 2),
            RetryDecision::Retry(Duration::from_millis(4000))
        );
    }

    #[test]
    fn fails_after_max_retries() {
        let error = ProviderError::Transport("rate limit".to_string());
        assert_eq!(policy().decide(&error, 3), RetryDecision::Fail);
    }

    #[test]
    fn fails_immediately_on_terminal_error() {
        let error = ProviderError::Transport("Invalid argument".to_string());
        assert_eq!(policy().decide(&error, 0), RetryDecision::Fail);
    }

    #[test]
    fn transient_phrase_check_works_on_response_bodies() {
        assert!(matches_transient_phrase(
            "{\"error\": \"Quota exceeded, try again later\"}"
        ));
        assert!(!matches_transient_phrase("{\"overallScore\": 80}"));
    }
}
