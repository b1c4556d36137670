// Evaluation pipeline: queue + provider + result shaping

use std::sync::Arc;
use std::time::Duration;

use oratio_core::application::{EvaluationService, RequestQueue, RequestQueueConfig};
use oratio_core::domain::TopicAdherence;
use oratio_core::port::evaluation_provider::mocks::{MockBehavior, MockEvaluationProvider};
use oratio_core::port::{EvaluationProvider, ProviderError};
use oratio_core::AppError;

fn service_with(provider: MockEvaluationProvider) -> (EvaluationService, Arc<MockEvaluationProvider>) {
    let provider = Arc::new(provider);
    let queue = RequestQueue::new(RequestQueueConfig {
        max_concurrent: 1,
        max_retries: 3,
        retry_base_delay: Duration::from_millis(20),
    });
    let service = EvaluationService::new(queue, Arc::clone(&provider) as Arc<dyn EvaluationProvider>);
    (service, provider)
}

fn evaluation_body(topic_adherence: &str) -> String {
    format!(
        r#"{{
            "overallScore": 84,
            "confidence": "Clear and composed with occasional pauses.",
            "fillerWords": {{ "count": 2, "words": ["um", "like"] }},
            "grammarFeedback": "Tense usage is consistent.",
            "alternativePhrasing": [
                {{ "original": "me and him went", "suggested": "he and I went" }}
            ],
            "topicAdherence": {}
        }}"#,
        topic_adherence
    )
}

#[tokio::test]
async fn evaluates_transcript_with_topic() {
    let (service, provider) = service_with(MockEvaluationProvider::new_success(
        evaluation_body("8"),
    ));

    let evaluation = service
        .evaluate("Today I want to talk about renewable energy.", Some("Energy"))
        .await
        .unwrap();

    assert_eq!(evaluation.overall_score, 84.0);
    assert_eq!(evaluation.filler_words.words, vec!["um", "like"]);
    assert_eq!(
        evaluation.topic_adherence.map(|t| t.score()),
        Some(8.0)
    );
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn accepts_fenced_json_and_detailed_topic_adherence() {
    let fenced = format!(
        "```json\n{}\n```",
        evaluation_body(r#"{ "score": 6, "feedback": "Drifted in the middle section." }"#)
    );
    let (service, _) = service_with(MockEvaluationProvider::new_success(fenced));

    let evaluation = service.evaluate("some speech", Some("Focus")).await.unwrap();
    match evaluation.topic_adherence {
        Some(TopicAdherence::Detailed { score, feedback }) => {
            assert_eq!(score, 6.0);
            assert!(feedback.contains("Drifted"));
        }
        other => panic!("expected detailed adherence, got {:?}", other),
    }
}

#[tokio::test]
async fn recovers_from_transient_provider_failures() {
    let (service, provider) = service_with(MockEvaluationProvider::new(
        MockBehavior::FailThenSucceed {
            error: ProviderError::Http {
                status: 429,
                message: "Resource exhausted".to_string(),
            },
            failures: 2,
            body: evaluation_body("null"),
        },
    ));

    let evaluation = service.evaluate("hello world", None).await.unwrap();
    assert!(evaluation.topic_adherence.is_none());
    // Two transparent retries before the success.
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_provider_error() {
    let (service, provider) = service_with(MockEvaluationProvider::new_fail(
        ProviderError::Http {
            status: 503,
            message: "Service Unavailable".to_string(),
        },
    ));

    let err = service.evaluate("hello world", None).await.unwrap_err();
    match err {
        AppError::Provider(ProviderError::Http { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected provider error, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn unparseable_body_reports_busy_not_failure() {
    let (service, _) = service_with(MockEvaluationProvider::new_success(
        "I'm sorry, I can't evaluate this right now.".to_string(),
    ));
    let err = service.evaluate("hello world", None).await.unwrap_err();
    assert!(matches!(err, AppError::Busy(_)));
}

#[tokio::test]
async fn concurrent_submissions_all_settle_and_gauges_reset() {
    let (service, provider) = service_with(
        MockEvaluationProvider::new_success(evaluation_body("null"))
            .with_delay(Duration::from_millis(30)),
    );
    let service = Arc::new(service);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.evaluate("a short speech", None).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(provider.call_count(), 4);
    assert_eq!(service.queue_length(), 0);
    assert_eq!(service.active_count(), 0);
}
