//! Gemini client retry and model fallback against a mock endpoint

mod helpers;

use helpers::{candidate_reply, error_reply, mock_settings, sample_checkin, MockGemini, INSIGHT_JSON};
use kzd_common::InsightSource;
use kzd_insight::services::{GeminiClient, GeminiError, InsightEngine, InsightGenerator};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PRIMARY: &str = "gemini-3-flash";
const SECONDARY: &str = "gemini-2.5-flash";
const TERTIARY: &str = "gemini-2.0-flash";

#[tokio::test]
async fn test_first_model_success() {
    let mock = MockGemini::start().await;
    mock.push(PRIMARY, 200, candidate_reply(INSIGHT_JSON));

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY])).unwrap();
    let generated = client.generate_insight(&sample_checkin()).await.unwrap();

    assert_eq!(
        generated.source,
        InsightSource::Ai {
            model: PRIMARY.to_string()
        }
    );
    assert!(generated.insight.main_insight.contains("shoulders"));
    assert_eq!(generated.insight.micro_actions.len(), 2);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key.as_deref(), Some("test-key"));
    let prompt = calls[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Too many meetings today"));
    let temperature = calls[0].body["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_transient_error_retries_same_model() {
    let mock = MockGemini::start().await;
    mock.push(PRIMARY, 503, error_reply(503, "The model is overloaded"))
        .push(PRIMARY, 429, error_reply(429, "Resource exhausted"))
        .push(PRIMARY, 200, candidate_reply(INSIGHT_JSON));

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY])).unwrap();
    let generated = client.generate_insight(&sample_checkin()).await.unwrap();

    assert_eq!(generated.source.to_string(), format!("ai:{}", PRIMARY));
    assert_eq!(mock.calls_for(PRIMARY), 3);
    assert_eq!(mock.calls_for(SECONDARY), 0);
}

#[tokio::test]
async fn test_retry_waits_exponential_backoff() {
    let mock = MockGemini::start().await;
    mock.push(PRIMARY, 503, error_reply(503, "overloaded"))
        .push(PRIMARY, 502, error_reply(502, "bad gateway"))
        .push(PRIMARY, 200, candidate_reply(INSIGHT_JSON));

    let mut settings = mock_settings(&mock.base_url, &[PRIMARY]);
    settings.base_backoff = Duration::from_millis(50);
    let client = GeminiClient::new(settings).unwrap();

    let started = Instant::now();
    client.generate_insight(&sample_checkin()).await.unwrap();

    // 50 ms after the first failure, 100 ms after the second
    assert!(
        started.elapsed() >= Duration::from_millis(150),
        "elapsed {:?}",
        started.elapsed()
    );
    assert_eq!(mock.calls_for(PRIMARY), 3);
}

#[tokio::test]
async fn test_retries_exhausted_moves_to_next_model() {
    let mock = MockGemini::start().await;
    for _ in 0..3 {
        mock.push(PRIMARY, 503, error_reply(503, "overloaded"));
    }
    mock.push(SECONDARY, 200, candidate_reply(INSIGHT_JSON));

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY])).unwrap();
    let generated = client.generate_insight(&sample_checkin()).await.unwrap();

    assert_eq!(
        generated.source,
        InsightSource::Ai {
            model: SECONDARY.to_string()
        }
    );
    assert_eq!(mock.calls_for(PRIMARY), 3);
    assert_eq!(mock.calls_for(SECONDARY), 1);
}

#[tokio::test]
async fn test_unknown_model_falls_through_without_retry() {
    let mock = MockGemini::start().await;
    mock.push(TERTIARY, 200, candidate_reply(INSIGHT_JSON));

    let client =
        GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY, TERTIARY])).unwrap();
    let generated = client.generate_insight(&sample_checkin()).await.unwrap();

    assert_eq!(generated.source.to_string(), format!("ai:{}", TERTIARY));
    assert_eq!(mock.calls_for(PRIMARY), 1);
    assert_eq!(mock.calls_for(SECONDARY), 1);
}

#[tokio::test]
async fn test_auth_error_is_fatal() {
    let mock = MockGemini::start().await;
    mock.push(PRIMARY, 401, error_reply(401, "API key not valid"));
    mock.push(SECONDARY, 200, candidate_reply(INSIGHT_JSON));

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY])).unwrap();
    let err = client.generate_insight(&sample_checkin()).await.unwrap_err();

    match err {
        GeminiError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(mock.calls_for(SECONDARY), 0);
}

#[tokio::test]
async fn test_fenced_reply_is_parsed() {
    let mock = MockGemini::start().await;
    let fenced = format!("```json\n{}\n```", INSIGHT_JSON);
    mock.push(PRIMARY, 200, candidate_reply(&fenced));

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY])).unwrap();
    let generated = client.generate_insight(&sample_checkin()).await.unwrap();

    assert_eq!(generated.insight.micro_actions[0].id, 1);
    assert_eq!(generated.insight.micro_actions[1].icon, "stretch");
}

#[tokio::test]
async fn test_garbage_reply_moves_to_next_model() {
    let mock = MockGemini::start().await;
    mock.push(PRIMARY, 200, candidate_reply("I'm sorry, I can't help with that."));
    mock.push(SECONDARY, 200, r#"{"candidates":[]}"#.to_string());

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY])).unwrap();
    let err = client.generate_insight(&sample_checkin()).await.unwrap_err();

    match &err {
        GeminiError::Exhausted { models_tried, last } => {
            assert_eq!(*models_tried, 2);
            assert!(matches!(**last, GeminiError::EmptyResponse(_)), "last: {last:?}");
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert_eq!(mock.calls_for(PRIMARY), 1);
}

#[tokio::test]
async fn test_all_models_exhausted_reports_last_status() {
    let mock = MockGemini::start().await;
    for _ in 0..3 {
        mock.push(PRIMARY, 500, error_reply(500, "internal"));
    }

    let client = GeminiClient::new(mock_settings(&mock.base_url, &[PRIMARY, SECONDARY])).unwrap();
    let err = client.generate_insight(&sample_checkin()).await.unwrap_err();

    assert!(matches!(err, GeminiError::Exhausted { models_tried: 2, .. }));
    // Secondary had nothing scripted and answered 404
    assert_eq!(err.status(), Some(404));
    assert_eq!(mock.calls_for(PRIMARY), 3);
}

#[tokio::test]
async fn test_connection_refused_falls_back_to_canned_insight() {
    // Nothing listens on port 9 of localhost
    let mut settings = mock_settings("http://127.0.0.1:9/models", &[PRIMARY]);
    settings.max_attempts = 2;
    let client = GeminiClient::new(settings).unwrap();

    let err = client.generate_insight(&sample_checkin()).await.unwrap_err();
    assert!(matches!(err.root(), GeminiError::Connect(_) | GeminiError::Http(_)), "got {err:?}");

    let primary: Arc<dyn InsightEngine> = Arc::new(client);
    let generator = InsightGenerator::new(Some(primary), Duration::ZERO);
    let generated = generator.generate(&sample_checkin()).await;
    assert!(generated.source.is_fallback());
    assert!(generated
        .insight
        .main_insight
        .starts_with("I notice you're feeling a bit pressured"));
    assert!(generated.insight.debug_error.is_some());
}
