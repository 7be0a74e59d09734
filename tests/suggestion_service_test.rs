use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assert_matches::assert_matches;
use pitchside::services::{LlmConfig, SuggestionError, SuggestionKind, SuggestionService};

mod common;
use common::prompt_context;

fn service_for(endpoint: Option<String>) -> SuggestionService {
    SuggestionService::new(LlmConfig {
        endpoint,
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn returns_suggestion_lines_from_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "- Work on first touch\n- Shoot with both feet\n- Scan before receiving"
                }
            }]
        })))
        .mount(&server)
        .await;

    let service = service_for(Some(server.uri()));
    let suggestions = service
        .suggest(SuggestionKind::Goals, &prompt_context())
        .await
        .unwrap();

    assert_eq!(
        suggestions,
        vec![
            "Work on first touch".to_string(),
            "Shoot with both feet".to_string(),
            "Scan before receiving".to_string(),
        ]
    );
}

#[tokio::test]
async fn upstream_failure_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let service = service_for(Some(server.uri()));
    let err = service
        .suggest(SuggestionKind::TrainingModules, &prompt_context())
        .await
        .unwrap_err();

    assert_matches!(err, SuggestionError::Api { status: 500, .. });
}

#[tokio::test]
async fn blank_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "\n\n" } }]
        })))
        .mount(&server)
        .await;

    let service = service_for(Some(server.uri()));
    let err = service
        .suggest(SuggestionKind::Goals, &prompt_context())
        .await
        .unwrap_err();

    assert_matches!(err, SuggestionError::Empty);
}

#[tokio::test]
async fn missing_endpoint_is_not_configured() {
    let service = service_for(None);
    let err = service
        .suggest(SuggestionKind::Goals, &prompt_context())
        .await
        .unwrap_err();

    assert_matches!(err, SuggestionError::NotConfigured);
}
