use std::time::Duration;

use httpmock::prelude::*;
use llm::{GeminiConfig, GeminiProvider};
use pipeline::{CompletionRequest, LlmError, LlmProvider, ModelName};
use serde_json::json;

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig {
        api_base: format!("{}/v1beta", server.base_url()),
        api_key: "test-google-key".to_string(),
        model: ModelName::new("gemini-1.5-flash").expect("model"),
        request_timeout: Duration::from_secs(5),
    })
    .expect("gemini provider should be created")
}

fn request() -> CompletionRequest {
    CompletionRequest {
        prompt: "--- Workflow: build ---\nERR".to_string(),
    }
}

#[tokio::test]
async fn sends_one_generate_content_request_and_returns_text_verbatim() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent")
            .query_param("key", "test-google-key")
            .json_body_includes(
                json!({
                    "contents": [{"role": "user", "parts": [{"text": "--- Workflow: build ---\nERR"}]}]
                })
                .to_string(),
            );
        then.status(200).json_body(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "- **Root cause:** compile error\n- **Fix:** declare `x`"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 12, "totalTokenCount": 22}
        }));
    });

    let completion = provider(&server)
        .complete(request())
        .await
        .expect("completion should succeed");

    mock.assert_calls(1);
    assert_eq!(
        completion.text,
        "- **Root cause:** compile error\n- **Fix:** declare `x`"
    );
}

#[tokio::test]
async fn blocked_prompt_is_classified_as_refusal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent");
        then.status(200).json_body(json!({
            "promptFeedback": {
                "blockReason": "OTHER",
                "safetyRatings": []
            }
        }));
    });

    let error = provider(&server)
        .complete(request())
        .await
        .expect_err("blocked");

    assert_eq!(
        error,
        LlmError::Blocked {
            reason: "OTHER".to_string()
        }
    );
}

#[tokio::test]
async fn server_error_is_a_status_error_and_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent");
        then.status(503)
            .json_body(json!({"error": {"code": 503, "message": "The model is overloaded."}}));
    });

    let error = provider(&server)
        .complete(request())
        .await
        .expect_err("overloaded");

    mock.assert_calls(1);
    match error {
        LlmError::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error_without_the_key() {
    let provider = GeminiProvider::new(GeminiConfig {
        api_base: "http://127.0.0.1:9/v1beta".to_string(),
        api_key: "secret-key".to_string(),
        model: ModelName::new("gemini-1.5-flash").expect("model"),
        request_timeout: Duration::from_secs(2),
    })
    .expect("provider");

    let error = provider.complete(request()).await.expect_err("refused");

    match error {
        LlmError::Transport { message } => assert!(!message.contains("secret-key")),
        other => panic!("expected Transport, got {other:?}"),
    }
}
