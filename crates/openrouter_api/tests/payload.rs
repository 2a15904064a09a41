use openrouter_api::payload::InputMessage;
use openrouter_api::{OpenRouterClient, OpenRouterConfig, OpenRouterError, ResponsesRequest};
use serde_json::{json, Value};

fn user_input(text: &str) -> Vec<InputMessage> {
    vec![InputMessage::new("user", text)]
}

#[test]
fn payload_serialization_defaults() {
    let request = ResponsesRequest::new("openai/gpt-oss-20b:free", user_input("hi"));
    let body = serde_json::to_value(&request).expect("serialize payload");

    assert_eq!(body["model"], "openai/gpt-oss-20b:free");
    assert_eq!(body["stream"], Value::Bool(false));
    assert_eq!(
        body["input"],
        json!([{"type": "message", "role": "user", "content": "hi"}])
    );
    assert!(body.get("reasoning").is_none());
}

#[test]
fn payload_reasoning_summary_is_optional() {
    let with_summary =
        ResponsesRequest::new("m", user_input("hi")).with_reasoning("high", true);
    let body = serde_json::to_value(&with_summary).expect("serialize payload");
    assert_eq!(body["reasoning"], json!({"effort": "high", "summary": "auto"}));

    let without_summary =
        ResponsesRequest::new("m", user_input("hi")).with_reasoning("low", false);
    let body = serde_json::to_value(&without_summary).expect("serialize payload");
    assert_eq!(body["reasoning"], json!({"effort": "low"}));
}

#[test]
fn build_request_forces_stream_flag_per_call() {
    let client = OpenRouterClient::new(OpenRouterConfig::new("key")).expect("client");
    let request = ResponsesRequest::new("m", user_input("hi"));

    let http_request = client
        .build_request(&request, true)
        .expect("build request")
        .build()
        .expect("request");
    let body: Value = serde_json::from_slice(
        http_request
            .body()
            .and_then(|body| body.as_bytes())
            .expect("buffered json body"),
    )
    .expect("json body");

    assert_eq!(body["stream"], Value::Bool(true));
    assert_eq!(http_request.method(), "POST");
    assert_eq!(
        http_request.url().as_str(),
        "https://openrouter.ai/api/v1/responses"
    );
}

#[test]
fn build_request_rejects_empty_input_and_model() {
    let client = OpenRouterClient::new(OpenRouterConfig::new("key")).expect("client");

    let error = client
        .build_request(&ResponsesRequest::new("m", Vec::new()), false)
        .expect_err("empty input should be rejected");
    assert!(matches!(error, OpenRouterError::InvalidRequestPayload(message) if message.contains("input")));

    let error = client
        .build_request(&ResponsesRequest::new(" ", user_input("hi")), false)
        .expect_err("blank model should be rejected");
    assert!(matches!(error, OpenRouterError::InvalidRequestPayload(message) if message.contains("model")));
}
