use reqwest::StatusCode;

use openrouter_api::error::parse_error_message;
use openrouter_api::OpenRouterError;

#[test]
fn parse_error_message_uses_json_message() {
    let body = r#"{"error":{"code":400,"message":"invalid model"}}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(message, "invalid model");
}

#[test]
fn parse_error_message_names_upstream_provider() {
    let body = r#"{"error":{"code":502,"message":"upstream error","metadata":{"provider_name":"Acme"}}}"#;
    let message = parse_error_message(StatusCode::BAD_GATEWAY, body);
    assert_eq!(message, "upstream error (provider: Acme)");
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "raw failure text";
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, body);
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_falls_back_to_status_reason_for_empty_body() {
    let message = parse_error_message(StatusCode::UNAUTHORIZED, "");
    assert_eq!(message, "Unauthorized");
}

#[test]
fn status_errors_expose_their_status() {
    let error = OpenRouterError::Status(StatusCode::UNAUTHORIZED, "No auth".to_string());
    assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(error.to_string(), "HTTP 401 Unauthorized No auth");
    assert_eq!(OpenRouterError::Cancelled.status(), None);
}
