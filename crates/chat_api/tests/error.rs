use reqwest::StatusCode;

use chat_api::error::parse_error_message;
use chat_api::ChatApiError;

#[test]
fn parse_error_message_prefers_error_message_field() {
    let body = r#"{"error":{"code":"model_not_found","message":"invalid model"}}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(message, "invalid model");
}

#[test]
fn parse_error_message_falls_back_to_code_then_type() {
    let with_code = r#"{"error":{"code":"insufficient_quota","type":"billing"}}"#;
    assert_eq!(
        parse_error_message(StatusCode::TOO_MANY_REQUESTS, with_code),
        "insufficient_quota"
    );

    let with_type = r#"{"error":{"type":"overloaded_error"}}"#;
    assert_eq!(
        parse_error_message(StatusCode::SERVICE_UNAVAILABLE, with_type),
        "overloaded_error"
    );
}

#[test]
fn parse_error_message_accepts_bare_string_error() {
    let body = r#"{"error":"unexpected request"}"#;
    assert_eq!(
        parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, body),
        "unexpected request"
    );
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "raw failure text";
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, body);
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_uses_status_reason_for_empty_body() {
    assert_eq!(
        parse_error_message(StatusCode::BAD_GATEWAY, ""),
        "Bad Gateway"
    );
}

#[test]
fn retry_exhausted_display_names_status_and_last_error() {
    let error = ChatApiError::RetryExhausted {
        status: Some(StatusCode::SERVICE_UNAVAILABLE),
        last_error: Some("overloaded".to_string()),
    };

    assert_eq!(
        error.to_string(),
        "retry exhausted after max attempts (status: 503, last error: overloaded)"
    );
}
