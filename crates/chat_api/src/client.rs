use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::build_headers;
use crate::payload::ChatRequest;
use crate::retry::{is_retryable_http_error, is_retryable_transport_error, retry_delay_ms, MAX_RETRIES};
use crate::url::normalize_chat_completions_url;

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_completions_url(&self.config.base_url)
    }

    pub fn build_headers(&self, user_agent: Option<&str>) -> Result<HeaderMap, ChatApiError> {
        let headers = build_headers(&self.config, user_agent)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        if request.model.trim().is_empty() {
            return Err(ChatApiError::Unknown(
                "chat request model must not be empty".to_owned(),
            ));
        }

        let headers = self.build_headers(self.config.user_agent.as_deref())?;
        let mut payload = request.clone();
        payload.stream = false;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    pub async fn send_with_retry(&self, request: &ChatRequest) -> Result<Response, ChatApiError> {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            match self.build_request(request)?.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    last_status = Some(status);
                    let body = response.text().await.unwrap_or_else(|_| {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &body) {
                        tokio::time::sleep(retry_delay_ms(attempt)).await;
                        continue;
                    }

                    return Err(ChatApiError::Status(status, message));
                }
                Err(error) => {
                    let retryable = is_retryable_transport_error(&error);
                    last_error = Some(error.to_string());
                    if !retryable {
                        return Err(ChatApiError::Request(error));
                    }
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(retry_delay_ms(attempt)).await;
                        continue;
                    }
                }
            }
        }

        Err(ChatApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Performs one chat exchange and returns the raw reply.
    ///
    /// JSON bodies are decoded into a [`Value`]; non-JSON bodies are returned
    /// as a string value and an empty body yields [`Value::Null`].
    pub async fn complete(&self, request: &ChatRequest) -> Result<Value, ChatApiError> {
        let response = self.send_with_retry(request).await?;
        let body = response.text().await?;
        Ok(decode_reply_body(&body))
    }
}

pub fn decode_reply_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::decode_reply_body;

    #[test]
    fn decode_reply_body_parses_json_objects() {
        assert_eq!(
            decode_reply_body(r#"{"choices":[{"message":{"content":"x"}}]}"#),
            json!({"choices": [{"message": {"content": "x"}}]})
        );
    }

    #[test]
    fn decode_reply_body_keeps_plain_text_as_string() {
        assert_eq!(decode_reply_body("just text"), json!("just text"));
    }

    #[test]
    fn decode_reply_body_maps_blank_body_to_null() {
        assert_eq!(decode_reply_body("  \n"), serde_json::Value::Null);
    }
}
