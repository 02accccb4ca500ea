//! Deterministic mock implementation of the shared `ai_gateway` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and controller-level integration testing. Replies can be
//! scripted per call; unscripted calls fall back to an echo reply shaped like
//! a Claude message.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use ai_gateway::{ChatGateway, ChatOptions, GatewayError, ProviderReply};
use serde_json::json;

/// Stable gateway identifier used for explicit startup selection.
pub const MOCK_GATEWAY_ID: &str = "mock";

/// One observed `chat` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub model: String,
}

/// Deterministic mock gateway used by `forge_app` tests and local runs.
#[derive(Debug, Default)]
pub struct MockGateway {
    scripted: Mutex<VecDeque<Result<ProviderReply, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Creates a mock gateway with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock gateway that answers calls with `replies` in order.
    #[must_use]
    pub fn with_replies(replies: Vec<Result<ProviderReply, GatewayError>>) -> Self {
        Self {
            scripted: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: ProviderReply) {
        lock_unpoisoned(&self.scripted).push_back(Ok(reply));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        lock_unpoisoned(&self.scripted).push_back(Err(GatewayError::new(message)));
    }

    /// Returns every call observed so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock_unpoisoned(&self.calls).clone()
    }

    #[must_use]
    pub fn pending_replies(&self) -> usize {
        lock_unpoisoned(&self.scripted).len()
    }
}

impl ChatGateway for MockGateway {
    fn gateway_id(&self) -> &str {
        MOCK_GATEWAY_ID
    }

    fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ProviderReply, GatewayError> {
        lock_unpoisoned(&self.calls).push(RecordedCall {
            prompt: prompt.to_string(),
            model: options.model.clone(),
        });

        if let Some(scripted) = lock_unpoisoned(&self.scripted).pop_front() {
            return scripted;
        }

        Ok(echo_reply(prompt, &options.model))
    }
}

/// Builds the unscripted reply: the content block of the prompt, tagged with the model.
fn echo_reply(prompt: &str, model: &str) -> ProviderReply {
    let text = format!("[{model}] {}", content_block(prompt));
    json!({
        "message": {
            "role": "assistant",
            "content": [
                { "type": "text", "text": text }
            ]
        }
    })
}

/// Returns the text after the last `---` separator, minus its `Header:` line.
fn content_block(prompt: &str) -> &str {
    let tail = prompt
        .rsplit_once("\n---\n")
        .map_or(prompt, |(_, tail)| tail)
        .trim_start();

    match tail.split_once('\n') {
        Some((header, body)) if header.trim_end().ends_with(':') => body.trim(),
        _ => tail.trim(),
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use ai_gateway::Provider;

    use super::*;

    #[test]
    fn gateway_id_is_explicit_mock_identity() {
        assert_eq!(MockGateway::new().gateway_id(), MOCK_GATEWAY_ID);
    }

    #[test]
    fn scripted_replies_are_returned_in_order_then_echo_resumes() {
        let gateway = MockGateway::with_replies(vec![
            Ok(json!("first")),
            Err(GatewayError::new("rate limited")),
        ]);
        let options = ChatOptions::for_provider(Provider::Claude);

        assert_eq!(gateway.chat("a", &options), Ok(json!("first")));
        assert_eq!(
            gateway.chat("b", &options),
            Err(GatewayError::new("rate limited"))
        );
        assert_eq!(gateway.pending_replies(), 0);

        let echoed = gateway.chat("c", &options).expect("echo should succeed");
        assert_eq!(
            echoed["message"]["content"][0]["text"],
            "[claude-sonnet-4-5] c"
        );
    }

    #[test]
    fn calls_record_prompt_and_model() {
        let gateway = MockGateway::new();
        gateway.push_failure("boom");

        let _ = gateway.chat("hello", &ChatOptions::for_provider(Provider::Gpt));

        assert_eq!(
            gateway.calls(),
            vec![RecordedCall {
                prompt: "hello".to_string(),
                model: "gpt-5.2-pro".to_string(),
            }]
        );
    }

    #[test]
    fn echo_uses_content_after_last_separator_header() {
        let prompt = "Meta prompt\n\n---\n\nUser Content to Enhance:\nrough notes\nsecond line";
        assert_eq!(content_block(prompt), "rough notes\nsecond line");
        assert_eq!(content_block("  plain  "), "plain");
    }
}
