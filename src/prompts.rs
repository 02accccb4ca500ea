//! Meta-prompts wrapped around user text before it is sent to a provider.

use ai_gateway::{ChatGateway, ChatOptions, Provider};

use crate::enhancement::Field;
use crate::error::ForgeError;
use crate::normalize::normalize;

const INSTRUCTIONS_META_PROMPT: &str = "You are an expert at crafting clear, effective AI system instructions. Transform the user's rough notes into professional, well-structured system instructions.

Guidelines:
- Use clear, imperative language
- Organize into logical sections if needed
- Be specific about behavior, tone, and constraints
- Keep it concise but comprehensive
- Use bullet points for clarity when appropriate

Return ONLY the enhanced system instructions, no explanations or meta-commentary.";

const PROMPT_META_PROMPT: &str = "You are an expert at crafting clear, effective AI prompts. Transform the user's rough description into a well-structured, detailed prompt.

Guidelines:
- Clarify the objective and expected output
- Add relevant context and constraints
- Structure the request logically
- Be specific about format, length, or style if implied
- Make implicit requirements explicit

Return ONLY the enhanced prompt, no explanations or meta-commentary.";

const CHAT_OPTIMIZE_META_PROMPT: &str = "You are an expert editor. Rewrite the user's text so it is clearer, better organized, and more effective, while preserving its meaning, intent, and language.

Guidelines:
- Fix grammar, spelling, and awkward phrasing
- Remove redundancy and tighten wording
- Keep the original tone unless it hurts clarity
- Preserve any code, names, and numbers exactly

Return ONLY the optimized text, no explanations or meta-commentary.";

const ENHANCE_MARKER: &str = "User Content to Enhance:";
const OPTIMIZE_MARKER: &str = "Text to Optimize:";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Builds the full request text for enhancing one code-page field.
pub fn enhancement_request(field: Field, content: &str) -> String {
    let meta = match field {
        Field::Instructions => INSTRUCTIONS_META_PROMPT,
        Field::Prompt => PROMPT_META_PROMPT,
    };
    wrap(meta, ENHANCE_MARKER, content)
}

/// Builds the full request text for the chat optimize loop.
pub fn chat_optimize_request(text: &str) -> String {
    wrap(CHAT_OPTIMIZE_META_PROMPT, OPTIMIZE_MARKER, text)
}

fn wrap(meta: &str, marker: &str, content: &str) -> String {
    format!("{meta}\n\n---\n\n{marker}\n{content}")
}

/// Sends `request` to `provider` through `gateway` and normalizes the reply to text.
pub fn request_text(
    gateway: &dyn ChatGateway,
    provider: Provider,
    request: &str,
) -> Result<String, ForgeError> {
    let options = ChatOptions::for_provider(provider);
    tracing::debug!(
        gateway = gateway.gateway_id(),
        model = %options.model,
        prompt_chars = request.chars().count(),
        "requesting completion"
    );

    let reply = gateway.chat(request, &options).map_err(|error| {
        let message = if error.message().trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            error.message().to_string()
        };
        ForgeError::GatewayFailure {
            label: provider.error_label(),
            message,
        }
    })?;
    tracing::debug!(model = %options.model, reply = %reply, "raw provider reply");

    normalize(&reply)
}

/// User-facing text for a failed provider exchange.
///
/// Normalizer failures carry the provider label like transport failures do.
pub fn failure_notice(provider: Provider, error: &ForgeError) -> String {
    match error {
        ForgeError::MalformedResponse(message) => {
            format!("{} error: {message}", provider.error_label())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use ai_gateway_mock::MockGateway;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn enhancement_request_places_content_after_marker() {
        let request = enhancement_request(Field::Prompt, "write a poem");

        assert!(request.starts_with("You are an expert at crafting clear, effective AI prompts."));
        assert!(request.ends_with("\n\n---\n\nUser Content to Enhance:\nwrite a poem"));
    }

    #[test]
    fn instructions_use_their_own_meta_prompt() {
        let request = enhancement_request(Field::Instructions, "be nice");
        assert!(request.contains("Return ONLY the enhanced system instructions"));
    }

    #[test]
    fn chat_optimize_request_uses_optimize_marker() {
        assert!(chat_optimize_request("hi").ends_with("---\n\nText to Optimize:\nhi"));
    }

    #[test]
    fn request_text_normalizes_reply_and_uses_provider_model() {
        let gateway = MockGateway::with_replies(vec![Ok(json!({
            "choices": [{"message": {"content": "  sharper  "}}]
        }))]);

        let text = request_text(&gateway, Provider::Gpt, "req").expect("request should succeed");

        assert_eq!(text, "sharper");
        assert_eq!(gateway.calls()[0].model, "gpt-5.2-pro");
    }

    #[test]
    fn gateway_failures_are_labelled_by_provider() {
        let gateway = MockGateway::new();
        gateway.push_failure("quota exceeded");
        gateway.push_failure(" ");

        let error = request_text(&gateway, Provider::Claude, "req").expect_err("should fail");
        assert_eq!(error.to_string(), "Claude error: quota exceeded");

        let error = request_text(&gateway, Provider::Gpt, "req").expect_err("should fail");
        assert_eq!(error.to_string(), "GPT error: Unknown error");
    }

    #[test]
    fn malformed_reply_notice_carries_provider_label() {
        let gateway = MockGateway::with_replies(vec![Ok(json!(null))]);

        let error = request_text(&gateway, Provider::Gpt, "req").expect_err("should fail");
        assert_eq!(error, ForgeError::MalformedResponse("empty response".to_string()));
        assert_eq!(failure_notice(Provider::Gpt, &error), "GPT error: empty response");
    }
}
