//! Chat-completions-backed implementation of the shared `ai_gateway` contract.
//!
//! This adapter turns one `chat` call into one blocking `chat_api` exchange and
//! hands the decoded reply back untouched; reading text out of it is left to
//! the caller's normalizer.

use std::sync::Arc;
use std::time::Duration;

use ai_gateway::{ChatGateway, ChatOptions, GatewayError, ProviderReply};
use chat_api::{ChatApiClient, ChatApiConfig, ChatApiError, ChatRequest};

/// Stable gateway identifier used by `forge_app` startup selection.
pub const CHAT_API_GATEWAY_ID: &str = "chat-api";

/// Runtime configuration for the chat API gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatApiGatewayConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl ChatApiGatewayConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_chat_api_config(self) -> ChatApiConfig {
        let mut config = ChatApiConfig::new(self.api_key);

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait ReplyClient: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<ProviderReply, ChatApiError>;
}

#[derive(Debug)]
struct DefaultReplyClient {
    client: ChatApiClient,
}

impl ReplyClient for DefaultReplyClient {
    fn complete(&self, request: &ChatRequest) -> Result<ProviderReply, ChatApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                ChatApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.complete(request))
    }
}

/// `ChatGateway` adapter backed by `chat_api` transport primitives.
pub struct ChatApiGateway {
    reply_client: Arc<dyn ReplyClient>,
}

impl ChatApiGateway {
    /// Creates a gateway using the real HTTP transport.
    pub fn new(config: ChatApiGatewayConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::new(
                "Failed to initialize chat-api gateway: API key is required",
            ));
        }

        let client = ChatApiClient::new(config.into_chat_api_config()).map_err(map_init_error)?;
        Ok(Self {
            reply_client: Arc::new(DefaultReplyClient { client }),
        })
    }

    #[cfg(test)]
    fn with_reply_client_for_tests(reply_client: Arc<dyn ReplyClient>) -> Self {
        Self { reply_client }
    }
}

impl ChatGateway for ChatApiGateway {
    fn gateway_id(&self) -> &str {
        CHAT_API_GATEWAY_ID
    }

    fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ProviderReply, GatewayError> {
        let request = ChatRequest::user_prompt(options.model.clone(), prompt);
        tracing::debug!(model = %options.model, "sending chat completion request");

        self.reply_client
            .complete(&request)
            .map_err(map_request_error)
    }
}

/// Surfaces the provider's own message for status failures, the transport's text otherwise.
fn map_request_error(error: ChatApiError) -> GatewayError {
    match error {
        ChatApiError::Status(_, message) => GatewayError::new(message),
        other => GatewayError::new(other.to_string()),
    }
}

fn map_init_error(error: ChatApiError) -> GatewayError {
    GatewayError::new(format!("Failed to initialize chat-api gateway: {error}"))
}
