//! Minimal provider-agnostic contract for one AI chat exchange.
//!
//! This crate defines only the request options, the failure type, and the
//! closed set of caller-visible providers. It excludes transport details and
//! any interpretation of the reply payload: callers receive the provider's raw
//! reply value and decide how to read text out of it.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Raw, provider-shaped reply returned by a gateway.
pub type ProviderReply = Value;

/// Error returned when the gateway rejects or fails a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    /// Creates a new gateway error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<String> for GatewayError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for GatewayError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Per-request options forwarded to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub model: String,
}

impl ChatOptions {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    #[must_use]
    pub fn for_provider(provider: Provider) -> Self {
        Self::new(provider.model_id())
    }
}

/// Caller-visible provider choice. Each provider maps to one fixed model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Claude,
    Gpt,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Claude, Provider::Gpt];

    /// Stable identifier used on the command line and in stored state.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gpt => "gpt",
        }
    }

    #[must_use]
    pub fn model_id(self) -> &'static str {
        match self {
            Self::Claude => "claude-sonnet-4-5",
            Self::Gpt => "gpt-5.2-pro",
        }
    }

    /// Human-readable name shown after a successful enhancement.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude Sonnet 4.5",
            Self::Gpt => "gpt-5.2-pro",
        }
    }

    /// Short label used as the prefix of gateway failure messages.
    #[must_use]
    pub fn error_label(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Gpt => "GPT",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|provider| provider.id() == normalized)
            .ok_or_else(|| {
                format!("Unsupported provider '{}'. Available providers: claude, gpt", value.trim())
            })
    }
}

/// Gateway interface for executing one chat exchange.
///
/// Implementations block until the exchange settles. There is no cancellation
/// and no implicit timeout: once started, a call runs to completion or failure.
pub trait ChatGateway: Send + Sync + 'static {
    /// Stable backend identifier (for example `mock` or `chat-api`).
    fn gateway_id(&self) -> &str;

    /// Sends `prompt` to the model selected by `options` and returns the raw reply.
    fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ProviderReply, GatewayError>;
}
