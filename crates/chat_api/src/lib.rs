//! Transport-only chat completions client primitives.
//!
//! This crate owns request building, retry policy, and raw reply retrieval for
//! an OpenAI-compatible `chat/completions` endpoint. It intentionally does not
//! interpret reply payloads: a successful exchange yields the decoded JSON
//! body (or the raw body text when it is not JSON) for callers to normalize.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{ChatMessage, ChatRequest};
pub use reqwest::StatusCode;
pub use url::normalize_chat_completions_url;
