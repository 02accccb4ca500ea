//! Page controllers and command-line surface for prompt_forge.
//!
//! ## Gateway bootstrap
//!
//! The AI gateway is selected explicitly through `PROMPT_FORGE_PROVIDER`:
//!
//! - `PROMPT_FORGE_PROVIDER=mock` (default) for deterministic local runs
//! - `PROMPT_FORGE_PROVIDER=chat-api` for an OpenAI-compatible chat completions endpoint
//!
//! When `PROMPT_FORGE_PROVIDER=chat-api`, set `PROMPT_FORGE_CHAT_API_CONFIG`
//! to a readable UTF-8 JSON file with this shape:
//!
//! ```json
//! {
//!   "api_key": "sk-...",
//!   "base_url": "https://openrouter.ai/api/v1",
//!   "timeout_sec": 120
//! }
//! ```
//!
//! Contract notes:
//! - `api_key` is required and must be non-empty.
//! - `base_url` is optional and defaults to `https://api.openai.com/v1`.
//! - `timeout_sec` is optional and must be > 0 when provided; requests never
//!   time out otherwise.
//! - Unknown JSON fields are rejected.
//!
//! ## Storage
//!
//! Saved instructions and the chat version history live in a file-backed
//! key-value store under `PROMPT_FORGE_STORAGE_DIR`, or the platform data
//! directory when unset.

pub mod app;
pub mod commands;
pub mod providers;
