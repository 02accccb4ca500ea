//! Prompt preparation core.
//!
//! Assembles a system-instructions block, a task prompt and file attachments
//! into one combined document, rewrites fields through an AI gateway, and
//! keeps a versioned history for the chat-optimize loop.
//!
//! # Public API Overview
//! - [`normalize`] turns provider-shaped replies into plain text.
//! - [`EnhancementSession`] tracks per-field enhancement with revert and redo.
//! - [`ChatHistory`] is the persisted version log with an undo cursor.
//! - [`AttachmentSet`] and [`generate`] read attachments concurrently and
//!   compose the final document in insertion order.
//! - [`EnvConfig`] and [`init_logging`] cover environment bootstrap.

pub mod attachments;
pub mod compose;
pub mod config;
pub mod enhancement;
pub mod error;
pub mod history;
pub mod logging;
pub mod normalize;
pub mod prompts;

pub use crate::attachments::{
    file_badge, format_file_size, AttachmentSet, AttachmentSummary, DiskFile, FileSource,
    MemoryFile,
};
pub use crate::compose::{
    compose, generate, read_attachments, AttachmentContent, AttachmentSection,
    READ_FAILURE_PLACEHOLDER,
};
pub use crate::config::EnvConfig;
pub use crate::enhancement::{EnhancementSession, EnhancementState, Field};
pub use crate::error::ForgeError;
pub use crate::history::{ChatHistory, VersionEntry, CHAT_VERSIONS_KEY, PREVIEW_CHARS};
pub use crate::logging::init_logging;
pub use crate::normalize::{normalize, ReplyShape};
pub use crate::prompts::{chat_optimize_request, enhancement_request, failure_notice, request_text};

pub use ai_gateway::{ChatGateway, ChatOptions, GatewayError, Provider};
