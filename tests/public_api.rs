#![allow(unused_imports)]

use prompt_forge::{
    chat_optimize_request, compose, enhancement_request, failure_notice, file_badge,
    format_file_size, generate, init_logging, normalize, read_attachments, request_text,
    AttachmentContent, AttachmentSection, AttachmentSet, AttachmentSummary, ChatGateway,
    ChatHistory, ChatOptions, DiskFile, EnhancementSession, EnhancementState, EnvConfig, Field,
    FileSource, ForgeError, GatewayError, MemoryFile, Provider, ReplyShape, VersionEntry,
    CHAT_VERSIONS_KEY, PREVIEW_CHARS, READ_FAILURE_PLACEHOLDER,
};

#[test]
fn public_api_exports_compile() {}
