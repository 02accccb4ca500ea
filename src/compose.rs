//! Output composition: instructions, prompt and attachments into one document.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::attachments::{AttachmentSet, FileSource};

pub const INSTRUCTIONS_LABEL: &str = "SYSTEM_INSTRUCTIONS";
pub const PROMPT_LABEL: &str = "USER_PROMPT";
pub const READ_FAILURE_PLACEHOLDER: &str = "[Error reading file]";

/// Outcome of reading one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    Text(String),
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSection {
    pub name: String,
    pub content: AttachmentContent,
}

impl AttachmentSection {
    fn render(&self, out: &mut String) {
        out.push_str("### ATTACHMENT: ");
        out.push_str(&self.name);
        out.push('\n');
        match &self.content {
            AttachmentContent::Text(text) => {
                let extension = self.name.rsplit('.').next().unwrap_or(&self.name);
                out.push_str(&format!("```{extension}\n{text}\n```\n\n"));
            }
            AttachmentContent::Unreadable => {
                out.push_str(READ_FAILURE_PLACEHOLDER);
                out.push_str("\n\n");
            }
        }
    }
}

/// Composes the final document from already-read attachment sections.
///
/// Blank text fields are omitted and trailing whitespace is trimmed, so an
/// empty session composes to the empty string.
pub fn compose(instructions: &str, prompt: &str, sections: &[AttachmentSection]) -> String {
    let mut out = String::new();

    for (label, text) in [(INSTRUCTIONS_LABEL, instructions), (PROMPT_LABEL, prompt)] {
        let text = text.trim();
        if !text.is_empty() {
            out.push_str(&format!("### {label}\n{text}\n\n"));
        }
    }

    for section in sections {
        section.render(&mut out);
    }

    out.truncate(out.trim_end().len());
    out
}

/// Reads every attachment concurrently and returns sections in insertion order.
///
/// Resolves only once every read has settled; a failed read becomes an
/// [`AttachmentContent::Unreadable`] section and never affects the others.
pub async fn read_attachments(attachments: &AttachmentSet) -> Vec<AttachmentSection> {
    join_all(attachments.iter().map(read_section)).await
}

async fn read_section(file: &Arc<dyn FileSource>) -> AttachmentSection {
    let content = match file.read_text().await {
        Ok(text) => AttachmentContent::Text(text),
        Err(error) => {
            tracing::warn!(name = file.name(), %error, "failed to read attachment");
            AttachmentContent::Unreadable
        }
    };

    AttachmentSection {
        name: file.name().to_string(),
        content,
    }
}

/// Reads all attachments and composes the combined document.
pub async fn generate(instructions: &str, prompt: &str, attachments: &AttachmentSet) -> String {
    let sections = read_attachments(attachments).await;
    compose(instructions, prompt, &sections)
}
