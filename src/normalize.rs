//! Reply normalization: turns provider-shaped chat replies into plain text.
//!
//! Providers answer in several overlapping shapes. Checks run in a fixed order
//! and the first shape that yields text wins; a reply matching none of them is
//! malformed.

use serde_json::{Map, Value};

use crate::error::ForgeError;

pub const EMPTY_RESPONSE: &str = "empty response";
pub const UNRECOGNIZED_SHAPE: &str = "unrecognized response shape";

/// Closed set of reply shapes, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    PlainText,
    MessageContent,
    TopLevelText,
    TopLevelContent,
    Choices,
    AssistantMessage,
}

impl ReplyShape {
    pub const ORDER: [ReplyShape; 6] = [
        ReplyShape::PlainText,
        ReplyShape::MessageContent,
        ReplyShape::TopLevelText,
        ReplyShape::TopLevelContent,
        ReplyShape::Choices,
        ReplyShape::AssistantMessage,
    ];

    fn extract(self, reply: &Value) -> Option<String> {
        let object = reply.as_object();
        match self {
            Self::PlainText => reply.as_str().map(trimmed),
            Self::MessageContent => object
                .and_then(|object| truthy_field(object, "message"))
                .and_then(Value::as_object)
                .and_then(|message| truthy_field(message, "content"))
                .and_then(message_content_text),
            Self::TopLevelText => object
                .and_then(|object| truthy_field(object, "text"))
                .and_then(Value::as_str)
                .map(trimmed),
            Self::TopLevelContent => object
                .and_then(|object| truthy_field(object, "content"))
                .and_then(joined_content_text),
            Self::Choices => object
                .and_then(|object| object.get("choices"))
                .and_then(Value::as_array)
                .and_then(|choices| choices.first())
                .and_then(choice_text),
            Self::AssistantMessage => object
                .filter(|object| object.get("role").and_then(Value::as_str) == Some("assistant"))
                .and_then(|object| truthy_field(object, "content"))
                .and_then(Value::as_str)
                .map(trimmed),
        }
    }
}

/// Extracts trimmed reply text, or fails with [`ForgeError::MalformedResponse`].
pub fn normalize(reply: &Value) -> Result<String, ForgeError> {
    if let Some(text) = ReplyShape::PlainText.extract(reply) {
        return Ok(text);
    }

    if !is_truthy(reply) {
        return Err(ForgeError::malformed(EMPTY_RESPONSE));
    }

    for shape in &ReplyShape::ORDER[1..] {
        if let Some(text) = shape.extract(reply) {
            tracing::debug!(?shape, "matched reply shape");
            return Ok(text);
        }
    }

    tracing::warn!(reply = %reply, "unrecognized reply shape");
    Err(ForgeError::malformed(UNRECOGNIZED_SHAPE))
}

/// `message.content`: first text-typed block, then the first block's text, then a bare string.
fn message_content_text(content: &Value) -> Option<String> {
    if let Some(blocks) = content.as_array().filter(|blocks| !blocks.is_empty()) {
        let typed = blocks
            .iter()
            .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .and_then(|block| block.get("text"))
            .filter(|text| is_truthy(text))
            .and_then(Value::as_str);
        if let Some(text) = typed {
            return Some(trimmed(text));
        }

        let first = blocks[0]
            .get("text")
            .filter(|text| is_truthy(text))
            .and_then(Value::as_str);
        if let Some(text) = first {
            return Some(trimmed(text));
        }
    }

    content.as_str().map(trimmed)
}

/// Top-level `content`: a string, or the concatenation of text blocks and bare strings.
fn joined_content_text(content: &Value) -> Option<String> {
    if let Some(text) = content.as_str() {
        return Some(trimmed(text));
    }

    let blocks = content.as_array().filter(|blocks| !blocks.is_empty())?;
    let joined: String = blocks
        .iter()
        .filter_map(|block| match block {
            Value::String(text) => Some(text.as_str()),
            Value::Object(fields) if fields.get("type").and_then(Value::as_str) == Some("text") => {
                fields.get("text").and_then(Value::as_str)
            }
            _ => None,
        })
        .collect();
    Some(trimmed(&joined))
}

fn choice_text(choice: &Value) -> Option<String> {
    let from_message = choice
        .get("message")
        .and_then(|message| message.get("content"))
        .filter(|content| is_truthy(content))
        .and_then(Value::as_str);
    if let Some(text) = from_message {
        return Some(trimmed(text));
    }

    choice
        .get("text")
        .filter(|text| is_truthy(text))
        .and_then(Value::as_str)
        .map(trimmed)
}

fn truthy_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| is_truthy(value))
}

/// Loose truthiness used when probing reply fields: null, false, zero and "" are all absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn trimmed(text: &str) -> String {
    text.trim().to_string()
}
