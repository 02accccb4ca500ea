//! Per-field AI enhancement tracking with revert and redo.

use std::fmt;
use std::str::FromStr;

use ai_gateway::{ChatGateway, Provider};

use crate::error::ForgeError;
use crate::prompts::{enhancement_request, request_text};

/// Editable code-page field that can be enhanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Instructions,
    Prompt,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Instructions, Field::Prompt];

    pub fn id(self) -> &'static str {
        match self {
            Self::Instructions => "instructions",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.id() == normalized)
            .ok_or_else(|| format!("Unknown field '{}'. Expected instructions or prompt", value.trim()))
    }
}

/// Enhancement bookkeeping for one field.
///
/// `original` is captured on the first enhancement of a cycle and survives
/// later re-enhancements; `is_enhanced` implies `original` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhancementState {
    pub original: Option<String>,
    pub provider: Option<Provider>,
    pub is_enhanced: bool,
}

#[derive(Debug, Clone, Default)]
struct FieldSlot {
    text: String,
    state: EnhancementState,
}

/// Owns the text of both enhanceable fields and their enhancement state.
#[derive(Debug, Clone, Default)]
pub struct EnhancementSession {
    instructions: FieldSlot,
    prompt: FieldSlot,
}

impl EnhancementSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: Field) -> &str {
        &self.slot(field).text
    }

    /// Replaces the field text as a user edit would. Enhancement state is kept.
    pub fn set_text(&mut self, field: Field, text: impl Into<String>) {
        self.slot_mut(field).text = text.into();
    }

    pub fn state(&self, field: Field) -> &EnhancementState {
        &self.slot(field).state
    }

    /// Starts an enhancement of the current field text with `provider`.
    ///
    /// Returns the trimmed content to send. Blank content fails with
    /// [`ForgeError::EmptyInput`] and leaves the state untouched.
    pub fn begin(&mut self, field: Field, provider: Provider) -> Result<String, ForgeError> {
        let slot = self.slot_mut(field);
        let content = slot.text.trim().to_string();
        if content.is_empty() {
            return Err(ForgeError::EmptyInput);
        }

        if !slot.state.is_enhanced {
            slot.state.original = Some(content.clone());
        }
        slot.state.provider = Some(provider);
        Ok(content)
    }

    pub fn complete(&mut self, field: Field, result: impl Into<String>) {
        let slot = self.slot_mut(field);
        slot.text = result.into();
        slot.state.is_enhanced = true;
    }

    /// Records a failed enhancement. The state is left exactly as `begin` left it.
    pub fn fail(&mut self, field: Field, error: ForgeError) -> ForgeError {
        tracing::debug!(field = %field, %error, "enhancement failed");
        error
    }

    /// Restores the pre-enhancement text and resets the field state.
    ///
    /// Returns `false` without touching anything when there is no original.
    pub fn revert(&mut self, field: Field) -> bool {
        let slot = self.slot_mut(field);
        let Some(original) = slot.state.original.take() else {
            return false;
        };

        slot.text = original;
        slot.state = EnhancementState::default();
        true
    }

    /// Restores the original text and hands back the provider to re-run with.
    ///
    /// Returns `None` when no provider has been recorded for the field.
    pub fn redo(&mut self, field: Field) -> Option<Provider> {
        let slot = self.slot_mut(field);
        let provider = slot.state.provider?;
        if let Some(original) = &slot.state.original {
            slot.text = original.clone();
        }
        Some(provider)
    }

    /// Empties the field and forgets its enhancement state.
    pub fn reset(&mut self, field: Field) {
        *self.slot_mut(field) = FieldSlot::default();
    }

    /// Runs one full enhancement cycle for `field` against `gateway`.
    pub fn enhance(
        &mut self,
        field: Field,
        provider: Provider,
        gateway: &dyn ChatGateway,
    ) -> Result<&str, ForgeError> {
        let content = self.begin(field, provider)?;
        match request_text(gateway, provider, &enhancement_request(field, &content)) {
            Ok(result) => {
                self.complete(field, result);
                Ok(self.text(field))
            }
            Err(error) => Err(self.fail(field, error)),
        }
    }

    fn slot(&self, field: Field) -> &FieldSlot {
        match field {
            Field::Instructions => &self.instructions,
            Field::Prompt => &self.prompt,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut FieldSlot {
        match field {
            Field::Instructions => &mut self.instructions,
            Field::Prompt => &mut self.prompt,
        }
    }
}
