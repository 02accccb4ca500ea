use std::sync::Arc;
use std::time::Duration;

use ai_gateway::{ChatGateway, Provider};
use kv_store::KeyValueStore;
use prompt_forge::{
    chat_optimize_request, failure_notice, generate, request_text, AttachmentSet,
    AttachmentSummary, ChatHistory, EnhancementSession, EnhancementState, Field, FileSource,
    ForgeError, VersionEntry,
};

/// Storage key holding the saved system instructions.
pub const INSTRUCTIONS_KEY: &str = "stored_instructions";
/// How long a notice stays visible before the host dismisses it.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

pub const ENHANCED_MESSAGE: &str = "Content enhanced successfully!";
pub const REVERTED_MESSAGE: &str = "Reverted to original content";
pub const OPTIMIZED_MESSAGE: &str = "Text optimized successfully!";
pub const UNDO_MESSAGE: &str = "Restored previous version";
pub const HISTORY_CLEARED_MESSAGE: &str = "Version history cleared";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub fn ttl(&self) -> Duration {
        NOTICE_TTL
    }
}

/// Host surface that displays notices.
pub trait NoticeSink {
    fn notify(&mut self, notice: Notice);
}

/// Controller for the code optimize page: instructions, prompt, attachments.
pub struct CodePage {
    session: EnhancementSession,
    attachments: AttachmentSet,
    gateway: Arc<dyn ChatGateway>,
    store: Arc<dyn KeyValueStore>,
}

impl CodePage {
    /// Opens the page with the saved instructions, if any.
    pub fn new(gateway: Arc<dyn ChatGateway>, store: Arc<dyn KeyValueStore>) -> Self {
        let mut session = EnhancementSession::new();
        match store.get(INSTRUCTIONS_KEY) {
            Ok(Some(saved)) => session.set_text(Field::Instructions, saved),
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "failed to load saved instructions"),
        }

        Self {
            session,
            attachments: AttachmentSet::new(),
            gateway,
            store,
        }
    }

    pub fn text(&self, field: Field) -> &str {
        self.session.text(field)
    }

    pub fn instructions(&self) -> &str {
        self.session.text(Field::Instructions)
    }

    pub fn prompt(&self) -> &str {
        self.session.text(Field::Prompt)
    }

    pub fn set_text(&mut self, field: Field, text: impl Into<String>) {
        self.session.set_text(field, text);
    }

    pub fn enhancement_state(&self, field: Field) -> &EnhancementState {
        self.session.state(field)
    }

    /// Display name of the provider behind the current enhancement, if the field is enhanced.
    pub fn enhanced_with(&self, field: Field) -> Option<&'static str> {
        let state = self.session.state(field);
        state
            .provider
            .filter(|_| state.is_enhanced)
            .map(Provider::display_name)
    }

    /// Persists the instructions field. Failures are logged and otherwise ignored.
    pub fn save_instructions(&self) {
        if let Err(error) = self.store.set(INSTRUCTIONS_KEY, self.instructions()) {
            tracing::warn!(%error, "failed to save instructions");
        }
    }

    /// Enhances `field` with `provider`, reporting the outcome through `sink`.
    pub fn enhance(
        &mut self,
        field: Field,
        provider: Provider,
        sink: &mut dyn NoticeSink,
    ) -> Result<(), ForgeError> {
        let outcome = self
            .session
            .enhance(field, provider, self.gateway.as_ref())
            .map(|_| ());
        match outcome {
            Ok(()) => {
                if field == Field::Instructions {
                    self.save_instructions();
                }
                sink.notify(Notice::success(ENHANCED_MESSAGE));
                Ok(())
            }
            Err(error) => {
                sink.notify(Notice::error(failure_notice(provider, &error)));
                Err(error)
            }
        }
    }

    /// Re-runs the last enhancement of `field` from its original text.
    ///
    /// Returns `Ok(false)` when the field has never been enhanced.
    pub fn redo(&mut self, field: Field, sink: &mut dyn NoticeSink) -> Result<bool, ForgeError> {
        let Some(provider) = self.session.redo(field) else {
            return Ok(false);
        };
        self.enhance(field, provider, sink).map(|()| true)
    }

    /// Restores the pre-enhancement text. Does nothing when there is nothing to revert.
    pub fn revert(&mut self, field: Field, sink: &mut dyn NoticeSink) -> bool {
        if !self.session.revert(field) {
            return false;
        }

        if field == Field::Instructions {
            self.save_instructions();
        }
        sink.notify(Notice::success(REVERTED_MESSAGE));
        true
    }

    /// Wipes the saved and current instructions along with their enhancement state.
    pub fn clear_instructions(&mut self) {
        if let Err(error) = self.store.remove(INSTRUCTIONS_KEY) {
            tracing::warn!(%error, "failed to remove saved instructions");
        }
        self.session.reset(Field::Instructions);
    }

    /// Clears the prompt and attachments. Instructions are kept.
    pub fn clear_all(&mut self) {
        self.session.reset(Field::Prompt);
        self.attachments.clear();
    }

    /// Adds files, skipping any already attached with the same name and size.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = Arc<dyn FileSource>>) -> usize {
        self.attachments.add_all(files)
    }

    pub fn remove_file(&mut self, index: usize) -> Result<(), ForgeError> {
        self.attachments.remove(index).map(|_| ())
    }

    pub fn clear_files(&mut self) {
        self.attachments.clear();
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    pub fn file_summaries(&self) -> Vec<AttachmentSummary> {
        self.attachments.summaries()
    }

    pub fn stats_line(&self) -> String {
        let characters = self.instructions().chars().count() + self.prompt().chars().count();
        format!(
            "{characters} characters | {} file(s)",
            self.attachments.len()
        )
    }

    /// Composes the combined document once every attachment has been read.
    pub async fn generate(&self) -> String {
        generate(self.instructions(), self.prompt(), &self.attachments).await
    }
}

/// Controller for the chat optimize page: one text input with versioned history.
pub struct ChatPage {
    input: String,
    history: ChatHistory,
    gateway: Arc<dyn ChatGateway>,
}

impl ChatPage {
    /// Opens the page with the persisted history; the input shows the latest version.
    pub fn new(gateway: Arc<dyn ChatGateway>, store: Arc<dyn KeyValueStore>) -> Self {
        let history = ChatHistory::load(store);
        let input = history.current().unwrap_or_default().to_string();

        Self {
            input,
            history,
            gateway,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Rewrites the input with `provider`, recording it before and after.
    pub fn optimize(
        &mut self,
        provider: Provider,
        sink: &mut dyn NoticeSink,
    ) -> Result<&str, ForgeError> {
        let content = self.input.trim().to_string();
        if content.is_empty() {
            let error = ForgeError::EmptyInput;
            sink.notify(Notice::error(error.to_string()));
            return Err(error);
        }

        self.history.record_if_changed(&self.input);
        let request = chat_optimize_request(&content);
        match request_text(self.gateway.as_ref(), provider, &request) {
            Ok(optimized) => {
                self.input = optimized;
                self.history.record_if_changed(&self.input);
                sink.notify(Notice::success(OPTIMIZED_MESSAGE));
                Ok(&self.input)
            }
            Err(error) => {
                sink.notify(Notice::error(failure_notice(provider, &error)));
                Err(error)
            }
        }
    }

    /// Steps back one version and loads it into the input.
    pub fn undo(&mut self, sink: &mut dyn NoticeSink) -> Result<&str, ForgeError> {
        match self.history.undo() {
            Ok(previous) => {
                self.input = previous.to_string();
                sink.notify(Notice::success(UNDO_MESSAGE));
                Ok(&self.input)
            }
            Err(error) => {
                sink.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Loads the version at zero-based `index` into the input.
    pub fn restore(&mut self, index: usize, sink: &mut dyn NoticeSink) -> Result<&str, ForgeError> {
        match self.history.restore(index) {
            Ok(version) => {
                self.input = version.to_string();
                sink.notify(Notice::success(format!("Restored version {}", index + 1)));
                Ok(&self.input)
            }
            Err(error) => {
                sink.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    pub fn clear_history(&mut self, sink: &mut dyn NoticeSink) {
        self.history.clear();
        sink.notify(Notice::success(HISTORY_CLEARED_MESSAGE));
    }

    pub fn versions(&self) -> Vec<VersionEntry> {
        self.history.entries()
    }
}
