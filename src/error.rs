use thiserror::Error;

/// Failures surfaced by the prompt-preparation core.
///
/// Every variant leaves the session in its previous valid state; none of them
/// is fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForgeError {
    #[error("Please enter some content first!")]
    EmptyInput,

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{label} error: {message}")]
    GatewayFailure { label: &'static str, message: String },

    #[error("index {index} is out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("failed to read attachment {name}: {message}")]
    AttachmentRead { name: String, message: String },

    #[error("stored value for {key} is corrupt: {message}")]
    PersistenceCorrupt { key: String, message: String },
}

impl ForgeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
