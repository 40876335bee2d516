use crate::Slot;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Missing element {0}")]
    MissingElement(String),

    #[error("Please select both PDFs first.")]
    MissingInput,

    #[error("PDF library not loaded: {0}")]
    LibraryUnavailable(String),

    #[error("Failed to read {input}: {detail}")]
    FileRead { input: Slot, detail: String },

    #[error("Failed to parse {input}: {detail}")]
    ParseError { input: Slot, detail: String },

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("A merge is already in progress.")]
    Busy,
}

impl MergeError {
    /// Errors after which the session cannot do any useful work.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MergeError::MissingElement(_) | MergeError::LibraryUnavailable(_)
        )
    }
}
