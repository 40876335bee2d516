//! Two-file PDF merge
//!
//! This crate holds everything that does not touch the browser:
//! - `engine`: the PDF capability trait and its lopdf implementation
//! - `merge`: the first-then-second page concatenation pipeline
//! - `orchestrator`: selection, busy and artifact state for one session
//! - `naming`: output file names
//! - `view`: the status/log/download surface the orchestrator drives

pub mod engine;
pub mod error;
pub mod merge;
pub mod naming;
pub mod orchestrator;
pub mod view;

use std::fmt;

pub use engine::{EngineError, EngineOptions, LopdfEngine, PdfEngine};
pub use error::MergeError;
pub use merge::{merge_pair, MergeOutput};
pub use naming::{merged_file_name, strip_pdf_extension};
pub use orchestrator::{MergeOrchestrator, MergeTicket, MergedArtifact, SelectedFile};
pub use view::{MergeView, RecordingView, StatusLevel};

/// Which of the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::First => f.write_str("PDF 1"),
            Slot::Second => f.write_str("PDF 2"),
        }
    }
}

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, MergeError> {
    let engine = LopdfEngine::default();
    let doc = engine
        .load(bytes)
        .map_err(|e| MergeError::InvalidPdf(e.0))?;
    Ok(engine.page_indices(&doc).len() as u32)
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_pdf::create_test_pdf;

    #[test]
    fn test_get_page_count() {
        assert_eq!(get_page_count(&create_test_pdf(4, "Count")).unwrap(), 4);
    }

    #[test]
    fn test_get_page_count_rejects_garbage() {
        let err = get_page_count(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, MergeError::InvalidPdf(_)));
        assert!(!err.to_string().contains("PDF 1"));
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(Slot::First.to_string(), "PDF 1");
        assert_eq!(Slot::Second.to_string(), "PDF 2");
    }
}
