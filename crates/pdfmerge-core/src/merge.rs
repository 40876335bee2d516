//! Two-document merge pipeline
//!
//! Concatenates every page of the first document followed by every page of
//! the second into a freshly created document.

use crate::engine::{EngineError, PdfEngine};
use crate::error::MergeError;
use crate::Slot;
use tracing::debug;

/// Serialized result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutput {
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

/// Merge two PDFs, first then second
///
/// The algorithm:
/// 1. Parse both inputs
/// 2. Create an empty destination document
/// 3. Copy all pages of the first input and append them in order
/// 4. Copy all pages of the second input and append them in order
/// 5. Serialize the destination
pub fn merge_pair<E: PdfEngine>(
    engine: &E,
    first: &[u8],
    second: &[u8],
) -> Result<MergeOutput, MergeError> {
    let first_doc = load(engine, Slot::First, first)?;
    let second_doc = load(engine, Slot::Second, second)?;

    let mut dest = engine.create().map_err(operation)?;

    let mut page_count = 0u32;
    for src in [&first_doc, &second_doc] {
        page_count += append_all_pages(engine, &mut dest, src)?;
    }

    let bytes = engine
        .save(&mut dest)
        .map_err(|e| MergeError::SerializationError(e.0))?;

    debug!(page_count, size = bytes.len(), "merge pipeline finished");
    Ok(MergeOutput { bytes, page_count })
}

fn load<E: PdfEngine>(engine: &E, input: Slot, bytes: &[u8]) -> Result<E::Document, MergeError> {
    engine.load(bytes).map_err(|e| MergeError::ParseError {
        input,
        detail: e.0,
    })
}

fn append_all_pages<E: PdfEngine>(
    engine: &E,
    dest: &mut E::Document,
    src: &E::Document,
) -> Result<u32, MergeError> {
    let indices = engine.page_indices(src);
    let pages = engine
        .copy_pages(dest, src, &indices)
        .map_err(operation)?;

    let mut appended = 0u32;
    for page in pages {
        engine.add_page(dest, page).map_err(operation)?;
        appended += 1;
    }
    Ok(appended)
}

fn operation(err: EngineError) -> MergeError {
    MergeError::OperationError(err.0)
}
