//! PDF engine capability
//!
//! The merge pipeline only needs five things from a PDF library: load,
//! create, copy pages, append a page, save. `PdfEngine` names exactly those so
//! the library can be swapped or mocked. `LopdfEngine` is the real one.

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guards the parent walk against malformed, cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl From<lopdf::Error> for EngineError {
    fn from(err: lopdf::Error) -> Self {
        EngineError(err.to_string())
    }
}

pub trait PdfEngine {
    /// In-memory document model.
    type Document;
    /// Opaque reference to one page inside a `Document`.
    type Page;

    /// Whether the underlying library can be used at all.
    fn is_available(&self) -> bool {
        true
    }

    fn load(&self, bytes: &[u8]) -> Result<Self::Document, EngineError>;

    fn create(&self) -> Result<Self::Document, EngineError>;

    /// Zero-based indices of every page, in document order.
    fn page_indices(&self, doc: &Self::Document) -> Vec<usize>;

    /// Copy the pages at `indices` from `src` into `dest`'s object space.
    ///
    /// The returned handles are not yet part of `dest`'s page tree; pass each
    /// one to [`PdfEngine::add_page`] in the order they should appear.
    fn copy_pages(
        &self,
        dest: &mut Self::Document,
        src: &Self::Document,
        indices: &[usize],
    ) -> Result<Vec<Self::Page>, EngineError>;

    fn add_page(&self, dest: &mut Self::Document, page: Self::Page) -> Result<(), EngineError>;

    fn save(&self, doc: &mut Self::Document) -> Result<Vec<u8>, EngineError>;
}

/// Options for the lopdf-backed engine
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineOptions {
    /// PDF version written into newly created documents
    pub version: String,
    /// Compress streams before saving
    pub compress: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            compress: true,
        }
    }
}

/// `PdfEngine` backed by lopdf
#[derive(Debug, Clone, Default)]
pub struct LopdfEngine {
    options: EngineOptions,
}

impl LopdfEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl PdfEngine for LopdfEngine {
    type Document = Document;
    type Page = ObjectId;

    fn load(&self, bytes: &[u8]) -> Result<Document, EngineError> {
        if bytes.len() < 8 {
            return Err(EngineError("File too small to be a valid PDF".into()));
        }
        if !bytes.starts_with(b"%PDF-") {
            return Err(EngineError(
                "Not a valid PDF file (missing %PDF- header)".into(),
            ));
        }

        let doc = Document::load_mem(bytes)?;
        if doc.is_encrypted() {
            return Err(EngineError("Encrypted PDFs are not supported".into()));
        }

        debug!(
            pages = doc.get_pages().len(),
            objects = doc.objects.len(),
            "loaded document"
        );
        Ok(doc)
    }

    fn create(&self) -> Result<Document, EngineError> {
        let mut doc = Document::with_version(self.options.version.clone());

        let pages_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(Vec::new())),
            ("Count", Object::Integer(0)),
        ]));
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Ok(doc)
    }

    fn page_indices(&self, doc: &Document) -> Vec<usize> {
        (0..doc.get_pages().len()).collect()
    }

    fn copy_pages(
        &self,
        dest: &mut Document,
        src: &Document,
        indices: &[usize],
    ) -> Result<Vec<ObjectId>, EngineError> {
        // Work on a renumbered clone so the source ids cannot collide with
        // anything already in the destination.
        let mut source = src.clone();
        source.renumber_objects_with(dest.max_id + 1);

        let pages: Vec<ObjectId> = source.get_pages().into_values().collect();

        let mut copied = Vec::with_capacity(indices.len());
        for &index in indices {
            let page_id = *pages.get(index).ok_or_else(|| {
                EngineError(format!(
                    "Page index {} out of range (document has {} pages)",
                    index,
                    pages.len()
                ))
            })?;

            let inherited = inherited_attributes(&source, page_id);
            let page = source.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }

            copied.push(page_id);
        }

        dest.max_id = dest.max_id.max(source.max_id);
        dest.objects.extend(source.objects);

        debug!(copied = copied.len(), "copied pages");
        Ok(copied)
    }

    fn add_page(&self, dest: &mut Document, page: ObjectId) -> Result<(), EngineError> {
        let pages_id = pages_root(dest)?;

        dest.get_dictionary_mut(page)?
            .set("Parent", Object::Reference(pages_id));

        let root = dest.get_dictionary_mut(pages_id)?;
        root.get_mut(b"Kids")
            .and_then(Object::as_array_mut)?
            .push(Object::Reference(page));
        let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        root.set("Count", Object::Integer(count + 1));

        Ok(())
    }

    fn save(&self, doc: &mut Document) -> Result<Vec<u8>, EngineError> {
        // The source catalogs and page trees are unreachable after re-parenting.
        let pruned = doc.prune_objects();
        debug!(pruned = pruned.len(), "pruned unreachable objects");

        if self.options.compress {
            doc.compress();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| EngineError(format!("Failed to save merged PDF: {}", e)))?;
        Ok(buffer)
    }
}

/// Resolve the Pages root referenced by the document catalog
fn pages_root(doc: &Document) -> Result<ObjectId, EngineError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| EngineError("No Root in trailer".into()))?;

    doc.get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| EngineError("No Pages in catalog".into()))
}

/// Collect inheritable attributes the page does not define itself
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE_ATTRIBUTES
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut found = Vec::new();
    let mut visited = HashSet::from([page_id]);
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(parent_id) = parent {
        if missing.is_empty() || visited.len() > MAX_TREE_DEPTH || !visited.insert(parent_id) {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    found
}
