//! The capability table a backend fills in at registration time.
//!
//! Every slot is optional: an absent slot means the backend does not offer
//! that capability and callers receive [`Error::PluginNotImplemented`]
//! instead of an invocation attempt. The table is populated once, inside the
//! registration entry point, and is immutable afterwards.
//!
//! Only [`document_open`](FunctionTable::document_open) is invoked by this
//! crate; the remaining slots are passed through unchanged to the data-model
//! layer built on top of it.
//!
//! [`Error::PluginNotImplemented`]: crate::Error::PluginNotImplemented

use crate::document::DocumentData;
use crate::error::Result;
use crate::plugin::Plugin;
use std::path::Path;

/// Open a document file, producing the backend's opaque document state.
pub type DocumentOpenFn =
    fn(path: &Path, password: Option<&str>, plugin: &Plugin) -> Result<DocumentData>;

/// Release backend resources held by a document before it is dropped.
pub type DocumentFreeFn = fn(data: &mut DocumentData) -> Result<()>;

/// Write the document back out to a new path.
pub type DocumentSaveAsFn = fn(data: &DocumentData, path: &Path) -> Result<()>;

/// Fetch document metadata as key/value pairs.
pub type DocumentGetMetadataFn = fn(data: &DocumentData) -> Result<Vec<(String, String)>>;

/// Number of pages in the document.
pub type PageCountFn = fn(data: &DocumentData) -> Result<usize>;

/// Extract the text of one page.
pub type PageGetTextFn = fn(data: &DocumentData, page: usize) -> Result<String>;

/// Search one page for a text string, yielding hit rectangles as
/// `[x1, y1, x2, y2]` in page coordinates.
pub type PageSearchTextFn =
    fn(data: &DocumentData, page: usize, text: &str) -> Result<Vec<[f64; 4]>>;

/// Render one page to raw pixel data at the given scale and rotation.
pub type PageRenderFn =
    fn(data: &DocumentData, page: usize, scale: f64, rotation: i32) -> Result<Vec<u8>>;

/// The fixed set of optional capability slots a backend can offer.
#[derive(Default, Clone)]
pub struct FunctionTable {
    /// Open a document. The one slot this crate invokes directly; a plugin
    /// without it is rejected by the loader.
    pub document_open: Option<DocumentOpenFn>,
    /// Release a document's backend state.
    pub document_free: Option<DocumentFreeFn>,
    /// Save a document under a new path.
    pub document_save_as: Option<DocumentSaveAsFn>,
    /// Read document metadata.
    pub document_get_metadata: Option<DocumentGetMetadataFn>,
    /// Count document pages.
    pub page_count: Option<PageCountFn>,
    /// Extract page text.
    pub page_get_text: Option<PageGetTextFn>,
    /// Search page text.
    pub page_search_text: Option<PageSearchTextFn>,
    /// Render a page.
    pub page_render: Option<PageRenderFn>,
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTable")
            .field("document_open", &self.document_open.is_some())
            .field("document_free", &self.document_free.is_some())
            .field("document_save_as", &self.document_save_as.is_some())
            .field("document_get_metadata", &self.document_get_metadata.is_some())
            .field("page_count", &self.page_count.is_some())
            .field("page_get_text", &self.page_get_text.is_some())
            .field("page_search_text", &self.page_search_text.is_some())
            .field("page_render", &self.page_render.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_no_capabilities() {
        let table = FunctionTable::default();
        assert!(table.document_open.is_none());
        assert!(table.document_free.is_none());
        assert!(table.page_search_text.is_none());
        assert!(table.page_render.is_none());
    }
}
