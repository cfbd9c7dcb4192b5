//! Open documents and their backend state.
//!
//! A [`Document`] pairs the opaque state a backend produced for an open file
//! with a reference to the [`Plugin`] that produced it. The plugin reference
//! borrows from the owning [`PluginRegistry`], so the borrow checker
//! guarantees a document can never outlive the registry that keeps its
//! backend mapped.
//!
//! [`PluginRegistry`]: crate::plugin::PluginRegistry

use crate::plugin::{FunctionTable, Plugin};
use std::any::Any;
use std::path::{Path, PathBuf};

/// Opaque per-document state produced by a backend's document-open slot.
///
/// The host never inspects this value; it is passed back to the backend's
/// other capability slots unchanged.
pub type DocumentData = Box<dyn Any + Send>;

/// An open document, tied to the plugin that opened it.
pub struct Document<'a> {
    plugin: &'a Plugin,
    path: PathBuf,
    mimetype: String,
    data: DocumentData,
}

impl<'a> Document<'a> {
    pub(crate) fn new(
        plugin: &'a Plugin,
        path: PathBuf,
        mimetype: String,
        data: DocumentData,
    ) -> Self {
        Self {
            plugin,
            path,
            mimetype,
            data,
        }
    }

    /// The plugin that opened this document.
    pub fn plugin(&self) -> &'a Plugin {
        self.plugin
    }

    /// The function table of the owning plugin.
    ///
    /// Later operations (page access, rendering and so on, implemented
    /// outside this crate) reach their backend capability through this
    /// accessor.
    pub fn functions(&self) -> &'a FunctionTable {
        self.plugin.functions()
    }

    /// The path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The MIME type the document was dispatched under.
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// The backend's opaque document state.
    pub fn data(&self) -> &(dyn Any + Send) {
        self.data.as_ref()
    }

    /// Mutable access to the backend's opaque document state.
    pub fn data_mut(&mut self) -> &mut DocumentData {
        &mut self.data
    }
}

impl std::fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("plugin", &self.plugin.name())
            .field("path", &self.path)
            .field("mimetype", &self.mimetype)
            .finish()
    }
}
