//! Plugin registry: ownership, MIME indexing and dispatch.
//!
//! The registry owns every successfully loaded [`Plugin`], preserves their
//! registration order, and indexes them by declared MIME type. It provides
//! no internal locking: loading and unloading take `&mut self`, lookups and
//! dispatch take `&self`, so the borrow checker enforces the rule that the
//! collections are never mutated concurrently with a lookup.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::mimetype::guess_mimetype;
use crate::plugin::loader::{DynamicLoader, ModuleLoader, Plugin, resolve_module_path};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

/// Registry of loaded document backends.
///
/// Created empty, populated by [`load_file`](Self::load_file) and
/// [`load_directory`](Self::load_directory), torn down as a unit: dropping
/// the registry unmaps every plugin's module, in unspecified order.
pub struct PluginRegistry {
    /// Loaded plugins in registration order, unique by resolved path.
    plugins: Vec<Plugin>,
    /// MIME type -> indices into `plugins`, each list in registration order.
    mimetype_index: HashMap<String, Vec<usize>>,
    loader: Box<dyn ModuleLoader>,
}

impl PluginRegistry {
    /// Create an empty registry using the default dynamic loader.
    pub fn new() -> Self {
        Self::with_loader(Box::new(DynamicLoader::new()))
    }

    /// Create an empty registry with a custom module loader.
    pub fn with_loader(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            plugins: Vec::new(),
            mimetype_index: HashMap::new(),
            loader,
        }
    }

    /// Load a single module file.
    ///
    /// The path is resolved to its canonical form first; loading a module
    /// that is already registered under that resolved path is a no-op
    /// success. On loader failure the registry is left unchanged.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let resolved = resolve_module_path(path.as_ref())?;

        if self.plugins.iter().any(|p| p.path() == resolved) {
            tracing::debug!(path = %resolved.display(), "module already loaded");
            return Ok(());
        }

        let plugin = self.loader.load(&resolved)?;
        self.insert(plugin);
        Ok(())
    }

    /// Load every module file found in a directory.
    ///
    /// Candidates are recognized by the platform's shared-library extension.
    /// A failure to load one candidate is logged and does not abort the
    /// scan; the operation succeeds as long as the directory itself was
    /// readable, even when zero plugins were loaded.
    pub fn load_directory(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(Error::InvalidArguments("plugin directory is empty".into()));
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(dir = %dir.display(), %error, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(OsStr::to_str) != Some(std::env::consts::DLL_EXTENSION)
            {
                continue;
            }
            if let Err(error) = self.load_file(&path) {
                tracing::warn!(path = %path.display(), %error, "skipping module");
            }
        }

        Ok(())
    }

    fn insert(&mut self, plugin: Plugin) {
        let index = self.plugins.len();
        for mimetype in plugin.mimetypes() {
            self.mimetype_index
                .entry(mimetype.clone())
                .or_default()
                .push(index);
        }
        tracing::info!(
            name = plugin.name(),
            path = %plugin.path().display(),
            "registered plugin"
        );
        self.plugins.push(plugin);
    }

    /// Look up a plugin by exact name.
    ///
    /// When several loaded plugins share a name, the first registered wins;
    /// registration order is part of the observable contract.
    pub fn get_plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// All loaded plugins, in registration order.
    pub fn get_plugins(&self) -> Vec<&Plugin> {
        self.plugins.iter().collect()
    }

    /// All plugins claiming a MIME type, in registration order.
    ///
    /// An unknown MIME type yields an empty list, not an error.
    pub fn find_by_mimetype(&self, mimetype: &str) -> Vec<&Plugin> {
        self.mimetype_index
            .get(mimetype)
            .map(|indices| indices.iter().map(|&i| &self.plugins[i]).collect())
            .unwrap_or_default()
    }

    /// Open a document, dispatching to a plugin by guessed MIME type.
    ///
    /// Error values stay distinct so callers can branch on them:
    /// [`Error::DocumentDoesNotExist`] for a missing file,
    /// [`Error::UnsupportedFormat`] when no loaded plugin claims the type,
    /// [`Error::PluginNotImplemented`] when the selected plugin has no
    /// document-open capability. Backend failures propagate verbatim.
    ///
    /// A file whose type cannot be guessed is dispatched as
    /// `application/octet-stream`, so [`Error::UnsupportedFormat`] always
    /// carries the MIME type the lookup ran against.
    pub fn open_document(
        &self,
        path: impl AsRef<Path>,
        password: Option<&str>,
    ) -> Result<Document<'_>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !path.exists() {
            return Err(Error::DocumentDoesNotExist(path.to_path_buf()));
        }

        let mimetype =
            guess_mimetype(path).unwrap_or_else(|| "application/octet-stream".to_string());

        let plugin = self
            .find_by_mimetype(&mimetype)
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnsupportedFormat(mimetype.clone()))?;

        let open = plugin
            .functions()
            .document_open
            .ok_or(Error::PluginNotImplemented)?;

        tracing::debug!(
            path = %path.display(),
            mimetype = %mimetype,
            plugin = plugin.name(),
            "opening document"
        );

        let data = open(path, password, plugin)?;
        Ok(Document::new(plugin, path.to_path_buf(), mimetype, data))
    }

    /// Unload a plugin by name, unmapping its module.
    ///
    /// Returns true when a plugin was found and removed. The MIME index is
    /// rebuilt from the remaining plugins.
    pub fn unload(&mut self, name: &str) -> bool {
        let Some(position) = self.plugins.iter().position(|p| p.name() == name) else {
            return false;
        };
        let plugin = self.plugins.remove(position);
        tracing::debug!(name = plugin.name(), "unloading plugin");
        drop(plugin);
        self.rebuild_index();
        true
    }

    fn rebuild_index(&mut self) {
        self.mimetype_index.clear();
        for (index, plugin) in self.plugins.iter().enumerate() {
            for mimetype in plugin.mimetypes() {
                self.mimetype_index
                    .entry(mimetype.clone())
                    .or_default()
                    .push(index);
            }
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        if !self.plugins.is_empty() {
            tracing::debug!(count = self.plugins.len(), "unloading all plugins");
        }
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.len())
            .field("mimetypes", &self.mimetype_index.len())
            .finish()
    }
}
