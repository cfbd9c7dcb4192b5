//! Dynamic plugin loading using libloading.
//!
//! The loader turns a module file on disk into a validated [`Plugin`], or
//! fails with no partial state left behind: on any error path the mapping is
//! released before the error is returned.

use crate::error::{Error, Result};
use crate::plugin::registration::{
    PLUGIN_REGISTER_SYMBOL_C, PluginRegisterFn, PluginRegistration,
};
use crate::plugin::FunctionTable;
use crate::version::{API_VERSION, Version};
use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};

/// Keeps a loaded backend module mapped into the process.
///
/// Dropping the value unmaps the module. The registry drops a plugin's
/// module when the plugin is unloaded or the registry itself is dropped;
/// unmapping is best-effort cleanup and never surfaces an error.
///
/// The `Send + Sync` bounds keep [`Plugin`] shareable across threads, so a
/// host can serialize the registry behind one lock or invoke immutable
/// capability tables concurrently.
pub trait Module: Send + Sync {}

/// The libloading-backed module handle used by [`DynamicLoader`].
struct LibraryModule {
    _library: Library,
}

impl Module for LibraryModule {}

/// One loaded backend module.
///
/// Created by a [`ModuleLoader`], owned by the registry for its whole
/// lifetime. Identity, version, capability table and MIME claims are fixed
/// at registration time and immutable afterwards.
pub struct Plugin {
    name: String,
    path: PathBuf,
    version: Version,
    functions: FunctionTable,
    mimetypes: Vec<String>,
    _module: Box<dyn Module>,
}

impl Plugin {
    pub(crate) fn new(
        name: String,
        path: PathBuf,
        version: Version,
        functions: FunctionTable,
        mimetypes: Vec<String>,
        module: Box<dyn Module>,
    ) -> Self {
        Self {
            name,
            path,
            version,
            functions,
            mimetypes,
            _module: module,
        }
    }

    /// The plugin's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved, canonical path of the module file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The interface version the plugin was built against.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The plugin's capability table.
    ///
    /// Immutable after registration, so invoking slots concurrently is safe
    /// provided the backend behind them is.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// The MIME types this plugin claims to handle, in declaration order.
    pub fn mimetypes(&self) -> &[String] {
        &self.mimetypes
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("mimetypes", &self.mimetypes)
            .finish()
    }
}

/// Resolve a module path to its absolute, canonical form.
///
/// Fails with [`Error::InvalidArguments`] when the path is empty or does not
/// resolve (for example, does not exist).
pub(crate) fn resolve_module_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidArguments("module path is empty".into()));
    }
    path.canonicalize().map_err(|e| {
        Error::InvalidArguments(format!("cannot resolve path {}: {e}", path.display()))
    })
}

/// Turns a filesystem path into a validated [`Plugin`].
///
/// The registry goes through this trait so hosts and tests can substitute
/// their own loading strategy for the default dynamic loader. Loaders must
/// be `Send + Sync` so the registry that owns one can be moved to or shared
/// with another thread.
pub trait ModuleLoader: Send + Sync {
    /// Load and validate the module at `path`.
    ///
    /// All-or-nothing: on failure no mapping and no plugin survive the call.
    fn load(&self, path: &Path) -> Result<Plugin>;
}

/// The default loader: maps shared libraries with libloading.
///
/// Loading a module executes arbitrary foreign code, so only module files
/// from trusted locations should ever reach this loader. A plugin whose
/// declared interface version is incompatible with the host's is still
/// loaded; the mismatch is logged as a warning and the compatibility
/// predicate is left to the host to enforce.
pub struct DynamicLoader {
    required_version: Version,
}

impl DynamicLoader {
    /// Create a loader expecting the host's own interface version.
    pub fn new() -> Self {
        Self {
            required_version: API_VERSION,
        }
    }

    /// Create a loader expecting a specific interface version.
    pub fn with_required_version(required_version: Version) -> Self {
        Self { required_version }
    }
}

impl Default for DynamicLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for DynamicLoader {
    fn load(&self, path: &Path) -> Result<Plugin> {
        let path = resolve_module_path(path)?;

        // SAFETY: Loading a dynamic library executes its initializers. The
        // host only hands trusted module paths to this loader.
        let library = unsafe { Library::new(&path) }
            .map_err(|e| Error::ModuleLoadFailed(e.to_string()))?;

        let entry: PluginRegisterFn = {
            // SAFETY: The library was just loaded; the symbol type is the
            // contract every backend must satisfy.
            let symbol: Symbol<PluginRegisterFn> = unsafe {
                library
                    .get(PLUGIN_REGISTER_SYMBOL_C)
                    .map_err(|_| Error::ModuleMissingEntryPoint)?
            };
            *symbol
        };

        let mut registration = PluginRegistration::new();
        // SAFETY: The registration pointer is valid and exclusive for the
        // duration of the call; the entry point must not retain it.
        unsafe { entry(&mut registration) };

        if let Some(offered) = registration.version()
            && !Version::is_compatible(self.required_version, offered)
        {
            tracing::warn!(
                plugin = registration.name(),
                required = %self.required_version,
                offered = %offered,
                "plugin interface version is incompatible with this host"
            );
        }

        if registration.functions().document_open.is_none() {
            return Err(Error::PluginMalformed(
                "plugin does not provide a document-open capability".into(),
            ));
        }

        let plugin = registration.into_plugin(
            path,
            Box::new(LibraryModule { _library: library }),
        )?;

        tracing::debug!(
            name = plugin.name(),
            path = %plugin.path().display(),
            version = %plugin.version(),
            mimetypes = ?plugin.mimetypes(),
            "loaded plugin"
        );

        Ok(plugin)
    }
}
