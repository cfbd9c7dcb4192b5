//! Plugin system for dynamically loaded document backends.
//!
//! A plugin is a shared library (.so on Linux) that exports a single symbol:
//!
//! ```c
//! void folio_plugin_register(PluginRegistration* registration);
//! ```
//!
//! The loader maps the module, invokes the entry point once so the backend
//! can declare its name, interface version, MIME types and capability
//! slots, and validates the result. Loaded plugins are owned by a
//! [`PluginRegistry`], which indexes them by MIME type and dispatches
//! document-open requests to the matching backend.
//!
//! Loading a module executes foreign code in-process; only point the
//! registry at plugin directories you trust.

mod functions;
mod loader;
mod registration;
mod registry;

pub use functions::{
    DocumentFreeFn, DocumentGetMetadataFn, DocumentOpenFn, DocumentSaveAsFn, FunctionTable,
    PageCountFn, PageGetTextFn, PageRenderFn, PageSearchTextFn,
};
pub use loader::{DynamicLoader, Module, ModuleLoader, Plugin};
pub use registration::{PLUGIN_REGISTER_SYMBOL, PluginRegisterFn, PluginRegistration};
pub use registry::PluginRegistry;
