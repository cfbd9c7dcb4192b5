//! Error types for Folio.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using Folio's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required call-time parameter was empty or otherwise unusable.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Allocation failure, reported by a backend.
    #[error("out of memory")]
    OutOfMemory,

    /// The file could not be mapped as a loadable module.
    #[error("failed to load module: {0}")]
    ModuleLoadFailed(String),

    /// The module does not export the registration entry point.
    #[error("missing plugin entry point: folio_plugin_register")]
    ModuleMissingEntryPoint,

    /// Registration left the plugin in a state that fails validation.
    #[error("malformed plugin: {0}")]
    PluginMalformed(String),

    /// The document file does not exist.
    #[error("document does not exist: {0}")]
    DocumentDoesNotExist(PathBuf),

    /// No loaded plugin claims the document's guessed MIME type.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The selected plugin does not offer the requested capability.
    #[error("plugin does not implement this operation")]
    PluginNotImplemented,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-reported failure that maps to nothing more specific.
    #[error("backend error: {0}")]
    Unknown(String),
}
