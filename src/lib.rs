//! # Folio
//!
//! Host-side plugin registry and dispatch core for document viewers.
//!
//! Folio discovers, loads and validates natively loaded format backends
//! ("plugins"), indexes them by the MIME types they claim, and dispatches
//! document-open requests to the matching backend. Document parsing and
//! rendering live entirely inside the plugins; this crate only manages
//! their lifecycle and the trust boundary around them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use folio::plugin::PluginRegistry;
//!
//! fn main() -> folio::Result<()> {
//!     let mut registry = PluginRegistry::new();
//!     registry.load_directory("/usr/lib/folio/plugins")?;
//!
//!     let document = registry.open_document("report.pdf", None)?;
//!     println!("opened with {}", document.plugin().name());
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Every operation is synchronous and runs on the caller's thread. The
//! registry has no internal locking: mutation takes `&mut self`, so a host
//! that needs concurrent access must serialize registry operations
//! externally. Capability tables are immutable after registration and may
//! be invoked from several threads, provided the backend behind each slot
//! is itself safe for concurrent invocation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod document;
pub mod error;
pub mod mimetype;
pub mod plugin;
pub mod version;

pub use document::{Document, DocumentData};
pub use error::{Error, Result};
pub use version::{API_VERSION, Version};
