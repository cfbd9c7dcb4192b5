//! The registration surface a backend fills in when it is loaded.
//!
//! Every module must export a single entry point:
//!
//! ```c
//! void folio_plugin_register(PluginRegistration* registration);
//! ```
//!
//! The loader invokes it once, right after mapping the module, with a fresh
//! [`PluginRegistration`]. The backend sets its display name, the interface
//! version it was built against, the MIME types it claims to handle, and
//! fills in its [`FunctionTable`] slots. There is no return-value
//! negotiation: a backend that fails internally simply leaves the
//! registration in a state the loader's validation will reject.
//!
//! Rust backends normally use the [`register_plugin!`](crate::register_plugin)
//! macro instead of exporting the symbol by hand.

use crate::error::{Error, Result};
use crate::plugin::loader::Module;
use crate::plugin::{FunctionTable, Plugin};
use crate::version::Version;
use std::path::PathBuf;

/// Name of the registration entry point every module must export.
pub const PLUGIN_REGISTER_SYMBOL: &str = "folio_plugin_register";

/// Null-terminated form of [`PLUGIN_REGISTER_SYMBOL`] for symbol lookup.
pub(crate) const PLUGIN_REGISTER_SYMBOL_C: &[u8] = b"folio_plugin_register\0";

/// Type of the registration entry point.
///
/// # Safety
///
/// The host passes a pointer that is valid and exclusive for the duration of
/// the call. The entry point must not retain it.
pub type PluginRegisterFn = unsafe extern "C" fn(*mut PluginRegistration);

/// A plugin's identity and capabilities, as filled in by its entry point.
#[derive(Default)]
pub struct PluginRegistration {
    name: String,
    version: Option<Version>,
    functions: FunctionTable,
    mimetypes: Vec<String>,
}

impl PluginRegistration {
    /// Create an empty registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plugin's display name.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Set the interface version the plugin was built against.
    pub fn set_version(&mut self, version: Version) {
        self.version = Some(version);
    }

    /// Declare a MIME type this plugin claims to handle.
    ///
    /// Declaration order is preserved; duplicates are ignored. Declaring no
    /// MIME type at all is legal but leaves the plugin unreachable through
    /// MIME dispatch.
    pub fn add_mimetype(&mut self, mimetype: &str) {
        if !self.mimetypes.iter().any(|m| m == mimetype) {
            self.mimetypes.push(mimetype.to_string());
        }
    }

    /// The capability table to populate.
    pub fn functions_mut(&mut self) -> &mut FunctionTable {
        &mut self.functions
    }

    /// The capability table as populated so far.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// The name set so far, empty until the backend provides one.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version set so far.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// The MIME types declared so far, in declaration order.
    pub fn mimetypes(&self) -> &[String] {
        &self.mimetypes
    }

    /// Turn a completed registration into a [`Plugin`].
    ///
    /// `path` must be the resolved, canonical path of the module file and
    /// `module` the handle keeping it mapped. Fails with
    /// [`Error::PluginMalformed`] when the backend left the name empty or
    /// never set a version. Capability validation beyond that is the
    /// loader's policy, not enforced here.
    pub fn into_plugin(self, path: PathBuf, module: Box<dyn Module>) -> Result<Plugin> {
        if self.name.is_empty() {
            return Err(Error::PluginMalformed(
                "registration left the plugin name empty".into(),
            ));
        }
        let version = self.version.ok_or_else(|| {
            Error::PluginMalformed("registration did not set a version".into())
        })?;

        Ok(Plugin::new(
            self.name,
            path,
            version,
            self.functions,
            self.mimetypes,
            module,
        ))
    }
}

impl std::fmt::Debug for PluginRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("mimetypes", &self.mimetypes)
            .finish()
    }
}

/// Define the registration entry point for a Rust backend.
///
/// Expands to the exported `folio_plugin_register` symbol, wiring the given
/// identity into the host's [`PluginRegistration`] and delegating table
/// population to a `fn(&mut FunctionTable)`.
///
/// # Example
///
/// ```ignore
/// use folio::plugin::FunctionTable;
///
/// fn register_functions(functions: &mut FunctionTable) {
///     functions.document_open = Some(open);
/// }
///
/// folio::register_plugin! {
///     name: "pdf",
///     version: (1, 0, 0),
///     mimetypes: ["application/pdf"],
///     functions: register_functions,
/// }
/// ```
#[macro_export]
macro_rules! register_plugin {
    (
        name: $name:literal,
        version: ($major:literal, $minor:literal, $patch:literal),
        mimetypes: [$($mimetype:literal),* $(,)?],
        functions: $fill:expr $(,)?
    ) => {
        /// Plugin registration entry point, invoked once by the host loader.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn folio_plugin_register(
            registration: *mut $crate::plugin::PluginRegistration,
        ) {
            if registration.is_null() {
                return;
            }
            // SAFETY: The host passes a valid, exclusive pointer for the
            // duration of this call.
            let registration = unsafe { &mut *registration };
            registration.set_name($name);
            registration.set_version($crate::Version::new($major, $minor, $patch));
            $(registration.add_mimetype($mimetype);)*
            let fill: fn(&mut $crate::plugin::FunctionTable) = $fill;
            fill(registration.functions_mut());
        }
    };
}
