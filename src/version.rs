//! Plugin interface versioning.
//!
//! A plugin declares the interface version it was built against during
//! registration. The host compares it to [`API_VERSION`] with
//! [`Version::is_compatible`]: the major version is a breaking-change
//! boundary, the minor version is additive and backward compatible, and the
//! patch version never affects compatibility.

use std::fmt;

/// The plugin interface version this host was built with.
pub const API_VERSION: Version = Version::new(1, 0, 0);

/// A three-field plugin interface version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    /// Major version (breaking-change boundary).
    pub major: u32,
    /// Minor version (additive, backward compatible).
    pub minor: u32,
    /// Patch version (irrelevant to compatibility).
    pub patch: u32,
}

impl Version {
    /// Create a version from its three components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Check whether `offered` satisfies `required`.
    ///
    /// True when the major versions match and the offered minor version is
    /// at least the required one. Pure; callers decide what to do with an
    /// incompatible plugin.
    pub fn is_compatible(required: Version, offered: Version) -> bool {
        offered.major == required.major && offered.minor >= required.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
