//! Locally installed version snapshot

use serde::{Deserialize, Serialize};

/// What is currently installed
///
/// An empty `installed_version_id` means the installed version is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVersionInfo {
    /// Package slug the installation was made from
    pub package_slug: String,
    /// Installed version id, empty if unknown
    pub installed_version_id: String,
}

impl LocalVersionInfo {
    /// Create a new snapshot
    pub fn new(package_slug: impl Into<String>, installed_version_id: impl Into<String>) -> Self {
        Self {
            package_slug: package_slug.into(),
            installed_version_id: installed_version_id.into(),
        }
    }

    /// Whether an installed version is known
    #[must_use]
    pub fn is_installed(&self) -> bool {
        !self.installed_version_id.is_empty()
    }
}
