//! Release descriptor types

use serde::{Deserialize, Serialize};

/// `release_kind` value of a stable release
pub const RELEASE_KIND: &str = "release";

/// One published version of the tracked package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Opaque version identifier, compared for exact equality only
    pub id: String,
    /// Human readable name
    pub display_name: String,
    /// Version label (for example `1.6.2`)
    pub version_label: String,
    /// ISO-8601 publish timestamp, may be empty
    pub published_at: String,
    /// Release channel (`release`, `beta`, `alpha`)
    pub release_kind: String,
}

impl ReleaseDescriptor {
    /// Create a descriptor with only an id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set version label
    #[must_use]
    pub fn with_version_label(mut self, label: impl Into<String>) -> Self {
        self.version_label = label.into();
        self
    }

    /// Set display name
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set publish timestamp
    #[must_use]
    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = published_at.into();
        self
    }

    /// Set release kind
    #[must_use]
    pub fn with_release_kind(mut self, kind: impl Into<String>) -> Self {
        self.release_kind = kind.into();
        self
    }

    /// Whether this descriptor is on the stable release channel
    #[must_use]
    pub fn is_release(&self) -> bool {
        self.release_kind == RELEASE_KIND
    }

    /// Label shown to users: the version label, else the id
    #[must_use]
    pub fn label(&self) -> &str {
        if self.version_label.is_empty() {
            &self.id
        } else {
            &self.version_label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_version_label() {
        let release = ReleaseDescriptor::new("abc").with_version_label("1.2.0");
        assert_eq!(release.label(), "1.2.0");
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let release = ReleaseDescriptor::new("abc");
        assert_eq!(release.label(), "abc");
    }

    #[test]
    fn test_is_release() {
        assert!(ReleaseDescriptor::new("a").with_release_kind("release").is_release());
        assert!(!ReleaseDescriptor::new("a").with_release_kind("beta").is_release());
    }
}
