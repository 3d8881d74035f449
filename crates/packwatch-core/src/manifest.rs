//! Installed modpack manifest reader

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use packwatch_api::LocalVersionInfo;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    project_slug: Option<String>,
    #[serde(default)]
    version_id: Option<String>,
}

/// Read what is currently installed
///
/// Never fails: a missing or unparsable manifest yields an empty
/// `installed_version_id`. A missing or empty slug falls back to
/// `fallback_slug`.
pub async fn read_local(path: &Path, fallback_slug: &str) -> LocalVersionInfo {
    let manifest = match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str::<Manifest>(&text).unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "manifest unparsable");
            Manifest::default()
        }),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "manifest unreadable");
            Manifest::default()
        }
    };

    let package_slug = manifest
        .project_slug
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| fallback_slug.to_string());

    LocalVersionInfo::new(package_slug, manifest.version_id.unwrap_or_default())
}
