//! Modrinth release catalog client

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use packwatch_api::ReleaseDescriptor;

use crate::error::{ClientError, Result};

/// Public Modrinth API root
pub const DEFAULT_BASE_URL: &str = "https://api.modrinth.com/v2";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Version entry as returned by `GET /project/{slug}/version`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ModrinthVersion {
    id: String,
    name: String,
    version_number: String,
    date_published: String,
    version_type: String,
}

impl From<ModrinthVersion> for ReleaseDescriptor {
    fn from(v: ModrinthVersion) -> Self {
        Self {
            id: v.id,
            display_name: v.name,
            version_label: v.version_number,
            published_at: v.date_published,
            release_kind: v.version_type,
        }
    }
}

/// Client for the Modrinth version listing
#[derive(Debug, Clone)]
pub struct ModrinthClient {
    client: Client,
    base_url: Url,
}

impl ModrinthClient {
    /// Create a client with the default timeout
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("packwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(base_url, client)
    }

    /// Create a client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::NotConfigured(format!(
                "base URL cannot hold paths: {base_url}"
            )));
        }
        Ok(Self { client, base_url })
    }

    /// Build the version listing URL for a project
    fn versions_url(&self, slug: &str, loader: &str, game_version: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::NotConfigured("base URL cannot hold paths".to_string()))?
            .pop_if_empty()
            .extend(["project", slug, "version"]);

        let loaders = serde_json::to_string(&[loader])?;
        let game_versions = serde_json::to_string(&[game_version])?;
        url.query_pairs_mut()
            .append_pair("loaders", &loaders)
            .append_pair("game_versions", &game_versions);

        Ok(url)
    }

    /// List every version matching the loader and game version
    ///
    /// # Errors
    /// Returns an error if the request fails or the catalog returns an error.
    pub async fn list_versions(
        &self,
        slug: &str,
        loader: &str,
        game_version: &str,
    ) -> Result<Vec<ReleaseDescriptor>> {
        let url = self.versions_url(slug, loader, game_version)?;
        debug!(%url, "querying catalog");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        let versions: Vec<ModrinthVersion> = response.json().await?;
        Ok(versions.into_iter().map(ReleaseDescriptor::from).collect())
    }

    /// Fetch the newest matching version, preferring stable releases
    ///
    /// # Errors
    /// Returns an error if the request fails or no versions match.
    #[instrument(skip(self))]
    pub async fn fetch_latest(
        &self,
        slug: &str,
        loader: &str,
        game_version: &str,
    ) -> Result<ReleaseDescriptor> {
        let versions = self.list_versions(slug, loader, game_version).await?;
        let count = versions.len();
        let latest = select_latest(versions)?;

        info!(
            candidates = count,
            id = %latest.id,
            version = %latest.version_label,
            "latest release resolved"
        );
        Ok(latest)
    }
}

/// Pick the newest candidate
///
/// Stable releases win over pre-releases when any exist. Among the remaining
/// candidates the greatest `published_at` wins; ties keep input order.
///
/// # Errors
/// Returns `ClientError::NoReleases` if `candidates` is empty.
pub fn select_latest(candidates: Vec<ReleaseDescriptor>) -> Result<ReleaseDescriptor> {
    let (releases, others): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(ReleaseDescriptor::is_release);

    let mut pool = if releases.is_empty() { others } else { releases };

    // Stable sort, descending, so equal timestamps stay in input order
    pool.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    pool.into_iter().next().ok_or(ClientError::NoReleases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(id: &str, kind: &str, published: &str) -> ReleaseDescriptor {
        ReleaseDescriptor::new(id)
            .with_release_kind(kind)
            .with_published_at(published)
    }

    #[test]
    fn test_select_prefers_releases() {
        let picked = select_latest(vec![
            version("beta-new", "beta", "2025-03-01T00:00:00Z"),
            version("rel-old", "release", "2025-01-01T00:00:00Z"),
            version("rel-mid", "release", "2025-02-01T00:00:00Z"),
        ])
        .unwrap();

        assert_eq!(picked.id, "rel-mid");
    }

    #[test]
    fn test_select_falls_back_to_all() {
        let picked = select_latest(vec![
            version("alpha", "alpha", "2025-01-01T00:00:00Z"),
            version("beta", "beta", "2025-02-01T00:00:00Z"),
        ])
        .unwrap();

        assert_eq!(picked.id, "beta");
    }

    #[test]
    fn test_select_empty() {
        assert!(matches!(select_latest(vec![]), Err(ClientError::NoReleases)));
    }

    #[test]
    fn test_select_ties_keep_input_order() {
        let picked = select_latest(vec![
            version("first", "release", "2025-01-01T00:00:00Z"),
            version("second", "release", "2025-01-01T00:00:00Z"),
        ])
        .unwrap();

        assert_eq!(picked.id, "first");
    }

    #[test]
    fn test_select_empty_date_sorts_last() {
        let picked = select_latest(vec![
            version("undated", "release", ""),
            version("dated", "release", "2024-06-01T00:00:00Z"),
        ])
        .unwrap();

        assert_eq!(picked.id, "dated");
    }

    #[test]
    fn test_versions_url() {
        let client = ModrinthClient::new(DEFAULT_BASE_URL).unwrap();
        let url = client
            .versions_url("cobbleverse", "fabric", "1.21.1")
            .unwrap();

        assert_eq!(url.path(), "/v2/project/cobbleverse/version");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("loaders".to_string(), r#"["fabric"]"#.to_string()),
                ("game_versions".to_string(), r#"["1.21.1"]"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_versions_url_trailing_slash_base() {
        let client = ModrinthClient::new("http://localhost:9000/api/").unwrap();
        let url = client.versions_url("pack", "quilt", "1.20").unwrap();
        assert_eq!(url.path(), "/api/project/pack/version");
    }

    #[test]
    fn test_invalid_url() {
        assert!(ModrinthClient::new("not a url").is_err());
    }
}
