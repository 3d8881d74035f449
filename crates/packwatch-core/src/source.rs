//! Release source seam

use async_trait::async_trait;

use packwatch_api::ReleaseDescriptor;
use packwatch_client::ModrinthClient;

use crate::error::CoreError;

/// Something that can tell us the newest release of a package
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Newest release matching the loader and game version tags
    async fn fetch_latest(
        &self,
        slug: &str,
        loader: &str,
        game_version: &str,
    ) -> Result<ReleaseDescriptor, CoreError>;
}

#[async_trait]
impl ReleaseSource for ModrinthClient {
    async fn fetch_latest(
        &self,
        slug: &str,
        loader: &str,
        game_version: &str,
    ) -> Result<ReleaseDescriptor, CoreError> {
        ModrinthClient::fetch_latest(self, slug, loader, game_version)
            .await
            .map_err(|e| CoreError::SourceQuery(e.to_string()))
    }
}
