//! Chat webhook client (Discord-compatible `{"content": ...}` body)

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, Result};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    content: &'a str,
}

/// Posts plain-text messages to a webhook URL
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: Option<Url>,
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Webhook URLs embed their token
        f.debug_struct("WebhookClient")
            .field("configured", &self.url.is_some())
            .finish_non_exhaustive()
    }
}

impl WebhookClient {
    /// Create a client with the default timeout
    ///
    /// An empty URL yields a client whose every post fails with
    /// `ClientError::NotConfigured`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let url = url.as_ref().trim();
        let url = if url.is_empty() {
            None
        } else {
            Some(Url::parse(url)?)
        };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// Whether a target URL is set
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Post one message
    ///
    /// # Errors
    /// Returns `ClientError::NotConfigured` without a URL, otherwise an error if
    /// the request fails or the webhook answers with a non-success status.
    #[instrument(skip_all)]
    pub async fn post(&self, message: &str) -> Result<()> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| ClientError::NotConfigured("webhook URL is empty".to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&WebhookBody { content: message })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        debug!(status = response.status().as_u16(), "webhook accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_unconfigured() {
        let client = WebhookClient::new("  ").unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_invalid_url() {
        assert!(WebhookClient::new("not a url").is_err());
    }

    #[test]
    fn test_debug_hides_url() {
        let client = WebhookClient::new("https://example.com/hooks/secret-token").unwrap();
        assert!(!format!("{client:?}").contains("secret-token"));
    }

    #[tokio::test]
    async fn test_post_unconfigured() {
        let client = WebhookClient::new("").unwrap();
        let err = client.post("hello").await.unwrap_err();
        assert!(matches!(err, ClientError::NotConfigured(_)));
    }
}
