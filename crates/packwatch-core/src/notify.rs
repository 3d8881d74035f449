//! Notification sinks

use async_trait::async_trait;
use tracing::info;

use packwatch_client::WebhookClient;
use packwatch_rcon::RconClient;

use crate::error::CoreError;

/// A channel that delivers plain-text messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message
    async fn notify(&self, message: &str) -> Result<(), CoreError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Writes every message to the audit log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), CoreError> {
        info!(target: "packwatch::audit", "{message}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[async_trait]
impl Notifier for WebhookClient {
    async fn notify(&self, message: &str) -> Result<(), CoreError> {
        self.post(message)
            .await
            .map_err(|e| CoreError::sink("webhook", e))
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[async_trait]
impl Notifier for RconClient {
    async fn notify(&self, message: &str) -> Result<(), CoreError> {
        self.send_message(message)
            .await
            .map_err(|e| CoreError::sink("console", e))
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
