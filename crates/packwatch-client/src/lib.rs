//! packwatch-client: HTTP clients for the release catalog and chat webhooks
//!
//! # Examples
//!
//! ## Latest release
//!
//! ```no_run
//! use packwatch_client::ModrinthClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModrinthClient::new(packwatch_client::modrinth::DEFAULT_BASE_URL)?;
//! let latest = client.fetch_latest("cobbleverse", "fabric", "1.21.1").await?;
//! println!("{} published {}", latest.label(), latest.published_at);
//! # Ok(())
//! # }
//! ```
//!
//! ## Webhook
//!
//! ```no_run
//! use packwatch_client::WebhookClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let webhook = WebhookClient::new("https://discord.com/api/webhooks/1/abc")?;
//! webhook.post("New release available").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod modrinth;
pub mod webhook;

pub use error::{ClientError, Result};
pub use modrinth::{ModrinthClient, select_latest};
pub use webhook::WebhookClient;
