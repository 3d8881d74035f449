//! Builds the checker and its collaborators from settings

use std::sync::Arc;

use eyre::{Result, WrapErr};
use tracing::{error, warn};

use packwatch_client::{ModrinthClient, WebhookClient, modrinth::DEFAULT_BASE_URL};
use packwatch_core::{
    Checker, CheckerArgs, DiscordConfig, LogNotifier, MinecraftConfig, Notifier, Settings,
    SourceConfig,
};
use packwatch_rcon::RconClient;

/// Build a checker with every enabled sink wired in
///
/// # Errors
/// Returns error only if no HTTP client can be created at all
pub fn build_checker(settings: &Settings) -> Result<Checker> {
    let source = release_source(&settings.source)?;

    let log: Option<Arc<dyn Notifier>> = if settings.notify.log {
        Some(Arc::new(LogNotifier::new()))
    } else {
        None
    };

    Ok(Checker::new(CheckerArgs {
        settings: settings.clone(),
        source: Arc::new(source),
        log,
        webhook: webhook_sink(&settings.notify.discord),
        console: console_sink(&settings.notify.minecraft),
    }))
}

/// Catalog client, falling back to the public API on a bad base URL
fn release_source(config: &SourceConfig) -> Result<ModrinthClient> {
    match ModrinthClient::with_timeout(&config.api_base, config.timeout()) {
        Ok(client) => Ok(client),
        Err(e) => {
            error!(
                api_base = %config.api_base,
                error = %e,
                "invalid release source URL, using {DEFAULT_BASE_URL}"
            );
            ModrinthClient::with_timeout(DEFAULT_BASE_URL, config.timeout())
                .wrap_err("failed to create release source client")
        }
    }
}

/// Webhook sink, or `None` when disabled or unusable
pub fn webhook_sink(config: &DiscordConfig) -> Option<Arc<dyn Notifier>> {
    if !config.enabled {
        return None;
    }

    match WebhookClient::with_timeout(&config.webhook, config.timeout()) {
        Ok(client) => {
            if !client.is_configured() {
                warn!("webhook notifications enabled but no webhook URL is set");
            }
            Some(Arc::new(client))
        }
        Err(e) => {
            error!(error = %e, "invalid webhook settings, webhook notifications disabled");
            None
        }
    }
}

/// Console sink, or `None` when disabled
pub fn console_sink(config: &MinecraftConfig) -> Option<Arc<dyn Notifier>> {
    if !config.enabled {
        return None;
    }

    if config.rcon_password.is_empty() {
        warn!("in-game notifications enabled but no console password is set");
    }

    let client = RconClient::new(&config.rcon_host, config.rcon_port, &config.rcon_password)
        .with_timeout(config.timeout());
    Some(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        assert!(build_checker(&Settings::default()).is_ok());
    }

    #[test]
    fn test_bad_api_base_falls_back() {
        let config = SourceConfig {
            api_base: "::not a url::".to_string(),
            ..SourceConfig::default()
        };
        assert!(release_source(&config).is_ok());
    }

    #[test]
    fn test_disabled_sinks() {
        assert!(webhook_sink(&DiscordConfig::default()).is_none());
        assert!(console_sink(&MinecraftConfig::default()).is_none());
    }

    #[test]
    fn test_enabled_sinks() {
        let discord = DiscordConfig {
            enabled: true,
            webhook: "https://discord.example/api/webhooks/1/token".to_string(),
            ..DiscordConfig::default()
        };
        let minecraft = MinecraftConfig {
            enabled: true,
            rcon_password: "pw".to_string(),
            ..MinecraftConfig::default()
        };

        assert_eq!(webhook_sink(&discord).unwrap().name(), "webhook");
        assert_eq!(console_sink(&minecraft).unwrap().name(), "console");
    }

    #[test]
    fn test_invalid_webhook_disables_sink() {
        let discord = DiscordConfig {
            enabled: true,
            webhook: "not a url".to_string(),
            ..DiscordConfig::default()
        };
        assert!(webhook_sink(&discord).is_none());
    }
}
