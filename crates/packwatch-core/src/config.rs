//! Configuration types for the checker, release source and sinks

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: u64 = 3600;

/// Everything the check cycle and scheduler need
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Polling and file locations
    #[serde(default)]
    pub checker: CheckerConfig,
    /// Release catalog query
    #[serde(default)]
    pub source: SourceConfig,
    /// Notification sinks
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Notification text
    #[serde(default)]
    pub message: MessageConfig,
}

/// Polling schedule and file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Run checks at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Run one check immediately at startup
    #[serde(default = "default_true")]
    pub check_on_start: bool,
    /// Hours between checks, values below 1 are treated as 1
    #[serde(default = "default_interval_hours")]
    pub interval_hours: i64,
    /// Installed modpack manifest
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
    /// Persisted check state
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_on_start: true,
            interval_hours: default_interval_hours(),
            manifest_path: default_manifest_path(),
            state_file: default_state_file(),
        }
    }
}

impl CheckerConfig {
    /// Time between checks
    #[must_use]
    pub fn interval(&self) -> Duration {
        let hours = u64::try_from(self.interval_hours.max(1)).unwrap_or(1);
        Duration::from_secs(hours.saturating_mul(SECS_PER_HOUR))
    }
}

/// Release catalog query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Project slug used when the manifest does not name one
    #[serde(default = "default_project_slug")]
    pub project_slug: String,
    /// Mod loader tag
    #[serde(default = "default_loader")]
    pub loader: String,
    /// Game version tag
    #[serde(default = "default_game_version")]
    pub game_version: String,
    /// Catalog API root
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            project_slug: default_project_slug(),
            loader: default_loader(),
            game_version: default_game_version(),
            api_base: default_api_base(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl SourceConfig {
    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Notification sink switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Write every cycle outcome to the log
    #[serde(default = "default_true")]
    pub log: bool,
    /// Chat webhook
    #[serde(default)]
    pub discord: DiscordConfig,
    /// In-game chat via the remote console
    #[serde(default)]
    pub minecraft: MinecraftConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            log: true,
            discord: DiscordConfig::default(),
            minecraft: MinecraftConfig::default(),
        }
    }
}

/// Chat webhook sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Post to the webhook
    #[serde(default)]
    pub enabled: bool,
    /// Webhook URL
    #[serde(default)]
    pub webhook: String,
    /// Request timeout in seconds
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook: String::new(),
            timeout_secs: default_webhook_timeout(),
        }
    }
}

impl DiscordConfig {
    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Remote console sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinecraftConfig {
    /// Announce in game chat
    #[serde(default)]
    pub enabled: bool,
    /// Hours before repeating an announcement for the same version, 0 or less disables repeats
    #[serde(default = "default_repeat_hours")]
    pub repeat_hours: i64,
    /// Console host
    #[serde(default = "default_rcon_host")]
    pub rcon_host: String,
    /// Console port
    #[serde(default = "default_rcon_port")]
    pub rcon_port: u16,
    /// Console password
    #[serde(default)]
    pub rcon_password: String,
    /// Deadline for the whole console exchange in seconds
    #[serde(default = "default_rcon_timeout")]
    pub timeout_secs: u64,
}

impl Default for MinecraftConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repeat_hours: default_repeat_hours(),
            rcon_host: default_rcon_host(),
            rcon_port: default_rcon_port(),
            rcon_password: String::new(),
            timeout_secs: default_rcon_timeout(),
        }
    }
}

impl MinecraftConfig {
    /// Console exchange deadline
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Update message wording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Prefix shown in brackets
    #[serde(default = "default_label")]
    pub label: String,
    /// Suggested action appended to the message
    #[serde(default = "default_remediation")]
    pub remediation: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            remediation: default_remediation(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_hours() -> i64 {
    168
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("/data/.modrinth-modpack-manifest.json")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("/state/state.json")
}

fn default_project_slug() -> String {
    "cobbleverse".to_string()
}

fn default_loader() -> String {
    "fabric".to_string()
}

fn default_game_version() -> String {
    "1.21.1".to_string()
}

fn default_api_base() -> String {
    "https://api.modrinth.com/v2".to_string()
}

fn default_source_timeout() -> u64 {
    20
}

fn default_webhook_timeout() -> u64 {
    15
}

fn default_repeat_hours() -> i64 {
    24
}

fn default_rcon_host() -> String {
    "mc-evolution".to_string()
}

fn default_rcon_port() -> u16 {
    25575
}

fn default_rcon_timeout() -> u64 {
    10
}

fn default_label() -> String {
    "CobbleVerse".to_string()
}

fn default_remediation() -> String {
    "./scripts/update-safe.sh".to_string()
}

impl Settings {
    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup
    ///
    /// Variable names match the container environment the checker has always
    /// been deployed with. Booleans accept `1`, `true`, `yes`, `on`; integers
    /// that fail to parse leave the current value in place.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |name: &str, target: &mut bool| {
            if let Some(raw) = lookup(name) {
                *target = parse_bool(&raw);
            }
        };
        flag("UPDATE_CHECK_ENABLED", &mut self.checker.enabled);
        flag("UPDATE_CHECK_ON_START", &mut self.checker.check_on_start);
        flag("UPDATE_NOTIFY_LOG", &mut self.notify.log);
        flag("UPDATE_NOTIFY_DISCORD", &mut self.notify.discord.enabled);
        flag("UPDATE_NOTIFY_MINECRAFT", &mut self.notify.minecraft.enabled);

        if let Some(hours) = lookup("UPDATE_CHECK_INTERVAL_HOURS").and_then(|v| parse_int(&v)) {
            self.checker.interval_hours = hours;
        }
        if let Some(hours) =
            lookup("UPDATE_NOTIFY_MINECRAFT_REPEAT_HOURS").and_then(|v| parse_int(&v))
        {
            self.notify.minecraft.repeat_hours = hours;
        }
        if let Some(port) = lookup("RCON_PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
            self.notify.minecraft.rcon_port = port;
        }

        let text = |name: &str, target: &mut String| {
            if let Some(value) = lookup(name) {
                *target = value;
            }
        };
        text("UPDATE_NOTIFY_DISCORD_WEBHOOK", &mut self.notify.discord.webhook);
        text("MODRINTH_PROJECT_SLUG", &mut self.source.project_slug);
        text("MODRINTH_LOADER", &mut self.source.loader);
        text("MODRINTH_GAME_VERSION", &mut self.source.game_version);
        text("RCON_HOST", &mut self.notify.minecraft.rcon_host);
        text("RCON_PASSWORD", &mut self.notify.minecraft.rcon_password);

        if let Some(path) = lookup("LOCAL_MANIFEST_PATH") {
            self.checker.manifest_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("UPDATE_CHECK_STATE_FILE") {
            self.checker.state_file = PathBuf::from(path);
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut settings = Settings::default();
        settings.apply_overrides(|name| vars.get(name).cloned());
        settings
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert!(settings.checker.enabled);
        assert!(settings.checker.check_on_start);
        assert_eq!(settings.checker.interval(), Duration::from_secs(168 * 3600));
        assert!(settings.notify.log);
        assert!(!settings.notify.discord.enabled);
        assert!(!settings.notify.minecraft.enabled);
        assert_eq!(settings.notify.minecraft.repeat_hours, 24);
        assert_eq!(settings.notify.minecraft.rcon_port, 25575);
        assert_eq!(settings.source.project_slug, "cobbleverse");
    }

    #[test]
    fn test_interval_clamped_to_one_hour() {
        let settings = overrides(&[("UPDATE_CHECK_INTERVAL_HOURS", "0")]);
        assert_eq!(settings.checker.interval(), Duration::from_secs(3600));

        let settings = overrides(&[("UPDATE_CHECK_INTERVAL_HOURS", "-5")]);
        assert_eq!(settings.checker.interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_interval_saturates() {
        let settings = overrides(&[("UPDATE_CHECK_INTERVAL_HOURS", "9223372036854775807")]);
        assert_eq!(settings.checker.interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_unparsable_int_keeps_default() {
        let settings = overrides(&[
            ("UPDATE_CHECK_INTERVAL_HOURS", "weekly"),
            ("RCON_PORT", "99999"),
            ("UPDATE_NOTIFY_MINECRAFT_REPEAT_HOURS", ""),
        ]);

        assert_eq!(settings.checker.interval_hours, 168);
        assert_eq!(settings.notify.minecraft.rcon_port, 25575);
        assert_eq!(settings.notify.minecraft.repeat_hours, 24);
    }

    #[test]
    fn test_bool_parsing() {
        let settings = overrides(&[
            ("UPDATE_NOTIFY_DISCORD", " YES "),
            ("UPDATE_NOTIFY_MINECRAFT", "on"),
            ("UPDATE_CHECK_ENABLED", "nope"),
            ("UPDATE_NOTIFY_LOG", "0"),
        ]);

        assert!(settings.notify.discord.enabled);
        assert!(settings.notify.minecraft.enabled);
        assert!(!settings.checker.enabled);
        assert!(!settings.notify.log);
    }

    #[test]
    fn test_text_and_path_overrides() {
        let settings = overrides(&[
            ("MODRINTH_PROJECT_SLUG", "other-pack"),
            ("RCON_HOST", "10.0.0.5"),
            ("RCON_PASSWORD", "pw"),
            ("UPDATE_CHECK_STATE_FILE", "/tmp/state.json"),
            ("UPDATE_NOTIFY_MINECRAFT_REPEAT_HOURS", "-1"),
        ]);

        assert_eq!(settings.source.project_slug, "other-pack");
        assert_eq!(settings.notify.minecraft.rcon_host, "10.0.0.5");
        assert_eq!(settings.notify.minecraft.rcon_password, "pw");
        assert_eq!(settings.checker.state_file, PathBuf::from("/tmp/state.json"));
        assert_eq!(settings.notify.minecraft.repeat_hours, -1);
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [checker]
            interval_hours = 12

            [notify.minecraft]
            enabled = true
            rcon_password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.checker.interval_hours, 12);
        assert!(settings.checker.check_on_start);
        assert!(settings.notify.minecraft.enabled);
        assert_eq!(settings.notify.minecraft.rcon_host, "mc-evolution");
        assert_eq!(settings.source.loader, "fabric");
    }
}
