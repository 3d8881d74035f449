//! Check cycle state machine
//!
//! One cycle walks `load local -> query source -> compare -> notify -> persist`
//! and stops at the first terminal outcome. Every reachable branch persists
//! the state before returning. Collaborator failures are logged and folded
//! into the outcome; nothing here ends the process.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{error, info, instrument, warn};

use packwatch_api::{CheckStatus, LocalVersionInfo, ReleaseDescriptor};

use crate::config::Settings;
use crate::manifest::read_local;
use crate::notify::Notifier;
use crate::source::ReleaseSource;
use crate::state::{CheckState, StateStore};

/// What happened to one sink during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// Sink disabled or suppressed by dedup
    Skipped,
    /// Sink accepted the message
    Delivered,
    /// Sink was attempted and failed
    Failed(String),
}

impl SinkOutcome {
    /// Whether the sink was attempted at all
    #[must_use]
    pub fn attempted(&self) -> bool {
        !matches!(self, SinkOutcome::Skipped)
    }
}

/// Result of one check cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Terminal status, also written to `last_status`
    pub status: CheckStatus,
    /// Latest remote release, if the source answered
    pub remote: Option<ReleaseDescriptor>,
    /// Webhook sink result
    pub webhook: SinkOutcome,
    /// Console sink result
    pub console: SinkOutcome,
}

impl CycleReport {
    fn new(status: CheckStatus) -> Self {
        Self {
            status,
            remote: None,
            webhook: SinkOutcome::Skipped,
            console: SinkOutcome::Skipped,
        }
    }
}

/// Arguments for building a `Checker`
pub struct CheckerArgs {
    /// Checker settings
    pub settings: Settings,
    /// Where the latest release comes from
    pub source: Arc<dyn ReleaseSource>,
    /// Audit log sink, `None` when logging of outcomes is disabled
    pub log: Option<Arc<dyn Notifier>>,
    /// Webhook sink, `None` when disabled
    pub webhook: Option<Arc<dyn Notifier>>,
    /// In-game console sink, `None` when disabled
    pub console: Option<Arc<dyn Notifier>>,
}

/// Runs check cycles
pub struct Checker {
    settings: Settings,
    store: StateStore,
    source: Arc<dyn ReleaseSource>,
    log: Option<Arc<dyn Notifier>>,
    webhook: Option<Arc<dyn Notifier>>,
    console: Option<Arc<dyn Notifier>>,
}

impl Checker {
    /// Create a new checker
    #[must_use]
    pub fn new(args: CheckerArgs) -> Self {
        let store = StateStore::new(args.settings.checker.state_file.clone());
        Self {
            settings: args.settings,
            store,
            source: args.source,
            log: args.log,
            webhook: args.webhook,
            console: args.console,
        }
    }

    /// Checker settings
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Backing state store
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run one cycle using the current time
    pub async fn run_once(&self) -> CycleReport {
        self.run_once_at(Utc::now()).await
    }

    /// Run one cycle as if it were `now`
    #[instrument(skip(self), fields(state_file = %self.store.path().display()))]
    pub async fn run_once_at(&self, now: DateTime<Utc>) -> CycleReport {
        let mut state = self.store.load().await;
        let manifest_path = &self.settings.checker.manifest_path;
        let local = read_local(manifest_path, &self.settings.source.project_slug).await;

        if !local.is_installed() {
            self.audit(&format!(
                "No local version found in {}",
                manifest_path.display()
            ))
            .await;
            return self
                .finish(&mut state, now, CycleReport::new(CheckStatus::LocalManifestMissing))
                .await;
        }

        let source = &self.settings.source;
        let remote = match self
            .source
            .fetch_latest(&local.package_slug, &source.loader, &source.game_version)
            .await
        {
            Ok(remote) => remote,
            Err(e) => {
                warn!(slug = %local.package_slug, error = %e, "release source query failed");
                self.audit(&format!("Could not query release source: {e}"))
                    .await;
                return self
                    .finish(&mut state, now, CycleReport::new(CheckStatus::RemoteQueryFailed))
                    .await;
            }
        };

        state.record_versions(
            &local.installed_version_id,
            &remote.id,
            &remote.version_label,
        );

        if local.installed_version_id == remote.id {
            self.audit(&format!(
                "No changes. Current version: {}",
                remote.version_label
            ))
            .await;
            let mut report = CycleReport::new(CheckStatus::UpToDate);
            report.remote = Some(remote);
            return self.finish(&mut state, now, report).await;
        }

        let message = build_update_message(&self.settings, &local, &remote);
        self.audit(&message).await;

        let first_for_version = state.last_notified_version_id() != Some(remote.id.as_str());
        let mut report = CycleReport::new(CheckStatus::UpdateAvailable);

        if first_for_version && let Some(webhook) = &self.webhook {
            report.webhook = deliver(webhook.as_ref(), &message).await;
        }

        if let Some(console) = &self.console {
            let repeat_hours = self.settings.notify.minecraft.repeat_hours;
            let due = first_for_version
                || should_repeat(state.last_notified_console_at(), repeat_hours, now);
            if due {
                report.console = deliver(console.as_ref(), &message).await;
                if report.console == SinkOutcome::Delivered {
                    state.set_last_notified_console_at(now);
                }
            }
        }

        // Attempts, not deliveries, close out a version so a broken sink is
        // not hammered every cycle.
        if first_for_version {
            state.mark_notified(&remote.id, now);
        }

        report.remote = Some(remote);
        self.finish(&mut state, now, report).await
    }

    /// Stamp, persist and return the report
    async fn finish(
        &self,
        state: &mut CheckState,
        now: DateTime<Utc>,
        report: CycleReport,
    ) -> CycleReport {
        state.set_last_check_at(now);
        state.set_last_status(report.status);

        if let Err(e) = self.store.save(state).await {
            error!(error = %e, "failed to persist check state");
        }

        info!(status = %report.status, "check cycle finished");
        report
    }

    async fn audit(&self, message: &str) {
        if let Some(log) = &self.log
            && let Err(e) = log.notify(message).await
        {
            warn!(error = %e, "audit log sink failed");
        }
    }
}

async fn deliver(sink: &dyn Notifier, message: &str) -> SinkOutcome {
    match sink.notify(message).await {
        Ok(()) => {
            info!(sink = sink.name(), "notification sent");
            SinkOutcome::Delivered
        }
        Err(e) => {
            warn!(sink = sink.name(), error = %e, "notification failed");
            SinkOutcome::Failed(e.to_string())
        }
    }
}

/// Whether a repeat announcement is due
///
/// Repeats are off when `repeat_hours <= 0`. A missing last-sent time counts
/// as due.
#[must_use]
pub fn should_repeat(
    last_sent: Option<DateTime<Utc>>,
    repeat_hours: i64,
    now: DateTime<Utc>,
) -> bool {
    if repeat_hours <= 0 {
        return false;
    }
    match last_sent {
        None => true,
        // A window too large to represent never elapses
        Some(last_sent) => ChronoDuration::try_hours(repeat_hours)
            .is_some_and(|window| now - last_sent >= window),
    }
}

/// Human readable update announcement
#[must_use]
pub fn build_update_message(
    settings: &Settings,
    local: &LocalVersionInfo,
    remote: &ReleaseDescriptor,
) -> String {
    let current: &str = if local.installed_version_id.is_empty() {
        "unknown"
    } else {
        &local.installed_version_id
    };
    let target: &str = if remote.label().is_empty() {
        "unknown"
    } else {
        remote.label()
    };
    let published: &str = if remote.published_at.is_empty() {
        "unknown date"
    } else {
        &remote.published_at
    };

    format!(
        "[{}] Update available: {current} -> {target} (published: {published}). Recommended: {}",
        settings.message.label, settings.message.remediation
    )
}
