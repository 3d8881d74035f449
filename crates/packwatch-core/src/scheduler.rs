//! Fixed-interval scheduler
//!
//! Runs a cycle callback on a timer. Cycles are awaited to completion before
//! the next sleep starts, so two cycles never overlap.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::CheckerConfig;

/// Drives check cycles on an interval
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    run_on_start: bool,
    enabled: bool,
}

impl Scheduler {
    /// Create an enabled scheduler that also runs on start
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            run_on_start: true,
            enabled: true,
        }
    }

    /// Build from checker settings
    #[must_use]
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new(config.interval())
            .with_run_on_start(config.check_on_start)
            .with_enabled(config.enabled)
    }

    /// Run one cycle immediately instead of waiting a full interval
    #[must_use]
    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    /// Disabled schedulers idle until shutdown without running cycles
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Time between cycles
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `shutdown` resolves, returning how many completed
    ///
    /// A cycle in flight when `shutdown` resolves is dropped.
    pub async fn run<F, Fut, S>(&self, mut cycle: F, shutdown: S) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if !self.enabled {
            info!("update checks disabled, idling");
            shutdown.await;
            return 0;
        }

        info!(interval = ?self.interval, run_on_start = self.run_on_start, "scheduler started");

        let mut completed = 0;
        if self.run_on_start {
            tokio::select! {
                _ = cycle() => completed += 1,
                () = &mut shutdown => return completed,
            }
        }

        loop {
            tokio::select! {
                () = sleep(self.interval) => {}
                () = &mut shutdown => break,
            }

            debug!("interval elapsed, starting cycle");
            tokio::select! {
                _ = cycle() => completed += 1,
                () = &mut shutdown => break,
            }
        }

        info!(cycles = completed, "scheduler stopped");
        completed
    }
}
