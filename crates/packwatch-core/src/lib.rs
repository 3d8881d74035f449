//! packwatch-core: Update detection and notification logic
//!
//! Implements the check-cycle state machine, the persisted check state, the
//! notification sinks and the scheduler that drives cycles on an interval.

pub mod checker;
pub mod config;
pub mod error;
pub mod manifest;
pub mod notify;
pub mod scheduler;
pub mod source;
pub mod state;

pub use checker::{
    Checker, CheckerArgs, CycleReport, SinkOutcome, build_update_message, should_repeat,
};
pub use config::{
    CheckerConfig, DiscordConfig, MessageConfig, MinecraftConfig, NotifyConfig, Settings,
    SourceConfig,
};
pub use error::CoreError;
pub use manifest::read_local;
pub use notify::{LogNotifier, Notifier};
pub use scheduler::Scheduler;
pub use source::ReleaseSource;
pub use state::{CheckState, StateStore};
