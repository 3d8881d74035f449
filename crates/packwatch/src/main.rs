//! packwatch daemon
//!
//! Polls the release catalog for a newer modpack version and announces it
//! through the log, a chat webhook and the game server console.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use packwatch_core::Scheduler;

mod config;
mod factory;

use config::{Config, DaemonConfig, LogFormat};

/// Modpack update checker
#[derive(Parser, Debug)]
#[command(name = "packwatch", version, about)]
struct Cli {
    /// Config file (defaults to `PACKWATCH_CONFIG` or the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default)]
enum Commands {
    /// Run a single check and exit
    #[command(name = "check-once")]
    CheckOnce,
    /// Check on an interval until interrupted
    #[default]
    Loop,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::discover);
    let (mut config, load_error) = match &config_path {
        Some(path) => Config::load_or_default(path),
        None => (Config::default(), None),
    };
    config.settings.apply_env();

    init_tracing(&config.daemon);

    match (&config_path, load_error) {
        (Some(path), None) => info!(path = %path.display(), "loaded configuration"),
        (Some(path), Some(e)) => error!(
            path = %path.display(),
            error = %e,
            "invalid config file, using defaults"
        ),
        (None, _) => warn!("no config file found, using defaults"),
    }

    let checker = factory::build_checker(&config.settings)?;

    match cli.command.unwrap_or_default() {
        Commands::CheckOnce => {
            let report = checker.run_once().await;
            info!(status = %report.status, "check complete");
        }
        Commands::Loop => {
            let scheduler = Scheduler::from_config(&config.settings.checker);
            scheduler
                .run(|| checker.run_once(), shutdown_signal())
                .await;
        }
    }

    Ok(())
}

fn init_tracing(daemon: &DaemonConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&daemon.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match daemon.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown requested");
}
