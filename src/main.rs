//! Application shell supervisor.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── supervisor (this file) ─────────────────────────────┐
//!   │                                                                                  │
//!   │   config ──▶ instance N ──────────────────────────────────────────┐              │
//!   │              │                                                    │              │
//!   │              │  LifecycleController::load                         │              │
//!   │              │     └─ libraries → StrictMode/Bootstrapper/Router  │              │
//!   │              │                                                    │              │
//!   │              │  UpdateCoordinator ◀── VersionWatcher (manifest)   │              │
//!   │              │     └─ SKIP_WAITING → hard reload ─────────────────┼──▶ instance N+1
//!   │              │                                                    │              │
//!   │              └── SIGINT/SIGTERM → unload → exit ──────────────────┘              │
//!   │                                                                                  │
//!   └──────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A hard reload ends the running instance. The supervisor re-reads the
//! configuration and starts a fresh one, with the active version carried
//! over in the shared version slot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use app_shell::config::{load_config, ShellConfig};
use app_shell::host::memory::{InMemoryDocument, RecordingNavigator};
use app_shell::lifecycle::{signals, startup, InstanceExit, Shutdown};
use app_shell::observability::{logging, metrics};
use app_shell::update::{BuildManifest, VersionSlot};

#[derive(Parser)]
#[command(name = "app-shell")]
#[command(about = "Mounts the application shell and reloads it when a new build is deployed", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

fn read_config(path: Option<&Path>) -> Result<ShellConfig, app_shell::config::ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ShellConfig::default()),
    }
}

/// Active version at process start: whatever is deployed right now.
fn initial_slot(config: &ShellConfig) -> VersionSlot {
    match BuildManifest::read(Path::new(&config.update.manifest_path)) {
        Ok(manifest) => VersionSlot::new(manifest),
        Err(e) => {
            tracing::warn!(error = %e, "No readable build manifest, assuming version 0.0.0");
            VersionSlot::new(BuildManifest::new("0.0.0"))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = read_config(cli.config.as_deref())?;

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init(&log_level);

    tracing::info!("app-shell v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let slot = initial_slot(&config);
    let navigator = RecordingNavigator::new();

    let shutdown = Arc::new(Shutdown::new());
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        trigger.trigger();
    });

    let mut generation: u64 = 0;
    loop {
        tracing::info!(
            generation,
            version = %slot.current().version,
            attachment_point = %config.mount.attachment_point,
            "Starting instance"
        );

        let document = InMemoryDocument::with_element(config.mount.attachment_point.clone());
        let exit = startup::boot(
            &config,
            document,
            &slot,
            navigator.clone(),
            shutdown.subscribe(),
            generation == 0,
        )
        .await?;

        match exit {
            InstanceExit::Reload(reload) => {
                tracing::info!(
                    version = %reload.version,
                    activated = reload.activated,
                    total_reloads = navigator.reloads(),
                    "Instance ended by hard reload"
                );
                generation += 1;
                match read_config(cli.config.as_deref()) {
                    Ok(fresh) => config = fresh,
                    Err(e) => tracing::error!(
                        "Failed to reload config: {}. Keeping current configuration.",
                        e
                    ),
                }
            }
            InstanceExit::Shutdown => break,
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
