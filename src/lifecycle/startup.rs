//! Startup orchestration for one application instance.
//!
//! # Responsibilities
//! - Build the lifecycle controller and mount the application
//! - Register the update worker and subscribe the coordinator once
//! - Run until a hard reload or a shutdown ends the instance
//!
//! # Design Decisions
//! - Fail fast: a failed first mount is fatal for the instance
//! - Mount first, then start listening for updates
//! - Update registration problems are logged; the app still runs
//! - After a hard reload is initiated the instance does nothing else
//! - A shutdown that is ready together with an update wins: the process
//!   stops and the waiting version stays waiting for the next start

use std::path::Path;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::config::ShellConfig;
use crate::host::{HostDocument, Navigator, WaitingVersion};
use crate::lifecycle::controller::LifecycleController;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::ui::AppFactory;
use crate::update::{
    PendingVersion, ReloadInitiated, Registration, RegistrationError, UpdateCoordinator,
    VersionSlot, VersionWatcher, WatchGuard,
};

/// Error type for instance startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// How an instance ended.
#[derive(Debug)]
pub enum InstanceExit {
    /// A hard reload was initiated; the next instance should start.
    Reload(ReloadInitiated),
    /// The process was asked to stop.
    Shutdown,
}

/// Mount the application, then wait for an update or a shutdown.
///
/// `updates` is `None` when update detection is unavailable; the instance
/// then only ends on shutdown.
pub async fn run_instance<D, N, W>(
    controller: &mut LifecycleController<D>,
    coordinator: UpdateCoordinator<N>,
    updates: Option<oneshot::Receiver<W>>,
    shutdown: ShutdownSignal,
) -> Result<InstanceExit, StartupError>
where
    D: HostDocument,
    N: Navigator,
    W: WaitingVersion,
{
    controller.load()?;
    await_exit(controller, coordinator, updates, shutdown).await
}

async fn await_exit<D, N, W>(
    controller: &mut LifecycleController<D>,
    coordinator: UpdateCoordinator<N>,
    updates: Option<oneshot::Receiver<W>>,
    mut shutdown: ShutdownSignal,
) -> Result<InstanceExit, StartupError>
where
    D: HostDocument,
    N: Navigator,
    W: WaitingVersion,
{
    let update = async move {
        let Some(subscription) = updates else {
            return std::future::pending::<ReloadInitiated>().await;
        };
        match coordinator.listen(subscription).await {
            Some(reload) => reload,
            None => std::future::pending::<ReloadInitiated>().await,
        }
    };

    tokio::select! {
        biased;

        () = shutdown.recv() => {
            tracing::info!("Instance received shutdown signal");
            controller.unload()?;
            Ok(InstanceExit::Shutdown)
        }
        reload = update => Ok(InstanceExit::Reload(reload)),
    }
}

/// Start the update watcher if updates are enabled and registration succeeds.
fn subscribe_updates(
    config: &ShellConfig,
    slot: &VersionSlot,
) -> Option<(WatchGuard, oneshot::Receiver<PendingVersion>)> {
    let registration = match Registration::resolve(&config.update) {
        Ok(r) => r,
        Err(RegistrationError::Disabled) => {
            tracing::info!("Update detection disabled");
            return None;
        }
        Err(e) => {
            tracing::error!(error = %e, "Update worker registration failed");
            return None;
        }
    };

    tracing::info!(
        script = %registration.script_url(),
        scope = %registration.scope(),
        localhost = registration.is_localhost(),
        "Update worker registered"
    );

    let (watcher, subscription) = VersionWatcher::new(
        Path::new(&config.update.manifest_path),
        slot.clone(),
        Duration::from_secs(config.update.poll_interval_secs),
    );
    Some((watcher.run(), subscription))
}

/// Boot one instance from configuration.
///
/// `first_install` marks the very first instance of the process, whose
/// version has just been cached.
pub async fn boot<D, N>(
    config: &ShellConfig,
    document: D,
    slot: &VersionSlot,
    navigator: N,
    shutdown: ShutdownSignal,
    first_install: bool,
) -> Result<InstanceExit, StartupError>
where
    D: HostDocument,
    N: Navigator,
{
    let app = AppFactory::named(config.mount.app_name.clone());
    let mut controller = LifecycleController::from_config(document, app, config);
    controller.load()?;

    let coordinator = UpdateCoordinator::new(navigator);
    let watch = subscribe_updates(config, slot);
    if first_install && watch.is_some() {
        coordinator.on_ready(&slot.current().version);
    }
    let (_guard, updates) = match watch {
        Some((guard, subscription)) => (Some(guard), Some(subscription)),
        None => (None, None),
    };

    await_exit(&mut controller, coordinator, updates, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{InMemoryDocument, RecordingNavigator};
    use crate::lifecycle::Shutdown;
    use crate::update::BuildManifest;

    #[tokio::test]
    async fn test_boot_fails_without_attachment_point() {
        let shutdown = Shutdown::new();
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let result = boot(
            &ShellConfig::default(),
            InMemoryDocument::new(),
            &slot,
            RecordingNavigator::new(),
            shutdown.subscribe(),
            true,
        )
        .await;
        assert!(matches!(
            result,
            Err(StartupError::Lifecycle(LifecycleError::AttachmentPointMissing { .. }))
        ));
    }

    #[tokio::test]
    async fn test_shutdown_unmounts() {
        let shutdown = Shutdown::new();
        let mut controller = LifecycleController::new(
            InMemoryDocument::with_element("root"),
            "root",
            AppFactory::named("App"),
        );
        let coordinator = UpdateCoordinator::new(RecordingNavigator::new());
        let rx = shutdown.subscribe();
        shutdown.trigger();

        let exit = run_instance::<_, _, PendingVersion>(&mut controller, coordinator, None, rx)
            .await
            .unwrap();
        assert!(matches!(exit, InstanceExit::Shutdown));
        assert!(!controller.is_mounted());
        assert_eq!(controller.document().mounted_count(), 0);
    }
}
