//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use app_shell::host::memory::InMemoryDocument;
use app_shell::host::{ActivationError, Navigator, WaitingVersion};
use app_shell::lifecycle::LifecycleController;
use app_shell::ui::{AppFactory, LibraryManifest};
use app_shell::update::ControlMessage;

/// Ordered record of externally visible actions.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Navigator that appends `reload` to the log.
pub struct LogNavigator(pub EventLog);

impl Navigator for LogNavigator {
    fn hard_reload(&self) {
        self.0.push("reload");
    }
}

/// Waiting version that logs every message it receives.
pub struct LogWaiting {
    pub log: EventLog,
    pub version: String,
    pub fail: bool,
}

impl LogWaiting {
    pub fn new(log: &EventLog, version: &str) -> Self {
        Self {
            log: log.clone(),
            version: version.to_string(),
            fail: false,
        }
    }

    pub fn failing(log: &EventLog, version: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(log, version)
        }
    }
}

impl WaitingVersion for LogWaiting {
    fn version(&self) -> &str {
        &self.version
    }

    fn post_message(&self, message: &ControlMessage) -> Result<(), ActivationError> {
        self.log.push(format!("activate:{}", message.encode()?));
        if self.fail {
            Err(ActivationError::Gone)
        } else {
            Ok(())
        }
    }
}

/// Controller over a document that contains `#root`.
pub fn controller_with(manifest: LibraryManifest) -> LifecycleController<InMemoryDocument> {
    LifecycleController::new(
        InMemoryDocument::with_element("root"),
        "root",
        AppFactory::named("App"),
    )
    .with_manifest(manifest)
}
