//! Update coordination state machine.
//!
//! # States
//! - Idle: waiting for the update collaborator (may last forever)
//! - UpdateDetected: a waiting version was delivered
//! - ActivationSent: SKIP_WAITING was posted (successfully or not)
//! - Reloading: hard reload initiated; the instance ends here
//!
//! # State Transitions
//! ```text
//! Idle → UpdateDetected → ActivationSent → Reloading
//! ```
//!
//! # Design Decisions
//! - Activation is best effort; the reload is unconditional
//! - Activation is always attempted before the reload starts
//! - Uses a hard navigation reload, never an in-place remount, so
//!   cached static assets are refreshed too
//! - `on_update_available` consumes the coordinator: one traversal per instance

use tokio::sync::oneshot;

use crate::host::{Navigator, WaitingVersion};
use crate::observability::metrics;
use crate::update::message::ControlMessage;

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    UpdateDetected,
    ActivationSent,
    Reloading,
}

/// Proof that a hard reload was initiated.
#[derive(Debug)]
#[must_use]
pub struct ReloadInitiated {
    /// Version that was asked to activate.
    pub version: String,
    /// Whether the activation message was delivered.
    pub activated: bool,
    /// States visited, in order.
    pub transitions: Vec<CoordinatorState>,
}

/// Bridges update notifications into activation followed by a hard reload.
#[derive(Debug)]
pub struct UpdateCoordinator<N: Navigator> {
    navigator: N,
    state: CoordinatorState,
    transitions: Vec<CoordinatorState>,
}

impl<N: Navigator> UpdateCoordinator<N> {
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            state: CoordinatorState::Idle,
            transitions: vec![CoordinatorState::Idle],
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// First install finished: the current version is cached for offline use.
    pub fn on_ready(&self, version: &str) {
        tracing::info!(version, "Content is cached for offline use");
    }

    /// Wait for the single update notification and handle it.
    ///
    /// Returns `None` if the collaborator went away without signalling; the
    /// coordinator then simply stays idle.
    pub async fn listen<W: WaitingVersion>(
        self,
        subscription: oneshot::Receiver<W>,
    ) -> Option<ReloadInitiated> {
        match subscription.await {
            Ok(waiting) => Some(self.on_update_available(&waiting)),
            Err(_) => {
                tracing::debug!("Update detector closed without signalling, staying idle");
                None
            }
        }
    }

    /// Activate the waiting version, then force a hard reload.
    pub fn on_update_available<W: WaitingVersion + ?Sized>(mut self, waiting: &W) -> ReloadInitiated {
        let version = waiting.version().to_string();
        self.transition(CoordinatorState::UpdateDetected);
        tracing::info!(version = %version, "New version available");

        let activated = match waiting.post_message(&ControlMessage::SkipWaiting) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(version = %version, error = %e, "Activation failed, reloading anyway");
                false
            }
        };
        metrics::record_activation(activated);
        self.transition(CoordinatorState::ActivationSent);

        self.transition(CoordinatorState::Reloading);
        metrics::record_hard_reload();
        tracing::info!(version = %version, activated, "Forcing hard reload");
        self.navigator.hard_reload();

        ReloadInitiated {
            version,
            activated,
            transitions: self.transitions,
        }
    }

    fn transition(&mut self, next: CoordinatorState) {
        tracing::debug!(from = ?self.state, to = ?next, "Coordinator transition");
        self.state = next;
        self.transitions.push(next);
    }
}
