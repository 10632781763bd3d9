//! Lifecycle error taxonomy.

use uuid::Uuid;

/// Errors returned by [`LifecycleController`](super::LifecycleController).
///
/// `AlreadyMounted` and `NotMounted` mean the caller broke the
/// load → unload ordering. They are never retried.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("attachment point `#{id}` not found in document")]
    AttachmentPointMissing { id: String },

    #[error("application is already mounted (mount {mount_id})")]
    AlreadyMounted { mount_id: Uuid },

    #[error("application is not mounted")]
    NotMounted,
}

impl LifecycleError {
    /// True for errors caused by calling operations out of order.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::AlreadyMounted { .. } | Self::NotMounted)
    }
}
