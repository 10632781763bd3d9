//! The live mount handle.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::host::{AttachmentPoint, SubtreeId};

/// Handle to the UI subtree currently attached to the document.
///
/// Not `Clone`: exactly one exists per live mount and only the controller
/// holds it.
#[derive(Debug)]
pub struct MountHandle {
    id: Uuid,
    point: AttachmentPoint,
    subtree: SubtreeId,
    mounted_at: Instant,
}

impl MountHandle {
    pub(crate) fn new(point: AttachmentPoint, subtree: SubtreeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            point,
            subtree,
            mounted_at: Instant::now(),
        }
    }

    /// Unique id of this mount.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn point(&self) -> &AttachmentPoint {
        &self.point
    }

    pub fn subtree(&self) -> SubtreeId {
        self.subtree
    }

    /// Time since the subtree was attached.
    pub fn age(&self) -> Duration {
        self.mounted_at.elapsed()
    }
}
