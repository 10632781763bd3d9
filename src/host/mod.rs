//! Host environment seams.
//!
//! # Responsibilities
//! - Resolve the attachment point and attach/detach UI subtrees
//! - Hold the global symbol registry libraries write into
//! - Perform a hard navigation reload
//! - Deliver control messages to a waiting application version
//!
//! # Design Decisions
//! - The lifecycle core only sees these traits; `memory.rs` is the
//!   in-process host used by the binary and the tests
//! - Attach/detach are infallible once the attachment point is resolved,
//!   which keeps `load` atomic

pub mod memory;

use std::fmt;

use crate::ui::library::{apply_unit, LibraryUnit, SymbolRegistry};
use crate::ui::UiNode;
use crate::update::message::ControlMessage;

/// A resolved attachment point in the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentPoint {
    id: String,
}

impl AttachmentPoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Host-assigned identifier of an attached subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubtreeId(pub u64);

/// The document the application renders into.
pub trait HostDocument {
    /// Look up the element with the given id.
    fn find_attachment_point(&self, id: &str) -> Option<AttachmentPoint>;

    /// Global symbols shared by every subtree.
    fn globals_mut(&mut self) -> &mut SymbolRegistry;

    /// Apply a presentation library to the globals.
    fn install_library(&mut self, unit: &dyn LibraryUnit) {
        apply_unit(unit, self.globals_mut());
    }

    /// Attach a UI tree under `point`.
    fn attach(&mut self, point: &AttachmentPoint, tree: UiNode) -> SubtreeId;

    /// Detach a previously attached subtree, returning it if it was present.
    fn detach(&mut self, point: &AttachmentPoint, subtree: SubtreeId) -> Option<UiNode>;
}

/// Page-level navigation.
pub trait Navigator {
    /// Reload the whole application from scratch, refreshing static assets.
    fn hard_reload(&self);
}

/// Failure to deliver a control message to a waiting version.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("version {0} is already active")]
    AlreadyActive(String),

    #[error("waiting version is no longer available")]
    Gone,

    #[error("malformed control message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A detected version held in the waiting state by the update collaborator.
pub trait WaitingVersion {
    /// Version label for logging.
    fn version(&self) -> &str;

    /// Deliver a control message to the waiting version.
    fn post_message(&self, message: &ControlMessage) -> Result<(), ActivationError>;
}
