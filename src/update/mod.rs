//! Update detection and coordination subsystem.
//!
//! # Data Flow
//! ```text
//! registration.rs (validate worker script URL)
//!     → detector.rs watches the deployed build manifest (notify + periodic poll)
//!     → first differing build held as PendingVersion ("waiting")
//!     → one-shot subscription delivers it
//!     → coordinator.rs:
//!           post SKIP_WAITING (message.rs) → waiting becomes active
//!           → Navigator::hard_reload → instance ends
//! ```
//!
//! # Design Decisions
//! - Exactly one subscriber, subscribed once per instance
//! - The active version lives in an `ArcSwap` shared across instances
//! - The reload never waits on activation succeeding

pub mod coordinator;
pub mod detector;
pub mod message;
pub mod registration;

pub use coordinator::{CoordinatorState, ReloadInitiated, UpdateCoordinator};
pub use detector::{BuildManifest, PendingVersion, VersionSlot, VersionWatcher, WatchGuard};
pub use message::ControlMessage;
pub use registration::{Registration, RegistrationError};
