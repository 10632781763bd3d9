//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build controller → load() → register updates → wait
//!
//! Controller (controller.rs):
//!     load:   resolve attachment point → install libraries → attach tree
//!     unload: detach tree → drop MountHandle
//!     reload: unload → load
//!
//! Exit:
//!     update coordinator → hard reload → InstanceExit::Reload
//!     signals.rs (SIGTERM/SIGINT) → shutdown.rs → unload → InstanceExit::Shutdown
//! ```
//!
//! # Design Decisions
//! - No global controller: startup code owns it and passes it down
//! - Misuse errors (AlreadyMounted, NotMounted) are returned, never ignored

pub mod controller;
pub mod error;
pub mod mount;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use controller::LifecycleController;
pub use error::LifecycleError;
pub use mount::MountHandle;
pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{InstanceExit, StartupError};
