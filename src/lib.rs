//! Application shell: mount lifecycle and update coordination.

pub mod config;
pub mod host;
pub mod lifecycle;
pub mod observability;
pub mod ui;
pub mod update;

pub use config::schema::ShellConfig;
pub use lifecycle::{LifecycleController, LifecycleError, Shutdown};
pub use update::UpdateCoordinator;
