//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ShellConfig (validated, immutable)
//!     → handed to the startup routine of each instance
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the lifetime of an instance; a hard reload
//!   starts a new instance which reads it again
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::LibraryConfig;
pub use schema::MountConfig;
pub use schema::ObservabilityConfig;
pub use schema::RoutingConfig;
pub use schema::ShellConfig;
pub use schema::UpdateConfig;
