//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (poll interval > 0, addresses parse)
//! - Detect duplicate library names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ShellConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ShellConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("mount.attachment_point must not be empty")]
    EmptyAttachmentPoint,

    #[error("mount.app_name must not be empty")]
    EmptyAppName,

    #[error("library at position {0} has an empty name")]
    EmptyLibraryName(usize),

    #[error("library `{0}` is listed more than once")]
    DuplicateLibrary(String),

    #[error("routing.base_path `{0}` must start with `/`")]
    RelativeBasePath(String),

    #[error("update.public_url `{0}` is not a valid URL")]
    InvalidPublicUrl(String),

    #[error("update.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ShellConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.mount.attachment_point.trim().is_empty() {
        errors.push(ValidationError::EmptyAttachmentPoint);
    }
    if config.mount.app_name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
    }

    let mut seen = HashSet::new();
    for (i, lib) in config.libraries.iter().enumerate() {
        if lib.name.trim().is_empty() {
            errors.push(ValidationError::EmptyLibraryName(i));
        } else if !seen.insert(lib.name.as_str()) {
            errors.push(ValidationError::DuplicateLibrary(lib.name.clone()));
        }
    }

    if !config.routing.base_path.starts_with('/') {
        errors.push(ValidationError::RelativeBasePath(config.routing.base_path.clone()));
    }

    if config.update.enabled {
        if Url::parse(&config.update.public_url).is_err() {
            errors.push(ValidationError::InvalidPublicUrl(config.update.public_url.clone()));
        }
        if config.update.poll_interval_secs == 0 {
            errors.push(ValidationError::ZeroPollInterval);
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
