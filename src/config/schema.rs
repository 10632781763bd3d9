//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the shell.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the application shell.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ShellConfig {
    /// Mount target and application identity.
    pub mount: MountConfig,

    /// Presentation libraries, applied in the order listed.
    pub libraries: Vec<LibraryConfig>,

    /// Routing boundary settings.
    pub routing: RoutingConfig,

    /// Update detection and activation.
    pub update: UpdateConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Mount configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Id of the document element the UI tree attaches to.
    pub attachment_point: String,

    /// Name of the root application component.
    pub app_name: String,

    /// Wrap the tree in a strict-mode boundary (development assertions).
    pub strict_mode: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            attachment_point: "root".to_string(),
            app_name: "App".to_string(),
            strict_mode: true,
        }
    }
}

/// A single presentation library unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Library name for logging.
    pub name: String,

    /// Global symbols this library registers, symbol -> definition.
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

/// Routing boundary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix prepended inside the hash fragment.
    pub base_path: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
        }
    }
}

/// Update detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Enable update detection.
    pub enabled: bool,

    /// Public URL the application is served from.
    pub public_url: String,

    /// Worker script URL, relative to `public_url` or absolute.
    pub script_url: String,

    /// Path of the deployed build manifest to watch.
    pub manifest_path: String,

    /// Poll interval for the file watcher in seconds.
    pub poll_interval_secs: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_url: "http://localhost:3000/".to_string(),
            script_url: "service-worker.js".to_string(),
            manifest_path: "build/manifest.json".to_string(),
            poll_interval_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ShellConfig = toml::from_str("").unwrap();
        assert_eq!(config.mount.attachment_point, "root");
        assert!(config.mount.strict_mode);
        assert!(config.libraries.is_empty());
        assert_eq!(config.update.poll_interval_secs, 2);
    }

    #[test]
    fn test_libraries_keep_file_order() {
        let raw = r#"
            [[libraries]]
            name = "fontawesome"
            symbols = { "fa-home" = "solid" }

            [[libraries]]
            name = "overrides"
            symbols = { "fa-home" = "regular" }
        "#;
        let config: ShellConfig = toml::from_str(raw).unwrap();
        let names: Vec<_> = config.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["fontawesome", "overrides"]);
        assert_eq!(config.libraries[1].symbols["fa-home"], "regular");
    }
}
