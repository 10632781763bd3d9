//! Hash routing boundary.
//!
//! In-app navigation only rewrites the fragment of the current location, so
//! moving between views never contacts the server. The route table itself
//! belongs to the application component.

use crate::config::RoutingConfig;

/// Routing boundary wrapping the application component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingBoundary {
    base_path: String,
}

impl RoutingBoundary {
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self { base_path }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.base_path.clone())
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Link target for an in-app path: always a fragment, never a server path.
    pub fn href(&self, path: &str) -> String {
        format!("#{}{}", self.base_path, path.trim_start_matches('/'))
    }
}

impl Default for RoutingBoundary {
    fn default() -> Self {
        Self::new("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_is_fragment() {
        let router = RoutingBoundary::default();
        assert_eq!(router.href("/settings"), "#/settings");
        assert_eq!(router.href("settings"), "#/settings");
        assert_eq!(router.href(""), "#/");
    }

    #[test]
    fn test_base_path_normalized() {
        let router = RoutingBoundary::new("/app");
        assert_eq!(router.base_path(), "/app/");
        assert_eq!(router.href("/users/1"), "#/app/users/1");
    }
}
