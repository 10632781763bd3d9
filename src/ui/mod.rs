//! UI tree construction.
//!
//! # Data Flow
//! ```text
//! LifecycleController::load
//!     → library.rs (apply LibraryManifest to host globals, in order)
//!     → build_root_tree:
//!           StrictMode
//!             └─ Bootstrapper(libraries)
//!                  └─ Router(hash, routing.rs)
//!                       └─ App component (opaque factory)
//!     → attached to the document by the host
//! ```
//!
//! # Design Decisions
//! - The tree is rebuilt from the factory on every load, never reused
//! - Boundaries are data; rendering belongs to the host

pub mod library;
pub mod routing;

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

pub use library::{IconLibrary, LibraryManifest, LibraryUnit, SymbolRegistry};
pub use routing::RoutingBoundary;

/// A node of the constructed UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiNode {
    /// Development assertions boundary.
    StrictMode(Box<UiNode>),
    /// Marks the subtree as rendered after the listed libraries were applied.
    Bootstrapper {
        libraries: Vec<String>,
        child: Box<UiNode>,
    },
    /// Hash routing boundary.
    Router {
        boundary: RoutingBoundary,
        child: Box<UiNode>,
    },
    /// Opaque application component.
    Component { name: String, instance: Uuid },
}

impl UiNode {
    /// Build a fresh component node with a new instance id.
    pub fn component(name: impl Into<String>) -> Self {
        UiNode::Component {
            name: name.into(),
            instance: Uuid::new_v4(),
        }
    }

    /// The innermost application component, if any.
    pub fn app(&self) -> Option<(&str, Uuid)> {
        match self {
            UiNode::StrictMode(child)
            | UiNode::Bootstrapper { child, .. }
            | UiNode::Router { child, .. } => child.app(),
            UiNode::Component { name, instance } => Some((name.as_str(), *instance)),
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, UiNode::StrictMode(_))
    }

    /// Routing boundary wrapping the component, if present.
    pub fn router(&self) -> Option<&RoutingBoundary> {
        match self {
            UiNode::StrictMode(child) | UiNode::Bootstrapper { child, .. } => child.router(),
            UiNode::Router { boundary, .. } => Some(boundary),
            UiNode::Component { .. } => None,
        }
    }
}

/// Builds the root application component.
#[derive(Clone)]
pub struct AppFactory {
    build: Arc<dyn Fn() -> UiNode + Send + Sync>,
}

impl AppFactory {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> UiNode + Send + Sync + 'static,
    {
        Self { build: Arc::new(build) }
    }

    /// Factory producing a named component with a fresh instance id per call.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move || UiNode::component(name.clone()))
    }

    pub fn build(&self) -> UiNode {
        (self.build)()
    }
}

impl fmt::Debug for AppFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppFactory").finish_non_exhaustive()
    }
}

/// Assemble the full tree around a freshly built application component.
pub fn build_root_tree(
    app: &AppFactory,
    manifest: &LibraryManifest,
    routing: &RoutingBoundary,
    strict_mode: bool,
) -> UiNode {
    let routed = UiNode::Router {
        boundary: routing.clone(),
        child: Box::new(app.build()),
    };
    let bootstrapped = UiNode::Bootstrapper {
        libraries: manifest.names(),
        child: Box::new(routed),
    };
    if strict_mode {
        UiNode::StrictMode(Box::new(bootstrapped))
    } else {
        bootstrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_shape() {
        let manifest = LibraryManifest::new().with(IconLibrary::new("icons"));
        let tree = build_root_tree(
            &AppFactory::named("App"),
            &manifest,
            &RoutingBoundary::default(),
            true,
        );

        assert!(tree.is_strict());
        assert_eq!(tree.router(), Some(&RoutingBoundary::default()));
        let UiNode::StrictMode(inner) = &tree else { panic!("expected strict root") };
        match inner.as_ref() {
            UiNode::Bootstrapper { libraries, .. } => assert_eq!(libraries, &["icons"]),
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(tree.app().map(|(name, _)| name), Some("App"));
    }

    #[test]
    fn test_each_build_is_fresh() {
        let factory = AppFactory::named("App");
        let manifest = LibraryManifest::new();
        let routing = RoutingBoundary::default();
        let a = build_root_tree(&factory, &manifest, &routing, false);
        let b = build_root_tree(&factory, &manifest, &routing, false);
        assert!(!a.is_strict());
        assert_ne!(a.app().unwrap().1, b.app().unwrap().1);
    }
}
