//! Application mount lifecycle.
//!
//! # States
//! - Unmounted: no UI tree attached
//! - Mounted: exactly one UI tree attached, tracked by a `MountHandle`
//!
//! # State Transitions
//! ```text
//! Unmounted → Mounted:   load()
//! Mounted   → Unmounted: unload()
//! Mounted   → Mounted:   reload() (unload, then load, no interleaving)
//! ```
//!
//! # Design Decisions
//! - The attachment point is resolved before anything touches the
//!   document, so a failed load leaves the document unchanged
//! - Libraries are installed in manifest order on every load
//! - Operations take `&mut self`; nothing can run between the two halves
//!   of a reload

use crate::config::ShellConfig;
use crate::host::HostDocument;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::mount::MountHandle;
use crate::observability::metrics;
use crate::ui::{build_root_tree, AppFactory, LibraryManifest, RoutingBoundary};

/// Owner of the single application mount.
#[derive(Debug)]
pub struct LifecycleController<D: HostDocument> {
    document: D,
    attachment_id: String,
    app: AppFactory,
    manifest: LibraryManifest,
    routing: RoutingBoundary,
    strict_mode: bool,
    mount: Option<MountHandle>,
}

impl<D: HostDocument> LifecycleController<D> {
    /// Create a controller mounting `app` at the element with id `attachment_id`.
    pub fn new(document: D, attachment_id: impl Into<String>, app: AppFactory) -> Self {
        Self {
            document,
            attachment_id: attachment_id.into(),
            app,
            manifest: LibraryManifest::new(),
            routing: RoutingBoundary::default(),
            strict_mode: true,
            mount: None,
        }
    }

    /// Create a controller from the shell configuration.
    pub fn from_config(document: D, app: AppFactory, config: &ShellConfig) -> Self {
        Self::new(document, config.mount.attachment_point.clone(), app)
            .with_manifest(LibraryManifest::from_config(&config.libraries))
            .with_routing(RoutingBoundary::from_config(&config.routing))
            .with_strict_mode(config.mount.strict_mode)
    }

    pub fn with_manifest(mut self, manifest: LibraryManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_routing(mut self, routing: RoutingBoundary) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Mount the application.
    pub fn load(&mut self) -> Result<(), LifecycleError> {
        if let Some(mount) = &self.mount {
            return Err(LifecycleError::AlreadyMounted { mount_id: mount.id() });
        }

        let point = self
            .document
            .find_attachment_point(&self.attachment_id)
            .ok_or_else(|| LifecycleError::AttachmentPointMissing {
                id: self.attachment_id.clone(),
            })?;

        self.document.globals_mut().begin_pass();
        for unit in self.manifest.units() {
            tracing::debug!(library = unit.name(), "Installing library");
            self.document.install_library(unit);
        }

        let tree = build_root_tree(&self.app, &self.manifest, &self.routing, self.strict_mode);
        let subtree = self.document.attach(&point, tree);
        let mount = MountHandle::new(point, subtree);

        tracing::info!(
            mount_id = %mount.id(),
            attachment_point = %mount.point(),
            libraries = self.manifest.len(),
            "Application mounted"
        );
        metrics::record_mount();

        self.mount = Some(mount);
        Ok(())
    }

    /// Unmount the application.
    pub fn unload(&mut self) -> Result<(), LifecycleError> {
        let mount = self.mount.take().ok_or(LifecycleError::NotMounted)?;

        if self.document.detach(mount.point(), mount.subtree()).is_none() {
            tracing::warn!(
                mount_id = %mount.id(),
                subtree = mount.subtree().0,
                "Subtree was already gone from the document"
            );
        }

        tracing::info!(
            mount_id = %mount.id(),
            uptime_ms = mount.age().as_millis() as u64,
            "Application unmounted"
        );
        metrics::record_unmount();
        Ok(())
    }

    /// Tear down the current mount and build a fresh one.
    pub fn reload(&mut self) -> Result<(), LifecycleError> {
        self.unload()?;
        self.load()
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// The live mount, if any.
    pub fn mount(&self) -> Option<&MountHandle> {
        self.mount.as_ref()
    }

    pub fn document(&self) -> &D {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{DocumentEvent, InMemoryDocument};
    use crate::ui::IconLibrary;

    fn controller(doc: InMemoryDocument) -> LifecycleController<InMemoryDocument> {
        LifecycleController::new(doc, "root", AppFactory::named("App"))
    }

    #[test]
    fn test_load_unload_cycle() {
        let mut ctl = controller(InMemoryDocument::with_element("root"));
        let mut seen = Vec::new();

        for _ in 0..3 {
            ctl.load().unwrap();
            assert_eq!(ctl.document().mounted_count(), 1);
            let id = ctl.mount().unwrap().id();
            assert!(!seen.contains(&id));
            seen.push(id);

            ctl.unload().unwrap();
            assert!(!ctl.is_mounted());
            assert_eq!(ctl.document().mounted_count(), 0);
        }
    }

    #[test]
    fn test_double_load_is_rejected() {
        let mut ctl = controller(InMemoryDocument::with_element("root"));
        ctl.load().unwrap();
        let first = ctl.mount().unwrap().id();

        let err = ctl.load().unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyMounted { mount_id } if mount_id == first));
        assert!(err.is_misuse());
        assert_eq!(ctl.document().mounted_count(), 1);
        assert_eq!(ctl.mount().unwrap().id(), first);
    }

    #[test]
    fn test_unload_without_load() {
        let mut ctl = controller(InMemoryDocument::with_element("root"));
        assert!(matches!(ctl.unload(), Err(LifecycleError::NotMounted)));
        assert!(matches!(ctl.reload(), Err(LifecycleError::NotMounted)));
        assert!(ctl.document().journal().is_empty());
    }

    #[test]
    fn test_missing_attachment_point_leaves_document_untouched() {
        let manifest = LibraryManifest::new().with(IconLibrary::new("icons").with_symbol("home", "h"));
        let mut ctl = controller(InMemoryDocument::with_element("app")).with_manifest(manifest);

        let err = ctl.load().unwrap_err();
        assert!(matches!(err, LifecycleError::AttachmentPointMissing { ref id } if id == "root"));
        assert!(!err.is_misuse());
        assert!(!ctl.is_mounted());
        assert!(ctl.document().journal().is_empty());
        assert!(ctl.document().globals().is_empty());
    }

    #[test]
    fn test_reload_detaches_before_attaching() {
        let mut ctl = controller(InMemoryDocument::with_element("root"));
        ctl.load().unwrap();
        let before = ctl.mount().unwrap().id();

        ctl.reload().unwrap();
        let after = ctl.mount().unwrap().id();
        assert_ne!(before, after);
        assert_eq!(ctl.document().mounted_count(), 1);

        let journal = ctl.document().journal();
        assert!(matches!(journal[1], DocumentEvent::Detached { .. }));
        assert!(matches!(journal[2], DocumentEvent::Attached { .. }));
    }

    #[test]
    fn test_libraries_installed_before_attach() {
        let manifest = LibraryManifest::new()
            .with(IconLibrary::new("solid"))
            .with(IconLibrary::new("brands"));
        let mut ctl = controller(InMemoryDocument::with_element("root")).with_manifest(manifest);
        ctl.load().unwrap();

        let journal = ctl.document().journal();
        assert_eq!(journal[0], DocumentEvent::LibraryInstalled("solid".into()));
        assert_eq!(journal[1], DocumentEvent::LibraryInstalled("brands".into()));
        assert!(matches!(journal[2], DocumentEvent::Attached { .. }));
    }

    #[test]
    fn test_repeated_reloads_keep_one_application_pass() {
        let manifest = LibraryManifest::new()
            .with(IconLibrary::new("solid"))
            .with(IconLibrary::new("brands"));
        let mut ctl = controller(InMemoryDocument::with_element("root")).with_manifest(manifest);
        ctl.load().unwrap();
        for _ in 0..50 {
            ctl.reload().unwrap();
        }

        let globals = ctl.document().globals();
        assert_eq!(globals.passes(), 51);
        assert_eq!(globals.applied(), ["solid", "brands"]);
    }

    #[test]
    fn test_from_config() {
        let mut config = ShellConfig::default();
        config.mount.attachment_point = "shell".into();
        config.mount.strict_mode = false;
        config.routing.base_path = "/app".into();

        let mut ctl = LifecycleController::from_config(
            InMemoryDocument::with_element("shell"),
            AppFactory::named("Dashboard"),
            &config,
        );
        ctl.load().unwrap();

        let (point, tree) = ctl.document().mounted_trees().next().unwrap();
        assert_eq!(point.id(), "shell");
        assert!(!tree.is_strict());
        assert_eq!(tree.router().unwrap().base_path(), "/app/");
        assert_eq!(tree.app().unwrap().0, "Dashboard");
    }
}
