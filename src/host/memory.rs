//! In-process host document and navigator.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::host::{AttachmentPoint, HostDocument, Navigator, SubtreeId};
use crate::ui::library::{apply_unit, LibraryUnit, SymbolRegistry};
use crate::ui::UiNode;

/// Observable document mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    LibraryInstalled(String),
    Attached { point: String, subtree: SubtreeId },
    Detached { point: String, subtree: SubtreeId },
}

/// A document held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    elements: HashSet<String>,
    globals: SymbolRegistry,
    mounted: BTreeMap<SubtreeId, (AttachmentPoint, UiNode)>,
    journal: Vec<DocumentEvent>,
    next_subtree: u64,
}

impl InMemoryDocument {
    /// Empty document with no elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document containing a single element with the given id.
    pub fn with_element(id: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.add_element(id);
        doc
    }

    pub fn add_element(&mut self, id: impl Into<String>) {
        self.elements.insert(id.into());
    }

    /// Number of subtrees currently attached anywhere in the document.
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Trees currently attached, in attach order.
    pub fn mounted_trees(&self) -> impl Iterator<Item = (&AttachmentPoint, &UiNode)> {
        self.mounted.values().map(|(point, tree)| (point, tree))
    }

    pub fn globals(&self) -> &SymbolRegistry {
        &self.globals
    }

    pub fn journal(&self) -> &[DocumentEvent] {
        &self.journal
    }
}

impl HostDocument for InMemoryDocument {
    fn find_attachment_point(&self, id: &str) -> Option<AttachmentPoint> {
        self.elements.contains(id).then(|| AttachmentPoint::new(id))
    }

    fn globals_mut(&mut self) -> &mut SymbolRegistry {
        &mut self.globals
    }

    fn install_library(&mut self, unit: &dyn LibraryUnit) {
        apply_unit(unit, &mut self.globals);
        self.journal
            .push(DocumentEvent::LibraryInstalled(unit.name().to_string()));
    }

    fn attach(&mut self, point: &AttachmentPoint, tree: UiNode) -> SubtreeId {
        self.next_subtree += 1;
        let subtree = SubtreeId(self.next_subtree);
        self.mounted.insert(subtree, (point.clone(), tree));
        self.journal.push(DocumentEvent::Attached {
            point: point.id().to_string(),
            subtree,
        });
        subtree
    }

    fn detach(&mut self, point: &AttachmentPoint, subtree: SubtreeId) -> Option<UiNode> {
        match self.mounted.remove(&subtree) {
            Some((attached_at, tree)) if &attached_at == point => {
                self.journal.push(DocumentEvent::Detached {
                    point: point.id().to_string(),
                    subtree,
                });
                Some(tree)
            }
            Some(entry) => {
                // Wrong attachment point: leave it mounted.
                self.mounted.insert(subtree, entry);
                None
            }
            None => None,
        }
    }
}

/// Navigator that records hard reload requests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    reloads: Arc<AtomicUsize>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hard reloads requested through any clone.
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn hard_reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Hard reload requested");
    }
}
