//! Presentation library manifest.
//!
//! # Responsibilities
//! - Describe third-party presentation libraries as initialization units
//! - Apply units to the host's global symbol registry in manifest order
//!
//! # Design Decisions
//! - Registration order = manifest order
//! - Symbol collisions resolve last-writer-wins, so the outcome is a pure
//!   function of the manifest order
//! - The manifest is static input; applying a unit cannot fail

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::config::LibraryConfig;

/// An initialization unit that registers global symbols.
pub trait LibraryUnit: Send + Sync + fmt::Debug {
    /// Library name for logging.
    fn name(&self) -> &str;

    /// Register this library's symbols.
    fn apply(&self, registry: &mut SymbolRegistry);
}

/// Global symbols registered by presentation libraries.
#[derive(Debug, Default, Clone)]
pub struct SymbolRegistry {
    /// symbol -> (owning library, definition)
    symbols: HashMap<String, (String, String)>,
    /// Library names applied during the most recent pass, in order.
    applied: Vec<String>,
    /// Number of application passes started.
    passes: u64,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol, replacing any earlier registration.
    pub fn register(&mut self, library: &str, symbol: &str, definition: &str) {
        let prev = self.symbols.insert(
            symbol.to_string(),
            (library.to_string(), definition.to_string()),
        );
        if let Some((owner, _)) = prev {
            if owner != library {
                tracing::debug!(symbol, previous = %owner, library, "Symbol overridden");
            }
        }
    }

    /// Library that currently owns `symbol`.
    pub fn owner(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(|(owner, _)| owner.as_str())
    }

    /// Current definition of `symbol`.
    pub fn definition(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(|(_, def)| def.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Start a new application pass; only the latest pass is recorded.
    pub fn begin_pass(&mut self) {
        self.applied.clear();
        self.passes += 1;
    }

    /// Library names applied in the latest pass, in order.
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    fn mark_applied(&mut self, library: &str) {
        self.applied.push(library.to_string());
    }
}

/// Icon pack style library: a fixed table of symbols.
#[derive(Debug, Clone)]
pub struct IconLibrary {
    name: String,
    symbols: BTreeMap<String, String>,
}

impl IconLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: BTreeMap::new(),
        }
    }

    /// Add a symbol definition (builder style).
    pub fn with_symbol(mut self, symbol: impl Into<String>, definition: impl Into<String>) -> Self {
        self.symbols.insert(symbol.into(), definition.into());
        self
    }
}

impl From<&LibraryConfig> for IconLibrary {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            name: config.name.clone(),
            symbols: config.symbols.clone(),
        }
    }
}

impl LibraryUnit for IconLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, registry: &mut SymbolRegistry) {
        for (symbol, definition) in &self.symbols {
            registry.register(&self.name, symbol, definition);
        }
    }
}

/// Ordered sequence of library units.
#[derive(Debug, Clone, Default)]
pub struct LibraryManifest {
    units: Vec<Arc<dyn LibraryUnit>>,
}

impl LibraryManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from configured libraries, preserving file order.
    pub fn from_config(configs: &[LibraryConfig]) -> Self {
        let units = configs
            .iter()
            .map(|c| Arc::new(IconLibrary::from(c)) as Arc<dyn LibraryUnit>)
            .collect();
        Self { units }
    }

    /// Append a unit; it is applied after every unit already present.
    pub fn push(&mut self, unit: Arc<dyn LibraryUnit>) {
        self.units.push(unit);
    }

    pub fn with(mut self, unit: impl LibraryUnit + 'static) -> Self {
        self.push(Arc::new(unit));
        self
    }

    pub fn units(&self) -> impl Iterator<Item = &(dyn LibraryUnit + 'static)> {
        self.units.iter().map(|u| u.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.units.iter().map(|u| u.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Apply a unit and record it in the registry's application log.
pub fn apply_unit(unit: &dyn LibraryUnit, registry: &mut SymbolRegistry) {
    unit.apply(registry);
    registry.mark_applied(unit.name());
}
