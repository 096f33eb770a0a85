//! Ordered registry of cleaners.

use std::collections::HashSet;

use crate::cleaner::base::{Cleaner, CleanerContext, CleanerKind};

/// Stable reference from a scan result back to the cleaner that produced
/// it: the cleaner's slot in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CleanerHandle(usize);

impl CleanerHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Registry holding cleaners in registration order.
///
/// Cleaners are only ever appended, so a handle stays valid for the
/// registry's lifetime.
#[derive(Default)]
pub struct CleanerRegistry {
    cleaners: Vec<Box<dyn Cleaner>>,
}

impl CleanerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given built-in cleaners, in the order given.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use echo_cleaner::cleaner::{CleanerContext, CleanerKind, CleanerRegistry, SystemRunner};
    ///
    /// let ctx = CleanerContext::new("/home/user", Arc::new(SystemRunner::default()));
    /// let registry = CleanerRegistry::from_kinds(&[CleanerKind::Trash, CleanerKind::Docker], &ctx);
    /// assert_eq!(registry.ids(), vec!["trash", "docker"]);
    /// ```
    pub fn from_kinds(kinds: &[CleanerKind], ctx: &CleanerContext) -> Self {
        let mut seen = HashSet::new();
        let mut registry = Self::new();
        for kind in kinds {
            if seen.insert(*kind) {
                registry.register(kind.build(ctx));
            }
        }
        registry
    }

    /// Create a registry with every built-in cleaner.
    pub fn with_all(ctx: &CleanerContext) -> Self {
        Self::from_kinds(&CleanerKind::ALL, ctx)
    }

    /// Append a cleaner and return its handle.
    pub fn register(&mut self, cleaner: Box<dyn Cleaner>) -> CleanerHandle {
        let handle = CleanerHandle(self.cleaners.len());
        tracing::debug!("Registered cleaner {} as #{}", cleaner.id(), handle.0);
        self.cleaners.push(cleaner);
        handle
    }

    /// Get a cleaner by handle.
    pub fn get(&self, handle: CleanerHandle) -> Option<&dyn Cleaner> {
        self.cleaners.get(handle.0).map(|c| c.as_ref())
    }

    /// Get a cleaner and its handle by ID.
    pub fn get_by_id(&self, id: &str) -> Option<(CleanerHandle, &dyn Cleaner)> {
        self.cleaners
            .iter()
            .enumerate()
            .find(|(_, c)| c.id() == id)
            .map(|(i, c)| (CleanerHandle(i), c.as_ref()))
    }

    /// Cleaners with their handles, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (CleanerHandle, &dyn Cleaner)> {
        self.cleaners
            .iter()
            .enumerate()
            .map(|(i, c)| (CleanerHandle(i), c.as_ref()))
    }

    /// List all cleaner IDs.
    pub fn ids(&self) -> Vec<&str> {
        self.cleaners.iter().map(|c| c.id()).collect()
    }

    /// Get the number of registered cleaners.
    pub fn len(&self) -> usize {
        self.cleaners.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.cleaners.is_empty()
    }
}
