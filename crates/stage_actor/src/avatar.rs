//! Character avatars
//!
//! An avatar is a small portrait shown next to dialogue. [`AvatarRegistry`]
//! maps actor IDs to avatar resource paths; [`AvatarCatalog`] answers whether
//! a path can be loaded at all.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// Source of truth for which avatar resources exist
pub trait AvatarCatalog: Send + Sync + 'static {
    /// Whether an avatar resource exists at `path`
    fn avatar_exists(&self, path: &str) -> bool;
}

/// Catalog backed by a fixed set of paths
#[derive(Debug, Default)]
pub struct StaticAvatarCatalog {
    paths: RwLock<HashSet<String>>,
}

impl StaticAvatarCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path
    pub fn with_avatar(self, path: impl Into<String>) -> Self {
        self.add(path);
        self
    }

    /// Add a path
    pub fn add(&self, path: impl Into<String>) {
        self.paths.write().insert(path.into());
    }
}

impl<S: Into<String>> FromIterator<S> for StaticAvatarCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: RwLock::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}

impl AvatarCatalog for StaticAvatarCatalog {
    fn avatar_exists(&self, path: &str) -> bool {
        self.paths.read().contains(path)
    }
}

/// Actor ID -> avatar path, at most one entry per actor
#[derive(Debug, Default)]
pub struct AvatarRegistry {
    avatars: RwLock<HashMap<String, String>>,
}

impl AvatarRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Avatar path assigned to `actor_id`
    pub fn get(&self, actor_id: &str) -> Option<String> {
        self.avatars.read().get(actor_id).cloned()
    }

    /// Assign `path`, returning the previous assignment
    pub fn set(&self, actor_id: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.avatars.write().insert(actor_id.into(), path.into())
    }

    /// Remove the assignment, returning it
    pub fn remove(&self, actor_id: &str) -> Option<String> {
        self.avatars.write().remove(actor_id)
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        self.avatars.read().len()
    }

    /// Check if nothing is assigned
    pub fn is_empty(&self) -> bool {
        self.avatars.read().is_empty()
    }

    /// Copy of every assignment
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.avatars.read().clone()
    }
}
