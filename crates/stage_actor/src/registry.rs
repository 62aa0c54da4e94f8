//! Actor registry
//!
//! Owns every live actor and hands out [`ActorLease`]s. A lease holds the
//! actor's exclusion lock, so two commands targeting the same actor run one
//! after the other while commands on different actors proceed in parallel.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use stage_core::ActorKind;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::actor::Actor;
use crate::error::{ActorError, ActorResult};

struct ActorEntry {
    actor: Arc<dyn Actor>,
    lock: Arc<Mutex<()>>,
}

/// Exclusive access to one actor for the lifetime of the lease
pub struct ActorLease {
    actor: Arc<dyn Actor>,
    _guard: OwnedMutexGuard<()>,
}

impl ActorLease {
    /// Shared handle to the leased actor
    pub fn actor(&self) -> &Arc<dyn Actor> {
        &self.actor
    }
}

impl Deref for ActorLease {
    type Target = dyn Actor;

    fn deref(&self) -> &Self::Target {
        self.actor.as_ref()
    }
}

impl fmt::Debug for ActorLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorLease")
            .field("actor", &self.actor.id())
            .finish()
    }
}

/// Registry of live actors keyed by ID
#[derive(Default)]
pub struct ActorRegistry {
    actors: RwLock<HashMap<String, ActorEntry>>,
}

impl ActorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor
    pub fn register(&self, actor: Arc<dyn Actor>) -> ActorResult<()> {
        let id = actor.id().to_string();
        let mut actors = self.actors.write();
        if actors.contains_key(&id) {
            return Err(ActorError::AlreadyExists(id));
        }

        log::debug!("Registered {} actor {}", actor.kind(), id);
        actors.insert(
            id,
            ActorEntry {
                actor,
                lock: Arc::new(Mutex::new(())),
            },
        );
        Ok(())
    }

    /// Remove an actor
    ///
    /// Commands already holding a lease keep their handle until they finish.
    pub fn remove(&self, id: &str) -> ActorResult<Arc<dyn Actor>> {
        let entry = self
            .actors
            .write()
            .remove(id)
            .ok_or_else(|| ActorError::NotFound(id.to_string()))?;
        log::debug!("Removed actor {}", id);
        Ok(entry.actor)
    }

    fn entry(&self, id: &str) -> Option<(Arc<dyn Actor>, Arc<Mutex<()>>)> {
        self.actors
            .read()
            .get(id)
            .map(|e| (e.actor.clone(), e.lock.clone()))
    }

    /// Wait for exclusive access to an actor
    pub async fn resolve(&self, id: &str) -> ActorResult<ActorLease> {
        let (actor, lock) = self
            .entry(id)
            .ok_or_else(|| ActorError::NotFound(id.to_string()))?;
        let guard = lock.lock_owned().await;
        Ok(ActorLease {
            actor,
            _guard: guard,
        })
    }

    /// Exclusive access without waiting; `None` if unknown or busy
    pub fn try_resolve(&self, id: &str) -> Option<ActorLease> {
        let (actor, lock) = self.entry(id)?;
        let guard = lock.try_lock_owned().ok()?;
        Some(ActorLease {
            actor,
            _guard: guard,
        })
    }

    /// Read-only handle, ignoring any lease
    pub fn get(&self, id: &str) -> Option<Arc<dyn Actor>> {
        self.actors.read().get(id).map(|e| e.actor.clone())
    }

    /// Check if an actor exists
    pub fn contains(&self, id: &str) -> bool {
        self.actors.read().contains_key(id)
    }

    /// All actor IDs, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.actors.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Visible actors of `kind`, sorted by ID
    pub fn visible_of_kind(&self, kind: ActorKind) -> Vec<Arc<dyn Actor>> {
        let mut actors: Vec<Arc<dyn Actor>> = self
            .actors
            .read()
            .values()
            .filter(|e| e.actor.kind() == kind && e.actor.is_visible())
            .map(|e| e.actor.clone())
            .collect();
        actors.sort_by(|a, b| a.id().cmp(b.id()));
        actors
    }

    /// Number of actors
    pub fn len(&self) -> usize {
        self.actors.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.actors.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::create_sprite_actor;
    use stage_services::ActorMetadata;

    fn registry_with(ids: &[&str]) -> ActorRegistry {
        let registry = ActorRegistry::new();
        for id in ids {
            registry
                .register(create_sprite_actor(*id, ActorMetadata::default()))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_register_and_remove() {
        let registry = registry_with(&["Sora", "Kohaku"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["Kohaku".to_string(), "Sora".to_string()]);

        let err = registry
            .register(create_sprite_actor("Sora", ActorMetadata::default()))
            .unwrap_err();
        assert_eq!(err, ActorError::AlreadyExists("Sora".to_string()));

        registry.remove("Sora").unwrap();
        assert!(!registry.contains("Sora"));
        assert_eq!(
            registry.remove("Sora").err().unwrap(),
            ActorError::NotFound("Sora".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown() {
        let registry = ActorRegistry::new();
        let err = registry.resolve("Nobody").await.unwrap_err();
        assert_eq!(err, ActorError::NotFound("Nobody".to_string()));
    }

    #[tokio::test]
    async fn test_lease_is_exclusive() {
        let registry = registry_with(&["Sora", "Kohaku"]);

        let lease = registry.resolve("Sora").await.unwrap();
        assert_eq!(lease.id(), "Sora");
        assert!(registry.try_resolve("Sora").is_none());
        assert!(registry.try_resolve("Kohaku").is_some());

        drop(lease);
        assert!(registry.try_resolve("Sora").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_waits_for_release() {
        let registry = Arc::new(registry_with(&["Sora"]));
        let lease = registry.resolve("Sora").await.unwrap();

        let waiter = registry.clone();
        let handle = tokio::spawn(async move { waiter.resolve("Sora").await.map(|l| l.id().to_string()) });

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(!handle.is_finished());

        drop(lease);
        assert_eq!(handle.await.unwrap().unwrap(), "Sora");
    }
}
