//! Actor manager service
//!
//! Ties the actor registry, the avatar registry and the actor configuration
//! together behind the [`Service`] lifecycle, and implements auto-arrange.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use stage_core::{ActorKind, CancellationToken, EasingType, LookDirection, TransitionOutcome, Vec3};
use stage_services::{
    ActorMetadata, ActorsConfig, Service, ServiceHealth, ServiceId, ServiceResult, ServiceState,
    ServiceStatus,
};

use crate::actor::Actor;
use crate::avatar::{AvatarCatalog, AvatarRegistry};
use crate::error::ActorResult;
use crate::registry::{ActorLease, ActorRegistry};
use crate::sprite::create_sprite_actor;

/// Actor manager - owns every actor and avatar assignment
pub struct ActorManager {
    id: ServiceId,
    status: ServiceStatus,
    config: ActorsConfig,
    registry: ActorRegistry,
    avatars: AvatarRegistry,
    catalog: Arc<dyn AvatarCatalog>,
}

impl ActorManager {
    /// Create a new actor manager
    pub fn new(config: ActorsConfig, catalog: Arc<dyn AvatarCatalog>) -> Self {
        Self {
            id: ServiceId::new("actors"),
            status: ServiceStatus::new(),
            config,
            registry: ActorRegistry::new(),
            avatars: AvatarRegistry::new(),
            catalog,
        }
    }

    /// Actor configuration
    pub fn config(&self) -> &ActorsConfig {
        &self.config
    }

    /// The actor registry
    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    /// The avatar registry
    pub fn avatars(&self) -> &AvatarRegistry {
        &self.avatars
    }

    /// Whether an avatar resource exists
    pub fn avatar_exists(&self, path: &str) -> bool {
        self.catalog.avatar_exists(path)
    }

    /// Whether characters are re-arranged when one is shown without a position
    pub fn auto_arrange_on_add(&self) -> bool {
        self.config.auto_arrange_on_add
    }

    /// Create a sprite actor from configured metadata and register it
    pub fn add_actor(&self, id: &str) -> ActorResult<Arc<dyn Actor>> {
        self.add_actor_with(id, self.config.metadata_for(id))
    }

    /// Create a sprite actor from explicit metadata and register it
    pub fn add_actor_with(&self, id: &str, metadata: ActorMetadata) -> ActorResult<Arc<dyn Actor>> {
        let actor = create_sprite_actor(id, metadata);
        self.registry.register(actor.clone())?;
        Ok(actor)
    }

    /// Register an existing actor
    pub fn register(&self, actor: Arc<dyn Actor>) -> ActorResult<()> {
        self.registry.register(actor)
    }

    /// Remove an actor and its avatar assignment
    pub fn remove_actor(&self, id: &str) -> ActorResult<Arc<dyn Actor>> {
        let actor = self.registry.remove(id)?;
        self.avatars.remove(id);
        Ok(actor)
    }

    /// Wait for exclusive access to an actor
    pub async fn resolve(&self, id: &str) -> ActorResult<ActorLease> {
        self.registry.resolve(id).await
    }

    /// Read-only actor handle
    pub fn get(&self, id: &str) -> Option<Arc<dyn Actor>> {
        self.registry.get(id)
    }

    /// Spread visible characters evenly across the scene
    ///
    /// `target` is the character the caller already holds a lease on; it is
    /// included even if its visibility fade has not started yet. Every other
    /// character is leased without waiting, and characters busy in another
    /// command keep their slot in the lineup but are not moved. Characters
    /// left of centre face right and the others face left.
    pub async fn arrange_characters(
        &self,
        target: &Arc<dyn Actor>,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        let mut lineup: Vec<Arc<dyn Actor>> = self
            .registry
            .visible_of_kind(ActorKind::Character)
            .into_iter()
            .filter(|a| a.id() != target.id())
            .collect();
        lineup.push(target.clone());
        lineup.sort_by(|a, b| a.id().cmp(b.id()));

        let count = lineup.len();
        let mut moves: Vec<(Arc<dyn Actor>, Option<ActorLease>, f32)> = Vec::with_capacity(count);
        for (index, actor) in lineup.into_iter().enumerate() {
            let slot = (index + 1) as f32 / (count + 1) as f32;
            if actor.id() == target.id() {
                moves.push((actor, None, slot));
                continue;
            }
            match self.registry.try_resolve(actor.id()) {
                Some(lease) => moves.push((actor, Some(lease), slot)),
                None => log::debug!("Auto-arrange skipping busy actor {}", actor.id()),
            }
        }

        log::debug!("Arranging {} characters around {}", count, target.id());

        let tasks = moves.iter().map(|(actor, _lease, slot)| {
            let x = self.config.scene_to_world(0, slot * 100.0);
            let look = if *slot <= 0.5 {
                LookDirection::Right
            } else {
                LookDirection::Left
            };
            async move {
                actor.change_look_direction(look, token).await?;
                let position = Vec3 {
                    x,
                    ..actor.position()
                };
                actor.change_position(position, duration, easing, token).await
            }
        });

        let mut outcome = TransitionOutcome::Completed;
        for result in join_all(tasks).await {
            if result?.is_cancelled() {
                outcome = TransitionOutcome::Cancelled;
            }
        }
        Ok(outcome)
    }
}

impl Service for ActorManager {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn state(&self) -> ServiceState {
        self.status.get()
    }

    fn health(&self) -> ServiceHealth {
        let health = match self.status.get() {
            ServiceState::Running => ServiceHealth::healthy(),
            state => ServiceHealth {
                state,
                ..Default::default()
            },
        };
        health
            .with_metric("actors", self.registry.len() as f64)
            .with_metric("avatars", self.avatars.len() as f64)
    }

    fn start(&self) -> ServiceResult<()> {
        self.status.start()?;
        log::info!("Actor manager started");
        Ok(())
    }

    fn stop(&self) -> ServiceResult<()> {
        self.status.stop()?;
        log::info!("Actor manager stopped with {} actors", self.registry.len());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
