//! Actor trait and state snapshot
//!
//! Every actor variant implements [`Actor`]. Getters read the current state
//! without waiting; every `change_*` call is an async transition that can be
//! cut short by the command's cancellation token. Transitions take `&self` so
//! several of them can run concurrently against one actor; implementations
//! keep their fields behind short-lived locks.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stage_core::{ActorKind, CancellationToken, Color, EasingType, LookDirection, TransitionOutcome, Vec3};

use crate::error::ActorResult;

/// Serializable snapshot of an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub id: String,
    pub kind: ActorKind,
    pub appearance: Option<String>,
    pub visible: bool,
    pub position: Vec3,
    pub tint: Color,
    pub look_direction: LookDirection,
}

/// Capability set shared by characters, backgrounds and props
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// Unique actor ID
    fn id(&self) -> &str;

    /// Actor variant
    fn kind(&self) -> ActorKind;

    /// Current appearance, if one was ever set
    fn appearance(&self) -> Option<String>;

    /// Visibility flag
    fn is_visible(&self) -> bool;

    /// Position in world units
    fn position(&self) -> Vec3;

    /// Tint color
    fn tint(&self) -> Color;

    /// Direction the actor is facing
    fn look_direction(&self) -> LookDirection;

    /// Snapshot of the current state
    fn state(&self) -> ActorState {
        ActorState {
            id: self.id().to_string(),
            kind: self.kind(),
            appearance: self.appearance(),
            visible: self.is_visible(),
            position: self.position(),
            tint: self.tint(),
            look_direction: self.look_direction(),
        }
    }

    /// Switch to another appearance
    async fn change_appearance(
        &self,
        appearance: &str,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome>;

    /// Show or hide the actor
    async fn change_visibility(
        &self,
        visible: bool,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome>;

    /// Move the actor
    async fn change_position(
        &self,
        position: Vec3,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome>;

    /// Tint the actor
    async fn change_tint(
        &self,
        tint: Color,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome>;

    /// Turn the actor. Discrete: there is no duration.
    async fn change_look_direction(
        &self,
        direction: LookDirection,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome>;
}
