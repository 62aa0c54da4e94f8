//! Sprite actors
//!
//! [`SpriteActor`] is the state machine shared by every sprite variant:
//! appearance cross-fades, opacity fades for visibility, position and tint
//! tweens, and a horizontal flip for look direction. The variants
//! ([`SpriteCharacter`], [`SpriteBackground`], [`SpriteProp`]) wrap it and add
//! kind-specific behavior.
//!
//! ## Look direction
//!
//! Sprites are drawn facing their baked direction and turn by flipping:
//!
//! | baked  | not flipped | flipped |
//! |--------|-------------|---------|
//! | Left   | Left        | Right   |
//! | Right  | Right       | Left    |
//! | Center | Center      | Center  |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use stage_core::{
    tween, ActorKind, CancellationToken, Color, EasingType, LookDirection, TransitionOutcome, Vec3,
};
use stage_services::ActorMetadata;

use crate::actor::Actor;
use crate::error::{ActorError, ActorResult};

#[derive(Debug, Clone)]
struct SpriteState {
    appearance: Option<String>,
    /// Appearance being faded out while `crossfade` < 1
    previous_appearance: Option<String>,
    crossfade: f32,
    visible: bool,
    opacity: f32,
    position: Vec3,
    tint: Color,
    flipped: bool,
}

/// Direction reported for a baked direction and flip state
fn reported_direction(baked: LookDirection, flipped: bool) -> LookDirection {
    match (baked, flipped) {
        (LookDirection::Center, _) => LookDirection::Center,
        (LookDirection::Left, false) | (LookDirection::Right, true) => LookDirection::Left,
        (LookDirection::Left, true) | (LookDirection::Right, false) => LookDirection::Right,
    }
}

/// Sprite state machine shared by all sprite variants
pub struct SpriteActor {
    id: String,
    metadata: ActorMetadata,
    baked_look_direction: LookDirection,
    state: RwLock<SpriteState>,
}

impl SpriteActor {
    /// Create a hidden sprite from metadata
    pub fn new(id: impl Into<String>, metadata: ActorMetadata) -> Self {
        let state = SpriteState {
            appearance: None,
            previous_appearance: None,
            crossfade: 1.0,
            visible: false,
            opacity: 0.0,
            position: metadata.initial_position(),
            tint: Color::WHITE,
            flipped: false,
        };
        Self {
            id: id.into(),
            baked_look_direction: metadata.baked_look_direction(),
            metadata,
            state: RwLock::new(state),
        }
    }

    /// Metadata the sprite was created from
    pub fn metadata(&self) -> &ActorMetadata {
        &self.metadata
    }

    /// Direction the art faces when not flipped
    pub fn baked_look_direction(&self) -> LookDirection {
        self.baked_look_direction
    }

    /// Current opacity (0.0 - 1.0)
    pub fn opacity(&self) -> f32 {
        self.state.read().opacity
    }

    /// Appearance cross-fade progress (1.0 when no fade is running)
    pub fn crossfade(&self) -> f32 {
        self.state.read().crossfade
    }

    /// Appearance being faded out, if a cross-fade is running or was cut short
    pub fn previous_appearance(&self) -> Option<String> {
        self.state.read().previous_appearance.clone()
    }

    /// Whether the sprite is mirrored
    pub fn is_flipped(&self) -> bool {
        self.state.read().flipped
    }

    fn set_tint_now(&self, tint: Color) {
        self.state.write().tint = tint;
    }
}

#[async_trait]
impl Actor for SpriteActor {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ActorKind {
        self.metadata.kind
    }

    fn appearance(&self) -> Option<String> {
        self.state.read().appearance.clone()
    }

    fn is_visible(&self) -> bool {
        self.state.read().visible
    }

    fn position(&self) -> Vec3 {
        self.state.read().position
    }

    fn tint(&self) -> Color {
        self.state.read().tint
    }

    fn look_direction(&self) -> LookDirection {
        reported_direction(self.baked_look_direction, self.state.read().flipped)
    }

    async fn change_appearance(
        &self,
        appearance: &str,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        if !self.metadata.has_appearance(appearance) {
            return Err(ActorError::resource_missing(&self.id, appearance));
        }
        {
            let mut state = self.state.write();
            if state.appearance.as_deref() == Some(appearance) {
                return Ok(TransitionOutcome::Completed);
            }
            state.previous_appearance = state.appearance.replace(appearance.to_string());
            state.crossfade = 0.0;
        }

        let outcome = tween(duration, easing, token, |t| self.state.write().crossfade = t).await;
        if outcome == TransitionOutcome::Completed {
            self.state.write().previous_appearance = None;
        }
        Ok(outcome)
    }

    async fn change_visibility(
        &self,
        visible: bool,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        let start = {
            let mut state = self.state.write();
            state.visible = visible;
            state.opacity
        };
        let target = if visible { 1.0 } else { 0.0 };

        let outcome = tween(duration, easing, token, |t| {
            self.state.write().opacity = start + (target - start) * t
        })
        .await;
        Ok(outcome)
    }

    async fn change_position(
        &self,
        position: Vec3,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        let start = self.position();
        let outcome = tween(duration, easing, token, |t| {
            self.state.write().position = start.lerp(position, t)
        })
        .await;
        Ok(outcome)
    }

    async fn change_tint(
        &self,
        tint: Color,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        let start = self.tint();
        let outcome = tween(duration, easing, token, |t| {
            self.state.write().tint = start.lerp(tint, t)
        })
        .await;
        Ok(outcome)
    }

    async fn change_look_direction(
        &self,
        direction: LookDirection,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        if token.is_cancelled() {
            return Ok(TransitionOutcome::Cancelled);
        }
        if self.baked_look_direction == LookDirection::Center {
            return Ok(TransitionOutcome::Completed);
        }

        let mut state = self.state.write();
        if direction == LookDirection::Center {
            state.flipped = false;
        } else if direction != reported_direction(self.baked_look_direction, state.flipped) {
            state.flipped = !state.flipped;
        }
        Ok(TransitionOutcome::Completed)
    }
}

macro_rules! sprite_variant {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $name {
            sprite: SpriteActor,
        }

        impl $name {
            /// Shared sprite state
            pub fn sprite(&self) -> &SpriteActor {
                &self.sprite
            }

            fn from_metadata(id: impl Into<String>, mut metadata: ActorMetadata) -> Self {
                metadata.kind = $kind;
                Self {
                    sprite: SpriteActor::new(id, metadata),
                }
            }
        }

        #[async_trait]
        impl Actor for $name {
            fn id(&self) -> &str {
                self.sprite.id()
            }

            fn kind(&self) -> ActorKind {
                $kind
            }

            fn appearance(&self) -> Option<String> {
                self.sprite.appearance()
            }

            fn is_visible(&self) -> bool {
                self.sprite.is_visible()
            }

            fn position(&self) -> Vec3 {
                self.sprite.position()
            }

            fn tint(&self) -> Color {
                self.sprite.tint()
            }

            fn look_direction(&self) -> LookDirection {
                self.sprite.look_direction()
            }

            async fn change_appearance(
                &self,
                appearance: &str,
                duration: Duration,
                easing: EasingType,
                token: &CancellationToken,
            ) -> ActorResult<TransitionOutcome> {
                self.sprite.change_appearance(appearance, duration, easing, token).await
            }

            async fn change_visibility(
                &self,
                visible: bool,
                duration: Duration,
                easing: EasingType,
                token: &CancellationToken,
            ) -> ActorResult<TransitionOutcome> {
                self.sprite.change_visibility(visible, duration, easing, token).await
            }

            async fn change_position(
                &self,
                position: Vec3,
                duration: Duration,
                easing: EasingType,
                token: &CancellationToken,
            ) -> ActorResult<TransitionOutcome> {
                self.sprite.change_position(position, duration, easing, token).await
            }

            async fn change_tint(
                &self,
                tint: Color,
                duration: Duration,
                easing: EasingType,
                token: &CancellationToken,
            ) -> ActorResult<TransitionOutcome> {
                self.sprite.change_tint(tint, duration, easing, token).await
            }

            async fn change_look_direction(
                &self,
                direction: LookDirection,
                token: &CancellationToken,
            ) -> ActorResult<TransitionOutcome> {
                self.sprite.change_look_direction(direction, token).await
            }
        }
    };
}

sprite_variant!(
    /// Character sprite; may dim itself while not speaking
    SpriteCharacter,
    ActorKind::Character
);

sprite_variant!(
    /// Full-scene background sprite
    SpriteBackground,
    ActorKind::Background
);

sprite_variant!(
    /// Scene prop sprite
    SpriteProp,
    ActorKind::Prop
);

impl SpriteCharacter {
    /// Create a hidden character
    ///
    /// With `highlight_when_speaking` the character starts out tinted with
    /// `not_speaking_tint`.
    pub fn new(id: impl Into<String>, metadata: ActorMetadata) -> Self {
        let character = Self::from_metadata(id, metadata);
        let sprite = &character.sprite;
        if sprite.metadata().highlight_when_speaking {
            sprite.set_tint_now(sprite.metadata().not_speaking_tint);
        }
        character
    }

    /// Light up (speaking) or dim (not speaking) the character
    ///
    /// Does nothing unless `highlight_when_speaking` is set.
    pub async fn change_speaking(
        &self,
        speaking: bool,
        duration: Duration,
        easing: EasingType,
        token: &CancellationToken,
    ) -> ActorResult<TransitionOutcome> {
        let metadata = self.sprite.metadata();
        if !metadata.highlight_when_speaking {
            return Ok(TransitionOutcome::Completed);
        }
        let tint = if speaking {
            Color::WHITE
        } else {
            metadata.not_speaking_tint
        };
        self.sprite.change_tint(tint, duration, easing, token).await
    }
}

impl SpriteBackground {
    /// Create a hidden background
    pub fn new(id: impl Into<String>, metadata: ActorMetadata) -> Self {
        Self::from_metadata(id, metadata)
    }
}

impl SpriteProp {
    /// Create a hidden prop
    pub fn new(id: impl Into<String>, metadata: ActorMetadata) -> Self {
        Self::from_metadata(id, metadata)
    }
}

/// Build the sprite variant matching `metadata.kind`
pub fn create_sprite_actor(id: impl Into<String>, metadata: ActorMetadata) -> Arc<dyn Actor> {
    match metadata.kind {
        ActorKind::Character => Arc::new(SpriteCharacter::new(id, metadata)),
        ActorKind::Background => Arc::new(SpriteBackground::new(id, metadata)),
        ActorKind::Prop => Arc::new(SpriteProp::new(id, metadata)),
    }
}
