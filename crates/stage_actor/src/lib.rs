//! # stage_actor - Stage Actors
//!
//! Live, stateful scene actors and the service that owns them.
//!
//! ## Features
//!
//! - `Actor` trait: appearance, visibility, position, tint and look-direction
//!   transitions, each async and cancellable
//! - Sprite variants for characters, backgrounds and props sharing one state
//!   machine
//! - Actor registry with per-actor exclusion leases
//! - Avatar assignments and the avatar resource catalog
//! - `ActorManager` service with character auto-arrange
//!
//! ## Example
//!
//! ```ignore
//! let manager = ActorManager::new(config.actors.clone(), catalog);
//! manager.add_actor("Sora")?;
//!
//! let sora = manager.resolve("Sora").await?;
//! sora.change_visibility(true, Duration::from_millis(350), EasingType::Linear, &token).await?;
//! ```

pub mod actor;
pub mod avatar;
pub mod error;
pub mod manager;
pub mod registry;
pub mod sprite;

pub use actor::{Actor, ActorState};
pub use avatar::{AvatarCatalog, AvatarRegistry, StaticAvatarCatalog};
pub use error::{ActorError, ActorResult};
pub use manager::ActorManager;
pub use registry::{ActorLease, ActorRegistry};
pub use sprite::{create_sprite_actor, SpriteActor, SpriteBackground, SpriteCharacter, SpriteProp};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actor::{Actor, ActorState};
    pub use crate::avatar::{AvatarCatalog, AvatarRegistry};
    pub use crate::error::{ActorError, ActorResult};
    pub use crate::manager::ActorManager;
    pub use crate::registry::ActorLease;
}
