//! # stage_core - Stage Core Types
//!
//! Value types shared by every Stage crate:
//! - Cooperative cancellation tokens
//! - Easing curves and the async tween driver used by actor transitions
//! - Positions (full and per-axis partial), tint colors
//! - Look directions and actor kinds
//!
//! Nothing in here knows about actors, services or commands; the types are
//! plain data plus the one async primitive (`tween`) that animates them.

pub mod cancel;
pub mod color;
pub mod easing;
pub mod error;
pub mod look;
pub mod tween;
pub mod vector;

pub use cancel::CancellationToken;
pub use color::Color;
pub use easing::EasingType;
pub use error::{ValueError, ValueResult};
pub use look::{ActorKind, LookDirection};
pub use tween::{tween, TransitionOutcome, FRAME_INTERVAL};
pub use vector::{PartialPosition, Vec3};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cancel::CancellationToken;
    pub use crate::color::Color;
    pub use crate::easing::EasingType;
    pub use crate::error::{ValueError, ValueResult};
    pub use crate::look::{ActorKind, LookDirection};
    pub use crate::tween::{tween, TransitionOutcome};
    pub use crate::vector::{PartialPosition, Vec3};
}
