//! # stage_command - Stage Commands
//!
//! Script commands that drive actors and audio, and the runner that executes
//! them.
//!
//! ## Features
//!
//! - `ModificationRequest`: one parsed "modify this actor" line, bound from
//!   script parameters
//! - Avatar resolution with its fallback chain
//! - `ModifyActor`: resolves the target and fans transitions out concurrently
//! - `StopVoice`: stops the playing voice
//! - `ScriptRunner`: waits or runs in the background per command, contains
//!   every failure at the command boundary
//!
//! ## Example
//!
//! ```ignore
//! let ctx = Arc::new(CommandContext::from_registry(&services)?);
//! let runner = ScriptRunner::new(ctx);
//!
//! let show = ModificationRequest::new("Sora").with_appearance("Happy").with_visible(true);
//! let reports = runner.run(vec![Arc::new(ModifyActor::new(show))]).await;
//! ```

pub mod avatar_policy;
pub mod command;
pub mod error;
pub mod modify;
pub mod request;
pub mod runner;
pub mod stop_voice;

pub use avatar_policy::{
    apply_avatar_decision, avatar_path, resolve_avatar, AvatarDecision, AVATAR_NONE,
};
pub use command::{Command, CommandContext, CommandPhase, CommandReport};
pub use error::{CommandError, CommandResult, ParameterError, ParameterResult};
pub use modify::ModifyActor;
pub use request::{split_target, ModificationRequest};
pub use runner::ScriptRunner;
pub use stop_voice::StopVoice;
