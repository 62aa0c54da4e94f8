//! # stage_backlog - Dialogue Backlog
//!
//! Keeps recently displayed lines together with the voice clips spoken with
//! them, and replays those clips on request.
//!
//! ## Usage
//!
//! ```ignore
//! let backlog = Backlog::new(audio.clone(), &config.backlog);
//! let line = backlog.add_message("Good morning.", Some("Sora"), &clips).await;
//! backlog.append_text(" Sleep well?");
//!
//! // Later, from the backlog UI
//! line.play_all().await?;
//! ```

pub mod backlog;
pub mod message;

pub use backlog::{Backlog, BacklogState};
pub use message::{BacklogMessage, BacklogMessageState, PlayOutcome};
