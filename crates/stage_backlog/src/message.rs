//! Backlog message with voice replay
//!
//! A message keeps the text shown in the backlog, the speaker and the voice
//! clips spoken with it. Clips are validated against the audio service before
//! they are accepted; playback replays a snapshot of the accepted clips, one
//! after another, and only one replay of a message runs at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stage_core::TransitionOutcome;
use stage_services::{AudioResult, AudioService};

/// Serializable snapshot of a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogMessageState {
    pub message_text: String,
    pub actor_name: Option<String>,
    pub voice_clip_names: Vec<String>,
}

/// Result of [`BacklogMessage::play_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A replay of this message was already running
    Rejected,
    /// The message has no voice clips
    NothingToPlay,
    /// The clips were played (or stopped part way)
    Played(TransitionOutcome),
}

#[derive(Default)]
struct MessageData {
    text: String,
    actor_name: Option<String>,
    clips: Vec<String>,
}

/// Clears the in-progress flag however playback ends
struct PlaybackGuard<'a>(&'a AtomicBool);

impl Drop for PlaybackGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One line of dialogue in the backlog
pub struct BacklogMessage {
    audio: Arc<AudioService>,
    data: RwLock<MessageData>,
    playable: AtomicBool,
    playing: AtomicBool,
}

impl BacklogMessage {
    /// Create an empty message
    pub fn new(audio: Arc<AudioService>) -> Self {
        Self {
            audio,
            data: RwLock::new(MessageData::default()),
            playable: AtomicBool::new(false),
            playing: AtomicBool::new(false),
        }
    }

    /// Set the text and speaker, then add `clips` in order
    ///
    /// A blank speaker means the line has none.
    pub async fn initialize(&self, message: &str, actor_name: Option<&str>, clips: &[String]) {
        self.set_text(message, actor_name);
        self.add_voice_clips(clips).await;
    }

    /// Replace the text and speaker
    pub fn set_text(&self, message: &str, actor_name: Option<&str>) {
        let mut data = self.data.write();
        data.text = message.to_string();
        data.actor_name = actor_name
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string);
    }

    /// Add `clips` one after another, keeping their order
    pub async fn add_voice_clips(&self, clips: &[String]) {
        for clip in clips {
            self.add_voice_clip(clip).await;
        }
    }

    /// Append streamed text
    pub fn append_text(&self, text: &str) {
        self.data.write().text.push_str(text);
    }

    /// Add a voice clip if the audio service knows it
    ///
    /// Blank and unknown ids are dropped. Returns whether the clip was added.
    pub async fn add_voice_clip(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        if !self.audio.voice_exists(id).await {
            log::debug!("Dropping unknown voice clip '{}'", id);
            return false;
        }

        self.data.write().clips.push(id.to_string());
        self.playable.store(true, Ordering::Release);
        true
    }

    /// Whether the play trigger is enabled
    ///
    /// False while a replay is running or before any clip was accepted.
    pub fn can_play(&self) -> bool {
        self.playable.load(Ordering::Acquire) && !self.is_playing()
    }

    /// Whether a replay of this message is running
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn text(&self) -> String {
        self.data.read().text.clone()
    }

    pub fn actor_name(&self) -> Option<String> {
        self.data.read().actor_name.clone()
    }

    pub fn voice_clips(&self) -> Vec<String> {
        self.data.read().clips.clone()
    }

    /// Replay every voice clip in order
    ///
    /// A call made while a replay is running is ignored. Clips added during a
    /// replay are only played by the next call.
    pub async fn play_all(&self) -> AudioResult<PlayOutcome> {
        if self
            .playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Voice replay already running; ignoring");
            return Ok(PlayOutcome::Rejected);
        }
        let _guard = PlaybackGuard(&self.playing);

        let clips = self.voice_clips();
        if clips.is_empty() {
            return Ok(PlayOutcome::NothingToPlay);
        }

        log::debug!("Replaying {} voice clip(s)", clips.len());
        let outcome = self.audio.play_voice_sequence(&clips).await?;
        Ok(PlayOutcome::Played(outcome))
    }

    /// Snapshot the message
    pub fn state(&self) -> BacklogMessageState {
        let data = self.data.read();
        BacklogMessageState {
            message_text: data.text.clone(),
            actor_name: data.actor_name.clone(),
            voice_clip_names: data.clips.clone(),
        }
    }
}

impl std::fmt::Debug for BacklogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        f.debug_struct("BacklogMessage")
            .field("text", &data.text)
            .field("actor_name", &data.actor_name)
            .field("clips", &data.clips)
            .field("playing", &self.is_playing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_services::{Service, SimulatedVoicePlayer};
    use std::time::Duration;

    fn audio() -> Arc<AudioService> {
        let player = SimulatedVoicePlayer::new()
            .with_clip("Sora_001", Duration::from_millis(800))
            .with_clip("Sora_002", Duration::from_millis(400));
        let audio = Arc::new(AudioService::with_player(Arc::new(player)));
        audio.start().unwrap();
        audio
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize() {
        let message = BacklogMessage::new(audio());
        message
            .initialize(
                "Hello",
                Some("  "),
                &["Sora_001".to_string(), "Missing".to_string(), "Sora_002".to_string()],
            )
            .await;
        message.append_text(", world");

        let state = message.state();
        assert_eq!(state.message_text, "Hello, world");
        assert_eq!(state.actor_name, None);
        assert_eq!(state.voice_clip_names, vec!["Sora_001", "Sora_002"]);
        assert!(message.can_play());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_playable_without_clips() {
        let message = BacklogMessage::new(audio());
        message.initialize("Hi", Some("Sora"), &[]).await;
        assert_eq!(message.actor_name().as_deref(), Some("Sora"));
        assert!(!message.can_play());
        assert_eq!(message.play_all().await.unwrap(), PlayOutcome::NothingToPlay);
        assert!(!message.is_playing());
    }
}
