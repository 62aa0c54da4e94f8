//! Voice playback backends
//!
//! [`VoicePlayer`] is the seam between the audio service and whatever actually
//! produces sound. Both calls are async: existence checks may hit an asset
//! index and playback lasts as long as the clip.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use stage_core::{CancellationToken, TransitionOutcome};

use crate::audio::{AudioError, AudioResult};

/// Backend that can check for and play voice clips
#[async_trait]
pub trait VoicePlayer: Send + Sync + 'static {
    /// Whether a clip with this ID can be played
    async fn clip_exists(&self, id: &str) -> bool;

    /// Play a clip to the end, or until `token` fires
    async fn play(
        &self,
        id: &str,
        volume: f32,
        token: &CancellationToken,
    ) -> AudioResult<TransitionOutcome>;
}

/// One entry in the simulated player's history
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRecord {
    pub clip: String,
    pub volume: f32,
    pub outcome: TransitionOutcome,
}

/// Headless voice player with an in-memory clip catalog
///
/// Playback sleeps for the clip's length. Records every finished or stopped
/// clip and tracks how many clips were playing at once.
#[derive(Default)]
pub struct SimulatedVoicePlayer {
    clips: RwLock<HashMap<String, Duration>>,
    failing: RwLock<HashSet<String>>,
    lookup_delay: Duration,
    history: Mutex<Vec<PlaybackRecord>>,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

impl SimulatedVoicePlayer {
    /// Create an empty player
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip to the catalog
    pub fn with_clip(self, id: impl Into<String>, length: Duration) -> Self {
        self.add_clip(id, length);
        self
    }

    /// Add a clip that exists but fails when played
    pub fn with_failing_clip(self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.clips.write().insert(id.clone(), Duration::ZERO);
        self.failing.write().insert(id);
        self
    }

    /// Delay every existence check by `delay`
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    /// Add a clip to the catalog
    pub fn add_clip(&self, id: impl Into<String>, length: Duration) {
        self.clips.write().insert(id.into(), length);
    }

    /// Clips played so far, in completion order
    pub fn history(&self) -> Vec<PlaybackRecord> {
        self.history.lock().clone()
    }

    /// IDs of clips that played to the end
    pub fn completed_clips(&self) -> Vec<String> {
        self.history
            .lock()
            .iter()
            .filter(|r| r.outcome == TransitionOutcome::Completed)
            .map(|r| r.clip.clone())
            .collect()
    }

    /// Clips currently playing
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of clips that were ever playing at once
    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoicePlayer for SimulatedVoicePlayer {
    async fn clip_exists(&self, id: &str) -> bool {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }
        self.clips.read().contains_key(id)
    }

    async fn play(
        &self,
        id: &str,
        volume: f32,
        token: &CancellationToken,
    ) -> AudioResult<TransitionOutcome> {
        let length = self
            .clips
            .read()
            .get(id)
            .copied()
            .ok_or_else(|| AudioError::ClipNotFound(id.to_string()))?;
        if self.failing.read().contains(id) {
            return Err(AudioError::Backend(format!("cannot decode '{}'", id)));
        }

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => TransitionOutcome::Cancelled,
            _ = tokio::time::sleep(length) => TransitionOutcome::Completed,
        };

        self.history.lock().push(PlaybackRecord {
            clip: id.to_string(),
            volume,
            outcome,
        });
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_play_known_clip() {
        let player = SimulatedVoicePlayer::new().with_clip("v1", Duration::from_secs(2));
        assert!(player.clip_exists("v1").await);
        assert!(!player.clip_exists("v2").await);

        let token = CancellationToken::new();
        let outcome = player.play("v1", 0.8, &token).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Completed);
        assert_eq!(player.completed_clips(), vec!["v1".to_string()]);
        assert_eq!(player.history()[0].volume, 0.8);
        assert_eq!(player.active(), 0);
        assert_eq!(player.peak_active(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_unknown_and_failing_clip() {
        let player = SimulatedVoicePlayer::new().with_failing_clip("broken");
        let token = CancellationToken::new();

        assert!(matches!(
            player.play("missing", 1.0, &token).await,
            Err(AudioError::ClipNotFound(_))
        ));
        assert!(matches!(
            player.play("broken", 1.0, &token).await,
            Err(AudioError::Backend(_))
        ));
        assert!(player.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_clip() {
        let player = SimulatedVoicePlayer::new().with_clip("long", Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();

        let outcome = player.play("long", 1.0, &token).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Cancelled);
        assert!(player.completed_clips().is_empty());
    }
}
