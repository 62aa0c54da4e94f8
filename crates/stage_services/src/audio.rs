//! Audio service
//!
//! Voice playback on top of a [`VoicePlayer`] backend. Only one voice plays at
//! a time: starting a clip or a sequence stops whatever was playing, and
//! [`AudioService::stop_voice`] cancels the current one.

use std::any::Any;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use stage_core::{CancellationToken, TransitionOutcome};
use thiserror::Error;

use crate::config::AudioConfig;
use crate::service::{Service, ServiceHealth, ServiceId, ServiceResult, ServiceState, ServiceStatus};
use crate::voice::VoicePlayer;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Voice clip not found: {0}")]
    ClipNotFound(String),

    #[error("Audio backend error: {0}")]
    Backend(String),

    #[error("Audio service is not running")]
    NotRunning,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// Audio statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStats {
    /// Clips that played (to the end or until stopped)
    pub clips_played: u64,
    /// Clips the backend failed to play
    pub clips_failed: u64,
    /// Sequences started
    pub sequences_played: u64,
    /// Explicit stop requests that interrupted a voice
    pub voices_stopped: u64,
}

/// The voice currently playing
struct CurrentVoice {
    generation: u64,
    token: CancellationToken,
}

/// Audio service - plays voice clips, one at a time
pub struct AudioService {
    id: ServiceId,
    status: ServiceStatus,
    player: Arc<dyn VoicePlayer>,
    voice_volume: RwLock<f32>,
    current: Mutex<Option<CurrentVoice>>,
    next_generation: Mutex<u64>,
    stats: RwLock<AudioStats>,
}

impl AudioService {
    /// Create a new audio service
    pub fn new(player: Arc<dyn VoicePlayer>, config: &AudioConfig) -> Self {
        Self {
            id: ServiceId::new("audio"),
            status: ServiceStatus::new(),
            player,
            voice_volume: RwLock::new(config.voice_volume.clamp(0.0, 1.0)),
            current: Mutex::new(None),
            next_generation: Mutex::new(0),
            stats: RwLock::new(AudioStats::default()),
        }
    }

    /// Create with default configuration
    pub fn with_player(player: Arc<dyn VoicePlayer>) -> Self {
        Self::new(player, &AudioConfig::default())
    }

    /// Voice volume (0.0 - 1.0)
    pub fn voice_volume(&self) -> f32 {
        *self.voice_volume.read()
    }

    /// Set the voice volume
    pub fn set_voice_volume(&self, volume: f32) -> AudioResult<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(AudioError::InvalidParameter(format!(
                "voice volume {} out of range",
                volume
            )));
        }
        *self.voice_volume.write() = volume;
        Ok(())
    }

    /// Check whether a voice clip exists
    pub async fn voice_exists(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        self.player.clip_exists(id).await
    }

    /// Whether a voice is playing right now
    pub fn is_playing(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Get statistics
    pub fn stats(&self) -> AudioStats {
        self.stats.read().clone()
    }

    /// Play one voice clip, stopping the current voice first
    pub async fn play_voice(&self, id: &str) -> AudioResult<TransitionOutcome> {
        self.ensure_running()?;
        let (generation, token) = self.begin_voice();
        let result = self.play_clip(id, &token).await;
        self.end_voice(generation);
        result
    }

    /// Play clips one after another, stopping the current voice first
    ///
    /// A clip that fails is logged and skipped. Returns `Cancelled` if the
    /// sequence was stopped before the last clip finished.
    pub async fn play_voice_sequence(&self, ids: &[String]) -> AudioResult<TransitionOutcome> {
        self.ensure_running()?;
        let (generation, token) = self.begin_voice();
        self.stats.write().sequences_played += 1;

        let mut outcome = TransitionOutcome::Completed;
        for id in ids {
            if token.is_cancelled() {
                outcome = TransitionOutcome::Cancelled;
                break;
            }
            match self.play_clip(id, &token).await {
                Ok(TransitionOutcome::Completed) => {}
                Ok(TransitionOutcome::Cancelled) => {
                    outcome = TransitionOutcome::Cancelled;
                    break;
                }
                Err(e) => log::warn!("Skipping voice clip '{}': {}", id, e),
            }
        }

        self.end_voice(generation);
        Ok(outcome)
    }

    /// Stop the current voice clip or sequence
    ///
    /// Returns whether anything was playing.
    pub fn stop_voice(&self) -> bool {
        match self.current.lock().take() {
            Some(current) => {
                current.token.cancel();
                self.stats.write().voices_stopped += 1;
                log::debug!("Voice stopped");
                true
            }
            None => false,
        }
    }

    fn ensure_running(&self) -> AudioResult<()> {
        if self.status.get().is_operational() {
            Ok(())
        } else {
            Err(AudioError::NotRunning)
        }
    }

    async fn play_clip(&self, id: &str, token: &CancellationToken) -> AudioResult<TransitionOutcome> {
        let volume = self.voice_volume();
        match self.player.play(id, volume, token).await {
            Ok(outcome) => {
                self.stats.write().clips_played += 1;
                Ok(outcome)
            }
            Err(e) => {
                self.stats.write().clips_failed += 1;
                Err(e)
            }
        }
    }

    fn begin_voice(&self) -> (u64, CancellationToken) {
        let generation = {
            let mut next = self.next_generation.lock();
            *next += 1;
            *next
        };
        let token = CancellationToken::new();
        let previous = self.current.lock().replace(CurrentVoice {
            generation,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        (generation, token)
    }

    fn end_voice(&self, generation: u64) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.generation == generation) {
            *current = None;
        }
    }
}

impl Service for AudioService {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn state(&self) -> ServiceState {
        self.status.get()
    }

    fn health(&self) -> ServiceHealth {
        let stats = self.stats();
        let health = match self.status.get() {
            ServiceState::Running => ServiceHealth::healthy(),
            ServiceState::Failed => ServiceHealth::failed("audio service failed"),
            state => ServiceHealth {
                state,
                ..Default::default()
            },
        };
        health
            .with_metric("clips_played", stats.clips_played as f64)
            .with_metric("clips_failed", stats.clips_failed as f64)
    }

    fn start(&self) -> ServiceResult<()> {
        self.status.start()?;
        log::info!("Audio service started (voice volume {})", self.voice_volume());
        Ok(())
    }

    fn stop(&self) -> ServiceResult<()> {
        self.stop_voice();
        self.status.stop()?;
        log::info!("Audio service stopped");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
