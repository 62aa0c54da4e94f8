//! Backlog service
//!
//! Bounded history of displayed dialogue. New lines go to the back; once the
//! configured limit is reached the oldest line is dropped.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stage_services::{
    AudioService, BacklogConfig, Service, ServiceHealth, ServiceId, ServiceResult, ServiceState,
    ServiceStatus,
};

use crate::message::{BacklogMessage, BacklogMessageState};

/// Serializable snapshot of the whole backlog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogState {
    pub messages: Vec<BacklogMessageState>,
}

/// Backlog service - keeps the most recent dialogue lines
pub struct Backlog {
    id: ServiceId,
    status: ServiceStatus,
    audio: Arc<AudioService>,
    max_messages: usize,
    messages: RwLock<VecDeque<Arc<BacklogMessage>>>,
}

impl Backlog {
    /// Create a new backlog
    pub fn new(audio: Arc<AudioService>, config: &BacklogConfig) -> Self {
        Self {
            id: ServiceId::new("backlog"),
            status: ServiceStatus::new(),
            audio,
            max_messages: config.max_messages.max(1),
            messages: RwLock::new(VecDeque::new()),
        }
    }

    /// Maximum number of lines kept
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Add a line, dropping the oldest one if the backlog is full
    ///
    /// The line is the latest one before its clips are validated, so text
    /// streamed in meanwhile lands on it.
    pub async fn add_message(
        &self,
        message: &str,
        actor_name: Option<&str>,
        clips: &[String],
    ) -> Arc<BacklogMessage> {
        let entry = Arc::new(BacklogMessage::new(self.audio.clone()));
        entry.set_text(message, actor_name);
        self.push(entry.clone());
        entry.add_voice_clips(clips).await;
        entry
    }

    fn push(&self, entry: Arc<BacklogMessage>) {
        let mut messages = self.messages.write();
        messages.push_back(entry);
        while messages.len() > self.max_messages {
            messages.pop_front();
            log::debug!("Backlog full; dropped oldest message");
        }
    }

    /// Append text to the latest line
    ///
    /// Returns false if the backlog is empty.
    pub fn append_text(&self, text: &str) -> bool {
        match self.latest() {
            Some(entry) => {
                entry.append_text(text);
                true
            }
            None => false,
        }
    }

    /// Add a voice clip to the latest line
    pub async fn add_voice_clip(&self, id: &str) -> bool {
        match self.latest() {
            Some(entry) => entry.add_voice_clip(id).await,
            None => false,
        }
    }

    pub fn latest(&self) -> Option<Arc<BacklogMessage>> {
        self.messages.read().back().cloned()
    }

    /// Lines from oldest to newest
    pub fn messages(&self) -> Vec<Arc<BacklogMessage>> {
        self.messages.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    /// Snapshot every line
    pub fn state(&self) -> BacklogState {
        BacklogState {
            messages: self.messages.read().iter().map(|m| m.state()).collect(),
        }
    }

    /// Replace the backlog with `state`
    ///
    /// Voice clips are validated again, so clips that no longer exist are
    /// dropped.
    pub async fn apply_state(&self, state: &BacklogState) {
        self.clear();
        let skip = state.messages.len().saturating_sub(self.max_messages);
        for message in state.messages.iter().skip(skip) {
            self.add_message(
                &message.message_text,
                message.actor_name.as_deref(),
                &message.voice_clip_names,
            )
            .await;
        }
        log::info!("Backlog restored with {} messages", self.len());
    }
}

impl Service for Backlog {
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
        health.with_metric("messages", self.len() as f64)
    }

    fn start(&self) -> ServiceResult<()> {
        self.status.start()?;
        log::info!("Backlog started (max {} messages)", self.max_messages);
        Ok(())
    }

    fn stop(&self) -> ServiceResult<()> {
        self.status.stop()?;
        log::info!("Backlog stopped");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_services::SimulatedVoicePlayer;
    use std::time::Duration;

    fn backlog(max_messages: usize) -> Backlog {
        let player = SimulatedVoicePlayer::new().with_clip("Sora_001", Duration::from_secs(1));
        let audio = Arc::new(AudioService::with_player(Arc::new(player)));
        Backlog::new(audio, &BacklogConfig { max_messages })
    }

    #[tokio::test(start_paused = true)]
    async fn test_oldest_dropped() {
        let backlog = backlog(2);
        for line in ["one", "two", "three"] {
            backlog.add_message(line, None, &[]).await;
        }
        let texts: Vec<String> = backlog.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_to_latest() {
        let backlog = backlog(10);
        assert!(!backlog.append_text("lost"));
        assert!(!backlog.add_voice_clip("Sora_001").await);

        backlog.add_message("Hel", Some("Sora"), &[]).await;
        assert!(backlog.append_text("lo"));
        assert!(backlog.add_voice_clip("Sora_001").await);

        let latest = backlog.latest().unwrap();
        assert_eq!(latest.text(), "Hello");
        assert_eq!(latest.voice_clips(), vec!["Sora_001"]);
    }

    #[test]
    fn test_health_reports_messages() {
        let backlog = backlog(5);
        backlog.start().unwrap();
        let health = backlog.health();
        assert_eq!(health.state, ServiceState::Running);
        assert_eq!(health.metrics.get("messages"), Some(&0.0));
    }
}
