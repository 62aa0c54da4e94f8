//! # stage_services - Stage Service Layer
//!
//! Long-lived managers shared by every running command:
//! - Service lifecycle and the service registry
//! - Engine configuration loaded from TOML
//! - Voice audio on top of a pluggable backend
//!
//! ## Service Architecture
//!
//! Services are managed by the ServiceRegistry which handles:
//! - Service lifecycle (start/stop/restart)
//! - Health monitoring
//! - Typed lookup, so commands can borrow `Arc<AudioService>` and friends
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ServiceRegistry::new();
//! registry.register(Arc::new(AudioService::with_player(player)))?;
//! registry.start_all()?;
//!
//! let audio = registry.find::<AudioService>().unwrap();
//! audio.play_voice("Sora_001").await?;
//! ```

pub mod audio;
pub mod config;
pub mod registry;
pub mod service;
pub mod voice;

pub use audio::{AudioError, AudioResult, AudioService, AudioStats};
pub use config::{
    ActorMetadata, ActorsConfig, AudioConfig, BacklogConfig, ConfigError, ConfigResult,
    StageConfig,
};
pub use registry::ServiceRegistry;
pub use service::{
    Service, ServiceError, ServiceHealth, ServiceId, ServiceResult, ServiceState, ServiceStatus,
};
pub use voice::{PlaybackRecord, SimulatedVoicePlayer, VoicePlayer};
