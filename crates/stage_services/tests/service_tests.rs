//! Integration tests for stage_services

use std::any::Any;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use stage_services::*;

// Mock service for testing
struct MockService {
    id: ServiceId,
    status: ServiceStatus,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
    journal: Arc<Mutex<Vec<String>>>,
}

impl MockService {
    fn new(id: &str, journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            id: ServiceId::new(id),
            status: ServiceStatus::new(),
            start_count: AtomicUsize::new(0),
            stop_count: AtomicUsize::new(0),
            journal,
        }
    }
}

impl Service for MockService {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn state(&self) -> ServiceState {
        self.status.get()
    }

    fn health(&self) -> ServiceHealth {
        match self.status.get() {
            ServiceState::Running => ServiceHealth::healthy(),
            _ => ServiceHealth::default(),
        }
    }

    fn start(&self) -> ServiceResult<()> {
        self.status.start()?;
        self.start_count.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push(format!("start {}", self.id));
        Ok(())
    }

    fn stop(&self) -> ServiceResult<()> {
        self.status.stop()?;
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push(format!("stop {}", self.id));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_registry_register_and_lookup() {
    init_logger();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let registry = ServiceRegistry::new();
    assert!(registry.is_empty());

    registry
        .register(Arc::new(MockService::new("alpha", journal.clone())))
        .unwrap();
    registry
        .register(Arc::new(MockService::new("beta", journal.clone())))
        .unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&ServiceId::new("alpha")));
    assert_eq!(
        registry.service_ids(),
        vec![ServiceId::new("alpha"), ServiceId::new("beta")]
    );

    let err = registry
        .register(Arc::new(MockService::new("alpha", journal)))
        .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));

    let typed: Arc<MockService> = registry.get_typed(&ServiceId::new("beta")).unwrap();
    assert_eq!(typed.id().name(), "beta");

    let missing = registry.get_typed::<MockService>(&ServiceId::new("gamma"));
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[test]
fn test_registry_type_mismatch_and_find() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let registry = ServiceRegistry::new();
    registry
        .register(Arc::new(MockService::new("mock", journal)))
        .unwrap();
    registry
        .register(Arc::new(AudioService::with_player(Arc::new(
            SimulatedVoicePlayer::new(),
        ))))
        .unwrap();

    let wrong = registry.get_typed::<AudioService>(&ServiceId::new("mock"));
    assert!(matches!(wrong, Err(ServiceError::TypeMismatch(_))));

    let audio = registry.find::<AudioService>().unwrap();
    assert_eq!(audio.id().name(), "audio");
    assert!(registry.find::<MockService>().is_some());
}

#[test]
fn test_start_and_stop_order() {
    init_logger();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let registry = ServiceRegistry::new();
    for id in ["first", "second", "third"] {
        registry
            .register(Arc::new(MockService::new(id, journal.clone())))
            .unwrap();
    }

    registry.start_all().unwrap();
    // Already running services are left alone
    registry.start_all().unwrap();

    let health = registry.health_all();
    assert!(health.values().all(|h| h.state == ServiceState::Running));

    registry.stop_all().unwrap();

    assert_eq!(
        *journal.lock(),
        vec![
            "start first",
            "start second",
            "start third",
            "stop third",
            "stop second",
            "stop first",
        ]
    );
}

#[test]
fn test_unregister_stops_running_service() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let registry = ServiceRegistry::new();
    let service = Arc::new(MockService::new("solo", journal.clone()));
    registry.register(service.clone()).unwrap();
    registry.start_all().unwrap();

    let removed = registry.unregister(&ServiceId::new("solo")).unwrap();
    assert_eq!(removed.state(), ServiceState::Stopped);
    assert_eq!(service.stop_count.load(Ordering::SeqCst), 1);
    assert_eq!(service.start_count.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());

    assert!(matches!(
        registry.unregister(&ServiceId::new("solo")),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn test_config_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[actors]
default_duration = 1.0
pixels_per_unit = 50.0

[actors.metadata.Kohaku]
kind = "prop"
position = [1.0, 2.0, 0.0]

[audio]
voice_volume = 0.25
"#
    )
    .unwrap();

    let config = StageConfig::load(file.path()).unwrap();
    assert_eq!(config.actors.default_duration(), Duration::from_secs(1));
    assert_eq!(config.actors.scene_size(), (38.4, 21.6));
    assert_eq!(config.audio.voice_volume, 0.25);

    let prop = config.actors.metadata_for("Kohaku");
    assert_eq!(prop.kind, stage_core::ActorKind::Prop);
    assert_eq!(prop.initial_position(), stage_core::Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn test_config_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = StageConfig::load(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[tokio::test(start_paused = true)]
async fn test_audio_service_through_registry() {
    init_logger();
    let player = Arc::new(
        SimulatedVoicePlayer::new()
            .with_clip("Sora_001", Duration::from_secs(2))
            .with_clip("Sora_002", Duration::from_secs(3)),
    );
    let config = StageConfig::default();
    let registry = ServiceRegistry::new();
    registry
        .register(Arc::new(AudioService::new(player.clone(), &config.audio)))
        .unwrap();
    registry.start_all().unwrap();

    let audio = registry.find::<AudioService>().unwrap();
    let outcome = audio
        .play_voice_sequence(&["Sora_001".to_string(), "Sora_002".to_string()])
        .await
        .unwrap();
    assert_eq!(outcome, stage_core::TransitionOutcome::Completed);
    assert_eq!(player.completed_clips(), vec!["Sora_001", "Sora_002"]);

    let health = audio.health();
    assert_eq!(health.metrics.get("clips_played"), Some(&2.0));

    registry.stop_all().unwrap();
    assert!(matches!(
        audio.play_voice("Sora_001").await,
        Err(AudioError::NotRunning)
    ));
}
