//! Integration tests for stage_actor

use std::sync::Arc;
use std::time::Duration;

use stage_actor::*;
use stage_core::{ActorKind, CancellationToken, Color, EasingType, LookDirection, Vec3};
use stage_services::{ActorMetadata, ActorsConfig, Service, StageConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn manager_from(toml: &str) -> Arc<ActorManager> {
    let config = StageConfig::from_toml_str(toml).unwrap();
    let catalog = Arc::new(StaticAvatarCatalog::new());
    let manager = Arc::new(ActorManager::new(config.actors, catalog));
    manager.start().unwrap();
    manager
}

#[tokio::test(start_paused = true)]
async fn test_actors_from_metadata() {
    init_logger();
    let manager = manager_from(
        r##"
[actors.metadata.Room]
kind = "background"

[actors.metadata.Lamp]
kind = "prop"
position = [2.0, -1.0, 0.5]

[actors.metadata.Sora]
highlight_when_speaking = true
not_speaking_tint = "#404040"
"##,
    );

    let room = manager.add_actor("Room").unwrap();
    let lamp = manager.add_actor("Lamp").unwrap();
    let sora = manager.add_actor("Sora").unwrap();

    assert_eq!(room.kind(), ActorKind::Background);
    assert_eq!(room.look_direction(), LookDirection::Center);
    assert_eq!(lamp.kind(), ActorKind::Prop);
    assert_eq!(lamp.position(), Vec3::new(2.0, -1.0, 0.5));
    assert_eq!(sora.kind(), ActorKind::Character);
    assert_eq!(sora.tint(), "#404040".parse::<Color>().unwrap());
    assert_eq!(
        manager.registry().ids(),
        vec!["Lamp".to_string(), "Room".to_string(), "Sora".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_transitions_on_one_actor() {
    let manager = Arc::new(ActorManager::new(
        ActorsConfig::default(),
        Arc::new(StaticAvatarCatalog::new()),
    ));
    manager.add_actor("Sora").unwrap();
    let lease = manager.resolve("Sora").await.unwrap();
    let token = CancellationToken::new();
    let duration = Duration::from_millis(300);

    let (visible, moved, tinted) = tokio::join!(
        lease.change_visibility(true, duration, EasingType::EaseInOutSine, &token),
        lease.change_position(Vec3::new(-4.0, 1.0, 0.0), duration, EasingType::Linear, &token),
        lease.change_tint(Color::RED, duration, EasingType::Linear, &token),
    );

    assert!(!visible.unwrap().is_cancelled());
    assert!(!moved.unwrap().is_cancelled());
    assert!(!tinted.unwrap().is_cancelled());

    let state = lease.state();
    assert!(state.visible);
    assert_eq!(state.position, Vec3::new(-4.0, 1.0, 0.0));
    assert_eq!(state.tint, Color::RED);
}

#[tokio::test(start_paused = true)]
async fn test_different_actors_progress_in_parallel() {
    let manager = Arc::new(ActorManager::new(
        ActorsConfig::default(),
        Arc::new(StaticAvatarCatalog::new()),
    ));
    manager.add_actor("A").unwrap();
    manager.add_actor("B").unwrap();

    let start = tokio::time::Instant::now();
    let mut handles = Vec::new();
    for (id, x) in [("A", -2.0), ("B", 2.0)] {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            let lease = manager.resolve(id).await.unwrap();
            let token = CancellationToken::new();
            lease
                .change_position(Vec3::new(x, 0.0, 0.0), Duration::from_secs(1), EasingType::Linear, &token)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Both one-second moves overlapped instead of running back to back
    assert!(start.elapsed() < Duration::from_millis(1500));
    assert_eq!(manager.get("A").unwrap().position().x, -2.0);
    assert_eq!(manager.get("B").unwrap().position().x, 2.0);
}

#[tokio::test(start_paused = true)]
async fn test_same_actor_leases_serialize() {
    let manager = Arc::new(ActorManager::new(
        ActorsConfig::default(),
        Arc::new(StaticAvatarCatalog::new()),
    ));
    manager
        .add_actor_with("Sora", ActorMetadata::new(ActorKind::Character))
        .unwrap();

    let start = tokio::time::Instant::now();
    let mut handles = Vec::new();
    for x in [1.0, 2.0] {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            let lease = manager.resolve("Sora").await.unwrap();
            let token = CancellationToken::new();
            lease
                .change_position(Vec3::new(x, 0.0, 0.0), Duration::from_secs(1), EasingType::Linear, &token)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(start.elapsed() >= Duration::from_secs(2));
}
