//! Engine configuration - TOML to StageConfig conversion
//!
//! # Config Format
//!
//! ```toml
//! [actors]
//! default_duration = 0.35
//! default_easing = "linear"
//! auto_arrange_on_add = true
//! reference_resolution = [1920, 1080]
//! pixels_per_unit = 100.0
//!
//! [actors.metadata.Sora]
//! kind = "character"
//! baked_look_direction = "left"
//! default_appearance = "Default"
//! appearances = ["Default", "Happy", "Sad"]
//!
//! [audio]
//! voice_volume = 1.0
//!
//! [backlog]
//! max_messages = 300
//! ```
//!
//! Every section and field is optional; missing values take the defaults
//! below.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stage_core::{ActorKind, Color, EasingType, LookDirection, Vec3};
use thiserror::Error;

/// Errors from config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Per-actor metadata consulted when an actor is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorMetadata {
    /// Actor variant
    pub kind: ActorKind,
    /// Direction the art faces when not flipped; defaults per kind
    pub baked_look_direction: Option<LookDirection>,
    /// Appearance applied when neither the command nor the actor has one
    pub default_appearance: Option<String>,
    /// Known appearances; empty means "accept any"
    pub appearances: Vec<String>,
    /// Start dimmed and light up while speaking
    pub highlight_when_speaking: bool,
    /// Tint used while not speaking
    pub not_speaking_tint: Color,
    /// Initial position in world units
    pub position: Option<[f32; 3]>,
}

impl ActorMetadata {
    /// Metadata with defaults for the given kind
    pub fn new(kind: ActorKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Baked look direction, falling back to the kind's default
    pub fn baked_look_direction(&self) -> LookDirection {
        self.baked_look_direction
            .unwrap_or_else(|| self.kind.default_baked_look_direction())
    }

    /// Initial position, origin when unset
    pub fn initial_position(&self) -> Vec3 {
        self.position.map(Vec3::from).unwrap_or(Vec3::ZERO)
    }

    /// Whether `appearance` is known to this actor
    pub fn has_appearance(&self, appearance: &str) -> bool {
        self.appearances.is_empty() || self.appearances.iter().any(|a| a == appearance)
    }
}

impl Default for ActorMetadata {
    fn default() -> Self {
        Self {
            kind: ActorKind::Character,
            baked_look_direction: None,
            default_appearance: None,
            appearances: Vec::new(),
            highlight_when_speaking: false,
            not_speaking_tint: Color::GRAY,
            position: None,
        }
    }
}

/// Actor-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorsConfig {
    /// Transition duration in seconds when a command doesn't give one
    pub default_duration: f32,
    /// Easing used when a command doesn't give one (or gives an unknown one)
    pub default_easing: String,
    /// Re-arrange visible characters when one is shown without a position
    pub auto_arrange_on_add: bool,
    /// Reference resolution in pixels, used for scene-space positions
    pub reference_resolution: [u32; 2],
    /// Pixels per world unit
    pub pixels_per_unit: f32,
    /// Metadata keyed by actor ID
    pub metadata: HashMap<String, ActorMetadata>,
}

impl ActorsConfig {
    /// Default duration as a `Duration`
    ///
    /// Zero if the configured value can't be represented; `validate` rejects
    /// such values.
    pub fn default_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.default_duration.max(0.0)).unwrap_or_default()
    }

    /// Default easing, `Linear` if the configured name is unknown
    pub fn default_easing(&self) -> EasingType {
        self.default_easing.parse().unwrap_or_default()
    }

    /// Metadata for `id`, or character defaults
    pub fn metadata_for(&self, id: &str) -> ActorMetadata {
        self.metadata.get(id).cloned().unwrap_or_default()
    }

    /// Scene size in world units
    pub fn scene_size(&self) -> (f32, f32) {
        (
            self.reference_resolution[0] as f32 / self.pixels_per_unit,
            self.reference_resolution[1] as f32 / self.pixels_per_unit,
        )
    }

    /// Convert a scene-space value (percent, origin bottom-left) on `axis`
    /// to world units (origin at scene centre). The z axis passes through.
    pub fn scene_to_world(&self, axis: usize, percent: f32) -> f32 {
        let (width, height) = self.scene_size();
        match axis {
            0 => (percent / 100.0 - 0.5) * width,
            1 => (percent / 100.0 - 0.5) * height,
            _ => percent,
        }
    }
}

impl Default for ActorsConfig {
    fn default() -> Self {
        Self {
            default_duration: 0.35,
            default_easing: EasingType::Linear.name().to_string(),
            auto_arrange_on_add: true,
            reference_resolution: [1920, 1080],
            pixels_per_unit: 100.0,
            metadata: HashMap::new(),
        }
    }
}

/// Audio-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Voice volume (0.0 - 1.0)
    pub voice_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { voice_volume: 1.0 }
    }
}

/// Backlog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogConfig {
    /// Maximum number of messages kept; the oldest are dropped
    pub max_messages: usize,
}

impl Default for BacklogConfig {
    fn default() -> Self {
        Self { max_messages: 300 }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub actors: ActorsConfig,
    pub audio: AudioConfig,
    pub backlog: BacklogConfig,
}

impl StageConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: StageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded stage config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        let actors = &self.actors;
        if !(actors.pixels_per_unit > 0.0) {
            return Err(ConfigError::Validation(
                "actors.pixels_per_unit must be positive".to_string(),
            ));
        }
        if actors.reference_resolution.contains(&0) {
            return Err(ConfigError::Validation(
                "actors.reference_resolution must be non-zero".to_string(),
            ));
        }
        if !(actors.default_duration >= 0.0) {
            return Err(ConfigError::Validation(
                "actors.default_duration must not be negative".to_string(),
            ));
        }
        if Duration::try_from_secs_f32(actors.default_duration).is_err() {
            return Err(ConfigError::Validation(format!(
                "actors.default_duration {} is too large",
                actors.default_duration
            )));
        }
        if actors.default_easing.parse::<EasingType>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown actors.default_easing '{}'",
                actors.default_easing
            )));
        }
        if !(0.0..=1.0).contains(&self.audio.voice_volume) {
            return Err(ConfigError::Validation(
                "audio.voice_volume must be within 0..=1".to_string(),
            ));
        }
        if self.backlog.max_messages == 0 {
            return Err(ConfigError::Validation(
                "backlog.max_messages must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[actors]
default_duration = 0.5
default_easing = "easeOutQuad"
auto_arrange_on_add = false

[actors.metadata.Sora]
kind = "character"
baked_look_direction = "right"
default_appearance = "Default"
appearances = ["Default", "Happy"]
highlight_when_speaking = true
not_speaking_tint = "#808080"

[actors.metadata.Room]
kind = "background"

[backlog]
max_messages = 10
"##;

    #[test]
    fn test_parse_sample() {
        let config = StageConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.actors.default_duration(), Duration::from_millis(500));
        assert_eq!(config.actors.default_easing(), EasingType::EaseOutQuad);
        assert!(!config.actors.auto_arrange_on_add);
        assert_eq!(config.backlog.max_messages, 10);
        assert_eq!(config.audio.voice_volume, 1.0);

        let sora = config.actors.metadata_for("Sora");
        assert_eq!(sora.baked_look_direction(), LookDirection::Right);
        assert!(sora.has_appearance("Happy"));
        assert!(!sora.has_appearance("Angry"));
        assert!(sora.highlight_when_speaking);

        let room = config.actors.metadata_for("Room");
        assert_eq!(room.kind, ActorKind::Background);
        assert_eq!(room.baked_look_direction(), LookDirection::Center);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = StageConfig::from_toml_str("").unwrap();
        assert_eq!(config, StageConfig::default());
        assert!(config.actors.auto_arrange_on_add);

        let unknown = config.actors.metadata_for("Nobody");
        assert_eq!(unknown.kind, ActorKind::Character);
        assert!(unknown.has_appearance("anything"));
    }

    #[test]
    fn test_validation() {
        let err = StageConfig::from_toml_str("[actors]\npixels_per_unit = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = StageConfig::from_toml_str("[actors]\ndefault_easing = \"wobble\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = StageConfig::from_toml_str("[actors]\ndefault_duration = 1e20").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = StageConfig::from_toml_str("[actors]\ndefault_duration = inf").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = StageConfig::from_toml_str("[backlog]\nmax_messages = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = StageConfig::from_toml_str("[actors\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_scene_to_world() {
        let actors = ActorsConfig::default();
        assert_eq!(actors.scene_size(), (19.2, 10.8));
        assert!((actors.scene_to_world(0, 50.0)).abs() < 1e-5);
        assert!((actors.scene_to_world(0, 100.0) - 9.6).abs() < 1e-5);
        assert!((actors.scene_to_world(1, 0.0) + 5.4).abs() < 1e-5);
        assert_eq!(actors.scene_to_world(2, -1.0), -1.0);
    }
}
