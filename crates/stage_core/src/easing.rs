//! Easing curves for timed transitions

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Easing function applied to the normalized progress of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EasingType {
    /// Constant speed
    #[default]
    Linear,
    /// Hermite smooth step
    SmoothStep,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
}

impl EasingType {
    /// All supported easing types
    pub const ALL: [EasingType; 11] = [
        Self::Linear,
        Self::SmoothStep,
        Self::EaseInSine,
        Self::EaseOutSine,
        Self::EaseInOutSine,
        Self::EaseInQuad,
        Self::EaseOutQuad,
        Self::EaseInOutQuad,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
    ];

    /// Map normalized progress `t` (clamped to 0..=1) through the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInSine => 1.0 - ((t * PI) / 2.0).cos(),
            Self::EaseOutSine => ((t * PI) / 2.0).sin(),
            Self::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }

    /// Script-facing name
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::SmoothStep => "smoothStep",
            Self::EaseInSine => "easeInSine",
            Self::EaseOutSine => "easeOutSine",
            Self::EaseInOutSine => "easeInOutSine",
            Self::EaseInQuad => "easeInQuad",
            Self::EaseOutQuad => "easeOutQuad",
            Self::EaseInOutQuad => "easeInOutQuad",
            Self::EaseInCubic => "easeInCubic",
            Self::EaseOutCubic => "easeOutCubic",
            Self::EaseInOutCubic => "easeInOutCubic",
        }
    }
}

impl fmt::Display for EasingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EasingType {
    type Err = ValueError;

    /// Case-insensitive lookup by script name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|easing| easing.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValueError::unsupported("easing", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in EasingType::ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing} at 1");
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(EasingType::Linear.apply(-1.0), 0.0);
        assert_eq!(EasingType::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("EASEINQUAD".parse::<EasingType>().unwrap(), EasingType::EaseInQuad);
        assert_eq!(" smoothstep ".parse::<EasingType>().unwrap(), EasingType::SmoothStep);
        assert!("bounce".parse::<EasingType>().is_err());
    }

    #[test]
    fn test_smooth_step_midpoint() {
        assert!((EasingType::SmoothStep.apply(0.5) - 0.5).abs() < 1e-5);
        assert!(EasingType::EaseInQuad.apply(0.5) < 0.5);
        assert!(EasingType::EaseOutQuad.apply(0.5) > 0.5);
    }
}
