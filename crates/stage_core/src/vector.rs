//! Positions and per-axis partial positions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// A 3D position in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Origin
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Component array
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A position where each axis may be left unspecified
///
/// Scripts write these as comma separated lists where empty components are
/// unset: `45,10` sets x and y, `,,-1` only sets z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialPosition {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl PartialPosition {
    /// Create from optional components
    pub fn new(x: Option<f32>, y: Option<f32>, z: Option<f32>) -> Self {
        Self { x, y, z }
    }

    /// A position with every axis set
    pub fn full(position: Vec3) -> Self {
        Self::new(Some(position.x), Some(position.y), Some(position.z))
    }

    /// Whether no axis is set
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Fill unset axes from `base`
    pub fn resolve(&self, base: Vec3) -> Vec3 {
        Vec3 {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            z: self.z.unwrap_or(base.z),
        }
    }

    /// Overlay the axes set in `other` on top of this one
    pub fn merge(&self, other: &PartialPosition) -> PartialPosition {
        PartialPosition {
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            z: other.z.or(self.z),
        }
    }

    /// Map every set axis through `f`, passing the axis index
    pub fn map(&self, f: impl Fn(usize, f32) -> f32) -> PartialPosition {
        PartialPosition {
            x: self.x.map(|v| f(0, v)),
            y: self.y.map(|v| f(1, v)),
            z: self.z.map(|v| f(2, v)),
        }
    }

    /// Parse a comma separated list of up to three optional numbers
    pub fn parse(parameter: &str, value: &str) -> ValueResult<Self> {
        let parts: Vec<&str> = value.split(',').collect();
        if parts.len() > 3 {
            return Err(ValueError::unsupported(parameter, value));
        }

        let mut axes = [None; 3];
        for (axis, part) in parts.iter().enumerate() {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let number = part
                .parse::<f32>()
                .map_err(|_| ValueError::invalid_number(parameter, value))?;
            axes[axis] = Some(number);
        }

        Ok(Self::new(axes[0], axes[1], axes[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, -10.0, 2.0);
        assert_eq!(a.lerp(b, 0.5), Vec3::new(5.0, -5.0, 1.0));
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_parse_partial() {
        let pos = PartialPosition::parse("pos", "45,10").unwrap();
        assert_eq!(pos, PartialPosition::new(Some(45.0), Some(10.0), None));

        let pos = PartialPosition::parse("pos", ",,-1").unwrap();
        assert_eq!(pos, PartialPosition::new(None, None, Some(-1.0)));

        let pos = PartialPosition::parse("pos", "50,0,-1").unwrap();
        assert_eq!(pos, PartialPosition::new(Some(50.0), Some(0.0), Some(-1.0)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            PartialPosition::parse("pos", "a,b"),
            Err(ValueError::InvalidNumber { .. })
        ));
        assert!(matches!(
            PartialPosition::parse("pos", "1,2,3,4"),
            Err(ValueError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_resolve_and_merge() {
        let base = Vec3::new(1.0, 2.0, 3.0);
        let partial = PartialPosition::new(None, Some(5.0), None);
        assert_eq!(partial.resolve(base), Vec3::new(1.0, 5.0, 3.0));

        let merged = partial.merge(&PartialPosition::new(Some(9.0), Some(7.0), None));
        assert_eq!(merged, PartialPosition::new(Some(9.0), Some(7.0), None));
        assert!(PartialPosition::default().is_empty());
        assert!(!merged.is_empty());
    }
}
