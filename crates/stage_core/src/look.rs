//! Look directions and actor kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Direction an actor faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookDirection {
    #[default]
    Left,
    Center,
    Right,
}

impl LookDirection {
    /// Parse an optional script value
    ///
    /// A missing or blank value means "don't change" and yields `Ok(None)`;
    /// `left`, `right` and `center` are accepted in any case; anything else
    /// is an unsupported value.
    pub fn parse_optional(value: Option<&str>) -> Result<Option<LookDirection>, ValueError> {
        match value {
            None => Ok(None),
            Some(v) if v.trim().is_empty() => Ok(None),
            Some(v) => v.parse().map(Some),
        }
    }

    /// Script-facing name
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for LookDirection {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("left") {
            Ok(Self::Left)
        } else if value.eq_ignore_ascii_case("right") {
            Ok(Self::Right)
        } else if value.eq_ignore_ascii_case("center") {
            Ok(Self::Center)
        } else {
            Err(ValueError::unsupported("look", s))
        }
    }
}

impl fmt::Display for LookDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Actor variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    #[default]
    Character,
    Background,
    Prop,
}

impl ActorKind {
    /// Look direction baked into the art when metadata doesn't say otherwise
    pub fn default_baked_look_direction(self) -> LookDirection {
        match self {
            Self::Character | Self::Prop => LookDirection::Left,
            Self::Background => LookDirection::Center,
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Background => write!(f, "background"),
            Self::Prop => write!(f, "prop"),
        }
    }
}
