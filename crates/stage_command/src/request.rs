//! Modification requests
//!
//! A [`ModificationRequest`] describes one "change this actor" script line.
//! It is built once, either with the `with_*` builder or by binding already
//! tokenised parameters with [`ModificationRequest::from_params`], and only
//! read afterwards.
//!
//! ## Parameters
//!
//! | name       | value                                   |
//! |------------|-----------------------------------------|
//! | (nameless) | `Id` or `Id.Appearance`                 |
//! | `look`     | `left`, `right` or `center`             |
//! | `avatar`   | avatar path, or `none` to remove it     |
//! | `pos`      | scene position in percent, `x,y,z`      |
//! | `position` | world position, `x,y,z`                 |
//! | `visible`  | `true` / `false`                        |
//! | `tint`     | `#RRGGBB[AA]` or a color name           |
//! | `time`     | duration in seconds                     |
//! | `easing`   | easing name                             |
//! | `wait`     | `true` / `false`                        |
//!
//! Vector components may be left empty: `pos:,,0` only sets z.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stage_core::{PartialPosition, ValueError, ValueResult};

use crate::error::{ParameterError, ParameterResult};

/// One parsed actor modification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationRequest {
    /// Target actor ID
    pub id: String,
    /// Appearance to switch to
    pub appearance: Option<String>,
    /// Raw look-direction value; validated when the command runs
    pub look: Option<String>,
    /// Avatar override; `none` removes the avatar
    pub avatar: Option<String>,
    /// World position, per axis
    pub position: PartialPosition,
    /// Scene position in percent, per axis
    pub scene_position: PartialPosition,
    /// Show or hide the actor
    pub visible: Option<bool>,
    /// Raw tint value; validated when the command runs
    pub tint: Option<String>,
    /// Transition duration in seconds
    pub duration: Option<f32>,
    /// Raw easing name; validated when the command runs
    pub easing: Option<String>,
    /// Whether the script waits for this command to finish
    pub wait: bool,
}

/// Split the nameless `Id.Appearance` value on the first `.`
pub fn split_target(value: &str) -> (&str, Option<&str>) {
    match value.split_once('.') {
        Some((id, appearance)) if !appearance.trim().is_empty() => (id.trim(), Some(appearance.trim())),
        Some((id, _)) => (id.trim(), None),
        None => (value.trim(), None),
    }
}

fn parse_bool(parameter: &str, value: &str) -> ParameterResult<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ParameterError::invalid(parameter, value))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ModificationRequest {
    /// Request targeting `id` that changes nothing yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            wait: true,
            ..Default::default()
        }
    }

    /// Bind tokenised script parameters
    pub fn from_params(params: &HashMap<String, String>) -> ParameterResult<Self> {
        let target = params
            .get("")
            .ok_or_else(|| ParameterError::Missing("id".to_string()))?;
        let (id, appearance) = split_target(target);
        if id.is_empty() {
            return Err(ParameterError::Missing("id".to_string()));
        }

        let mut request = Self::new(id);
        request.appearance = appearance.map(str::to_string);

        for (name, value) in params {
            match name.as_str() {
                "" => {}
                "look" => request.look = non_blank(value),
                "avatar" => request.avatar = non_blank(value),
                "tint" => request.tint = non_blank(value),
                "easing" => request.easing = non_blank(value),
                "pos" => request.scene_position = PartialPosition::parse(name, value)?,
                "position" => request.position = PartialPosition::parse(name, value)?,
                "visible" => request.visible = Some(parse_bool(name, value)?),
                "wait" => request.wait = parse_bool(name, value)?,
                "time" => {
                    let seconds: f32 = value
                        .trim()
                        .parse()
                        .map_err(|_| ParameterError::invalid(name, value))?;
                    if !(seconds >= 0.0) || Duration::try_from_secs_f32(seconds).is_err() {
                        return Err(ParameterError::invalid(name, value));
                    }
                    request.duration = Some(seconds);
                }
                other => return Err(ParameterError::Unknown(other.to_string())),
            }
        }

        Ok(request)
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = Some(appearance.into());
        self
    }

    pub fn with_look(mut self, look: impl Into<String>) -> Self {
        self.look = Some(look.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_position(mut self, position: PartialPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_scene_position(mut self, position: PartialPosition) -> Self {
        self.scene_position = position;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_tint(mut self, tint: impl Into<String>) -> Self {
        self.tint = Some(tint.into());
        self
    }

    /// Duration in seconds
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Whether any position axis (world or scene) is given
    pub fn has_position(&self) -> bool {
        !self.position.is_empty() || !self.scene_position.is_empty()
    }

    /// Requested duration, if any
    ///
    /// Fails for values no `Duration` can hold (NaN, infinite or too large).
    pub fn duration(&self) -> ValueResult<Option<Duration>> {
        self.duration
            .map(|seconds| {
                let clamped = if seconds < 0.0 { 0.0 } else { seconds };
                Duration::try_from_secs_f32(clamped)
                    .map_err(|_| ValueError::invalid_number("time", seconds.to_string()))
            })
            .transpose()
    }
}
