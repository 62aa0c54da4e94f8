//! Command errors

use stage_actor::ActorError;
use stage_core::ValueError;
use thiserror::Error;

/// Problems binding script parameters to a request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("Missing required parameter: {0}")]
    Missing(String),

    #[error("Unknown parameter: {0}")]
    Unknown(String),

    #[error("Invalid value for {parameter}: '{value}'")]
    Invalid { parameter: String, value: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl ParameterError {
    pub fn invalid(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Invalid {
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}

pub type ParameterResult<T> = Result<T, ParameterError>;

/// Issues raised while executing a command
///
/// `TargetNotFound` fails the command; the others are collected into the
/// command report while sibling transitions carry on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(ValueError),

    #[error("Resource missing: {0}")]
    ResourceMissing(String),

    #[error("Service not registered: {0}")]
    MissingService(String),

    #[error("Command panicked: {0}")]
    Panicked(String),

    #[error("Actor error: {0}")]
    Actor(ActorError),
}

impl From<ActorError> for CommandError {
    fn from(error: ActorError) -> Self {
        match error {
            ActorError::NotFound(id) => Self::TargetNotFound(id),
            ActorError::ResourceMissing { actor, resource } => {
                Self::ResourceMissing(format!("{}/{}", actor, resource))
            }
            ActorError::Value(value) => Self::UnsupportedValue(value),
            other => Self::Actor(other),
        }
    }
}

impl From<ValueError> for CommandError {
    fn from(error: ValueError) -> Self {
        Self::UnsupportedValue(error)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
