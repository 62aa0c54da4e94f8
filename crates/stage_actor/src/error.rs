//! Actor errors

use stage_core::ValueError;
use thiserror::Error;

/// Actor errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActorError {
    #[error("Actor not found: {0}")]
    NotFound(String),

    #[error("Actor already exists: {0}")]
    AlreadyExists(String),

    #[error("Resource missing for actor {actor}: {resource}")]
    ResourceMissing { actor: String, resource: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl ActorError {
    /// Missing resource (appearance, avatar) for `actor`
    pub fn resource_missing(actor: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::ResourceMissing {
            actor: actor.into(),
            resource: resource.into(),
        }
    }
}

pub type ActorResult<T> = Result<T, ActorError>;
