//! Service trait and core types
//!
//! Defines the base Service trait that all long-lived Stage managers implement.
//! Services are shared behind `Arc` between concurrently running commands, so
//! every method takes `&self` and keeps its mutable state behind locks.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a new service ID
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the service name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
    /// Service is not running
    Stopped,
    /// Service is starting up
    Starting,
    /// Service is running
    Running,
    /// Service is stopping
    Stopping,
    /// Service has failed
    Failed,
}

impl ServiceState {
    /// Check if service is operational
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Check if service is in transition
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    /// Whether the lifecycle allows moving from `self` to `to`
    pub fn can_transition_to(&self, to: ServiceState) -> bool {
        use ServiceState::*;
        matches!(
            (self, to),
            (Stopped | Failed, Starting)
                | (Starting, Running | Failed)
                | (Running, Stopping | Failed)
                | (Stopping, Stopped | Failed)
        )
    }
}

/// Service health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Current state
    pub state: ServiceState,
    /// Health score (0.0 = dead, 1.0 = perfect)
    pub health_score: f32,
    /// Last error message if any
    pub last_error: Option<String>,
    /// Additional metrics
    pub metrics: HashMap<String, f64>,
}

impl Default for ServiceHealth {
    fn default() -> Self {
        Self {
            state: ServiceState::Stopped,
            health_score: 0.0,
            last_error: None,
            metrics: HashMap::new(),
        }
    }
}

impl ServiceHealth {
    /// Create a healthy status
    pub fn healthy() -> Self {
        Self {
            state: ServiceState::Running,
            health_score: 1.0,
            ..Default::default()
        }
    }

    /// Create a failed status
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            state: ServiceState::Failed,
            health_score: 0.0,
            last_error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Attach a metric
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }
}

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service not found: {0}")]
    NotFound(String),

    #[error("Service already exists: {0}")]
    AlreadyExists(String),

    #[error("Service not running: {0}")]
    NotRunning(String),

    #[error("Service type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition { from: ServiceState, to: ServiceState },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Lifecycle state holder shared by service implementations
#[derive(Debug)]
pub struct ServiceStatus {
    state: RwLock<ServiceState>,
}

impl ServiceStatus {
    /// Create a stopped status
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ServiceState::Stopped),
        }
    }

    /// Current state
    pub fn get(&self) -> ServiceState {
        *self.state.read()
    }

    /// Move to `to`, rejecting transitions the lifecycle does not allow
    pub fn transition(&self, to: ServiceState) -> ServiceResult<()> {
        let mut state = self.state.write();
        if !state.can_transition_to(to) {
            return Err(ServiceError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    /// Run Stopped -> Starting -> Running
    pub fn start(&self) -> ServiceResult<()> {
        self.transition(ServiceState::Starting)?;
        self.transition(ServiceState::Running)
    }

    /// Run Running -> Stopping -> Stopped
    pub fn stop(&self) -> ServiceResult<()> {
        self.transition(ServiceState::Stopping)?;
        self.transition(ServiceState::Stopped)
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Base trait for all services
pub trait Service: Send + Sync + 'static {
    /// Get the service ID
    fn id(&self) -> &ServiceId;

    /// Get current state
    fn state(&self) -> ServiceState;

    /// Get health status
    fn health(&self) -> ServiceHealth;

    /// Start the service
    fn start(&self) -> ServiceResult<()>;

    /// Stop the service
    fn stop(&self) -> ServiceResult<()>;

    /// Restart the service
    fn restart(&self) -> ServiceResult<()> {
        self.stop()?;
        self.start()
    }

    /// Type erasure for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Shared type erasure for downcasting into `Arc<T>`
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
