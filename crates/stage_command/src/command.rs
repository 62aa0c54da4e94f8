//! Command trait, execution context and reports

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stage_actor::ActorManager;
use stage_core::CancellationToken;
use stage_services::{AudioService, ServiceRegistry};

use crate::error::{CommandError, CommandResult};

/// Where a command is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandPhase {
    /// Not started
    Pending,
    /// Looking up the target and resolving parameters
    Resolving,
    /// Running transitions
    Applying,
    /// Every transition finished
    Completed,
    /// At least one transition observed cancellation
    Cancelled,
    /// The command could not run
    Failed,
}

impl CommandPhase {
    /// Whether the command has finished, one way or another
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What happened when a command ran
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    /// Command name
    pub command: String,
    /// Target actor, if the command has one
    pub target: Option<String>,
    /// Final (or current) phase
    pub phase: CommandPhase,
    /// Non-fatal issues and the fatal one, if any
    pub issues: Vec<CommandError>,
}

impl CommandReport {
    /// A pending report
    pub fn new(command: impl Into<String>, target: Option<String>) -> Self {
        Self {
            command: command.into(),
            target,
            phase: CommandPhase::Pending,
            issues: Vec::new(),
        }
    }

    /// A report for a command that failed with `error`
    pub fn failed(command: impl Into<String>, target: Option<String>, error: CommandError) -> Self {
        let mut report = Self::new(command, target);
        report.fail(error);
        report
    }

    /// Move to `phase`
    pub fn enter(&mut self, phase: CommandPhase) {
        log::debug!(
            "{}{}: {} -> {}",
            self.command,
            self.target.as_deref().map(|t| format!(" {}", t)).unwrap_or_default(),
            self.phase,
            phase
        );
        self.phase = phase;
    }

    /// Record a non-fatal issue
    pub fn push_issue(&mut self, issue: CommandError) {
        self.issues.push(issue);
    }

    /// Record a fatal error and mark the command failed
    pub fn fail(&mut self, error: CommandError) {
        self.issues.push(error);
        self.phase = CommandPhase::Failed;
    }

    pub fn is_completed(&self) -> bool {
        self.phase == CommandPhase::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == CommandPhase::Cancelled
    }

    pub fn is_failed(&self) -> bool {
        self.phase == CommandPhase::Failed
    }
}

/// Services a command runs against
#[derive(Clone)]
pub struct CommandContext {
    pub actors: Arc<ActorManager>,
    pub audio: Arc<AudioService>,
}

impl CommandContext {
    /// Create a context from service handles
    pub fn new(actors: Arc<ActorManager>, audio: Arc<AudioService>) -> Self {
        Self { actors, audio }
    }

    /// Look the services up in a registry
    pub fn from_registry(registry: &ServiceRegistry) -> CommandResult<Self> {
        let actors = registry
            .find::<ActorManager>()
            .ok_or_else(|| CommandError::MissingService("actors".to_string()))?;
        let audio = registry
            .find::<AudioService>()
            .ok_or_else(|| CommandError::MissingService("audio".to_string()))?;
        Ok(Self::new(actors, audio))
    }
}

/// A script command
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// Command name, for reports and logs
    fn name(&self) -> &str;

    /// Target actor, if any
    fn target(&self) -> Option<&str> {
        None
    }

    /// Whether the runner waits for this command before dispatching the next
    fn wait(&self) -> bool {
        true
    }

    /// Run the command
    ///
    /// Never fails: every problem ends up in the report.
    async fn execute(&self, ctx: &CommandContext, token: &CancellationToken) -> CommandReport;
}
