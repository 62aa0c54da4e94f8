//! Script runner
//!
//! Executes commands in script order. Commands with `wait` set are awaited
//! before the next one is dispatched; the rest run in the background and are
//! joined before [`ScriptRunner::run`] returns. Each command is a failure
//! boundary: errors end up in its report and a panic turns into a `Failed`
//! report instead of taking the runner down.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use stage_core::CancellationToken;
use tokio::task::JoinHandle;

use crate::command::{Command, CommandContext, CommandPhase, CommandReport};
use crate::error::CommandError;

/// Runs lists of commands against one context
pub struct ScriptRunner {
    ctx: Arc<CommandContext>,
    token: CancellationToken,
}

impl ScriptRunner {
    /// Create a runner
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self {
            ctx,
            token: CancellationToken::new(),
        }
    }

    /// Token shared by every command this runner starts
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Stop dispatching and cancel running commands
    ///
    /// Cancellation is permanent for this runner.
    pub fn cancel(&self) {
        log::info!("Script runner cancelled");
        self.token.cancel();
    }

    /// Whether [`ScriptRunner::cancel`] was called
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `commands`, returning one report per command in script order
    ///
    /// Commands never dispatched because the runner was cancelled are
    /// reported as `Cancelled` with no issues.
    pub async fn run(&self, commands: Vec<Arc<dyn Command>>) -> Vec<CommandReport> {
        let mut reports: Vec<Option<CommandReport>> = vec![None; commands.len()];
        let mut background: Vec<(usize, Arc<dyn Command>, JoinHandle<CommandReport>)> = Vec::new();

        for (index, command) in commands.iter().enumerate() {
            if self.token.is_cancelled() {
                let mut skipped = CommandReport::new(command.name(), command.target().map(str::to_string));
                skipped.phase = CommandPhase::Cancelled;
                reports[index] = Some(skipped);
                continue;
            }

            if command.wait() {
                let report = run_contained(command.clone(), self.ctx.clone(), self.token.clone()).await;
                reports[index] = Some(report);
            } else {
                let handle = tokio::spawn(run_contained(
                    command.clone(),
                    self.ctx.clone(),
                    self.token.clone(),
                ));
                background.push((index, command.clone(), handle));
            }
        }

        for (index, command, handle) in background {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => CommandReport::failed(
                    command.name(),
                    command.target().map(str::to_string),
                    CommandError::Panicked(e.to_string()),
                ),
            };
            reports[index] = Some(report);
        }

        reports.into_iter().flatten().collect()
    }
}

/// Execute one command, turning a panic into a failed report
async fn run_contained(
    command: Arc<dyn Command>,
    ctx: Arc<CommandContext>,
    token: CancellationToken,
) -> CommandReport {
    let result = AssertUnwindSafe(command.execute(&ctx, &token))
        .catch_unwind()
        .await;
    match result {
        Ok(report) => {
            if !report.issues.is_empty() {
                log::debug!(
                    "{} finished {} with {} issue(s)",
                    command.name(),
                    report.phase,
                    report.issues.len()
                );
            }
            report
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("{} panicked: {}", command.name(), message);
            CommandReport::failed(
                command.name(),
                command.target().map(str::to_string),
                CommandError::Panicked(message),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
