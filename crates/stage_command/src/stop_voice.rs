//! Stop voice command

use async_trait::async_trait;
use stage_core::CancellationToken;

use crate::command::{Command, CommandContext, CommandPhase, CommandReport};

/// Stops the voice clip or sequence currently playing
#[derive(Debug, Clone, Default)]
pub struct StopVoice {
    wait: bool,
}

impl StopVoice {
    pub const NAME: &'static str = "stopVoice";

    pub fn new() -> Self {
        Self { wait: true }
    }

    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }
}

#[async_trait]
impl Command for StopVoice {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn wait(&self) -> bool {
        self.wait
    }

    async fn execute(&self, ctx: &CommandContext, _token: &CancellationToken) -> CommandReport {
        let mut report = CommandReport::new(Self::NAME, None);
        if !ctx.audio.stop_voice() {
            log::debug!("stopVoice: nothing playing");
        }
        report.enter(CommandPhase::Completed);
        report
    }
}
