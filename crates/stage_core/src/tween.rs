//! Async tween driver
//!
//! Every timed actor transition is a loop that advances once per frame,
//! feeds eased progress into a step callback and checks the command's
//! cancellation token between frames. A zero duration applies the final
//! value immediately.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::cancel::CancellationToken;
use crate::easing::EasingType;

/// Frame length used to advance tweens
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How a transition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionOutcome {
    /// The final value was reached
    Completed,
    /// The token fired first; the value is left wherever the tween stopped
    Cancelled,
}

impl TransitionOutcome {
    /// Whether the transition was cut short
    pub fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Drive `step` from eased progress 0 to 1 over `duration`
///
/// `step` receives the eased progress and is called at least once with `1.0`
/// unless the token is triggered while the visual portion is running. There
/// is no rollback on cancellation.
pub async fn tween<F>(
    duration: Duration,
    easing: EasingType,
    token: &CancellationToken,
    mut step: F,
) -> TransitionOutcome
where
    F: FnMut(f32) + Send,
{
    if duration.is_zero() {
        step(1.0);
        return TransitionOutcome::Completed;
    }
    if token.is_cancelled() {
        return TransitionOutcome::Cancelled;
    }

    let start = Instant::now();
    let total = duration.as_secs_f32();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return TransitionOutcome::Cancelled,
            _ = tokio::time::sleep(FRAME_INTERVAL) => {}
        }

        let t = (start.elapsed().as_secs_f32() / total).min(1.0);
        step(easing.apply(t));
        if t >= 1.0 {
            return TransitionOutcome::Completed;
        }
    }
}
