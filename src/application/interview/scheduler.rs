//! Cancellable delayed continuation.
//!
//! After an answer is committed the next question is generated only after a
//! short pacing delay. The delay is an explicit value that can be cancelled,
//! either directly or through the session's shutdown token.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// A continuation scheduled to run once its deadline passes.
#[derive(Debug)]
pub struct ScheduledContinuation {
    deadline: Instant,
    token: CancellationToken,
}

impl ScheduledContinuation {
    /// Schedules a continuation `delay` from now. Cancelling `parent` also
    /// cancels the continuation.
    pub fn schedule(delay: Duration, parent: &CancellationToken) -> Self {
        Self {
            deadline: Instant::now() + delay,
            token: parent.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Time left until the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Waits for the deadline. Returns `false` if cancelled first.
    pub async fn wait(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = sleep_until(self.deadline) => !self.token.is_cancelled(),
        }
    }
}
