//! Caller context: optional deadline plus cancellation

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{SdkError, SdkResult};

/// Deadline and cancellation signal carried through every network operation
///
/// Cloning shares the cancellation signal. [`CallContext::child_with_timeout`]
/// derives a context that is cancelled with its parent and never outlives
/// the parent's deadline.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl CallContext {
    /// No deadline, never cancelled unless [`CallContext::cancel`] is called
    pub fn background() -> Self {
        Self {
            deadline: None,
            token: CancellationToken::new(),
        }
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Absolute deadline
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Child context whose deadline is the earlier of the parent's and `now + timeout`
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            token: self.token.child_token(),
        }
    }

    /// Child context sharing the parent's deadline, or `fallback` from now if it has none
    pub fn or_timeout(&self, fallback: Duration) -> Self {
        match self.deadline {
            Some(deadline) => Self {
                deadline: Some(deadline),
                token: self.token.child_token(),
            },
            None => self.child_with_timeout(fallback),
        }
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline (zero once passed)
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Cancel this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`CallContext::cancel`] was called here or on a parent
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail fast if the context is already finished
    pub fn check(&self) -> SdkResult<()> {
        if self.token.is_cancelled() {
            return Err(SdkError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SdkError::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Resolves once the context is cancelled or its deadline passes
    ///
    /// Yields the matching error; never resolves for a background context
    /// that is not cancelled.
    pub async fn done(&self) -> SdkError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => SdkError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => SdkError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                SdkError::Cancelled
            }
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}
