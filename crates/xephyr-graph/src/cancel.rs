//! Cancellation and deadline signal checked between engine phases.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A cooperative stop signal.
///
/// Engine operations call [`CancelSignal::check`] between major phases
/// (graph construction, sorting, forward pass, backward pass). They never
/// check mid-phase.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never fires unless [`CancelSignal::cancel`] is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one owned by a request handler.
    #[must_use]
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Builder-style deadline, relative to now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Builder-style optional deadline.
    #[must_use]
    pub fn with_optional_timeout(self, timeout: Option<Duration>) -> Self {
        match timeout {
            Some(timeout) => self.with_timeout(timeout),
            None => self,
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the token was cancelled or the deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Return `Error::Cancelled` if the signal has fired.
    pub fn check(&self, phase: &'static str) -> Result<()> {
        if self.is_cancelled() {
            tracing::debug!(phase, "Engine computation cancelled");
            return Err(Error::Cancelled { phase });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_signal_passes() {
        let signal = CancelSignal::new();
        assert!(signal.check("build").is_ok());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let signal = CancelSignal::new();
        let handle = signal.clone();
        handle.cancel();

        let err = signal.check("sort").unwrap_err();
        assert!(matches!(err, Error::Cancelled { phase: "sort" }));
    }

    #[test]
    fn test_expired_deadline_fires() {
        let signal = CancelSignal::new().with_timeout(Duration::ZERO);
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_no_timeout_leaves_signal_open() {
        let signal = CancelSignal::new().with_optional_timeout(None);
        assert!(!signal.is_cancelled());
    }
}
