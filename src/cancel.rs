//! Cancellation signals for in-flight requests.

use std::sync::Arc;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// A CancelSource is the owning half of a cancellation signal.  It hands out
/// [`CancelToken`]s that can be attached to a request, and carries the trigger
/// that aborts whatever the token is attached to.
///
/// Triggering is idempotent and safe at any time; triggering after the
/// attached request has already completed has no observable effect.
#[derive(Debug, Default)]
pub struct CancelSource {
    token: CancelToken,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a token for this source, suitable for
    /// [`RequestOptions::cancel_token`](crate::RequestOptions::cancel_token).
    /// All tokens from one source observe the same trigger.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Request abort of whatever this source's tokens are attached to.
    pub fn cancel(&self) {
        self.token.trigger(None);
    }

    /// As [`cancel`](CancelSource::cancel), recording a reason that will be
    /// carried on the resulting `Cancelled` outcome.  The first reason
    /// supplied for a source wins.
    pub fn cancel_with_reason<S: Into<String>>(&self, reason: S) {
        self.token.trigger(Some(reason.into()));
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// The observing half of a cancellation signal.  A token is attached to at
/// most one request execution; the executor races it against the network
/// call and reports abort when it fires first.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl CancelToken {
    /// True once the signal has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Wait until the signal is triggered.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }

    /// The reason recorded when the signal was triggered, if any.
    pub fn reason(&self) -> Option<String> {
        self.reason.get().cloned()
    }

    // Tokens only observe; the public trigger sides are CancelSource and
    // CancelHandle.
    pub(crate) fn trigger(&self, reason: Option<String>) {
        if let Some(reason) = reason {
            let _ = self.reason.set(reason);
        }
        self.inner.cancel();
    }
}

/// The cancellation routine for one [`RequestTask`](crate::RequestTask),
/// returned by [`cancel_handle`](crate::RequestTask::cancel_handle).  It
/// triggers the token that is actually attached to the task's request, so
/// cancelling through the handle and cancelling through a caller-held
/// [`CancelSource`] are observably equivalent.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancelToken,
}

impl CancelHandle {
    pub(crate) fn new(token: CancelToken) -> Self {
        Self { token }
    }

    /// Request abort of the task's request.  Idempotent; a no-op once the
    /// task has settled.
    pub fn cancel(&self) {
        self.token.trigger(None);
    }

    /// As [`cancel`](CancelHandle::cancel), with a reason string.
    pub fn cancel_with_reason<S: Into<String>>(&self, reason: S) {
        self.token.trigger(Some(reason.into()));
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
