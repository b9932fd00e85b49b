//! Run-scoped cancellation signal.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// Signals a running review that its consumer went away.
///
/// The first recorded reason sticks; later calls to [`cancel`](Self::cancel)
/// are ignored. The runner polls [`is_cancelled`](Self::is_cancelled) before
/// each stage and awaits [`cancelled`](Self::cancelled) alongside the
/// in-flight one.
#[derive(Default)]
pub struct CancellationToken {
    flag: AtomicBool,
    reason: Mutex<Option<String>>,
    wake: Notify,
}

impl CancellationToken {
    /// Creates a token that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token. Returns `true` if this call was the one that fired it.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        if self.flag.swap(true, Ordering::AcqRel) {
            return false;
        }
        let reason = reason.into();
        debug!(reason = %reason, "Review cancelled");
        *self.reason.lock() = Some(reason);
        self.wake.notify_waiters();
        true
    }

    /// Whether the token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Reason recorded by the first [`cancel`](Self::cancel) call.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }

    /// Resolves once the token fires.
    pub async fn cancelled(&self) {
        loop {
            // Register interest before reading the flag.
            let notified = self.wake.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CancellationToken")
            .field(&self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_fresh_token_is_live() {
        let token = CancellationToken::new();

        assert!(!token.is_cancelled());
        assert_eq!(token.reason(), None);
    }

    #[test]
    fn test_first_reason_sticks() {
        let token = CancellationToken::new();

        assert!(token.cancel("client disconnected"));
        assert!(!token.cancel("shutdown"));
        assert!(token.is_cancelled());
        assert_eq!(token.reason().as_deref(), Some("client disconnected"));
    }

    #[tokio::test]
    async fn test_waiters_released_before_and_after_firing() {
        let token = Arc::new(CancellationToken::new());
        let early = tokio::spawn({
            let token = Arc::clone(&token);
            async move { token.cancelled().await }
        });

        tokio::task::yield_now().await;
        token.cancel("client disconnected");

        tokio::time::timeout(Duration::from_secs(1), early)
            .await
            .unwrap()
            .unwrap();
        tokio::time::timeout(Duration::from_millis(50), token.cancelled())
            .await
            .unwrap();
    }
}
