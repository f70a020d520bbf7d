//! Keep-alive accounting for in-flight handler work.
//!
//! Lifecycle and fetch handlers hold a [`WorkGuard`] for the duration of
//! their asynchronous work; the guard is released on drop, including on
//! failure. The host waits on [`KeepAlive::idle`] before tearing the
//! worker down so batch operations are never cut short.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    notify: Notify,
}

/// Counter of outstanding handler invocations.
#[derive(Debug, Clone, Default)]
pub struct KeepAlive {
    inner: Arc<Inner>,
}

impl KeepAlive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one handler invocation as in flight.
    pub fn hold(&self) -> WorkGuard {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        WorkGuard { inner: Arc::clone(&self.inner) }
    }

    /// Number of handlers currently in flight.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Wait until no handler work is in flight.
    pub async fn idle(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.inner.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// RAII guard for one in-flight handler invocation.
#[derive(Debug)]
pub struct WorkGuard {
    inner: Arc<Inner>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_hold_and_release() {
        let keep_alive = KeepAlive::new();
        assert_eq!(keep_alive.pending(), 0);

        let guard = keep_alive.hold();
        let second = keep_alive.hold();
        assert_eq!(keep_alive.pending(), 2);

        drop(guard);
        assert_eq!(keep_alive.pending(), 1);
        drop(second);
        assert_eq!(keep_alive.pending(), 0);
    }

    #[tokio::test]
    async fn test_idle_returns_immediately_when_unused() {
        let keep_alive = KeepAlive::new();
        tokio::time::timeout(Duration::from_millis(100), keep_alive.idle())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_idle_waits_for_guard_release() {
        let keep_alive = KeepAlive::new();
        let guard = keep_alive.hold();

        let waiter = {
            let keep_alive = keep_alive.clone();
            tokio::spawn(async move { keep_alive.idle().await })
        };

        // Still held: idle must not have completed.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_millis(500), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
