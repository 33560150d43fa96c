//! Debouncing: coalesce bursts of calls into one delayed action
//!
//! Two flavours share the same semantics (each call restarts the quiet
//! period, and the action receives the most recent call's arguments):
//! - [`Debounce`] is driven by explicit instants, for the page event loop.
//! - [`debounce`] wraps an action in a [`Debounced`] handle backed by tokio
//!   timers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::warn;

/// Clock-driven debouncer
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    wait: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounce<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Record a call at `now`, replacing any pending arguments
    pub fn call(&mut self, args: T, now: Instant) {
        self.pending = Some((now + self.wait, args));
    }

    /// When the pending call is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending arguments once the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.pending.take().map(|(_, args)| args)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

type Action<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Handle returned by [`debounce`]
pub struct Debounced<T> {
    action: Action<T>,
    wait: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Wrap `action` so it only runs after `wait` passes without another call.
///
/// Calls must be made from within a tokio runtime.
pub fn debounce<T, F>(action: F, wait: Duration) -> Debounced<T>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    Debounced {
        action: Arc::new(action),
        wait,
        pending: Mutex::new(None),
    }
}

impl<T: Send + 'static> Debounced<T> {
    pub fn call(&self, args: T) {
        let Ok(mut pending) = self.pending.lock() else {
            warn!("Debounce state poisoned, dropping call");
            return;
        };
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let action = Arc::clone(&self.action);
        let wait = self.wait;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            action(args);
        }));
    }

    /// Drop the pending call, if any
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

impl<T> Drop for Debounced<T> {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_debounce_keeps_last_args() {
        let mut debounce = Debounce::new(Duration::from_millis(100));
        let start = Instant::now();
        for i in 0..5u64 {
            debounce.call(i, start + Duration::from_millis(i * 20));
        }
        // Last call at 80ms, due at 180ms.
        assert_eq!(debounce.poll(start + Duration::from_millis(179)), None);
        assert_eq!(debounce.poll(start + Duration::from_millis(180)), Some(4));
        assert_eq!(debounce.poll(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_clock_debounce_cancel() {
        let mut debounce = Debounce::new(Duration::from_millis(100));
        let start = Instant::now();
        debounce.call("x", start);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(start + Duration::from_secs(1)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_calls_fire_once_with_last_args() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            move |value: u32| sink.lock().unwrap().push(value),
            Duration::from_millis(100),
        );

        for value in 1..=5 {
            debounced.call(value);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(*calls.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            move |value: &'static str| sink.lock().unwrap().push(value),
            Duration::from_millis(100),
        );

        debounced.call("first");
        tokio::time::sleep(Duration::from_millis(150)).await;
        debounced.call("second");
        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let calls = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            move |_: ()| *sink.lock().unwrap() += 1,
            Duration::from_millis(100),
        );

        debounced.call(());
        debounced.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_call() {
        let calls = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            move |_: ()| *sink.lock().unwrap() += 1,
            Duration::from_millis(100),
        );

        debounced.call(());
        drop(debounced);
        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;

        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
