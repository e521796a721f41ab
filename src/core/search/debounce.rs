//! Trailing-edge debounce on the tokio timer.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

/// Delays work until `delay` has passed without another call.
///
/// Each [`call`](Debouncer::call) cancels the previously scheduled task if
/// it is still waiting out its delay, so only the most recent one runs.
/// Work that has already started is never interrupted; stale results from
/// it are handled by the catalog ticket.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<oneshot::Sender<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `work`, replacing anything still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let (cancel_tx, cancel_rx) = oneshot::channel();

        tokio::spawn(async move {
            // Cancellation only races the delay; once the timer wins, the
            // work runs to completion.
            tokio::select! {
                _ = tokio::time::sleep(delay) => work.await,
                _ = cancel_rx => {}
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        // Dropping the previous sender resolves its receiver.
        pending.replace(cancel_tx);
    }

    /// Drop any scheduled work that has not started yet.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_coalesce_to_latest() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=5 {
            let runs = Arc::clone(&runs);
            let last = Arc::clone(&last);
            debouncer.call(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let runs = Arc::clone(&runs);
            debouncer.call(async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_work_survives_later_call() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let finished = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&finished);
        debouncer.call(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // First task is now inside its work, not its delay.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let counter = Arc::clone(&finished);
        debouncer.call(async move {
            counter.fetch_add(10, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_debouncer_cancels_waiting_work() {
        let runs = Arc::new(AtomicUsize::new(0));
        {
            let debouncer = Debouncer::new(Duration::from_millis(50));
            let counter = Arc::clone(&runs);
            debouncer.call(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        debouncer.call(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
