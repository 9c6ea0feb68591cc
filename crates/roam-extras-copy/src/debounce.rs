use std::time::Duration;

use tokio::task::JoinHandle;

/// Single-slot deferred task. Scheduling again before the delay elapses
/// cancels the pending run and restarts the delay, so a burst of requests
/// produces one run, `delay` after the last request.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, run: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            run();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let shared = runs.clone();
        let make = move || {
            let shared = shared.clone();
            Box::new(move || {
                shared.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (runs, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_after_last_request() {
        let (runs, make) = counter();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for _ in 0..5 {
            debouncer.schedule(make());
            sleep(Duration::from_millis(100)).await;
        }
        // Last request was 100ms ago.
        sleep(Duration::from_millis(199)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_requests_each_run() {
        let (runs, make) = counter();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(make());
        sleep(Duration::from_millis(301)).await;
        debouncer.schedule(make());
        sleep(Duration::from_millis(301)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_discard_pending_run() {
        let (runs, make) = counter();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(make());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        debouncer.schedule(make());
        drop(debouncer);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
