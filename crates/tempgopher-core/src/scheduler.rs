//! Periodic refresh timer.
//!
//! [`PollScheduler`] owns at most one recurring timer. Starting it again
//! replaces the running timer, so ticks never overlap.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle of a running timer.
#[derive(Debug)]
pub struct PollState {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    period: Duration,
}

impl PollState {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the timer task is still alive.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

/// Owner of the recurring refresh timer.
///
/// The first callback fires one full period after [`start`](Self::start),
/// not immediately. Dropping the scheduler stops the timer.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Default)]
pub struct PollScheduler {
    state: Option<PollState>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` every `period`, replacing any running timer.
    pub fn start<F>(&mut self, period: Duration, mut callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.pause();

        // `interval` rejects a zero period.
        let period = period.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first immediate tick
            timer.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = timer.tick() => callback(),
                }
            }
        });

        debug!(?period, "Poll timer started");
        self.state = Some(PollState {
            cancel,
            task,
            period,
        });
    }

    /// Start again after [`pause`](Self::pause). Same as [`start`](Self::start).
    pub fn resume<F>(&mut self, period: Duration, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.start(period, callback);
    }

    /// Stop the timer. Returns `false` if it was not running.
    ///
    /// In-flight work started by earlier ticks is not cancelled.
    pub fn pause(&mut self) -> bool {
        match self.state.take() {
            Some(state) => {
                state.cancel.cancel();
                debug!("Poll timer paused");
                true
            }
            None => false,
        }
    }

    pub fn running(&self) -> bool {
        self.state.as_ref().is_some_and(PollState::is_active)
    }

    pub fn state(&self) -> Option<&PollState> {
        self.state.as_ref()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicU32>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicU32::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let (count, callback) = counter();
        let mut scheduler = PollScheduler::new();
        scheduler.start(Duration::from_secs(60), callback);
        assert!(scheduler.running());

        sleep(Duration::from_secs(59)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_is_idempotent() {
        let (count, callback) = counter();
        let mut scheduler = PollScheduler::new();
        assert!(!scheduler.pause());

        scheduler.start(Duration::from_secs(10), callback);
        sleep(Duration::from_secs(11)).await;
        assert!(scheduler.pause());
        assert!(!scheduler.pause());
        assert!(!scheduler.running());

        sleep(Duration::from_secs(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_timer() {
        let (count, callback) = counter();
        let (count2, callback2) = counter();
        let mut scheduler = PollScheduler::new();

        scheduler.start(Duration::from_secs(10), callback);
        sleep(Duration::from_secs(5)).await;
        scheduler.resume(Duration::from_secs(10), callback2);

        sleep(Duration::from_secs(11)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(count2.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.state().map(PollState::period), Some(Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (count, callback) = counter();
        let mut scheduler = PollScheduler::new();
        scheduler.start(Duration::from_secs(10), callback);
        drop(scheduler);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
