//! Daily trigger that re-arms itself from the wall clock after every run.
//!
//! ```text
//!   start ──> Waiting { next } ──(sleep)──> Firing ──(action done)──┐
//!               ^                                                    │
//!               └────────────────────────────────────────────────────┘
//!   cancel (any state) ──> Idle
//! ```
//!
//! Each cycle recomputes the delay from the current time instead of
//! sleeping a fixed 24h, so clock changes and drift correct themselves.
//! The trigger is a wall-clock time; the sleep is real time, resolved
//! through the clock's zone so daylight-saving days fire on the hour.
//! A trigger missed while the process is not running is not caught up.

use std::sync::Arc;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::clock::Clock;

/// Seconds past the hour at which the trigger fires.
pub const FIRE_SECOND: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Waiting { next: NaiveDateTime },
    Firing,
}

/// Runs with the local date at fire time.
pub type DailyAction = Arc<dyn Fn(NaiveDate) -> BoxFuture<'static, ()> + Send + Sync>;

/// `hour:00:03` today if that is still ahead of `now`, else tomorrow.
pub fn next_occurrence(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, FIRE_SECOND).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(time);
    if today > now {
        return today;
    }
    now.date()
        .succ_opt()
        .map(|tomorrow| tomorrow.and_time(time))
        .unwrap_or(today)
}

pub struct DailyScheduler {
    clock: Arc<dyn Clock>,
    action: DailyAction,
    state: Arc<Mutex<SchedulerState>>,
    task: Option<JoinHandle<()>>,
}

impl DailyScheduler {
    pub fn new(clock: Arc<dyn Clock>, action: DailyAction) -> Self {
        Self {
            clock,
            action,
            state: Arc::new(Mutex::new(SchedulerState::Idle)),
            task: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Arms the trigger for `hour`, replacing any trigger already armed.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, hour: u32) {
        self.cancel();

        let now = self.clock.now();
        let next = next_occurrence(now, hour);
        *self.state.lock() = SchedulerState::Waiting { next };
        log::info!("Last year today scheduled for {next}");

        let clock = self.clock.clone();
        let action = self.action.clone();
        let state = self.state.clone();
        self.task = Some(tokio::spawn(async move {
            let mut next = next;
            loop {
                tokio::time::sleep(clock.until(next)).await;

                *state.lock() = SchedulerState::Firing;
                action(clock.now().date()).await;

                next = next_occurrence(clock.now(), hour);
                *state.lock() = SchedulerState::Waiting { next };
                log::info!("Last year today rescheduled for {next}");
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("Daily scheduler cancelled");
        }
        *self.state.lock() = SchedulerState::Idle;
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::AnchoredClock;
    use crate::clock::dst::DstZone;
    use futures::FutureExt;
    use rstest::rstest;
    use std::time::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[rstest]
    #[case(at(2024, 11, 25, 8, 0, 0), 9, at(2024, 11, 25, 9, 0, 3))]
    #[case(at(2024, 11, 25, 10, 0, 0), 9, at(2024, 11, 26, 9, 0, 3))]
    #[case(at(2024, 11, 25, 9, 0, 2), 9, at(2024, 11, 25, 9, 0, 3))]
    // Exactly at the trigger instant counts as passed.
    #[case(at(2024, 11, 25, 9, 0, 3), 9, at(2024, 11, 26, 9, 0, 3))]
    #[case(at(2024, 12, 31, 23, 30, 0), 0, at(2025, 1, 1, 0, 0, 3))]
    #[case(at(2024, 2, 28, 23, 0, 0), 23, at(2024, 2, 28, 23, 0, 3))]
    fn test_next_occurrence(
        #[case] now: NaiveDateTime,
        #[case] hour: u32,
        #[case] expected: NaiveDateTime,
    ) {
        assert_eq!(next_occurrence(now, hour), expected);
    }

    fn recording_scheduler(anchor: NaiveDateTime) -> (DailyScheduler, Arc<Mutex<Vec<NaiveDate>>>) {
        recording_scheduler_with(Arc::new(AnchoredClock::new(anchor)))
    }

    fn recording_scheduler_with(clock: Arc<dyn Clock>) -> (DailyScheduler, Arc<Mutex<Vec<NaiveDate>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let action: DailyAction = Arc::new(move |date| {
            let sink = sink.clone();
            async move {
                sink.lock().push(date);
            }
            .boxed()
        });
        let scheduler = DailyScheduler::new(clock, action);
        (scheduler, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_trigger_and_rearms_for_tomorrow() {
        let (mut scheduler, fired) = recording_scheduler(at(2024, 11, 25, 8, 0, 0));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        scheduler.start(9);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Waiting {
                next: at(2024, 11, 25, 9, 0, 3)
            }
        );

        tokio::time::sleep(Duration::from_secs(3602)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*fired.lock(), vec![NaiveDate::from_ymd_opt(2024, 11, 25).unwrap()]);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Waiting {
                next: at(2024, 11, 26, 9, 0, 3)
            }
        );

        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        assert_eq!(fired.lock().len(), 2);
        assert_eq!(fired.lock()[1], NaiveDate::from_ymd_opt(2024, 11, 26).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_to_idle_and_never_fires() {
        let (mut scheduler, fired) = recording_scheduler(at(2024, 11, 25, 8, 0, 0));
        scheduler.start(9);

        scheduler.cancel();
        tokio::time::sleep(Duration::from_secs(48 * 3600)).await;

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(fired.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_the_armed_trigger() {
        let (mut scheduler, fired) = recording_scheduler(at(2024, 11, 25, 8, 0, 0));
        scheduler.start(9);

        scheduler.start(10);
        tokio::time::sleep(Duration::from_secs(3700)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(fired.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_on_the_hour_when_clocks_go_forward() {
        let clock = AnchoredClock::in_zone(DstZone::spring_forward(), at(2025, 3, 30, 0, 30, 0));
        let (mut scheduler, fired) = recording_scheduler_with(Arc::new(clock));

        scheduler.start(9);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Waiting {
                next: at(2025, 3, 30, 9, 0, 3)
            }
        );

        // 8h30m of wall time, but only 7h30m of real time.
        tokio::time::sleep(Duration::from_secs(27002)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*fired.lock(), vec![NaiveDate::from_ymd_opt(2025, 3, 30).unwrap()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_on_the_hour_when_clocks_go_back() {
        let clock = AnchoredClock::in_zone(DstZone::fall_back(), at(2025, 10, 26, 0, 30, 0));
        let (mut scheduler, fired) = recording_scheduler_with(Arc::new(clock));

        scheduler.start(9);
        tokio::time::sleep(Duration::from_secs(34202)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*fired.lock(), vec![NaiveDate::from_ymd_opt(2025, 10, 26).unwrap()]);
    }
}
