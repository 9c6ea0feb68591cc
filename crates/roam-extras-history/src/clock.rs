use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use tokio::time::Instant;

/// Longest forward jump a wall-clock time is searched past.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Local wall-clock time, plus the real time left until a wall-clock
/// instant. The two differ across daylight-saving changes.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn until(&self, wall: NaiveDateTime) -> Duration;
}

/// Resolves a wall-clock time in `tz` to an instant. Ambiguous times take
/// the earlier instant; times skipped by a forward jump take the first
/// valid minute after the gap.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=MAX_GAP_MINUTES).find_map(|minutes| {
        let candidate = wall.checked_add_signed(TimeDelta::minutes(minutes))?;
        tz.from_local_datetime(&candidate).earliest()
    })
}

/// Real time from `now` until the wall-clock instant `wall` in `now`'s zone.
pub fn delay_until<Tz: TimeZone>(now: &DateTime<Tz>, wall: NaiveDateTime) -> Duration {
    let Some(target) = resolve_local(&now.timezone(), wall) else {
        log::warn!("{wall} has no local instant, firing now");
        return Duration::ZERO;
    };
    target
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn until(&self, wall: NaiveDateTime) -> Duration {
        delay_until(&Local::now(), wall)
    }
}

/// Starts at a fixed wall-clock time and advances with the tokio clock, so
/// paused-time tests can move it with `tokio::time::advance` or sleeps.
#[derive(Clone)]
pub struct AnchoredClock<Tz: TimeZone = Utc> {
    tz: Tz,
    anchor_utc: NaiveDateTime,
    started: Instant,
}

impl AnchoredClock<Utc> {
    pub fn new(anchor: NaiveDateTime) -> Self {
        Self::in_zone(Utc, anchor)
    }
}

impl<Tz: TimeZone> AnchoredClock<Tz> {
    /// `anchor` is a wall-clock time in `tz`.
    pub fn in_zone(tz: Tz, anchor: NaiveDateTime) -> Self {
        let anchor_utc = resolve_local(&tz, anchor)
            .map(|instant| instant.naive_utc())
            .unwrap_or(anchor);
        Self {
            tz,
            anchor_utc,
            started: Instant::now(),
        }
    }

    fn now_in_zone(&self) -> DateTime<Tz> {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or(TimeDelta::MAX);
        let utc = self
            .anchor_utc
            .checked_add_signed(elapsed)
            .unwrap_or(NaiveDateTime::MAX);
        self.tz.from_utc_datetime(&utc)
    }
}

impl<Tz> Clock for AnchoredClock<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    fn now(&self) -> NaiveDateTime {
        self.now_in_zone().naive_local()
    }

    fn until(&self, wall: NaiveDateTime) -> Duration {
        delay_until(&self.now_in_zone(), wall)
    }
}

/// A zone with a single offset change, for daylight-saving tests.
#[cfg(test)]
pub(crate) mod dst {
    use chrono::{
        FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DstZone {
        switch_utc: NaiveDateTime,
        before_hours: i32,
        after_hours: i32,
    }

    impl DstZone {
        /// UTC+0 until 2025-03-30 01:00 UTC, then UTC+1. Local 01:00..02:00
        /// does not exist.
        pub fn spring_forward() -> Self {
            Self {
                switch_utc: utc(2025, 3, 30, 1),
                before_hours: 0,
                after_hours: 1,
            }
        }

        /// UTC+1 until 2025-10-26 01:00 UTC, then UTC+0. Local 01:00..02:00
        /// happens twice.
        pub fn fall_back() -> Self {
            Self {
                switch_utc: utc(2025, 10, 26, 1),
                before_hours: 1,
                after_hours: 0,
            }
        }

        fn offset(&self, hours: i32) -> DstOffset {
            DstOffset { zone: *self, hours }
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[derive(Debug, Clone, Copy)]
    pub struct DstOffset {
        zone: DstZone,
        hours: i32,
    }

    impl Offset for DstOffset {
        fn fix(&self) -> FixedOffset {
            FixedOffset::east_opt(self.hours * 3600).unwrap()
        }
    }

    impl TimeZone for DstZone {
        type Offset = DstOffset;

        fn from_offset(offset: &DstOffset) -> Self {
            offset.zone
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<DstOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<DstOffset> {
            let before = (*local - TimeDelta::hours(self.before_hours.into()) < self.switch_utc)
                .then(|| self.offset(self.before_hours));
            let after = (*local - TimeDelta::hours(self.after_hours.into()) >= self.switch_utc)
                .then(|| self.offset(self.after_hours));
            match (before, after) {
                (Some(earlier), Some(later)) => LocalResult::Ambiguous(earlier, later),
                (Some(only), None) | (None, Some(only)) => LocalResult::Single(only),
                (None, None) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> DstOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> DstOffset {
            if *utc < self.switch_utc {
                self.offset(self.before_hours)
            } else {
                self.offset(self.after_hours)
            }
        }
    }
}
