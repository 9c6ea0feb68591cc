//! Last year today: shows the daily-note pages for today's calendar date
//! in earlier years in the right sidebar, on demand and once a day.
//!
//! [`LastYearTodayPlugin`] wires together the [`resolver`], the sidebar
//! [`windows`], the window [`marker`] and the [`scheduler`].

pub mod clock;
pub mod date;
pub mod error;
pub mod marker;
pub mod plugin;
pub mod resolver;
pub mod scheduler;
pub mod styles;
pub mod windows;

pub use clock::{AnchoredClock, Clock, SystemClock, delay_until};
pub use date::{DateError, format_roam_date, looks_like_roam_date, parse_roam_date, years_before};
pub use error::HistoryError;
pub use marker::WindowMarker;
pub use plugin::{CLOSE_COMMAND, LastYearTodayPlugin, Lifecycle, OPEN_COMMAND};
pub use resolver::{HistoricalPage, resolve, resolve_from};
pub use scheduler::{DailyScheduler, SchedulerState, next_occurrence};
pub use windows::{close_windows, open_windows};
