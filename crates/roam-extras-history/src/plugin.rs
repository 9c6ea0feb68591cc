use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::BoxFuture;
use roam_extras_config::{TRIGGER_HOUR, YEARS_BACK, history_panel};
use roam_extras_host::{CommandCallback, ExtensionApi, Graph, SettingValue, Sidebar};

use crate::clock::{Clock, SystemClock};
use crate::date::parse_roam_date;
use crate::error::HistoryError;
use crate::marker::WindowMarker;
use crate::resolver::resolve_from;
use crate::scheduler::{DailyAction, DailyScheduler, SchedulerState};
use crate::styles::{inject_styles, remove_styles};
use crate::windows::{close_windows, open_windows};

pub const OPEN_COMMAND: &str = "Open Last Year Today";
pub const CLOSE_COMMAND: &str = "Close Last Year Today";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

/// Resolve-and-show, shared by the commands and the daily trigger. The
/// look-back window is read at each use.
#[derive(Clone)]
struct HistoricalPages {
    graph: Arc<dyn Graph>,
    sidebar: Option<Arc<dyn Sidebar>>,
    years_back: Arc<AtomicU32>,
}

impl HistoricalPages {
    fn sidebar(&self) -> Result<&dyn Sidebar, HistoryError> {
        self.sidebar.as_deref().ok_or(HistoryError::SidebarUnavailable)
    }

    async fn open(&self, today: NaiveDate) -> Result<usize, HistoryError> {
        let sidebar = self.sidebar()?;
        let years_back = self.years_back.load(Ordering::SeqCst);
        let pages = resolve_from(self.graph.as_ref(), today, years_back).await;
        Ok(open_windows(sidebar, &pages).await?)
    }

    async fn close(&self, today: NaiveDate) -> Result<usize, HistoryError> {
        let sidebar = self.sidebar()?;
        let years_back = self.years_back.load(Ordering::SeqCst);
        let pages = resolve_from(self.graph.as_ref(), today, years_back).await;
        Ok(close_windows(sidebar, &pages).await?)
    }
}

pub struct LastYearTodayPlugin {
    api: ExtensionApi,
    clock: Arc<dyn Clock>,
    pages: HistoricalPages,
    trigger_hour: u32,
    lifecycle: Lifecycle,
    scheduler: DailyScheduler,
    marker: Option<WindowMarker>,
}

impl LastYearTodayPlugin {
    pub fn new(api: ExtensionApi) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    pub fn with_clock(api: ExtensionApi, clock: Arc<dyn Clock>) -> Self {
        let pages = HistoricalPages {
            graph: api.graph.clone(),
            sidebar: api.sidebar.clone(),
            years_back: Arc::new(AtomicU32::new(YEARS_BACK.default)),
        };
        let scheduler = DailyScheduler::new(clock.clone(), daily_action(&pages));
        Self {
            api,
            clock,
            pages,
            trigger_hour: TRIGGER_HOUR.default,
            lifecycle: Lifecycle::Unloaded,
            scheduler,
            marker: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn years_back(&self) -> u32 {
        self.pages.years_back.load(Ordering::SeqCst)
    }

    pub fn trigger_hour(&self) -> u32 {
        self.trigger_hour
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Reads the settings, registers the panel and commands, injects the
    /// window styles, starts marking windows and arms the daily trigger.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Loaded {
            self.unload();
        }
        self.lifecycle = Lifecycle::Loading;

        let settings = self.api.settings.as_ref();
        self.pages
            .years_back
            .store(YEARS_BACK.read(settings), Ordering::SeqCst);
        self.trigger_hour = TRIGGER_HOUR.read(settings);

        match self.activate() {
            Ok(()) => {
                self.lifecycle = Lifecycle::Loaded;
                log::info!(
                    "Last year today loaded: {} years back, daily at {}:00",
                    self.years_back(),
                    self.trigger_hour
                );
                true
            }
            Err(e) => {
                log::error!("Failed to load last year today: {e}");
                self.teardown();
                self.lifecycle = Lifecycle::Unloaded;
                false
            }
        }
    }

    pub fn unload(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Loaded {
            return true;
        }
        self.lifecycle = Lifecycle::Unloading;
        self.teardown();
        self.lifecycle = Lifecycle::Unloaded;
        log::info!("Last year today unloaded");
        true
    }

    /// Applies an input change from the settings panel. Empty input is
    /// ignored; anything else is validated, stored and takes effect: a new
    /// hour re-arms the trigger right away, a new look-back window applies
    /// from the next run.
    pub async fn on_setting_changed(&mut self, id: &str, value: &SettingValue) -> bool {
        let setting = if id == YEARS_BACK.key {
            YEARS_BACK
        } else if id == TRIGGER_HOUR.key {
            TRIGGER_HOUR
        } else {
            log::debug!("Ignoring change to unknown setting {id}");
            return false;
        };
        let Some(parsed) = value.as_text().and_then(|raw| setting.from_input(raw)) else {
            return false;
        };

        if id == YEARS_BACK.key {
            self.pages.years_back.store(parsed, Ordering::SeqCst);
        } else {
            self.trigger_hour = parsed;
            if self.lifecycle == Lifecycle::Loaded {
                self.scheduler.start(parsed);
            }
        }

        if let Err(e) = setting.persist(self.api.settings.as_ref(), parsed).await {
            log::warn!("Could not persist {id}: {e}");
        }
        log::info!("{} changed to {parsed}", setting.name);
        true
    }

    /// Opens the pages for the current local date.
    pub async fn open_today(&self) -> Result<usize, HistoryError> {
        self.pages.open(self.clock.now().date()).await
    }

    pub async fn close_today(&self) -> Result<usize, HistoryError> {
        self.pages.close(self.clock.now().date()).await
    }

    /// Opens the pages for a daily-note title such as "November 25th, 2024".
    pub async fn open_for(&self, today: &str) -> Result<usize, HistoryError> {
        self.pages.open(parse_roam_date(today)?).await
    }

    pub async fn close_for(&self, today: &str) -> Result<usize, HistoryError> {
        self.pages.close(parse_roam_date(today)?).await
    }

    fn activate(&mut self) -> Result<(), HistoryError> {
        self.api.panel.create(history_panel())?;
        self.api.dom.mutate(inject_styles)?;
        self.marker = Some(WindowMarker::start(&self.api.dom));

        self.api.commands.add_command(
            OPEN_COMMAND,
            self.command(|pages, today| async move { pages.open(today).await }.boxed()),
        )?;
        self.api.commands.add_command(
            CLOSE_COMMAND,
            self.command(|pages, today| async move { pages.close(today).await }.boxed()),
        )?;

        self.scheduler.start(self.trigger_hour);
        Ok(())
    }

    fn command<F>(&self, run: F) -> CommandCallback
    where
        F: Fn(HistoricalPages, NaiveDate) -> BoxFuture<'static, Result<usize, HistoryError>>
            + Send
            + Sync
            + 'static,
    {
        let pages = self.pages.clone();
        let clock = self.clock.clone();
        let run = Arc::new(run);
        Arc::new(move || {
            let pages = pages.clone();
            let today = clock.now().date();
            let run = run.clone();
            async move {
                if let Err(e) = run(pages, today).await {
                    log::error!("Last year today command failed: {e}");
                }
            }
            .boxed()
        })
    }

    fn teardown(&mut self) {
        self.scheduler.cancel();
        if let Some(marker) = self.marker.take() {
            marker.stop();
        }
        for label in [OPEN_COMMAND, CLOSE_COMMAND] {
            if let Err(e) = self.api.commands.remove_command(label) {
                log::warn!("Could not remove command {label:?}: {e}");
            }
        }
        self.api.dom.mutate(remove_styles);
    }
}

impl Drop for LastYearTodayPlugin {
    fn drop(&mut self) {
        self.unload();
    }
}

fn daily_action(pages: &HistoricalPages) -> DailyAction {
    let pages = pages.clone();
    Arc::new(move |today| {
        let pages = pages.clone();
        async move {
            if let Err(e) = pages.open(today).await {
                log::error!("Daily last year today run failed: {e}");
            }
        }
        .boxed()
    })
}
