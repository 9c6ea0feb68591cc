//! Load/unload orchestration for the copy buttons.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use roam_extras_config::{HIGHLIGHT_COPY, INLINE_CODE_COPY, copy_panel};
use roam_extras_host::{Document, DomError, ExtensionApi, HostError, Selector, SettingValue};
use thiserror::Error;

use crate::actions::CopyContext;
use crate::scanner::{ScanReport, Scanner};
use crate::styles::{inject_styles, remove_styles};
use crate::target::{BUTTON_CLASS, wrappers};
use crate::watcher::{ChangeWatcher, RESCAN_DELAY, Rescan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Host call failed: {0}")]
    Host(#[from] HostError),
    #[error("Document update failed: {0}")]
    Dom(#[from] DomError),
}

/// What an unload took out of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub buttons: usize,
    pub listeners: usize,
    pub wrappers: usize,
    pub styles_removed: bool,
}

pub struct CopyButtonPlugin {
    api: ExtensionApi,
    lifecycle: Lifecycle,
    inline_enabled: bool,
    highlight_enabled: bool,
    watcher: Option<ChangeWatcher>,
    /// Cleared before teardown so a re-scan already past its debounce
    /// cannot add buttons back.
    active: Arc<AtomicBool>,
}

impl CopyButtonPlugin {
    pub fn new(api: ExtensionApi) -> Self {
        Self {
            api,
            lifecycle: Lifecycle::Unloaded,
            inline_enabled: INLINE_CODE_COPY.default,
            highlight_enabled: HIGHLIGHT_COPY.default,
            watcher: None,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn inline_enabled(&self) -> bool {
        self.inline_enabled
    }

    pub fn highlight_enabled(&self) -> bool {
        self.highlight_enabled
    }

    /// Reads the toggles, registers the settings panel, injects styles,
    /// starts watching and scans once. Loading twice reloads.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn load(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Loaded {
            self.unload();
        }
        self.lifecycle = Lifecycle::Loading;

        let settings = self.api.settings.clone();
        self.inline_enabled = INLINE_CODE_COPY.read_or_init(settings.as_ref()).await;
        self.highlight_enabled = HIGHLIGHT_COPY.read_or_init(settings.as_ref()).await;

        // Registered once per load; a settings change reuses the panel.
        if let Err(e) = self.api.panel.create(copy_panel()) {
            log::error!("Failed to load copy buttons: {e}");
            self.lifecycle = Lifecycle::Unloaded;
            return false;
        }

        self.finish_load()
    }

    /// Undoes everything `load` did. Returns false only when the document
    /// could not be fully restored; the plugin is unloaded either way.
    pub fn unload(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Loaded {
            return true;
        }
        self.lifecycle = Lifecycle::Unloading;

        let clean = match self.teardown() {
            Ok(report) => {
                log::info!(
                    "Copy buttons unloaded: removed {} buttons and {} wrappers",
                    report.buttons,
                    report.wrappers
                );
                true
            }
            Err(e) => {
                log::error!("Failed to clean up copy buttons: {e}");
                false
            }
        };

        self.lifecycle = Lifecycle::Unloaded;
        clean
    }

    /// Applies a change event from the settings panel. A change while
    /// loaded fully reinitializes with the new flags.
    pub async fn on_setting_changed(&mut self, id: &str, value: &SettingValue) -> bool {
        let enabled = if id == INLINE_CODE_COPY.key {
            let enabled = INLINE_CODE_COPY.from_value(value);
            self.inline_enabled = enabled;
            enabled
        } else if id == HIGHLIGHT_COPY.key {
            let enabled = HIGHLIGHT_COPY.from_value(value);
            self.highlight_enabled = enabled;
            enabled
        } else {
            log::debug!("Ignoring change to unknown setting {id}");
            return false;
        };

        if let Err(e) = self.api.settings.set(id, SettingValue::Bool(enabled)).await {
            log::warn!("Could not persist {id}: {e}");
        }

        if self.lifecycle != Lifecycle::Loaded {
            return true;
        }
        self.unload();
        self.lifecycle = Lifecycle::Loading;
        self.finish_load()
    }

    /// Runs a scan outside the watcher, e.g. right after the host rendered.
    pub fn scan_now(&self) -> ScanReport {
        self.scanner().scan()
    }

    fn scanner(&self) -> Scanner {
        let context = CopyContext::new(
            self.api.dom.clone(),
            self.api.graph.clone(),
            self.api.clipboard.clone(),
        );
        Scanner::new(context, self.inline_enabled, self.highlight_enabled)
    }

    fn finish_load(&mut self) -> bool {
        match self.activate() {
            Ok(report) => {
                self.lifecycle = Lifecycle::Loaded;
                log::info!(
                    "Copy buttons loaded: {} code blocks, {} inline code, {} highlights",
                    report.code_blocks,
                    report.inline_codes,
                    report.highlights
                );
                true
            }
            Err(e) => {
                log::error!("Failed to load copy buttons: {e}");
                if let Err(e) = self.teardown() {
                    log::warn!("Cleanup after failed load was incomplete: {e}");
                }
                self.lifecycle = Lifecycle::Unloaded;
                false
            }
        }
    }

    fn activate(&mut self) -> Result<ScanReport, PluginError> {
        self.api.dom.mutate(inject_styles)?;

        self.active = Arc::new(AtomicBool::new(true));
        let scanner = self.scanner();
        let rescan = self.rescan(scanner.clone());
        self.watcher = Some(ChangeWatcher::start(&self.api.dom, RESCAN_DELAY, rescan));

        Ok(scanner.scan())
    }

    fn rescan(&self, scanner: Scanner) -> Rescan {
        let active = self.active.clone();
        Arc::new(move || {
            let report = scanner.scan_while(&active);
            if report.total() > 0 {
                log::debug!("Re-scan added {} copy buttons", report.total());
            }
        })
    }

    fn teardown(&mut self) -> Result<CleanupReport, PluginError> {
        self.active.store(false, Ordering::SeqCst);
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
        Ok(self.api.dom.mutate(remove_injected)?)
    }
}

impl Drop for CopyButtonPlugin {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Strips buttons (listeners first), unwraps wrappers in place and drops
/// the stylesheet.
fn remove_injected(doc: &mut Document) -> Result<CleanupReport, DomError> {
    let mut report = CleanupReport::default();

    for button in doc.query_selector_all(doc.root(), &Selector::class(BUTTON_CLASS)) {
        report.listeners += doc.remove_listeners(button);
        doc.remove(button);
        report.buttons += 1;
    }

    // Outer wrappers come first in document order; their children move up
    // and any inner wrapper is unwrapped in its new position afterwards.
    for wrapper in doc.query_selector_all(doc.root(), wrappers()) {
        if let Some(parent) = doc.parent(wrapper) {
            for child in doc.children(wrapper).to_vec() {
                doc.insert_before(parent, child, wrapper)?;
            }
            doc.remove(wrapper);
        }
        report.wrappers += 1;
    }

    report.styles_removed = remove_styles(doc);
    Ok(report)
}
