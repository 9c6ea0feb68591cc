//! In-memory host. Backs the test suites and the command-line front end.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    Clipboard, CommandCallback, CommandPalette, Dom, ExtensionApi, Graph, HostError, PanelConfig,
    SettingValue, SettingsPanel, SettingsStore, Sidebar, SidebarWindow,
};

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, SettingValue>>,
    fail_writes: AtomicBool,
}

impl MemorySettings {
    pub fn insert(&self, key: &str, value: impl Into<SettingValue>) {
        self.values.lock().insert(key.to_string(), value.into());
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.lock().get(key).cloned()
    }

    async fn set(&self, key: &str, value: SettingValue) -> Result<(), HostError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(HostError::Storage(format!("refused write to {key}")));
        }
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPanel {
    panels: Mutex<Vec<PanelConfig>>,
    creates: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryPanel {
    pub fn panels(&self) -> Vec<PanelConfig> {
        self.panels.lock().clone()
    }

    /// Successful `create` calls, including ones that replaced a panel.
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SettingsPanel for MemoryPanel {
    fn create(&self, config: PanelConfig) -> Result<(), HostError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable("settings panel".to_string()));
        }
        let mut panels = self.panels.lock();
        panels.retain(|panel| panel.tab_title != config.tab_title);
        panels.push(config);
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryGraph {
    pages: Mutex<HashMap<String, String>>,
    blocks: Mutex<HashMap<String, String>>,
    queried: Mutex<Vec<String>>,
}

impl MemoryGraph {
    pub fn add_page(&self, title: &str, uid: &str) {
        self.pages.lock().insert(title.to_string(), uid.to_string());
    }

    pub fn add_block(&self, uid: &str, markdown: &str) {
        self.blocks
            .lock()
            .insert(uid.to_string(), markdown.to_string());
    }

    /// Page titles looked up so far, in call order.
    pub fn queried_titles(&self) -> Vec<String> {
        self.queried.lock().clone()
    }
}

#[async_trait]
impl Graph for MemoryGraph {
    async fn page_uid_by_title(&self, title: &str) -> Result<Option<String>, HostError> {
        self.queried.lock().push(title.to_string());
        Ok(self.pages.lock().get(title).cloned())
    }

    fn block_string(&self, uid: &str) -> Result<Option<String>, HostError> {
        Ok(self.blocks.lock().get(uid).cloned())
    }
}

#[derive(Default)]
pub struct MemorySidebar {
    open: AtomicBool,
    windows: Mutex<Vec<SidebarWindow>>,
}

impl MemorySidebar {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<SidebarWindow> {
        self.windows.lock().clone()
    }
}

#[async_trait]
impl Sidebar for MemorySidebar {
    async fn open(&self) -> Result<(), HostError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn add_window(&self, window: SidebarWindow) -> Result<(), HostError> {
        let mut windows = self.windows.lock();
        if !windows
            .iter()
            .any(|w| w.kind == window.kind && w.block_uid == window.block_uid)
        {
            windows.push(window);
        }
        Ok(())
    }

    async fn remove_window(&self, window: SidebarWindow) -> Result<(), HostError> {
        self.windows
            .lock()
            .retain(|w| !(w.kind == window.kind && w.block_uid == window.block_uid));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCommandPalette {
    commands: Mutex<BTreeMap<String, CommandCallback>>,
}

impl MemoryCommandPalette {
    pub fn labels(&self) -> Vec<String> {
        self.commands.lock().keys().cloned().collect()
    }

    /// Runs the command registered under `label`; false when there is none.
    pub async fn run(&self, label: &str) -> bool {
        let callback = self.commands.lock().get(label).cloned();
        match callback {
            Some(callback) => {
                callback().await;
                true
            }
            None => false,
        }
    }
}

impl CommandPalette for MemoryCommandPalette {
    fn add_command(&self, label: &str, callback: CommandCallback) -> Result<(), HostError> {
        self.commands.lock().insert(label.to_string(), callback);
        Ok(())
    }

    fn remove_command(&self, label: &str) -> Result<(), HostError> {
        self.commands.lock().remove(label);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryClipboard {
    pub fn text(&self) -> Option<String> {
        self.contents.lock().clone()
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), HostError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::Clipboard("permission denied".to_string()));
        }
        *self.contents.lock() = Some(text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Every host seam, in memory, with the concrete handles kept for inspection.
#[derive(Clone, Default)]
pub struct MemoryHost {
    pub dom: Dom,
    pub settings: Arc<MemorySettings>,
    pub panel: Arc<MemoryPanel>,
    pub graph: Arc<MemoryGraph>,
    pub sidebar: Arc<MemorySidebar>,
    pub commands: Arc<MemoryCommandPalette>,
    pub clipboard: Arc<MemoryClipboard>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api(&self) -> ExtensionApi {
        ExtensionApi {
            dom: self.dom.clone(),
            settings: self.settings.clone(),
            panel: self.panel.clone(),
            graph: self.graph.clone(),
            sidebar: Some(self.sidebar.clone()),
            commands: self.commands.clone(),
            clipboard: self.clipboard.clone(),
        }
    }

    /// Same as [`MemoryHost::api`] but for a host with no right sidebar.
    pub fn api_without_sidebar(&self) -> ExtensionApi {
        ExtensionApi {
            sidebar: None,
            ..self.api()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[tokio::test]
    async fn test_settings_round_trip_and_failure() {
        let settings = MemorySettings::default();
        settings.set("k", SettingValue::Bool(true)).await.unwrap();
        assert_eq!(settings.get("k"), Some(SettingValue::Bool(true)));

        settings.set_failing(true);
        assert!(settings.set("k", SettingValue::Bool(false)).await.is_err());
        assert_eq!(settings.get("k"), Some(SettingValue::Bool(true)));
    }

    #[tokio::test]
    async fn test_sidebar_add_is_idempotent_per_uid() {
        let sidebar = MemorySidebar::default();
        sidebar.add_window(SidebarWindow::outline("a")).await.unwrap();
        sidebar.add_window(SidebarWindow::outline("a")).await.unwrap();
        sidebar.add_window(SidebarWindow::outline("b")).await.unwrap();

        sidebar.remove_window(SidebarWindow::outline("a")).await.unwrap();

        assert_eq!(sidebar.windows(), vec![SidebarWindow::outline("b")]);
    }

    #[tokio::test]
    async fn test_command_palette_runs_callbacks() {
        let palette = MemoryCommandPalette::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        palette
            .add_command(
                "Do it",
                Arc::new(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    .boxed()
                }),
            )
            .unwrap();

        assert!(palette.run("Do it").await);
        assert!(!palette.run("Missing").await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
