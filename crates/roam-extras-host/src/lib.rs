//! Host seams shared by the roam-extras plugins.
//!
//! The plugins never talk to a concrete notes application. Everything they
//! consume from the host goes through this crate: the live document
//! ([`dom::Dom`]), key-value settings and the settings panel, graph lookups,
//! the right sidebar, the command palette and the clipboard.
//! [`memory::MemoryHost`] implements all of them in memory.

pub mod clipboard;
pub mod commands;
pub mod dom;
pub mod error;
pub mod graph;
pub mod memory;
pub mod settings;
pub mod sidebar;

use std::sync::Arc;

pub use clipboard::Clipboard;
pub use commands::{CommandCallback, CommandPalette};
pub use dom::{Dom, Document, DomError, MutationObserver, MutationRecord, NodeId, Selector};
pub use error::HostError;
pub use graph::Graph;
pub use memory::MemoryHost;
pub use settings::{Control, PanelConfig, SettingSpec, SettingValue, SettingsPanel, SettingsStore};
pub use sidebar::{Sidebar, SidebarWindow, WindowKind};

/// Everything a plugin receives from the host when it is loaded.
#[derive(Clone)]
pub struct ExtensionApi {
    pub dom: Dom,
    pub settings: Arc<dyn SettingsStore>,
    pub panel: Arc<dyn SettingsPanel>,
    pub graph: Arc<dyn Graph>,
    /// `None` when the host does not expose a right sidebar.
    pub sidebar: Option<Arc<dyn Sidebar>>,
    pub commands: Arc<dyn CommandPalette>,
    pub clipboard: Arc<dyn Clipboard>,
}
