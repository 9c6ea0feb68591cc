use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::HostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Outline,
}

/// A right-sidebar window, serialized the way the host expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarWindow {
    #[serde(rename = "type")]
    pub kind: WindowKind,
    #[serde(rename = "block-uid")]
    pub block_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SidebarWindow {
    pub fn outline(block_uid: &str) -> Self {
        Self {
            kind: WindowKind::Outline,
            block_uid: block_uid.to_string(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

#[async_trait]
pub trait Sidebar: Send + Sync {
    async fn open(&self) -> Result<(), HostError>;
    async fn add_window(&self, window: SidebarWindow) -> Result<(), HostError>;
    async fn remove_window(&self, window: SidebarWindow) -> Result<(), HostError>;
}
