use roam_extras_host::{DomError, HostError};
use thiserror::Error;

use crate::date::DateError;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Could not read today's date: {0}")]
    Date(#[from] DateError),
    #[error("The host has no right sidebar")]
    SidebarUnavailable,
    #[error("Host call failed: {0}")]
    Host(#[from] HostError),
    #[error("Document update failed: {0}")]
    Dom(#[from] DomError),
}
