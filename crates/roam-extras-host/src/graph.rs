use async_trait::async_trait;

use crate::HostError;

/// Read access to the host's page/block graph.
#[async_trait]
pub trait Graph: Send + Sync {
    /// Uid of the page titled exactly `title`, if one exists.
    async fn page_uid_by_title(&self, title: &str) -> Result<Option<String>, HostError>;

    /// Raw markdown string of the block `uid`.
    fn block_string(&self, uid: &str) -> Result<Option<String>, HostError>;
}
