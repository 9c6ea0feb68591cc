use std::sync::Arc;

use futures::future::BoxFuture;

use crate::HostError;

pub type CommandCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub trait CommandPalette: Send + Sync {
    fn add_command(&self, label: &str, callback: CommandCallback) -> Result<(), HostError>;
    fn remove_command(&self, label: &str) -> Result<(), HostError>;
}
