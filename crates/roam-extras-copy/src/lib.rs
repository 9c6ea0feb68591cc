//! Copy buttons for code blocks, inline code and highlighted text.
//!
//! ```text
//! ChangeWatcher --(relevant batch, 300ms quiet)--> Scanner --> button + wrapper
//!                                                     |
//!                                   click --> CopyAction --> clipboard + icon flash
//! ```
//!
//! [`CopyButtonPlugin`] owns the whole lifecycle and undoes every DOM change
//! it made on unload.

pub mod actions;
pub mod block_uid;
pub mod button;
pub mod debounce;
pub mod fence;
pub mod plugin;
pub mod scanner;
pub mod styles;
pub mod target;
pub mod watcher;

pub use actions::{CopyAction, CopyContext};
pub use block_uid::{owning_block_uid, resolve_block_uid};
pub use debounce::Debouncer;
pub use fence::extract_fenced_code;
pub use plugin::{CleanupReport, CopyButtonPlugin, Lifecycle, PluginError};
pub use scanner::{ScanReport, Scanner};
pub use target::TargetKind;
pub use watcher::{ChangeWatcher, RESCAN_DELAY, is_relevant};
