//! Mutation watcher that turns relevant DOM churn into debounced re-scans.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use roam_extras_host::dom::ObserverHandle;
use roam_extras_host::{Document, Dom, MutationRecord, NodeId};
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;
use crate::target::{containers, synthetic, targets};

/// Quiet period after the last relevant batch before a re-scan runs.
pub const RESCAN_DELAY: Duration = Duration::from_millis(300);

pub type Rescan = Arc<dyn Fn() + Send + Sync>;

/// A batch matters when any record's target, or any node it added or
/// removed, is a target, holds a target, is one of our wrappers or
/// buttons, or sits inside a target or wrapper.
pub fn is_relevant(doc: &Document, batch: &[MutationRecord]) -> bool {
    batch.iter().any(|record| {
        std::iter::once(&record.target)
            .chain(&record.added)
            .chain(&record.removed)
            .any(|node| node_is_relevant(doc, *node))
    })
}

fn node_is_relevant(doc: &Document, node: NodeId) -> bool {
    if !doc.is_element(node) {
        return false;
    }
    doc.matches(node, targets())
        || doc.query_selector(node, targets()).is_some()
        || doc.matches(node, synthetic())
        || doc.closest(node, containers()).is_some()
}

/// Owns one document observer and one debounce slot. Stopping (or
/// dropping) disconnects the observer and discards any pending re-scan.
pub struct ChangeWatcher {
    observer: ObserverHandle,
    debouncer: Arc<Mutex<Debouncer>>,
    task: JoinHandle<()>,
}

impl ChangeWatcher {
    /// Must be called from within a tokio runtime.
    pub fn start(dom: &Dom, delay: Duration, rescan: Rescan) -> Self {
        let mut observer = dom.observe();
        let handle = observer.handle();
        let debouncer = Arc::new(Mutex::new(Debouncer::new(delay)));

        let task = tokio::spawn({
            let dom = dom.clone();
            let debouncer = debouncer.clone();
            async move {
                while let Some(batch) = observer.next_batch().await {
                    if dom.read(|doc| is_relevant(doc, &batch)) {
                        log::debug!("Relevant DOM changes detected, re-scan scheduled");
                        let rescan = rescan.clone();
                        debouncer.lock().schedule(move || rescan());
                    }
                }
            }
        });

        log::debug!("Change watcher started");
        Self {
            observer: handle,
            debouncer,
            task,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.lock().is_pending()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
        self.task.abort();
        self.debouncer.lock().cancel();
        log::debug!("Change watcher stopped");
    }
}
