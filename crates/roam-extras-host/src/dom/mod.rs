//! Live document shared between the host and the plugins.
//!
//! [`Dom`] wraps a [`Document`] behind a mutex. All writes go through
//! [`Dom::mutate`]; the records a closure produces are handed to every
//! connected [`MutationObserver`] as a single batch once the closure
//! returns, the way a browser delivers mutation records per task.

mod document;
mod selector;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;

pub use document::{Document, DomError, MutationKind, MutationRecord, NodeId};
pub use selector::{Compound, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    pub current_target: NodeId,
}

pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

pub type MutationBatch = Vec<MutationRecord>;

struct Registration {
    id: u64,
    tx: mpsc::UnboundedSender<MutationBatch>,
}

struct Shared {
    document: Mutex<Document>,
    observers: Mutex<Vec<Registration>>,
    next_observer: AtomicU64,
}

#[derive(Clone)]
pub struct Dom {
    shared: Arc<Shared>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl Dom {
    pub fn new(document: Document) -> Self {
        Self {
            shared: Arc::new(Shared {
                document: Mutex::new(document),
                observers: Mutex::new(Vec::new()),
                next_observer: AtomicU64::new(1),
            }),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.shared.document.lock())
    }

    pub fn mutate<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let (result, records) = {
            let mut document = self.shared.document.lock();
            let result = f(&mut document);
            (result, document.take_records())
        };
        if !records.is_empty() {
            self.deliver(records);
        }
        result
    }

    /// Starts observing the whole document.
    pub fn observe(&self) -> MutationObserver {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.shared.next_observer.fetch_add(1, Ordering::Relaxed);
        self.shared.observers.lock().push(Registration { id, tx });
        MutationObserver {
            handle: ObserverHandle {
                id,
                shared: Arc::downgrade(&self.shared),
            },
            rx,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.shared.observers.lock().len()
    }

    /// Dispatches a click on `target`, bubbling up to the root. Handlers run
    /// outside the document lock so they are free to read or mutate it.
    /// Returns the number of handlers invoked.
    pub fn click(&self, target: NodeId) -> usize {
        let handlers: Vec<(NodeId, EventHandler)> = self.read(|doc| {
            let mut out = Vec::new();
            let mut current = Some(target);
            while let Some(node) = current {
                out.extend(
                    doc.handlers(node, EventKind::Click)
                        .into_iter()
                        .map(|handler| (node, handler)),
                );
                current = doc.parent(node);
            }
            out
        });

        for (current_target, handler) in &handlers {
            handler(&Event {
                kind: EventKind::Click,
                target,
                current_target: *current_target,
            });
        }
        handlers.len()
    }

    fn deliver(&self, records: MutationBatch) {
        let mut observers = self.shared.observers.lock();
        observers.retain(|registration| {
            let open = registration.tx.send(records.clone()).is_ok();
            if !open {
                log::debug!("Dropping closed mutation observer {}", registration.id);
            }
            open
        });
    }
}

/// Receiving end of a document observation. Dropping it disconnects.
pub struct MutationObserver {
    handle: ObserverHandle,
    rx: mpsc::UnboundedReceiver<MutationBatch>,
}

impl MutationObserver {
    /// Waits for the next batch; `None` once disconnected and drained.
    pub async fn next_batch(&mut self) -> Option<MutationBatch> {
        self.rx.recv().await
    }

    pub fn try_next_batch(&mut self) -> Option<MutationBatch> {
        self.rx.try_recv().ok()
    }

    pub fn handle(&self) -> ObserverHandle {
        self.handle.clone()
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        self.handle.disconnect();
    }
}

/// Detached control over an observer, usable after the receiver has been
/// moved into a task.
#[derive(Clone)]
pub struct ObserverHandle {
    id: u64,
    shared: Weak<Shared>,
}

impl ObserverHandle {
    pub fn disconnect(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared
                .observers
                .lock()
                .retain(|registration| registration.id != self.id);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| {
            shared
                .observers
                .lock()
                .iter()
                .any(|registration| registration.id == self.id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_mutate_delivers_one_batch_per_closure() {
        let dom = Dom::default();
        let mut observer = dom.observe();

        dom.mutate(|doc| {
            let body = doc.body();
            let a = doc.create_element("div");
            let b = doc.create_element("div");
            doc.append_child(body, a).unwrap();
            doc.append_child(body, b).unwrap();
        });

        let batch = observer.try_next_batch().unwrap();
        assert_eq!(batch.len(), 2);
        assert!(observer.try_next_batch().is_none());
    }

    #[test]
    fn test_read_only_closure_delivers_nothing() {
        let dom = Dom::default();
        let mut observer = dom.observe();

        dom.mutate(|doc| doc.body());

        assert!(observer.try_next_batch().is_none());
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let dom = Dom::default();
        let observer = dom.observe();
        let handle = observer.handle();
        assert_eq!(dom.observer_count(), 1);

        handle.disconnect();

        assert!(!handle.is_connected());
        assert_eq!(dom.observer_count(), 0);
        drop(observer);
    }

    #[test]
    fn test_dropping_observer_disconnects() {
        let dom = Dom::default();
        let observer = dom.observe();
        drop(observer);
        assert_eq!(dom.observer_count(), 0);
    }

    #[test]
    fn test_click_bubbles_to_ancestors() {
        let dom = Dom::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let (button, icon) = dom.mutate(|doc| {
            let body = doc.body();
            let button = doc.create_element("span");
            let icon = doc.create_element("span");
            doc.append_child(body, button).unwrap();
            doc.append_child(button, icon).unwrap();
            (button, icon)
        });
        let counter = hits.clone();
        dom.mutate(|doc| {
            doc.add_listener(
                button,
                EventKind::Click,
                Arc::new(move |event: &Event| {
                    assert_eq!(event.current_target, button);
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
        });

        assert_eq!(dom.click(icon), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
