//! Tags sidebar windows showing a daily-note page so the injected styles
//! can set them apart.

use roam_extras_host::dom::{MutationKind, ObserverHandle};
use roam_extras_host::{Document, Dom, MutationRecord, Selector};
use tokio::task::JoinHandle;

use crate::date::looks_like_roam_date;

pub const WINDOW_CLASS: &str = "rm-sidebar-outline";
pub const TITLE_CLASS: &str = "rm-title-display";
pub const MARKER_ATTRIBUTE: &str = "data-last-year-today";

/// Marks every unmarked sidebar outline whose title looks like a date.
/// Returns how many were marked.
pub fn mark_windows(doc: &mut Document) -> usize {
    let mut marked = 0;
    for window in doc.query_selector_all(doc.root(), &Selector::class(WINDOW_CLASS)) {
        if doc.attribute(window, MARKER_ATTRIBUTE) == Some("true") {
            continue;
        }
        let title = doc
            .query_selector(window, &Selector::class(TITLE_CLASS))
            .and_then(|display| doc.query_selector(display, &Selector::tag("span")))
            .map(|span| doc.text_content(span));
        if title.is_some_and(|title| looks_like_roam_date(&title))
            && doc.set_attribute(window, MARKER_ATTRIBUTE, "true").is_ok()
        {
            marked += 1;
        }
    }
    marked
}

fn has_child_list_changes(batch: &[MutationRecord]) -> bool {
    batch
        .iter()
        .any(|record| record.kind == MutationKind::ChildList)
}

/// Keeps sidebar windows marked while it lives.
pub struct WindowMarker {
    observer: ObserverHandle,
    task: JoinHandle<()>,
}

impl WindowMarker {
    /// Marks what is already open, then follows structural changes.
    /// Must be called from within a tokio runtime.
    pub fn start(dom: &Dom) -> Self {
        let mut observer = dom.observe();
        let handle = observer.handle();
        dom.mutate(mark_windows);

        let task = tokio::spawn({
            let dom = dom.clone();
            async move {
                while let Some(batch) = observer.next_batch().await {
                    if has_child_list_changes(&batch) {
                        let marked = dom.mutate(mark_windows);
                        if marked > 0 {
                            log::debug!("Marked {marked} historical sidebar windows");
                        }
                    }
                }
            }
        });

        Self {
            observer: handle,
            task,
        }
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for WindowMarker {
    fn drop(&mut self) {
        self.observer.disconnect();
        self.task.abort();
    }
}
