use std::sync::atomic::{AtomicBool, Ordering};

use roam_extras_host::dom::EventKind;
use roam_extras_host::{Document, DomError, NodeId, Selector};

use crate::actions::{CopyAction, CopyContext};
use crate::block_uid::owning_block_uid;
use crate::button::create_button;
use crate::target::{BUTTON_CLASS, CODE_BLOCK_CLASS, SETTINGS_BAR_CLASS, TargetKind};

/// Buttons added by one scan, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub code_blocks: usize,
    pub inline_codes: usize,
    pub highlights: usize,
}

impl ScanReport {
    pub fn total(&self) -> usize {
        self.code_blocks + self.inline_codes + self.highlights
    }

    fn count(&mut self, kind: TargetKind) {
        match kind {
            TargetKind::CodeBlock => self.code_blocks += 1,
            TargetKind::InlineCode => self.inline_codes += 1,
            TargetKind::Highlight => self.highlights += 1,
        }
    }
}

/// Attaches a copy button to every unprocessed target. A target counts as
/// processed once it has a button (code blocks) or sits in its wrapper
/// (inline code, highlights), so scanning is idempotent.
#[derive(Clone)]
pub struct Scanner {
    context: CopyContext,
    inline_enabled: bool,
    highlight_enabled: bool,
}

impl Scanner {
    pub fn new(context: CopyContext, inline_enabled: bool, highlight_enabled: bool) -> Self {
        Self {
            context,
            inline_enabled,
            highlight_enabled,
        }
    }

    pub fn is_enabled(&self, kind: TargetKind) -> bool {
        match kind {
            TargetKind::CodeBlock => true,
            TargetKind::InlineCode => self.inline_enabled,
            TargetKind::Highlight => self.highlight_enabled,
        }
    }

    /// Scans the live document in one mutation batch.
    pub fn scan(&self) -> ScanReport {
        let dom = self.context.dom().clone();
        dom.mutate(|doc| self.scan_document(doc))
    }

    /// Like `scan`, but does nothing unless `active` is still set once the
    /// document lock is held.
    pub fn scan_while(&self, active: &AtomicBool) -> ScanReport {
        let dom = self.context.dom().clone();
        dom.mutate(|doc| {
            if !active.load(Ordering::SeqCst) {
                return ScanReport::default();
            }
            self.scan_document(doc)
        })
    }

    pub fn scan_document(&self, doc: &mut Document) -> ScanReport {
        let mut report = ScanReport::default();
        for kind in TargetKind::ALL {
            if !self.is_enabled(kind) {
                continue;
            }
            for node in doc.query_selector_all(doc.root(), &kind.selector()) {
                match self.process(doc, kind, node) {
                    Ok(true) => report.count(kind),
                    Ok(false) => {}
                    Err(e) => log::warn!("Could not add copy button to {kind:?}: {e}"),
                }
            }
        }
        report
    }

    fn process(&self, doc: &mut Document, kind: TargetKind, node: NodeId) -> Result<bool, DomError> {
        if self.is_processed(doc, kind, node) {
            return Ok(false);
        }
        let Some(uid) = owning_block_uid(doc, node) else {
            log::debug!("No block uid for {kind:?} {node:?}, skipping");
            return Ok(false);
        };
        match kind {
            TargetKind::CodeBlock => self.attach_to_code_block(doc, node, uid),
            TargetKind::InlineCode => self.wrap(doc, node, kind, &uid, CopyAction::InlineCode),
            TargetKind::Highlight => self.wrap(doc, node, kind, &uid, CopyAction::Highlight),
        }
    }

    fn is_processed(&self, doc: &Document, kind: TargetKind, node: NodeId) -> bool {
        match kind {
            TargetKind::CodeBlock => doc
                .query_selector(node, &Selector::class(BUTTON_CLASS))
                .is_some(),
            TargetKind::InlineCode => {
                // Code inside a code block belongs to the block's button.
                doc.closest(node, &Selector::class(CODE_BLOCK_CLASS)).is_some()
                    || self.in_own_wrapper(doc, kind, node)
            }
            TargetKind::Highlight => self.in_own_wrapper(doc, kind, node),
        }
    }

    fn in_own_wrapper(&self, doc: &Document, kind: TargetKind, node: NodeId) -> bool {
        match (kind.wrapper_class(), doc.parent(node)) {
            (Some(class), Some(parent)) => doc.has_class(parent, class),
            _ => false,
        }
    }

    /// The button goes into the settings bar, just before its last item.
    fn attach_to_code_block(&self, doc: &mut Document, block: NodeId, uid: String) -> Result<bool, DomError> {
        let Some(anchor) = doc
            .query_selector(block, &Selector::class(SETTINGS_BAR_CLASS))
            .and_then(|bar| doc.last_element_child(bar))
        else {
            return Ok(false);
        };
        let Some(bar) = doc.parent(anchor) else {
            return Ok(false);
        };

        let created = create_button(doc, &uid)?;
        let handler = self
            .context
            .click_handler(CopyAction::CodeBlock { uid }, created.button);
        doc.add_listener(created.button, EventKind::Click, handler);
        doc.insert_before(bar, created.button, anchor)?;
        Ok(true)
    }

    /// `target` becomes `wrapper > (target, button)` at the same position.
    fn wrap(
        &self,
        doc: &mut Document,
        target: NodeId,
        kind: TargetKind,
        uid: &str,
        action: CopyAction,
    ) -> Result<bool, DomError> {
        let (Some(parent), Some(wrapper_class)) = (doc.parent(target), kind.wrapper_class()) else {
            return Ok(false);
        };

        let wrapper = doc.create_element("span");
        doc.add_class(wrapper, wrapper_class)?;
        doc.insert_before(parent, wrapper, target)?;
        doc.append_child(wrapper, target)?;

        let created = create_button(doc, uid)?;
        let handler = self.context.click_handler(action, created.button);
        doc.add_listener(created.button, EventKind::Click, handler);
        doc.append_child(wrapper, created.button)?;
        Ok(true)
    }
}
