use std::sync::Arc;
use std::time::Duration;

use roam_extras_host::dom::{Event, EventHandler};
use roam_extras_host::{Clipboard, Document, Dom, Graph, NodeId, Selector};

use crate::button::{IDLE_ICON, SUCCESS_ICON, icon_of};
use crate::fence::extract_fenced_code;
use crate::target::{BUTTON_CLASS, HIGHLIGHT_CLASS, HIGHLIGHT_WRAPPER_CLASS, INLINE_CODE_TAG, INLINE_WRAPPER_CLASS};

/// How long the success checkmark stays before the icon reverts.
pub const FEEDBACK_DURATION: Duration = Duration::from_millis(1000);

/// What a button copies when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAction {
    /// The fenced body of the block's stored markdown.
    CodeBlock { uid: String },
    /// The text of the `code` element in the button's wrapper.
    InlineCode,
    /// The text of the highlight in the button's wrapper.
    Highlight,
}

/// Everything a copy action touches.
#[derive(Clone)]
pub struct CopyContext {
    dom: Dom,
    graph: Arc<dyn Graph>,
    clipboard: Arc<dyn Clipboard>,
}

impl CopyContext {
    pub fn new(dom: Dom, graph: Arc<dyn Graph>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            dom,
            graph,
            clipboard,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Text `action` would put on the clipboard for `button`, if any.
    pub fn copy_text(&self, action: &CopyAction, button: NodeId) -> Option<String> {
        match action {
            CopyAction::CodeBlock { uid } => match self.graph.block_string(uid) {
                Ok(markdown) => extract_fenced_code(&markdown?),
                Err(e) => {
                    log::error!("Could not read block {uid}: {e}");
                    None
                }
            },
            CopyAction::InlineCode => self.dom.read(|doc| {
                wrapped_text(doc, button, INLINE_WRAPPER_CLASS, &Selector::tag(INLINE_CODE_TAG))
            }),
            CopyAction::Highlight => self.dom.read(|doc| {
                wrapped_text(doc, button, HIGHLIGHT_WRAPPER_CLASS, &Selector::class(HIGHLIGHT_CLASS))
            }),
        }
    }

    /// Copies and flashes the success icon. Returns whether the clipboard
    /// was written; failures are logged and leave the icon alone.
    pub async fn run(&self, action: CopyAction, button: NodeId) -> bool {
        let Some(text) = self.copy_text(&action, button) else {
            log::debug!("Nothing to copy for {action:?}");
            return false;
        };

        if let Err(e) = self.clipboard.write_text(&text).await {
            log::error!("Could not copy text: {e}");
            return false;
        }

        self.flash(button).await;
        true
    }

    /// Click listener that runs `action` on the current runtime.
    pub fn click_handler(&self, action: CopyAction, button: NodeId) -> EventHandler {
        let context = self.clone();
        Arc::new(move |_event: &Event| {
            let context = context.clone();
            let action = action.clone();
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        context.run(action, button).await;
                    });
                }
                Err(e) => log::error!("Copy button clicked outside a runtime: {e}"),
            }
        })
    }

    async fn flash(&self, button: NodeId) {
        let Some(icon) = self.dom.read(|doc| icon_of(doc, button)) else {
            return;
        };
        self.set_icon(icon, SUCCESS_ICON);
        tokio::time::sleep(FEEDBACK_DURATION).await;
        self.set_icon(icon, IDLE_ICON);
    }

    fn set_icon(&self, icon: NodeId, glyph: &str) {
        if let Err(e) = self.dom.mutate(|doc| doc.set_text_content(icon, glyph)) {
            log::warn!("Could not update copy icon: {e}");
        }
    }
}

fn wrapped_text(doc: &Document, button: NodeId, wrapper_class: &str, target: &Selector) -> Option<String> {
    let wrapper = doc.closest(button, &Selector::class(wrapper_class))?;
    let node = doc.query_selector(wrapper, target)?;
    Some(text_without_buttons(doc, node))
}

/// Text content with nested copy buttons left out, so a code span inside a
/// highlight does not leak its icon into the copied text.
fn text_without_buttons(doc: &Document, node: NodeId) -> String {
    if !doc.is_element(node) {
        return doc.text_content(node);
    }
    if doc.has_class(node, BUTTON_CLASS) {
        return String::new();
    }
    doc.children(node)
        .iter()
        .map(|child| text_without_buttons(doc, *child))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::create_button;
    use roam_extras_host::MemoryHost;

    fn context(host: &MemoryHost) -> CopyContext {
        CopyContext::new(host.dom.clone(), host.graph.clone(), host.clipboard.clone())
    }

    /// `body > span.<wrapper_class> > (<target> "text", button)`
    fn wrapped(host: &MemoryHost, wrapper_class: &str, target_tag: &str, target_class: &str, text: &str) -> NodeId {
        host.dom.mutate(|doc| {
            let body = doc.body();
            let wrapper = doc.create_element("span");
            doc.add_class(wrapper, wrapper_class).unwrap();
            doc.append_child(body, wrapper).unwrap();
            let target = doc.create_element(target_tag);
            doc.add_class(target, target_class).unwrap();
            doc.set_text_content(target, text).unwrap();
            doc.append_child(wrapper, target).unwrap();
            let button = create_button(doc, "uid").unwrap().button;
            doc.append_child(wrapper, button).unwrap();
            button
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_block_copies_fenced_body_and_flashes() {
        let host = MemoryHost::new();
        host.graph.add_block("uid", "```js\nconst a=1;\n```");
        let button = host.dom.mutate(|doc| {
            let created = create_button(doc, "uid").unwrap();
            let body = doc.body();
            doc.append_child(body, created.button).unwrap();
            created.button
        });
        let context = context(&host);

        let run = tokio::spawn({
            let context = context.clone();
            async move { context.run(CopyAction::CodeBlock { uid: "uid".into() }, button).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(host.clipboard.text().as_deref(), Some("const a=1;"));
        let icon = host.dom.read(|doc| icon_of(doc, button)).unwrap();
        assert_eq!(host.dom.read(|doc| doc.text_content(icon)), SUCCESS_ICON);

        assert!(run.await.unwrap());
        assert_eq!(host.dom.read(|doc| doc.text_content(icon)), IDLE_ICON);
    }

    #[tokio::test]
    async fn test_code_block_without_fence_is_noop() {
        let host = MemoryHost::new();
        host.graph.add_block("uid", "just prose");
        let button = host.dom.mutate(|doc| create_button(doc, "uid").unwrap().button);

        let copied = context(&host)
            .run(CopyAction::CodeBlock { uid: "uid".into() }, button)
            .await;

        assert!(!copied);
        assert_eq!(host.clipboard.writes(), 0);
    }

    #[test]
    fn test_inline_code_text_comes_from_wrapper() {
        let host = MemoryHost::new();
        let button = wrapped(&host, INLINE_WRAPPER_CLASS, "code", "", "npm test");

        let text = context(&host).copy_text(&CopyAction::InlineCode, button);

        assert_eq!(text.as_deref(), Some("npm test"));
    }

    #[test]
    fn test_highlight_text_skips_nested_buttons() {
        let host = MemoryHost::new();
        let button = wrapped(&host, HIGHLIGHT_WRAPPER_CLASS, "span", HIGHLIGHT_CLASS, "marked");
        host.dom.mutate(|doc| {
            let highlight = doc
                .query_selector(doc.body(), &Selector::class(HIGHLIGHT_CLASS))
                .unwrap();
            let nested = create_button(doc, "uid").unwrap().button;
            doc.append_child(highlight, nested).unwrap();
        });

        let text = context(&host).copy_text(&CopyAction::Highlight, button);

        assert_eq!(text.as_deref(), Some("marked"));
    }

    #[tokio::test]
    async fn test_clipboard_failure_leaves_icon_idle() {
        let host = MemoryHost::new();
        host.clipboard.set_failing(true);
        let button = wrapped(&host, INLINE_WRAPPER_CLASS, "code", "", "x");

        let copied = context(&host).run(CopyAction::InlineCode, button).await;

        assert!(!copied);
        let icon = host.dom.read(|doc| icon_of(doc, button)).unwrap();
        assert_eq!(host.dom.read(|doc| doc.text_content(icon)), IDLE_ICON);
    }
}
