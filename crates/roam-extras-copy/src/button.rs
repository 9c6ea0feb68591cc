use roam_extras_host::{Document, DomError, NodeId, Selector};

use crate::target::{BUTTON_CLASS, ICON_CLASS};

pub const IDLE_ICON: &str = "📋";
pub const SUCCESS_ICON: &str = "✓";

const BUTTON_CLASSES: &str = "bp3-button bp3-minimal bp3-small dont-focus-block";

/// A detached copy button; the caller decides where it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyButton {
    pub button: NodeId,
    pub icon: NodeId,
}

/// Builds `span.copy-code-button > span.copy-icon` for the block `uid`.
/// The button is kept out of the tab order so focusing it never steals
/// focus from the block editor.
pub fn create_button(doc: &mut Document, uid: &str) -> Result<CopyButton, DomError> {
    let button = doc.create_element("span");
    doc.add_class(button, BUTTON_CLASSES)?;
    doc.add_class(button, BUTTON_CLASS)?;
    doc.set_attribute(button, "tabindex", "-1")?;
    doc.set_attribute(button, "data-block-uid", uid)?;

    let icon = doc.create_element("span");
    doc.add_class(icon, ICON_CLASS)?;
    doc.set_text_content(icon, IDLE_ICON)?;
    doc.append_child(button, icon)?;

    Ok(CopyButton { button, icon })
}

pub fn icon_of(doc: &Document, button: NodeId) -> Option<NodeId> {
    doc.query_selector(button, &Selector::class(ICON_CLASS))
}
