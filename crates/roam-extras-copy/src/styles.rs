use roam_extras_host::{Document, DomError, NodeId};

pub const STYLE_ID: &str = "nicer-code-block-copy-styles";

pub const STYLES: &str = r#"
.inline-code-wrapper,
.highlight-wrapper {
  position: relative;
  display: inline-block;
}

.inline-code-wrapper .copy-code-button,
.highlight-wrapper .copy-code-button {
  visibility: hidden;
  opacity: 0;
  transition: opacity 0.2s ease;
  position: absolute;
  top: -18px;
  right: 0;
  background: rgba(255, 255, 255, 0.9);
  border-radius: 3px;
  box-shadow: 0 1px 3px rgba(0,0,0,0.12);
  padding: 2px;
  margin: 0;
}

.inline-code-wrapper:hover .copy-code-button,
.highlight-wrapper:hover .copy-code-button {
  visibility: visible;
  opacity: 1;
}

.rm-code-block .copy-code-button {
  margin-right: 5px;
}

.copy-code-button .copy-icon {
  height: 16px;
  width: 16px;
  display: flex;
  align-items: center;
  justify-content: center;
}
"#;

/// Replaces any previous copy of the stylesheet with a fresh one in `head`.
pub fn inject_styles(doc: &mut Document) -> Result<NodeId, DomError> {
    remove_styles(doc);
    let style = doc.create_element("style");
    doc.set_element_id(style, STYLE_ID)?;
    doc.set_text_content(style, STYLES)?;
    let head = doc.head();
    doc.append_child(head, style)?;
    Ok(style)
}

/// Returns whether a stylesheet was present.
pub fn remove_styles(doc: &mut Document) -> bool {
    match doc.get_element_by_id(STYLE_ID) {
        Some(style) => {
            doc.remove(style);
            true
        }
        None => false,
    }
}
