use roam_extras_host::{Document, DomError};

pub const STYLE_ID: &str = "last-year-today-styles";

pub const STYLES: &str = r#"
.rm-sidebar-outline[data-last-year-today="true"] {
  border: 2px solid #FFE4B5;
  border-radius: 8px;
  padding: 8px;
  box-shadow: 0 2px 8px rgba(255, 228, 181, 0.3);
}

.rm-sidebar-outline[data-last-year-today="true"] .rm-title-display span {
  background-color: #FFE4B5;
  padding: 2px 6px;
  border-radius: 4px;
  font-weight: 600;
  position: relative;
  padding-left: 24px;
  box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
}

.rm-sidebar-outline[data-last-year-today="true"] .rm-title-display span::before {
  content: "⏳";
  position: absolute;
  left: 4px;
  top: 50%;
  transform: translateY(-50%);
  font-size: 14px;
}
"#;

/// Adds the stylesheet to `head` unless it is already there.
pub fn inject_styles(doc: &mut Document) -> Result<(), DomError> {
    if doc.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = doc.create_element("style");
    doc.set_element_id(style, STYLE_ID)?;
    doc.set_text_content(style, STYLES)?;
    let head = doc.head();
    doc.append_child(head, style)
}

pub fn remove_styles(doc: &mut Document) -> bool {
    let Some(style) = doc.get_element_by_id(STYLE_ID) else {
        return false;
    };
    doc.remove(style);
    true
}
