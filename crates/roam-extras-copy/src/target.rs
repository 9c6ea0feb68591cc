//! Class names shared with the host page, and the three target kinds.

use std::sync::OnceLock;

use roam_extras_host::Selector;

pub const CODE_BLOCK_CLASS: &str = "rm-code-block";
pub const SETTINGS_BAR_CLASS: &str = "rm-code-block__settings-bar";
pub const HIGHLIGHT_CLASS: &str = "rm-highlight";
pub const BLOCK_CLASS: &str = "roam-block";
pub const INLINE_CODE_TAG: &str = "code";

pub const INLINE_WRAPPER_CLASS: &str = "inline-code-wrapper";
pub const HIGHLIGHT_WRAPPER_CLASS: &str = "highlight-wrapper";
pub const BUTTON_CLASS: &str = "copy-code-button";
pub const ICON_CLASS: &str = "copy-icon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    CodeBlock,
    InlineCode,
    Highlight,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [
        TargetKind::CodeBlock,
        TargetKind::InlineCode,
        TargetKind::Highlight,
    ];

    pub fn selector(self) -> Selector {
        match self {
            TargetKind::CodeBlock => Selector::class(CODE_BLOCK_CLASS),
            TargetKind::InlineCode => Selector::tag(INLINE_CODE_TAG),
            TargetKind::Highlight => Selector::class(HIGHLIGHT_CLASS),
        }
    }

    /// Class of the wrapper inserted around the target; code blocks host
    /// their button in the settings bar instead.
    pub fn wrapper_class(self) -> Option<&'static str> {
        match self {
            TargetKind::CodeBlock => None,
            TargetKind::InlineCode => Some(INLINE_WRAPPER_CLASS),
            TargetKind::Highlight => Some(HIGHLIGHT_WRAPPER_CLASS),
        }
    }
}

/// `.rm-code-block, code, .rm-highlight`
pub fn targets() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        TargetKind::ALL
            .into_iter()
            .map(TargetKind::selector)
            .reduce(Selector::or)
            .unwrap_or_else(|| Selector::class(CODE_BLOCK_CLASS))
    })
}

/// `.inline-code-wrapper, .highlight-wrapper, .copy-code-button`
pub fn synthetic() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| wrappers().clone().or(Selector::class(BUTTON_CLASS)))
}

/// `.inline-code-wrapper, .highlight-wrapper`
pub fn wrappers() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        Selector::class(INLINE_WRAPPER_CLASS).or(Selector::class(HIGHLIGHT_WRAPPER_CLASS))
    })
}

/// `.rm-code-block, .inline-code-wrapper, .highlight-wrapper`
pub fn containers() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::class(CODE_BLOCK_CLASS).or(wrappers().clone()))
}
