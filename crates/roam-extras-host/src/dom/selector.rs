/// One compound simple selector: an optional tag, an optional id and any
/// number of classes, all of which must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// A selector list (`a, b, c`) of compound selectors. No combinators: the
/// plugins only ever ask "is this element one of these kinds".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Self::single(Compound {
            tag: Some(tag.to_ascii_lowercase()),
            ..Compound::default()
        })
    }

    pub fn class(class: &str) -> Self {
        Self::single(Compound {
            classes: vec![class.to_string()],
            ..Compound::default()
        })
    }

    pub fn id(id: &str) -> Self {
        Self::single(Compound {
            id: Some(id.to_string()),
            ..Compound::default()
        })
    }

    /// Narrow every alternative to elements that also carry `class`.
    pub fn with_class(mut self, class: &str) -> Self {
        for alternative in &mut self.alternatives {
            alternative.classes.push(class.to_string());
        }
        self
    }

    /// Selector list union, like `self, other` in CSS.
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    pub fn alternatives(&self) -> &[Compound] {
        &self.alternatives
    }

    fn single(compound: Compound) -> Self {
        Self {
            alternatives: vec![compound],
        }
    }
}
