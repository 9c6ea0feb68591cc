use std::collections::BTreeMap;
use std::fmt;

use super::selector::{Compound, Selector};
use super::{EventHandler, EventKind};

/// Handle to a node in a [`Document`] arena.
///
/// Nodes are never freed: removed subtrees stay in the arena, detached, so
/// mutation records can still be inspected after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes { name: String },
}

/// One observed change, shaped like a browser mutation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0:?} cannot be inserted into its own subtree")]
    Hierarchy(NodeId),
    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

struct Listener {
    kind: EventKind,
    handler: EventHandler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("kind", &self.kind).finish()
    }
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
}

/// Arena-backed document tree: `html > (head, body)`.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    records: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            records: Vec::new(),
        };
        let root = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(root, head, None);
        doc.link(root, body, None);
        doc.root = root;
        doc.head = head;
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.node(node).kind, NodeKind::Element(_))
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|e| e.id.as_deref())
    }

    pub fn set_element_id(&mut self, node: NodeId, id: &str) -> Result<(), DomError> {
        self.element_mut(node)?.id = Some(id.to_string());
        self.record_attribute(node, "id");
        Ok(())
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.element(node).map(|e| e.classes.as_slice()).unwrap_or(&[])
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    /// Adds each whitespace-separated class in `classes` that is not present yet.
    pub fn add_class(&mut self, node: NodeId, classes: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        let mut changed = false;
        for class in classes.split_whitespace() {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
                changed = true;
            }
        }
        if changed {
            self.record_attribute(node, "class");
        }
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.record_attribute(node, name);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        if self.element_mut(node)?.attributes.remove(name).is_some() {
            self.record_attribute(node, name);
        }
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn last_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node)
            .iter()
            .rev()
            .copied()
            .find(|child| self.is_element(*child))
    }

    /// Moves `child` (detaching it from any current parent) to the end of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert(parent, child, None)
    }

    /// Moves `node` into `parent` right before `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.insert(parent, node, Some(reference))
    }

    /// Detaches `node` from its parent. The subtree stays in the arena.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            return;
        };
        self.record(MutationRecord {
            kind: MutationKind::ChildList,
            target: parent,
            added: Vec::new(),
            removed: vec![node],
        });
        self.unlink(node);
    }

    /// True when `descendant` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = Some(descendant);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    pub fn text_content(&self, node: NodeId) -> String {
        match &self.node(node).kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element(_) => self
                .children(node)
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
        }
    }

    /// Replaces all children of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.element_mut(node)?;
        let removed = std::mem::take(&mut self.nodes[node.0].children);
        for child in &removed {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.create_text(text);
        self.link(node, text_node, None);
        self.record(MutationRecord {
            kind: MutationKind::ChildList,
            target: node,
            added: vec![text_node],
            removed,
        });
        Ok(())
    }

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        selector
            .alternatives()
            .iter()
            .any(|compound| Self::compound_matches(element, compound))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.matches(candidate, selector) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// First matching descendant of `scope` (excluding `scope`), in document order.
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    /// All matching descendants of `scope` (excluding `scope`), in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.element_id(*node) == Some(id))
    }

    pub fn add_listener(&mut self, node: NodeId, kind: EventKind, handler: EventHandler) {
        self.nodes[node.0].listeners.push(Listener { kind, handler });
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.node(node).listeners.len()
    }

    /// Drops every listener on `node` and its descendants; returns how many were removed.
    pub fn remove_listeners(&mut self, node: NodeId) -> usize {
        let mut removed = 0;
        for target in std::iter::once(node).chain(self.descendants(node)) {
            removed += self.nodes[target.0].listeners.len();
            self.nodes[target.0].listeners.clear();
        }
        removed
    }

    pub(super) fn handlers(&self, node: NodeId, kind: EventKind) -> Vec<EventHandler> {
        self.node(node)
            .listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .map(|listener| listener.handler.clone())
            .collect()
    }

    /// Drains the records produced since the last call.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Indented outline of the subtree at `node`, one node per line.
    pub fn dump(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(node, 0, &mut out);
        out
    }

    fn dump_into(&self, node: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match &self.node(node).kind {
            NodeKind::Text(text) => {
                out.push_str(&format!("{indent}{text:?}\n"));
            }
            NodeKind::Element(element) => {
                let mut line = format!("{indent}<{}", element.tag);
                if let Some(id) = &element.id {
                    line.push_str(&format!(" #{id}"));
                }
                for class in &element.classes {
                    line.push_str(&format!(" .{class}"));
                }
                for (name, value) in &element.attributes {
                    line.push_str(&format!(" {name}={value:?}"));
                }
                line.push('>');
                out.push_str(&line);
                out.push('\n');
                for child in self.children(node) {
                    self.dump_into(*child, depth + 1, out);
                }
            }
        }
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn compound_matches(element: &ElementData, compound: &Compound) -> bool {
        compound.tag().is_none_or(|tag| element.tag == tag)
            && compound
                .id()
                .is_none_or(|id| element.id.as_deref() == Some(id))
            && compound
                .classes()
                .iter()
                .all(|class| element.classes.contains(class))
    }

    fn insert(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.element_mut(parent)?;
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy(child));
        }
        self.remove(child);
        self.link(parent, child, reference);
        self.record(MutationRecord {
            kind: MutationKind::ChildList,
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Only changes inside the connected tree are observable.
    fn record(&mut self, record: MutationRecord) {
        if self.is_connected(record.target) {
            self.records.push(record);
        }
    }

    fn record_attribute(&mut self, node: NodeId, name: &str) {
        self.record(MutationRecord {
            kind: MutationKind::Attributes {
                name: name.to_string(),
            },
            target: node,
            added: Vec::new(),
            removed: Vec::new(),
        });
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node.0]
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.node(node).kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }
}
