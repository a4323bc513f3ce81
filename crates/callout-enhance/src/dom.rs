//! Owned, index-addressed document tree.
//!
//! Nodes live in a single arena and refer to each other by [`NodeId`]. Removing
//! a node only unlinks it from its parent; the slot stays allocated so ids
//! handed out earlier never dangle.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Doctype(Doctype),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of `name`, appending the attribute when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    /// Class tokens in attribute order with duplicates removed.
    pub fn classes(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = Vec::new();
        for token in self.attr("class").unwrap_or_default().split_ascii_whitespace() {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.name.eq_ignore_ascii_case(name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create(NodeKind::Element(ElementData::new(name)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    /// Unlink `id` from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` into `parent` directly before `reference`.
    ///
    /// Returns `false` and leaves the tree untouched when `reference` is not a
    /// child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> bool {
        if self.nodes[reference.0].parent != Some(parent) || child == reference {
            return false;
        }

        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let Some(position) = siblings.iter().position(|sibling| *sibling == reference) else {
            return false;
        };
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Pre-order traversal of everything below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants {
            document: self,
            stack,
        }
    }

    pub fn elements_by_name(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|id| self.is_element_named(*id, name))
            .collect()
    }

    /// First descendant of `scope`, in document order, that is an element
    /// with any of the given names.
    pub fn first_descendant_by_names(&self, scope: NodeId, names: &[&str]) -> Option<NodeId> {
        self.descendants(scope)
            .find(|id| names.iter().any(|name| self.is_element_named(*id, name)))
    }

    /// The child of `ancestor` whose subtree contains `descendant`.
    pub fn child_containing(&self, ancestor: NodeId, descendant: NodeId) -> Option<NodeId> {
        let mut current = descendant;
        loop {
            let parent = self.parent(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Concatenated text of every text node below `id`, the way the DOM's
    /// `textContent` reads. Text and comment nodes return their own data.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::Doctype(_) => String::new(),
            NodeKind::Root | NodeKind::Element(_) => {
                let mut content = String::new();
                for descendant in self.descendants(id) {
                    if let NodeKind::Text(text) = self.kind(descendant) {
                        content.push_str(text);
                    }
                }
                content
            }
        }
    }

    /// Replace everything below `id` with a single text node holding `text`.
    /// An empty string leaves the node without children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(existing) | NodeKind::Comment(existing) => {
                *existing = text.to_owned();
            }
            NodeKind::Doctype(_) => {}
            NodeKind::Root | NodeKind::Element(_) => {
                for child in std::mem::take(&mut self.nodes[id.0].children) {
                    self.nodes[child.0].parent = None;
                }
                if !text.is_empty() {
                    let node = self.create_text(text);
                    self.append_child(id, node);
                }
            }
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(id) {
            element.set_attr(name, value);
        }
    }

    pub fn class_list(&self, id: NodeId) -> Vec<String> {
        self.element(id)
            .map(|element| element.classes().into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.classes().contains(&class))
    }

    /// Add `class` the way `classList.add` does: tokens stay unique, existing
    /// order is kept, and the attribute is rewritten space-separated.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };

        let mut tokens: Vec<String> = element.classes().into_iter().map(str::to_owned).collect();
        if !tokens.iter().any(|token| token == class) {
            tokens.push(class.to_owned());
        }
        element.set_attr("class", tokens.join(" "));
    }
}

pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.document.children(next).iter().rev().copied());
        Some(next)
    }
}
