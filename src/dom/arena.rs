//! Arena-allocated document tree.
//!
//! Nodes live in one vector and link to each other by index. Unlike a
//! read-only parse tree, element classes and attributes stay mutable so a
//! page can reflect the writes the scroll spy makes.

use html5ever::{LocalName, QualName};

/// Index of a node in a [`PageDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Class list, kept separate from `attrs` since it is the hot path
        /// for both matching and mutation.
        classes: Vec<String>,
    },
    Text(String),
    /// Comments, doctypes and processing instructions. Kept only so the
    /// parser has something to hand back.
    Other,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A parsed HTML page.
#[derive(Debug)]
pub struct PageDom {
    nodes: Vec<Node>,
}

impl PageDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let classes = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "class")
            .map(|a| a.value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        self.alloc(NodeData::Element {
            name,
            attrs,
            classes,
        })
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(NodeData::Text(text))
    }

    pub fn create_other(&mut self) -> NodeId {
        self.alloc(NodeData::Other)
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.get(parent).and_then(|n| n.last_child);

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.next_sibling = None;
        }
        if let Some(last) = last
            && let Some(node) = self.get_mut(last)
        {
            node.next_sibling = Some(child);
        }
        if let Some(node) = self.get_mut(parent) {
            if node.first_child.is_none() {
                node.first_child = Some(child);
            }
            node.last_child = Some(child);
        }
    }

    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        self.detach(new_node);
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(node) = self.get_mut(new_node) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = Some(sibling);
        }
        if let Some(node) = self.get_mut(sibling) {
            node.prev_sibling = Some(new_node);
        }
        match prev {
            Some(prev) => {
                if let Some(node) = self.get_mut(prev) {
                    node.next_sibling = Some(new_node);
                }
            }
            None => {
                if let Some(parent) = parent
                    && let Some(node) = self.get_mut(parent)
                {
                    node.first_child = Some(new_node);
                }
            }
        }
    }

    /// Unlink `target` from its parent and siblings.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        match prev {
            Some(prev) => {
                if let Some(node) = self.get_mut(prev) {
                    node.next_sibling = next;
                }
            }
            None => {
                if let Some(parent) = parent
                    && let Some(node) = self.get_mut(parent)
                {
                    node.first_child = next;
                }
            }
        }
        match next {
            Some(next) => {
                if let Some(node) = self.get_mut(next) {
                    node.prev_sibling = prev;
                }
            }
            None => {
                if let Some(parent) = parent
                    && let Some(node) = self.get_mut(parent)
                {
                    node.last_child = prev;
                }
            }
        }
        if let Some(node) = self.get_mut(target) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Append text to the trailing text node of `parent`, or start a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.get(parent).and_then(|n| n.last_child);
        if let Some(last) = last
            && let Some(Node {
                data: NodeData::Text(existing),
                ..
            }) = self.get_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Insert text before `sibling`, merging into a preceding text node.
    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        let prev = self.get(sibling).and_then(|n| n.prev_sibling);
        if let Some(prev) = prev
            && let Some(Node {
                data: NodeData::Text(existing),
                ..
            }) = self.get_mut(prev)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.insert_before(sibling, node);
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self.get(parent).and_then(|n| n.first_child),
        }
    }

    /// Strict descendants of `root` in document (pre-)order.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(root).collect();
        stack.reverse();
        Descendants { dom: self, stack }
    }

    /// First element in the document carrying `id`, like `getElementById`.
    ///
    /// Detached nodes and template contents are not part of the document.
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.document())
            .find(|&node| self.attr(node, "id").as_deref() == Some(id))
    }

    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.filter(|&p| self.is_element(p))
    }

    /// Attribute value. `class` reflects the live class list.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        let NodeData::Element { attrs, classes, .. } = &self.get(id)?.data else {
            return None;
        };
        let attr = attrs.iter().find(|a| a.name.local.as_ref() == name)?;
        if name == "class" {
            return Some(classes.join(" "));
        }
        Some(attr.value.clone())
    }

    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    /// Set an attribute. Returns `false` if the value was already set.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(Node {
            data: NodeData::Element { attrs, .. },
            ..
        }) = self.get_mut(id)
        else {
            return false;
        };
        match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
            Some(attr) if attr.value == value => false,
            Some(attr) => {
                attr.value = value.to_string();
                true
            }
            None => {
                attrs.push(Attribute {
                    name: QualName::new(None, html5ever::ns!(), LocalName::from(name)),
                    value: value.to_string(),
                });
                true
            }
        }
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { classes, .. }) => classes,
            _ => &[],
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Add or remove a class. Returns `true` if membership changed.
    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) -> bool {
        let Some(Node {
            data: NodeData::Element { attrs, classes, .. },
            ..
        }) = self.get_mut(id)
        else {
            return false;
        };
        let position = classes.iter().position(|c| c == class);
        let changed = match (position, on) {
            (None, true) => {
                classes.push(class.to_string());
                true
            }
            (Some(index), false) => {
                classes.remove(index);
                true
            }
            _ => false,
        };
        if changed && !attrs.iter().any(|a| a.name.local.as_ref() == "class") {
            attrs.push(Attribute {
                name: QualName::new(None, html5ever::ns!(), LocalName::from("class")),
                value: String::new(),
            });
        }
        changed
    }

    /// Concatenated text of `id`'s direct text children.
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .filter_map(|child| match &self.get(child)?.data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| match &self.get(node)?.data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for PageDom {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Children<'a> {
    dom: &'a PageDom,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom.get(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}

pub struct Descendants<'a> {
    dom: &'a PageDom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let mark = self.stack.len();
        self.stack.extend(self.dom.children(id));
        self.stack[mark..].reverse();
        Some(id)
    }
}
