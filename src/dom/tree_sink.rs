//! html5ever `TreeSink` that builds a [`PageDom`].

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, NodeId, PageDom};

/// Node handle handed to the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(pub NodeId);

/// Parser sink.
///
/// html5ever's `TreeSink` takes `&self`, so the DOM sits behind a
/// `RefCell`.
pub struct PageSink {
    dom: RefCell<PageDom>,
    /// Boxed copies of element names. Boxes are never dropped or mutated
    /// before the sink is, so `elem_name` can hand out references to them.
    names: RefCell<HashMap<NodeId, Box<QualName>>>,
    /// Detached fragment holding each `<template>`'s contents.
    templates: RefCell<HashMap<NodeId, NodeId>>,
}

impl Default for PageSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(PageDom::new()),
            names: RefCell::new(HashMap::new()),
            templates: RefCell::new(HashMap::new()),
        }
    }

    pub fn into_dom(self) -> PageDom {
        self.dom.into_inner()
    }

    fn append_to(&self, parent: NodeId, child: NodeOrText<Handle>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node.0),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

impl TreeSink for PageSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> Handle {
        Handle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let names = self.names.borrow();
        match names.get(&target.0) {
            // SAFETY: the boxed name is heap-allocated, never mutated and
            // only dropped with `self`, so it outlives `'a` even though the
            // map guard does not.
            Some(name) => unsafe { &*(name.as_ref() as *const QualName) },
            None => &EMPTY,
        }
    }

    fn create_element(&self, name: QualName, attrs: Vec<Html5Attribute>, _flags: ElementFlags) -> Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| Attribute {
                name: a.name,
                value: a.value.to_string(),
            })
            .collect();

        let id = self.dom.borrow_mut().create_element(name.clone(), attrs);
        self.names.borrow_mut().insert(id, Box::new(name));
        Handle(id)
    }

    fn create_comment(&self, _text: StrTendril) -> Handle {
        Handle(self.dom.borrow_mut().create_other())
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
        Handle(self.dom.borrow_mut().create_other())
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        self.append_to(parent.0, child);
    }

    fn append_based_on_parent_node(&self, element: &Handle, prev_element: &Handle, child: NodeOrText<Handle>) {
        let has_parent = self.dom.borrow().get(element.0).is_some_and(|n| n.parent.is_some());
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append_to(prev_element.0, child);
        }
    }

    fn append_doctype_to_document(&self, _name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {
        let mut dom = self.dom.borrow_mut();
        let document = dom.document();
        let doctype = dom.create_other();
        dom.append(document, doctype);
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        let mut templates = self.templates.borrow_mut();
        let fragment = *templates
            .entry(target.0)
            .or_insert_with(|| self.dom.borrow_mut().create_other());
        Handle(fragment)
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Handle, new_node: NodeOrText<Handle>) {
        let mut dom = self.dom.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => dom.insert_before(sibling.0, node.0),
            NodeOrText::AppendText(text) => dom.insert_text_before(sibling.0, &text),
        }
    }

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in attrs {
            let name = attr.name.local.as_ref();
            if dom.attr(target.0, name).is_none() {
                dom.set_attr(target.0, name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        self.dom.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(node.0).collect();
        for child in children {
            dom.detach(child);
            dom.append(new_parent.0, child);
        }
    }
}
