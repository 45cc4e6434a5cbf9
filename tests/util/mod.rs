// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small reference-counted DOM and a toy tree builder driving
//! `TreeState`, enough to check the shapes the algorithms produce.

#![allow(dead_code)]

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt::Write;
use std::mem;
use std::rc::{Rc, Weak};

use html5stack::{
    html_descriptor, AdoptionOutcome, Attribute, ElementSink, InsertionPoint, LocalName,
    QualName, StackEntry, TreeState, TreeStateOpts,
};
use markup5ever::tendril::StrTendril;
use markup5ever::{local_name, namespace_url, ns};

pub enum NodeData {
    Document,
    Text {
        contents: RefCell<String>,
    },
    Element {
        name: LocalName,
        attrs: Vec<Attribute>,
        template_contents: Option<Handle>,
    },
}

pub struct Node {
    pub parent: Cell<Option<Weak<Node>>>,
    pub children: RefCell<Vec<Handle>>,
    pub data: NodeData,
}

pub type Handle = Rc<Node>;

impl Node {
    fn new(data: NodeData) -> Handle {
        Rc::new(Node {
            parent: Cell::new(None),
            children: RefCell::new(vec![]),
            data,
        })
    }
}

fn append(new_parent: &Handle, child: Handle) {
    let previous_parent = child.parent.replace(Some(Rc::downgrade(new_parent)));
    assert!(previous_parent.is_none());
    new_parent.children.borrow_mut().push(child);
}

fn get_parent_and_index(target: &Handle) -> Option<(Handle, usize)> {
    let weak = target.parent.take()?;
    let parent = weak.upgrade().expect("dangling weak pointer");
    target.parent.set(Some(weak));
    let i = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, target))
        .expect("have parent but couldn't find in parent's children!");
    Some((parent, i))
}

fn remove_from_parent(target: &Handle) {
    if let Some((parent, i)) = get_parent_and_index(target) {
        parent.children.borrow_mut().remove(i);
        target.parent.set(None);
    }
}

#[derive(Default)]
pub struct RcSink {
    pub errors: RefCell<Vec<Cow<'static, str>>>,
}

impl RcSink {
    pub fn create_html(&self, name: &str, attrs: Vec<Attribute>) -> Handle {
        let name = LocalName::from(name);
        let template_contents = (name == local_name!("template")).then(|| Node::new(NodeData::Document));
        Node::new(NodeData::Element {
            name,
            attrs,
            template_contents,
        })
    }
}

impl ElementSink for RcSink {
    type Handle = Handle;

    fn create_element(&self, template: &StackEntry<Handle>) -> Handle {
        self.create_html(&template.name, template.attrs.clone())
    }

    fn insert(&self, at: InsertionPoint<Handle>, node: &Handle) {
        match at {
            InsertionPoint::LastChild(parent) => append(&parent, node.clone()),
            InsertionPoint::TemplateContents(template) => match template.data {
                NodeData::Element {
                    template_contents: Some(ref contents),
                    ..
                } => append(contents, node.clone()),
                _ => panic!("not a template element!"),
            },
            InsertionPoint::TableFosterParenting {
                table,
                stack_parent,
            } => match get_parent_and_index(&table) {
                Some((parent, i)) => {
                    node.parent.set(Some(Rc::downgrade(&parent)));
                    parent.children.borrow_mut().insert(i, node.clone());
                },
                None => append(&stack_parent, node.clone()),
            },
        }
    }

    fn append(&self, parent: &Handle, child: &Handle) {
        append(parent, child.clone());
    }

    fn remove_from_parent(&self, target: &Handle) {
        remove_from_parent(target);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let mut children = node.children.borrow_mut();
        let mut new_children = new_parent.children.borrow_mut();
        for child in children.iter() {
            child.parent.set(Some(Rc::downgrade(new_parent)));
        }
        new_children.extend(mem::take(&mut *children));
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }
}

/// Compact markup for `node` and its descendants.
pub fn serialize(node: &Handle) -> String {
    let mut out = String::new();
    serialize_into(&mut out, node);
    out
}

fn serialize_into(out: &mut String, node: &Handle) {
    match node.data {
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                serialize_into(out, child);
            }
        },
        NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
        NodeData::Element {
            ref name,
            ref attrs,
            ref template_contents,
        } => {
            out.push('<');
            out.push_str(name);
            for attr in attrs {
                let _ = write!(out, " {}=\"{}\"", attr.name.local, attr.value);
            }
            out.push('>');
            if let Some(contents) = template_contents {
                serialize_into(out, contents);
            }
            for child in node.children.borrow().iter() {
                serialize_into(out, child);
            }
            let _ = write!(out, "</{}>", name);
        },
    }
}

pub fn attr(name: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, ns!(), LocalName::from(name)),
        value: StrTendril::from(value),
    }
}

/// Drives a `TreeState` the way the in body insertion mode would, for the
/// handful of tokens the tests need.
pub struct Builder {
    pub sink: RcSink,
    pub state: TreeState<Handle>,
    pub document: Handle,
}

impl Builder {
    pub fn new() -> Builder {
        let sink = RcSink::default();
        let mut state = TreeState::new(TreeStateOpts {
            exact_errors: true,
            check_invariants: true,
        });
        let document = Node::new(NodeData::Document);
        let html = sink.create_html("html", vec![]);
        append(&document, html.clone());
        state.push_element(element_entry(html.clone(), "html", vec![]));
        let body = sink.create_html("body", vec![]);
        append(&html, body.clone());
        state.push_element(element_entry(body, "body", vec![]));
        Builder {
            sink,
            state,
            document,
        }
    }

    pub fn start(&mut self, name: &str) {
        self.start_with_attrs(name, vec![]);
    }

    pub fn start_with_attrs(&mut self, name: &str, attrs: Vec<Attribute>) {
        let node = self.sink.create_html(name, attrs.clone());
        let entry = element_entry(node.clone(), name, attrs);
        let is_formatting = entry.is_formatting();
        if is_formatting {
            self.state.reconstruct_active_formatting_elements(&self.sink);
        }
        let place = self.state.appropriate_place_for_insertion(None);
        self.sink.insert(place, &node);
        if is_formatting {
            self.state.push_formatting(entry);
        } else {
            self.state.push_element(entry);
        }
    }

    pub fn text(&mut self, text: &str) {
        self.state.reconstruct_active_formatting_elements(&self.sink);
        let place = self.state.appropriate_place_for_insertion(None);
        let node = Node::new(NodeData::Text {
            contents: RefCell::new(text.to_owned()),
        });
        self.sink.insert(place, &node);
    }

    pub fn end(&mut self, name: &str) {
        let name = LocalName::from(name);
        let descriptor = html_descriptor(name.clone());
        if descriptor.group.is_formatting()
            && self.state.adoption_agency(&self.sink, &name) == AdoptionOutcome::Done
        {
            return;
        }
        self.state.any_other_end_tag(&self.sink, &name);
    }

    pub fn markup(&self) -> String {
        serialize(&self.document)
    }
}

pub fn element_entry(node: Handle, name: &str, attrs: Vec<Attribute>) -> StackEntry<Handle> {
    StackEntry::from_descriptor(&html_descriptor(LocalName::from(name)), node, attrs)
}
