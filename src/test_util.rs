// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use crate::entry::StackEntry;
use crate::interface::ElementSink;
use crate::stack::InsertionPoint;

/// A sink whose handles are strings: `"b#1"` is the first node it created,
/// a `<b>`. Every call is recorded.
#[derive(Default)]
pub struct RecordingSink {
    next_id: Cell<usize>,
    pub created: RefCell<Vec<String>>,
    pub inserted: RefCell<Vec<(InsertionPoint<String>, String)>>,
    pub appended: RefCell<Vec<(String, String)>>,
    pub removed: RefCell<Vec<String>>,
    pub reparented: RefCell<Vec<(String, String)>>,
    pub errors: RefCell<Vec<Cow<'static, str>>>,
    pub popped: RefCell<Vec<String>>,
}

impl ElementSink for RecordingSink {
    type Handle = String;

    fn create_element(&self, template: &StackEntry<String>) -> String {
        self.next_id.set(self.next_id.get() + 1);
        let node = format!("{}#{}", template.name, self.next_id.get());
        self.created.borrow_mut().push(node.clone());
        node
    }

    fn insert(&self, at: InsertionPoint<String>, node: &String) {
        self.inserted.borrow_mut().push((at, node.clone()));
    }

    fn append(&self, parent: &String, child: &String) {
        self.appended.borrow_mut().push((parent.clone(), child.clone()));
    }

    fn remove_from_parent(&self, target: &String) {
        self.removed.borrow_mut().push(target.clone());
    }

    fn reparent_children(&self, node: &String, new_parent: &String) {
        self.reparented
            .borrow_mut()
            .push((node.clone(), new_parent.clone()));
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn pop(&self, node: &String) {
        self.popped.borrow_mut().push(node.clone());
    }
}
