// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The DOM side of the tree state.
//!
//! The stack and formatting list never build nodes themselves. Whenever an
//! algorithm has to create, move or attach a node it calls into an
//! `ElementSink` supplied by the tree builder.

use std::borrow::Cow;

use crate::entry::StackEntry;
use crate::stack::InsertionPoint;

/// Methods a tree builder's DOM must provide for reconstruction and the
/// adoption agency algorithm.
pub trait ElementSink {
    /// `Handle` is a reference to a DOM node. The tree state holds clones of
    /// these, one per entry.
    type Handle: Clone;

    /// Create a fresh element with the namespace, name and attributes of
    /// `template`. The new node is not attached anywhere.
    fn create_element(&self, template: &StackEntry<Self::Handle>) -> Self::Handle;

    /// Attach `node` at `at`.
    fn insert(&self, at: InsertionPoint<Self::Handle>, node: &Self::Handle);

    /// Append `child` as the last child of `parent`.
    fn append(&self, parent: &Self::Handle, child: &Self::Handle);

    /// Detach `target` from its parent, if it has one.
    fn remove_from_parent(&self, target: &Self::Handle);

    /// Move every child of `node` to the end of `new_parent`'s children.
    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle);

    /// Signal a parse error.
    fn parse_error(&self, msg: Cow<'static, str>);

    /// Called when an element is popped off the stack of open elements.
    fn pop(&self, _node: &Self::Handle) {}
}
