// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The stack of open elements.
//!
//! <https://html.spec.whatwg.org/#the-stack-of-open-elements>

use std::slice;

use markup5ever::LocalName;

use crate::descriptor::ElementGroup;
use crate::entry::{EntryArena, EntryId, StackEntry};

/// Scope flavors for "has an element in ... scope".
///
/// <https://html.spec.whatwg.org/#has-an-element-in-scope>
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ScopeKind {
    Default,
    ListItem,
    Button,
    Table,
    Select,
}

impl ScopeKind {
    /// Does `entry` terminate a downward search in this scope?
    fn is_boundary<Handle>(self, entry: &StackEntry<Handle>) -> bool {
        let html_group = |groups: &[ElementGroup]| entry.is_html() && groups.contains(&entry.group);
        match self {
            ScopeKind::Default => entry.scoping,
            ScopeKind::ListItem => entry.scoping || html_group(&[ElementGroup::OlOrUl]),
            ScopeKind::Button => entry.scoping || html_group(&[ElementGroup::Button]),
            ScopeKind::Table => html_group(&[
                ElementGroup::Html,
                ElementGroup::Table,
                ElementGroup::Template,
            ]),
            ScopeKind::Select => !html_group(&[ElementGroup::Optgroup, ElementGroup::Option]),
        }
    }
}

/// Result of scoped lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Searched element was found at this stack index.
    Some(usize),
    /// Scope boundary was reached.
    NotInScope,
    /// Stack was exhausted without finding the element or any boundary.
    None,
}

impl Position {
    pub fn is_some(&self) -> bool {
        matches!(self, Position::Some(_))
    }
}

/// Where a new node goes.
///
/// <https://html.spec.whatwg.org/#appropriate-place-for-inserting-a-node>
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertionPoint<Handle> {
    /// Insert as last child in this parent.
    LastChild(Handle),
    /// Insert as last child of this template element's contents.
    TemplateContents(Handle),
    /// Insert immediately before `table` if it has a parent node, otherwise
    /// as last child of `stack_parent` (the element below `table` on the stack).
    TableFosterParenting { table: Handle, stack_parent: Handle },
}

/// Stack of open elements, most recently added at end.
///
/// Index 0 is the root element. The stack holds one share of each entry in
/// the arena; every operation that drops a slot releases that share.
#[derive(Clone, Debug, Default)]
pub struct OpenElementsStack {
    open_elems: Vec<EntryId>,
}

impl OpenElementsStack {
    pub fn new() -> OpenElementsStack {
        OpenElementsStack { open_elems: vec![] }
    }

    /// Push `id`, taking over the caller's share.
    pub fn push(&mut self, id: EntryId) {
        self.open_elems.push(id);
    }

    /// Pop the current node and return its DOM node.
    ///
    /// Panics if that would pop the root; use `teardown` at end of parse.
    pub fn pop<Handle: Clone>(&mut self, arena: &mut EntryArena<Handle>) -> Handle {
        assert!(self.open_elems.len() > 1, "popped the root element");
        let id = self.open_elems.pop().expect("no current element");
        let node = arena.get(id).node.clone();
        arena.release(id);
        node
    }

    /// Pop while `pred` holds for the current node. Never pops the root.
    /// Returns the popped nodes, most recently opened first.
    pub fn pop_while<Handle, P>(
        &mut self,
        arena: &mut EntryArena<Handle>,
        mut pred: P,
    ) -> Vec<Handle>
    where
        Handle: Clone,
        P: FnMut(&StackEntry<Handle>) -> bool,
    {
        let mut popped = vec![];
        while self.open_elems.len() > 1 && pred(arena.get(self.current_id())) {
            popped.push(self.pop(arena));
        }
        popped
    }

    /// Pop everything above index `len`. Returns the popped nodes, most
    /// recently opened first.
    pub fn truncate<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
        len: usize,
    ) -> Vec<Handle> {
        assert!(len >= 1, "popped the root element");
        let mut popped = vec![];
        while self.open_elems.len() > len {
            popped.push(self.pop(arena));
        }
        popped
    }

    /// Remove `id` from wherever it is, leaving the elements above it in
    /// place. Returns false if it was not open.
    pub fn remove_entry<Handle>(&mut self, arena: &mut EntryArena<Handle>, id: EntryId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        assert!(index > 0, "removed the root element");
        self.open_elems.remove(index);
        arena.release(id);
        true
    }

    /// Put `new` in `old`'s slot. Takes over the caller's share of `new`.
    pub fn replace<Handle>(&mut self, arena: &mut EntryArena<Handle>, old: EntryId, new: EntryId) {
        let index = self.position(old).expect("replaced element is not open");
        self.open_elems[index] = new;
        arena.release(old);
    }

    /// Insert `new` immediately above `existing`. Takes over the caller's
    /// share of `new`.
    pub fn insert_after(&mut self, existing: EntryId, new: EntryId) {
        let index = self.position(existing).expect("element is not open");
        self.open_elems.insert(index + 1, new);
    }

    /// Release every entry, root included. End of parse only.
    pub fn teardown<Handle>(&mut self, arena: &mut EntryArena<Handle>) {
        while let Some(id) = self.open_elems.pop() {
            arena.release(id);
        }
    }

    /// Swap in new contents wholesale, returning the old ones. The caller
    /// is responsible for the shares on both sides.
    pub(crate) fn replace_contents(&mut self, open_elems: Vec<EntryId>) -> Vec<EntryId> {
        std::mem::replace(&mut self.open_elems, open_elems)
    }

    pub fn current_id(&self) -> EntryId {
        *self.open_elems.last().expect("no current element")
    }

    pub fn current<'a, Handle>(&self, arena: &'a EntryArena<Handle>) -> &'a StackEntry<Handle> {
        arena.get(self.current_id())
    }

    pub fn root_id(&self) -> EntryId {
        *self.open_elems.first().expect("no root element")
    }

    pub fn get(&self, index: usize) -> EntryId {
        self.open_elems[index]
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.open_elems.iter().rposition(|&e| e == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.open_elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open_elems.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<slice::Iter<'_, EntryId>> {
        self.open_elems.iter().copied()
    }

    pub fn as_slice(&self) -> &[EntryId] {
        &self.open_elems
    }

    /// Scan from the current node downward for an entry matching `pred`,
    /// stopping at the first boundary of `scope`.
    pub fn position_in_scope<Handle, P>(
        &self,
        arena: &EntryArena<Handle>,
        scope: ScopeKind,
        pred: P,
    ) -> Position
    where
        P: Fn(EntryId, &StackEntry<Handle>) -> bool,
    {
        for (index, &id) in self.open_elems.iter().enumerate().rev() {
            let entry = arena.get(id);
            if pred(id, entry) {
                return Position::Some(index);
            }
            if scope.is_boundary(entry) {
                return Position::NotInScope;
            }
        }

        // Impossible while the root html element is open, since it bounds
        // every scope.
        Position::None
    }

    /// Is there an HTML element named `target` in `scope`?
    pub fn has_in_scope<Handle>(
        &self,
        arena: &EntryArena<Handle>,
        target: &LocalName,
        scope: ScopeKind,
    ) -> bool {
        self.position_in_scope(arena, scope, |_, entry| entry.is_html_named(target))
            .is_some()
    }

    /// Is this particular element in `scope`?
    pub fn has_entry_in_scope<Handle>(
        &self,
        arena: &EntryArena<Handle>,
        target: EntryId,
        scope: ScopeKind,
    ) -> bool {
        self.position_in_scope(arena, scope, |id, _| id == target)
            .is_some()
    }

    /// The foster-parenting insertion point, if the current node is one of
    /// the table elements that foster-parent misplaced content.
    pub fn foster_parent_insertion_point<Handle: Clone>(
        &self,
        arena: &EntryArena<Handle>,
    ) -> Option<InsertionPoint<Handle>> {
        if !self.current(arena).foster_parenting {
            return None;
        }
        Some(self.foster_parent_location(arena))
    }

    /// <https://html.spec.whatwg.org/#appropriate-place-for-inserting-a-node>
    pub fn appropriate_place_for_insertion<Handle: Clone>(
        &self,
        arena: &EntryArena<Handle>,
        override_target: Option<EntryId>,
        foster_parenting: bool,
    ) -> InsertionPoint<Handle> {
        let target = arena.get(override_target.unwrap_or_else(|| self.current_id()));
        if foster_parenting && target.foster_parenting {
            return self.foster_parent_location(arena);
        }
        if target.is_html() && target.group == ElementGroup::Template {
            InsertionPoint::TemplateContents(target.node.clone())
        } else {
            InsertionPoint::LastChild(target.node.clone())
        }
    }

    fn foster_parent_location<Handle: Clone>(
        &self,
        arena: &EntryArena<Handle>,
    ) -> InsertionPoint<Handle> {
        for (index, &id) in self.open_elems.iter().enumerate().rev() {
            let entry = arena.get(id);
            if !entry.is_html() {
                continue;
            }
            match entry.group {
                ElementGroup::Template => {
                    return InsertionPoint::TemplateContents(entry.node.clone());
                },
                ElementGroup::Table if index > 0 => {
                    return InsertionPoint::TableFosterParenting {
                        table: entry.node.clone(),
                        stack_parent: arena.get(self.open_elems[index - 1]).node.clone(),
                    };
                },
                _ => (),
            }
        }
        InsertionPoint::LastChild(arena.get(self.root_id()).node.clone())
    }

    /// <https://html.spec.whatwg.org/#generate-implied-end-tags>
    pub fn generate_implied_end_tags<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
        except: Option<&LocalName>,
    ) -> Vec<Handle> {
        self.pop_while(arena, |entry| {
            entry.is_html()
                && entry.group.implies_end_tag()
                && except.map_or(true, |name| entry.name != *name)
        })
    }

    /// <https://html.spec.whatwg.org/#generate-all-implied-end-tags-thoroughly>
    pub fn generate_all_implied_end_tags_thoroughly<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
    ) -> Vec<Handle> {
        self.pop_while(arena, |entry| {
            entry.is_html() && entry.group.implies_end_tag_thoroughly()
        })
    }

    /// Pop elements until an HTML element named `name` has been popped.
    /// Returns the popped nodes, none if no such element is open.
    pub fn pop_until_named<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
        name: &LocalName,
    ) -> Vec<Handle> {
        let position = self
            .open_elems
            .iter()
            .rposition(|&id| arena.get(id).is_html_named(name));
        // The root element is never popped.
        let Some(index) = position.filter(|&index| index > 0) else {
            return vec![];
        };
        self.truncate(arena, index)
    }

    /// <https://html.spec.whatwg.org/#clear-the-stack-back-to-a-table-context>
    pub fn clear_back_to_table_context<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
    ) -> Vec<Handle> {
        self.clear_back_to(arena, &[ElementGroup::Table])
    }

    /// <https://html.spec.whatwg.org/#clear-the-stack-back-to-a-table-body-context>
    pub fn clear_back_to_table_body_context<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
    ) -> Vec<Handle> {
        self.clear_back_to(arena, &[ElementGroup::TbodyOrTheadOrTfoot])
    }

    /// <https://html.spec.whatwg.org/#clear-the-stack-back-to-a-table-row-context>
    pub fn clear_back_to_table_row_context<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
    ) -> Vec<Handle> {
        self.clear_back_to(arena, &[ElementGroup::Tr])
    }

    fn clear_back_to<Handle: Clone>(
        &mut self,
        arena: &mut EntryArena<Handle>,
        groups: &[ElementGroup],
    ) -> Vec<Handle> {
        self.pop_while(arena, |entry| {
            !(entry.is_html()
                && (groups.contains(&entry.group)
                    || matches!(entry.group, ElementGroup::Template | ElementGroup::Html)))
        })
    }
}

impl<'a> IntoIterator for &'a OpenElementsStack {
    type IntoIter = std::iter::Copied<slice::Iter<'a, EntryId>>;
    type Item = EntryId;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
