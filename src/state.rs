// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tree builder's element bookkeeping in one place.
//!
//! `TreeState` owns the entry arena together with the stack of open
//! elements, the list of active formatting elements and the form element
//! pointer, and implements the tree construction algorithms that touch
//! several of them at once.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use log::{debug, log_enabled, warn, Level};
use markup5ever::LocalName;

use crate::entry::{EntryArena, EntryId, StackEntry};
use crate::formatting::{ActiveFormattingList, FormatEntry};
use crate::interface::ElementSink;
use crate::snapshot::Snapshot;
use crate::stack::{InsertionPoint, OpenElementsStack, ScopeKind};

/// Tree state options, with an impl for Default.
#[derive(Copy, Clone)]
pub struct TreeStateOpts {
    /// Name the offending tags in parse error messages, at some
    /// performance penalty? Default: false
    pub exact_errors: bool,

    /// Verify the shared-ownership bookkeeping after every mutation?
    /// Default: true in debug builds
    pub check_invariants: bool,
}

impl Default for TreeStateOpts {
    fn default() -> TreeStateOpts {
        TreeStateOpts {
            exact_errors: false,
            check_invariants: cfg!(debug_assertions),
        }
    }
}

/// What the caller should do after running the adoption agency.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum AdoptionOutcome {
    /// The end tag has been handled.
    Done,
    /// No formatting element matched; act as described in the "any other
    /// end tag" entry instead.
    AnyOtherEndTag,
}

enum Bookmark {
    Replace(EntryId),
    InsertAfter(EntryId),
}

pub struct TreeState<Handle> {
    /// Options controlling the behavior of the tree state.
    opts: TreeStateOpts,

    /// Owner of every entry referenced below.
    arena: EntryArena<Handle>,

    /// Stack of open elements, most recently added at end.
    open_elems: OpenElementsStack,

    /// List of active formatting elements.
    active_formatting: ActiveFormattingList,

    /// Form element pointer.
    form_elem: Option<Handle>,

    /// Is foster parenting enabled?
    foster_parenting: bool,
}

impl<Handle: Clone> TreeState<Handle> {
    pub fn new(opts: TreeStateOpts) -> TreeState<Handle> {
        TreeState {
            opts,
            arena: EntryArena::new(),
            open_elems: OpenElementsStack::new(),
            active_formatting: ActiveFormattingList::new(),
            form_elem: None,
            foster_parenting: false,
        }
    }

    pub fn opts(&self) -> TreeStateOpts {
        self.opts
    }

    pub fn arena(&self) -> &EntryArena<Handle> {
        &self.arena
    }

    pub fn open_elems(&self) -> &OpenElementsStack {
        &self.open_elems
    }

    pub fn active_formatting(&self) -> &ActiveFormattingList {
        &self.active_formatting
    }

    pub fn entry(&self, id: EntryId) -> &StackEntry<Handle> {
        self.arena.get(id)
    }

    //§ stack-of-open-elements
    pub fn push_element(&mut self, entry: StackEntry<Handle>) -> EntryId {
        let id = self.arena.insert(entry);
        self.open_elems.push(id);
        self.maybe_check();
        id
    }

    /// Push a formatting element and record it in the list of active
    /// formatting elements.
    pub fn push_formatting(&mut self, entry: StackEntry<Handle>) -> EntryId {
        let id = self.arena.insert(entry);
        self.open_elems.push(id);
        self.active_formatting.append(&mut self.arena, id);
        self.maybe_check();
        id
    }

    pub fn pop<Sink>(&mut self, sink: &Sink) -> Handle
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let node = self.open_elems.pop(&mut self.arena);
        sink.pop(&node);
        self.maybe_check();
        node
    }

    pub fn current_id(&self) -> EntryId {
        self.open_elems.current_id()
    }

    pub fn current_entry(&self) -> &StackEntry<Handle> {
        self.open_elems.current(&self.arena)
    }

    pub fn current_node(&self) -> &Handle {
        &self.current_entry().node
    }

    pub fn root_node(&self) -> &Handle {
        &self.arena.get(self.open_elems.root_id()).node
    }

    /// Remove `id` from the stack without popping the elements above it.
    pub fn remove_from_stack<Sink>(&mut self, sink: &Sink, id: EntryId) -> bool
    where
        Sink: ElementSink<Handle = Handle>,
    {
        if !self.open_elems.contains(id) {
            return false;
        }
        let node = self.arena.get(id).node.clone();
        self.open_elems.remove_entry(&mut self.arena, id);
        sink.pop(&node);
        self.maybe_check();
        true
    }

    pub fn in_scope_named(&self, scope: ScopeKind, name: &LocalName) -> bool {
        self.open_elems.has_in_scope(&self.arena, name, scope)
    }

    pub fn entry_in_scope(&self, scope: ScopeKind, id: EntryId) -> bool {
        self.open_elems.has_entry_in_scope(&self.arena, id, scope)
    }

    pub fn generate_implied_end_tags<Sink>(
        &mut self,
        sink: &Sink,
        except: Option<&LocalName>,
    ) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let popped = self
            .open_elems
            .generate_implied_end_tags(&mut self.arena, except);
        self.notify_popped(sink, popped)
    }

    pub fn generate_all_implied_end_tags_thoroughly<Sink>(&mut self, sink: &Sink) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let popped = self
            .open_elems
            .generate_all_implied_end_tags_thoroughly(&mut self.arena);
        self.notify_popped(sink, popped)
    }

    pub fn pop_until_named<Sink>(&mut self, sink: &Sink, name: &LocalName) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let popped = self.open_elems.pop_until_named(&mut self.arena, name);
        self.notify_popped(sink, popped)
    }

    pub fn clear_back_to_table_context<Sink>(&mut self, sink: &Sink) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let popped = self.open_elems.clear_back_to_table_context(&mut self.arena);
        self.notify_popped(sink, popped)
    }

    pub fn clear_back_to_table_body_context<Sink>(&mut self, sink: &Sink) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let popped = self
            .open_elems
            .clear_back_to_table_body_context(&mut self.arena);
        self.notify_popped(sink, popped)
    }

    pub fn clear_back_to_table_row_context<Sink>(&mut self, sink: &Sink) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let popped = self
            .open_elems
            .clear_back_to_table_row_context(&mut self.arena);
        self.notify_popped(sink, popped)
    }

    /// Tell the sink about every node that left the stack, most recently
    /// opened first.
    fn notify_popped<Sink>(&self, sink: &Sink, popped: Vec<Handle>) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        for node in &popped {
            sink.pop(node);
        }
        self.maybe_check();
        popped.len()
    }
    //§ END

    //§ foster-parent
    pub fn foster_parenting(&self) -> bool {
        self.foster_parenting
    }

    pub fn set_foster_parenting(&mut self, enabled: bool) {
        self.foster_parenting = enabled;
    }

    /// <https://html.spec.whatwg.org/#appropriate-place-for-inserting-a-node>
    pub fn appropriate_place_for_insertion(
        &self,
        override_target: Option<EntryId>,
    ) -> InsertionPoint<Handle> {
        self.open_elems
            .appropriate_place_for_insertion(&self.arena, override_target, self.foster_parenting)
    }
    //§ END

    //§ form-element-pointer
    pub fn form_element(&self) -> Option<&Handle> {
        self.form_elem.as_ref()
    }

    pub fn set_form_element(&mut self, form: Option<Handle>) {
        self.form_elem = form;
    }
    //§ END

    //§ list-of-active-formatting-elements
    pub fn insert_marker(&mut self) {
        self.active_formatting.insert_marker();
    }

    pub fn clear_active_formatting_to_marker(&mut self) {
        self.active_formatting
            .clear_to_last_marker(&mut self.arena);
        self.maybe_check();
    }

    pub fn remove_from_active_formatting(&mut self, id: EntryId) -> bool {
        let removed = self
            .active_formatting
            .remove_entry(&mut self.arena, id);
        self.maybe_check();
        removed
    }

    pub fn reconstruct_active_formatting_elements<Sink>(&mut self, sink: &Sink) -> usize
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let created = self.active_formatting.reconstruct(
            &mut self.arena,
            &mut self.open_elems,
            sink,
            self.foster_parenting,
        );
        self.maybe_check();
        created
    }
    //§ END

    //§ adoption-agency-algorithm
    /// Run the adoption agency algorithm for an end tag named `subject`.
    pub fn adoption_agency<Sink>(&mut self, sink: &Sink, subject: &LocalName) -> AdoptionOutcome
    where
        Sink: ElementSink<Handle = Handle>,
    {
        // Step 1. Let subject be token's tag name.
        // Step 2. If the current node is an HTML element whose tag name is subject,
        // and the current node is not in the list of active formatting elements,
        // then pop the current node off the stack of open elements and return.
        let current = self.open_elems.current_id();
        if self.arena.get(current).is_html_named(subject)
            && !self.active_formatting.contains(current)
        {
            self.pop(sink);
            return AdoptionOutcome::Done;
        }

        // Step 3. Let outer loop counter be 0.
        // Step 4. While true:
        for _ in 0..8 {
            // Step 4.1. If outer loop counter is greater than or equal to 8, then return.
            // Step 4.2. Increment outer loop counter by 1.
            // Step 4.3. Let formatting element be the last element in the list of active
            // formatting elements that:
            // * is between the end of the list and the last marker in the list,
            //   if any, or the start of the list otherwise, and
            // * has the tag name subject.
            // If there is no such element, then return and instead act as described in
            // the "any other end tag" entry above.
            let Some((_, fmt_id)) = self.active_formatting.find_by_name(&self.arena, subject)
            else {
                return AdoptionOutcome::AnyOtherEndTag;
            };

            // Step 4.4. If formatting element is not in the stack of open elements, then
            // this is a parse error; remove the element from the list, and return.
            let Some(fmt_stack_index) = self.open_elems.position(fmt_id) else {
                self.parse_error(sink, "Formatting element not open", || {
                    format!("Formatting element {subject} not open")
                });
                self.active_formatting
                    .remove_entry(&mut self.arena, fmt_id);
                self.maybe_check();
                return AdoptionOutcome::Done;
            };

            // Step 4.5. If formatting element is in the stack of open elements, but the
            // element is not in scope, then this is a parse error; return.
            if !self
                .open_elems
                .has_entry_in_scope(&self.arena, fmt_id, ScopeKind::Default)
            {
                self.parse_error(sink, "Formatting element not in scope", || {
                    format!("Formatting element {subject} not in scope")
                });
                return AdoptionOutcome::Done;
            }

            // Step 4.6. If formatting element is not the current node, this is a parse
            // error. (But do not return.)
            if self.open_elems.current_id() != fmt_id {
                self.parse_error(sink, "Formatting element not current node", || {
                    format!("Formatting element {subject} not current node")
                });
            }

            // Step 4.7. Let furthest block be the topmost node in the stack of open
            // elements that is lower in the stack than formatting element, and is an
            // element in the special category. There might not be one.
            let furthest = (fmt_stack_index + 1..self.open_elems.len())
                .map(|index| (index, self.open_elems.get(index)))
                .find(|&(_, id)| self.arena.get(id).special);

            // Step 4.8. If there is no furthest block, then the UA must first pop all the
            // nodes from the bottom of the stack of open elements, from the current node
            // up to and including formatting element, then remove formatting element
            // from the list of active formatting elements, and finally return.
            let Some((furthest_index, furthest_id)) = furthest else {
                let popped = self
                    .open_elems
                    .truncate(&mut self.arena, fmt_stack_index);
                self.active_formatting
                    .remove_entry(&mut self.arena, fmt_id);
                self.notify_popped(sink, popped);
                return AdoptionOutcome::Done;
            };

            // Step 4.9. Let common ancestor be the element immediately above formatting
            // element in the stack of open elements.
            let common_ancestor = self.open_elems.get(fmt_stack_index - 1);

            // Step 4.10. Let a bookmark note the position of formatting element in the
            // list of active formatting elements relative to the elements on either
            // side of it in the list.
            let mut bookmark = Bookmark::Replace(fmt_id);

            // Step 4.11. Let node and last node be furthest block.
            let mut node_index = furthest_index;
            let mut last_node = furthest_id;

            // Step 4.12. Let inner loop counter be 0.
            let mut inner_counter = 0;

            // Step 4.13. While true:
            loop {
                // Step 4.13.1. Increment inner loop counter by 1.
                inner_counter += 1;

                // Step 4.13.2. Let node be the element immediately above node in the
                // stack of open elements, or if node is no longer in the stack of open
                // elements (e.g. because it got removed by this algorithm), the element
                // that was immediately above node in the stack of open elements before
                // node was removed.
                node_index -= 1;
                let node_id = self.open_elems.get(node_index);

                // Step 4.13.3. If node is formatting element, then break.
                if node_id == fmt_id {
                    break;
                }

                // Step 4.13.4. If inner loop counter is greater than 3 and node is in the
                // list of active formatting elements, then remove node from the list of
                // active formatting elements.
                if inner_counter > 3 {
                    self.active_formatting
                        .remove_entry(&mut self.arena, node_id);
                }

                // Step 4.13.5. If node is not in the list of active formatting elements,
                // then remove node from the stack of open elements and continue.
                if !self.active_formatting.contains(node_id) {
                    self.remove_from_stack(sink, node_id);
                    continue;
                }

                // Step 4.13.6. Create an element for the token for which the element node
                // was created, in the HTML namespace, with common ancestor as the intended
                // parent; replace the entry for node in the list of active formatting
                // elements with an entry for the new element, replace the entry for node
                // in the stack of open elements with an entry for the new element, and let
                // node be the new element.
                let new_node = sink.create_element(self.arena.get(node_id));
                let new_entry = self.arena.get(node_id).recreate(new_node);
                let new_id = self.arena.insert(new_entry);
                self.arena.retain(new_id);
                self.active_formatting
                    .replace(&mut self.arena, node_id, new_id);
                self.open_elems
                    .replace(&mut self.arena, node_id, new_id);

                // Step 4.13.7. If last node is furthest block, then move the aforementioned
                // bookmark to be immediately after the new node in the list of active
                // formatting elements.
                if last_node == furthest_id {
                    bookmark = Bookmark::InsertAfter(new_id);
                }

                // Step 4.13.8. Append last node to node.
                let last = self.arena.get(last_node).node.clone();
                sink.remove_from_parent(&last);
                sink.append(&self.arena.get(new_id).node, &last);

                // Step 4.13.9. Set last node to node.
                last_node = new_id;
            }

            // Step 4.14. Insert whatever last node ended up being in the appropriate place
            // for inserting a node, but using common ancestor as the override target.
            let last = self.arena.get(last_node).node.clone();
            sink.remove_from_parent(&last);
            let insertion_point = self.open_elems.appropriate_place_for_insertion(
                &self.arena,
                Some(common_ancestor),
                self.foster_parenting,
            );
            sink.insert(insertion_point, &last);

            // Step 4.15. Create an element for the token for which formatting element was
            // created, in the HTML namespace, with furthest block as the intended parent.
            let fmt_node = sink.create_element(self.arena.get(fmt_id));
            let new_entry = self.arena.get(fmt_id).recreate(fmt_node.clone());
            let new_id = self.arena.insert(new_entry);

            // Step 4.16. Take all of the child nodes of furthest block and append them to
            // the element created in the last step.
            // Step 4.17. Append that new element to furthest block.
            let furthest_node = self.arena.get(furthest_id).node.clone();
            sink.reparent_children(&furthest_node, &fmt_node);
            sink.append(&furthest_node, &fmt_node);

            // Step 4.18. Remove formatting element from the list of active formatting
            // elements, and insert the new element into the list of active formatting
            // elements at the position of the aforementioned bookmark.
            match bookmark {
                Bookmark::Replace(to_replace) => {
                    self.active_formatting
                        .replace(&mut self.arena, to_replace, new_id);
                },
                Bookmark::InsertAfter(previous) => {
                    self.active_formatting.insert_after(previous, new_id);
                    self.active_formatting
                        .remove_entry(&mut self.arena, fmt_id);
                },
            }

            // Step 4.19. Remove formatting element from the stack of open elements, and
            // insert the new element into the stack of open elements immediately below
            // the position of furthest block in that stack.
            self.remove_from_stack(sink, fmt_id);
            self.arena.retain(new_id);
            self.open_elems.insert_after(furthest_id, new_id);

            debug!("adoption agency moved <{}> under its furthest block", subject);
            self.maybe_check();
        }

        warn!("adoption agency for </{}> ran out of iterations", subject);
        AdoptionOutcome::Done
    }

    /// The "any other end tag" steps of the in body insertion mode.
    pub fn any_other_end_tag<Sink>(&mut self, sink: &Sink, name: &LocalName)
    where
        Sink: ElementSink<Handle = Handle>,
    {
        let mut match_id = None;
        for id in self.open_elems.iter().rev() {
            let entry = self.arena.get(id);
            if entry.is_html_named(name) {
                match_id = Some(id);
                break;
            }
            if entry.special {
                self.parse_error(sink, "Found special tag while closing generic tag", || {
                    format!("Found special tag {} while closing </{}>", entry.name, name)
                });
                return;
            }
        }

        let Some(match_id) = match_id else {
            self.parse_error(sink, "Unexpected end tag", || format!("Unexpected end tag </{name}>"));
            return;
        };

        self.generate_implied_end_tags(sink, Some(name));
        if self.open_elems.current_id() != match_id {
            self.parse_error(sink, "Unexpected open element while closing", || {
                format!(
                    "Unexpected open element {} while closing </{}>",
                    self.current_entry().name,
                    name
                )
            });
        }

        match self.open_elems.position(match_id) {
            Some(0) | None => {
                self.parse_error(sink, "Tried to close the root element", || {
                    format!("Tried to close the root element with </{name}>")
                });
            },
            Some(index) => {
                let popped = self.open_elems.truncate(&mut self.arena, index);
                self.notify_popped(sink, popped);
            },
        }
    }
    //§ END

    //§ speculative-parsing
    pub fn snapshot(&mut self) -> Snapshot<Handle> {
        Snapshot::capture(
            &mut self.arena,
            &self.open_elems,
            &self.active_formatting,
            self.form_elem.as_ref(),
        )
    }

    pub fn restore(&mut self, snapshot: &Snapshot<Handle>) {
        snapshot.restore(
            &mut self.arena,
            &mut self.open_elems,
            &mut self.active_formatting,
            &mut self.form_elem,
        );
        self.maybe_check();
    }

    pub fn discard(&mut self, snapshot: Snapshot<Handle>) {
        snapshot.discard(&mut self.arena);
        self.maybe_check();
    }

    pub fn restore_and_discard(&mut self, snapshot: Snapshot<Handle>) {
        snapshot.restore_and_discard(
            &mut self.arena,
            &mut self.open_elems,
            &mut self.active_formatting,
            &mut self.form_elem,
        );
        self.maybe_check();
    }

    /// Release everything held by the stack, the list and the form pointer.
    /// Entries still held by outstanding snapshots survive until those are
    /// discarded.
    pub fn end(&mut self) {
        self.active_formatting.teardown(&mut self.arena);
        self.open_elems.teardown(&mut self.arena);
        self.form_elem = None;
        debug!(
            "tree state torn down, {} entries still held by snapshots",
            self.arena.live_count()
        );
    }
    //§ END

    //§ debugging
    pub fn dump_state(&self, label: &str) {
        if !log_enabled!(Level::Debug) {
            return;
        }

        let open_elems: Vec<String> = self
            .open_elems
            .iter()
            .map(|id| self.arena.get(id).name.to_string())
            .collect();
        let active_formatting: Vec<String> = self
            .active_formatting
            .iter()
            .map(|entry| match entry {
                FormatEntry::Marker => "marker".to_owned(),
                FormatEntry::Element(id) if self.open_elems.contains(id) => {
                    self.arena.get(id).name.to_string()
                },
                FormatEntry::Element(id) => format!("{} (closed)", self.arena.get(id).name),
            })
            .collect();

        debug!("dump_state on {}", label);
        debug!("    open_elems: [{}]", open_elems.join(", "));
        debug!("    active_formatting: [{}]", active_formatting.join(", "));
    }

    /// Panic unless every entry named by the stack and the list is live
    /// and counts at least one share per slot naming it.
    pub fn check_consistency(&self) {
        let mut holders: HashMap<EntryId, u32> = HashMap::new();
        for id in self.open_elems.iter() {
            let count = holders.entry(id).or_default();
            assert!(*count == 0, "entry {id:?} appears twice on the stack");
            *count += 1;
        }

        let mut in_list = HashSet::new();
        for entry in self.active_formatting.iter() {
            if let FormatEntry::Element(id) = entry {
                assert!(
                    in_list.insert(id),
                    "entry {id:?} appears twice in active formatting elements"
                );
                *holders.entry(id).or_default() += 1;
            }
        }

        for (id, count) in holders {
            assert!(self.arena.is_live(id), "holder of destroyed entry {id:?}");
            assert!(
                self.arena.refcount(id) >= count,
                "entry {:?} has {} holders but refcount {}",
                id,
                count,
                self.arena.refcount(id)
            );
        }
    }
    //§ END

    fn maybe_check(&self) {
        if self.opts.check_invariants {
            self.check_consistency();
        }
    }

    fn parse_error<Sink, F>(&self, sink: &Sink, msg: &'static str, exact: F)
    where
        Sink: ElementSink<Handle = Handle>,
        F: FnOnce() -> String,
    {
        sink.parse_error(if self.opts.exact_errors {
            Cow::Owned(exact())
        } else {
            Cow::Borrowed(msg)
        });
    }
}

impl<Handle: Clone> Default for TreeState<Handle> {
    fn default() -> TreeState<Handle> {
        TreeState::new(TreeStateOpts::default())
    }
}
