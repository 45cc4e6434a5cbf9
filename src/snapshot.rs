// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Saved copies of the tree state, for speculative parsing.
//!
//! A snapshot shares entries with the live stack and list instead of
//! copying them, so capturing is proportional to the number of open
//! elements and never touches the DOM.

use log::debug;

use crate::entry::{EntryArena, EntryId};
use crate::formatting::{ActiveFormattingList, FormatEntry};
use crate::stack::OpenElementsStack;

/// A saved stack of open elements, list of active formatting elements and
/// form element pointer.
///
/// Holds one share of every entry it names until `discard` is called.
#[must_use = "a snapshot keeps its entries alive until it is discarded"]
pub struct Snapshot<Handle> {
    open_elems: Vec<EntryId>,
    active_formatting: Vec<FormatEntry>,
    form_elem: Option<Handle>,
}

fn element_ids(entries: &[FormatEntry]) -> impl Iterator<Item = EntryId> + '_ {
    entries.iter().filter_map(|entry| match *entry {
        FormatEntry::Element(id) => Some(id),
        FormatEntry::Marker => None,
    })
}

impl<Handle: Clone> Snapshot<Handle> {
    pub fn capture(
        arena: &mut EntryArena<Handle>,
        open_elems: &OpenElementsStack,
        active_formatting: &ActiveFormattingList,
        form_elem: Option<&Handle>,
    ) -> Snapshot<Handle> {
        let snapshot = Snapshot {
            open_elems: open_elems.as_slice().to_vec(),
            active_formatting: active_formatting.as_slice().to_vec(),
            form_elem: form_elem.cloned(),
        };
        for &id in &snapshot.open_elems {
            arena.retain(id);
        }
        for id in element_ids(&snapshot.active_formatting) {
            arena.retain(id);
        }
        debug!(
            "captured snapshot: {} open elements, {} formatting entries",
            snapshot.open_elems.len(),
            snapshot.active_formatting.len()
        );
        snapshot
    }

    /// Make the live state equal to this snapshot again. The snapshot
    /// stays valid and can be restored more than once.
    pub fn restore(
        &self,
        arena: &mut EntryArena<Handle>,
        open_elems: &mut OpenElementsStack,
        active_formatting: &mut ActiveFormattingList,
        form_elem: &mut Option<Handle>,
    ) {
        // Take the new shares before dropping the old ones, so an entry
        // present on both sides is never destroyed in between.
        for &id in &self.open_elems {
            arena.retain(id);
        }
        for id in element_ids(&self.active_formatting) {
            arena.retain(id);
        }

        let old_open_elems = open_elems.replace_contents(self.open_elems.clone());
        let old_active_formatting =
            active_formatting.replace_contents(self.active_formatting.clone());
        for id in old_open_elems {
            arena.release(id);
        }
        for id in element_ids(&old_active_formatting) {
            arena.release(id);
        }

        *form_elem = self.form_elem.clone();
        debug!(
            "restored snapshot: {} open elements, {} formatting entries",
            self.open_elems.len(),
            self.active_formatting.len()
        );
    }

    /// Release everything this snapshot holds.
    pub fn discard(mut self, arena: &mut EntryArena<Handle>) {
        for id in self.open_elems.drain(..) {
            arena.release(id);
        }
        for entry in self.active_formatting.drain(..) {
            if let FormatEntry::Element(id) = entry {
                arena.release(id);
            }
        }
        self.form_elem = None;
    }

    pub fn restore_and_discard(
        self,
        arena: &mut EntryArena<Handle>,
        open_elems: &mut OpenElementsStack,
        active_formatting: &mut ActiveFormattingList,
        form_elem: &mut Option<Handle>,
    ) {
        self.restore(arena, open_elems, active_formatting, form_elem);
        self.discard(arena);
    }
}

impl<Handle> Snapshot<Handle> {
    pub fn open_elems(&self) -> &[EntryId] {
        &self.open_elems
    }

    pub fn active_formatting(&self) -> &[FormatEntry] {
        &self.active_formatting
    }

    pub fn form_elem(&self) -> Option<&Handle> {
        self.form_elem.as_ref()
    }
}

impl<Handle> Drop for Snapshot<Handle> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            debug_assert!(
                self.open_elems.is_empty() && self.active_formatting.is_empty(),
                "snapshot dropped without being discarded"
            );
        }
    }
}
