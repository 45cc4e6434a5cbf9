// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The list of active formatting elements.
//!
//! <https://html.spec.whatwg.org/#list-of-active-formatting-elements>

use std::slice;

use log::debug;
use markup5ever::LocalName;

use crate::entry::{EntryArena, EntryId};
use crate::interface::ElementSink;
use crate::stack::OpenElementsStack;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FormatEntry {
    Element(EntryId),
    Marker,
}

/// Active formatting elements, most recently added at end, with markers.
///
/// The list holds its own share of each element entry, separate from the
/// stack's share of the same entry.
#[derive(Clone, Debug, Default)]
pub struct ActiveFormattingList {
    entries: Vec<FormatEntry>,
}

impl ActiveFormattingList {
    pub fn new() -> ActiveFormattingList {
        ActiveFormattingList { entries: vec![] }
    }

    /// Push `id` onto the list, taking a new share of it.
    ///
    /// Applies the Noah's Ark clause first: if three equivalent elements
    /// already sit after the last marker, the earliest of them is dropped.
    pub fn append<Handle>(&mut self, arena: &mut EntryArena<Handle>, id: EntryId) {
        let mut first_match = None;
        let mut matches = 0usize;
        {
            let new_entry = arena.get(id);
            for (i, old) in self.end_to_marker() {
                if new_entry.equiv_modulo_attr_order(arena.get(old)) {
                    first_match = Some(i);
                    matches += 1;
                }
            }
        }

        if matches >= 3 {
            let index = first_match.expect("matches with no index");
            if let FormatEntry::Element(old) = self.entries.remove(index) {
                debug!(
                    "Noah's Ark: dropping <{}> at {} from active formatting elements",
                    arena.get(old).name,
                    index
                );
                arena.release(old);
            }
        }

        arena.retain(id);
        self.entries.push(FormatEntry::Element(id));
    }

    pub fn insert_marker(&mut self) {
        self.entries.push(FormatEntry::Marker);
    }

    /// <https://html.spec.whatwg.org/#clear-the-list-of-active-formatting-elements-up-to-the-last-marker>
    pub fn clear_to_last_marker<Handle>(&mut self, arena: &mut EntryArena<Handle>) {
        loop {
            match self.entries.pop() {
                None | Some(FormatEntry::Marker) => break,
                Some(FormatEntry::Element(id)) => {
                    arena.release(id);
                },
            }
        }
    }

    /// Iterate over the elements (with index in the list) from the end to
    /// the last marker, or the beginning if there are no markers.
    pub fn end_to_marker(&self) -> impl Iterator<Item = (usize, EntryId)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map_while(|(i, entry)| match *entry {
                FormatEntry::Element(id) => Some((i, id)),
                FormatEntry::Marker => None,
            })
    }

    /// The most recent HTML element named `name` after the last marker.
    pub fn find_by_name<Handle>(
        &self,
        arena: &EntryArena<Handle>,
        name: &LocalName,
    ) -> Option<(usize, EntryId)> {
        self.end_to_marker()
            .find(|&(_, id)| arena.get(id).is_html_named(name))
    }

    /// The most recent HTML element named `name` anywhere in the list,
    /// looking past markers.
    pub fn find_any_by_name<Handle>(
        &self,
        arena: &EntryArena<Handle>,
        name: &LocalName,
    ) -> Option<(usize, EntryId)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, entry)| match *entry {
                FormatEntry::Element(id) if arena.get(id).is_html_named(name) => Some((i, id)),
                _ => None,
            })
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| *entry == FormatEntry::Element(id))
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.position(id).is_some()
    }

    /// Drop the list's share of `id`. The entry lives on if the stack or a
    /// snapshot still holds it.
    pub fn remove_entry<Handle>(&mut self, arena: &mut EntryArena<Handle>, id: EntryId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.entries.remove(index);
        arena.release(id);
        true
    }

    /// Put `new` in `old`'s place. Takes over the caller's share of `new`.
    pub fn replace<Handle>(&mut self, arena: &mut EntryArena<Handle>, old: EntryId, new: EntryId) {
        let index = self
            .position(old)
            .expect("replaced element is not in active formatting elements");
        self.entries[index] = FormatEntry::Element(new);
        arena.release(old);
    }

    /// Insert `new` right after `existing`. Takes over the caller's share of
    /// `new`.
    pub fn insert_after(&mut self, existing: EntryId, new: EntryId) {
        let index = self
            .position(existing)
            .expect("bookmark not found in active formatting elements");
        self.entries.insert(index + 1, FormatEntry::Element(new));
    }

    fn is_marker_or_open(&self, stack: &OpenElementsStack, entry: FormatEntry) -> bool {
        match entry {
            FormatEntry::Marker => true,
            FormatEntry::Element(id) => stack.contains(id),
        }
    }

    /// <https://html.spec.whatwg.org/#reconstruct-the-active-formatting-elements>
    ///
    /// Returns the number of elements re-created.
    pub fn reconstruct<Handle, Sink>(
        &mut self,
        arena: &mut EntryArena<Handle>,
        stack: &mut OpenElementsStack,
        sink: &Sink,
        foster_parenting: bool,
    ) -> usize
    where
        Handle: Clone,
        Sink: ElementSink<Handle = Handle>,
    {
        // Step 1. If there are no entries in the list of active formatting elements,
        // then there is nothing to reconstruct; stop this algorithm.
        let Some(&last) = self.entries.last() else {
            return 0;
        };

        // Step 2. If the last entry is a marker, or an element that is in the stack
        // of open elements, then there is nothing to reconstruct.
        if self.is_marker_or_open(stack, last) {
            return 0;
        }

        // Step 3. Let entry be the last element in the list.
        let mut entry_index = self.entries.len() - 1;
        loop {
            // Step 4. Rewind: If there are no entries before entry, jump to create.
            if entry_index == 0 {
                break;
            }

            // Step 5. Let entry be the entry one earlier than entry.
            entry_index -= 1;

            // Step 6. If entry is neither a marker nor an open element, go to rewind.
            // Step 7. Advance: Let entry be the element one later than entry.
            if self.is_marker_or_open(stack, self.entries[entry_index]) {
                entry_index += 1;
                break;
            }
        }

        let mut created = 0;
        loop {
            // Step 8. Create: Insert an HTML element for the token for which the
            // element entry was created, to obtain new element.
            let old = match self.entries[entry_index] {
                FormatEntry::Element(id) => id,
                FormatEntry::Marker => {
                    panic!("Found marker during formatting element reconstruction")
                },
            };
            let insertion_point = stack.appropriate_place_for_insertion(arena, None, foster_parenting);
            let node = sink.create_element(arena.get(old));
            sink.insert(insertion_point, &node);
            let new_entry = arena.get(old).recreate(node);
            let new = arena.insert(new_entry);
            stack.push(new);

            // Step 9. Replace the entry for entry in the list with an entry for new element.
            arena.retain(new);
            self.entries[entry_index] = FormatEntry::Element(new);
            arena.release(old);
            created += 1;

            // Step 10. If the entry for new element is not the last entry in the
            // list, return to the step labeled advance.
            if entry_index == self.entries.len() - 1 {
                break;
            }
            entry_index += 1;
        }

        debug!("reconstructed {} active formatting elements", created);
        created
    }

    /// Release every element. End of parse only.
    pub fn teardown<Handle>(&mut self, arena: &mut EntryArena<Handle>) {
        while let Some(entry) = self.entries.pop() {
            if let FormatEntry::Element(id) = entry {
                arena.release(id);
            }
        }
    }

    /// Swap in new contents wholesale, returning the old ones. The caller
    /// is responsible for the shares on both sides.
    pub(crate) fn replace_contents(&mut self, entries: Vec<FormatEntry>) -> Vec<FormatEntry> {
        std::mem::replace(&mut self.entries, entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<slice::Iter<'_, FormatEntry>> {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[FormatEntry] {
        &self.entries
    }
}
