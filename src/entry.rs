// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stack entries and the arena that counts their holders.
//!
//! One logical element record is aliased by the stack of open elements, the
//! list of active formatting elements and any number of snapshots. Those
//! structures hold `EntryId`s; the arena slot keeps the holder count and
//! frees the record when the last holder lets go.

use std::fmt;

use markup5ever::{namespace_url, ns, Attribute, LocalName, Namespace};

use crate::descriptor::{ElementDescriptor, ElementGroup};

/// An element as seen by the tree builder's bookkeeping.
///
/// Immutable after construction. `name`, `pop_name` and `node` are cloned in
/// once here and dropped once when the arena frees the slot.
#[derive(Clone)]
pub struct StackEntry<Handle> {
    pub group: ElementGroup,
    pub ns: Namespace,
    pub name: LocalName,
    /// Name an end tag must carry to close this element.
    pub pop_name: LocalName,
    pub node: Handle,
    /// Attributes of the token the element was created for.
    pub attrs: Vec<Attribute>,
    pub scoping: bool,
    pub special: bool,
    pub foster_parenting: bool,
}

impl<Handle> StackEntry<Handle> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group: ElementGroup,
        ns: Namespace,
        name: LocalName,
        pop_name: LocalName,
        node: Handle,
        scoping: bool,
        special: bool,
        foster_parenting: bool,
        attrs: Vec<Attribute>,
    ) -> StackEntry<Handle> {
        StackEntry {
            group,
            ns,
            name,
            pop_name,
            node,
            attrs,
            scoping,
            special,
            foster_parenting,
        }
    }

    pub fn from_descriptor(
        desc: &ElementDescriptor,
        node: Handle,
        attrs: Vec<Attribute>,
    ) -> StackEntry<Handle> {
        StackEntry::with_pop_name(desc, node, desc.name.clone(), attrs)
    }

    /// For elements closed by a tag other than their own name, such as HTML
    /// integration points inside foreign content.
    pub fn with_pop_name(
        desc: &ElementDescriptor,
        node: Handle,
        pop_name: LocalName,
        attrs: Vec<Attribute>,
    ) -> StackEntry<Handle> {
        StackEntry::new(
            desc.group,
            desc.ns.clone(),
            desc.name.clone(),
            pop_name,
            node,
            desc.scoping,
            desc.special,
            desc.foster_parenting,
            attrs,
        )
    }

    /// A synthesized scope boundary for foreign content. Never special and
    /// never a foster parent, whatever the descriptor says.
    pub fn scope_boundary(
        desc: &ElementDescriptor,
        node: Handle,
        pop_name: LocalName,
        scoping: bool,
    ) -> StackEntry<Handle> {
        StackEntry::new(
            desc.group,
            desc.ns.clone(),
            desc.name.clone(),
            pop_name,
            node,
            scoping,
            false,
            false,
            vec![],
        )
    }

    /// Same identity fields and token, different node.
    pub fn recreate(&self, node: Handle) -> StackEntry<Handle> {
        StackEntry {
            group: self.group,
            ns: self.ns.clone(),
            name: self.name.clone(),
            pop_name: self.pop_name.clone(),
            node,
            attrs: self.attrs.clone(),
            scoping: self.scoping,
            special: self.special,
            foster_parenting: self.foster_parenting,
        }
    }

    pub fn is_html_named(&self, name: &LocalName) -> bool {
        self.ns == ns!(html) && self.name == *name
    }

    pub fn is_html(&self) -> bool {
        self.ns == ns!(html)
    }

    pub fn is_formatting(&self) -> bool {
        self.is_html() && self.group.is_formatting()
    }

    /// Same name, namespace and attributes, in any attribute order.
    ///
    /// This is the equality the Noah's Ark clause counts with.
    pub fn equiv_modulo_attr_order(&self, other: &StackEntry<Handle>) -> bool {
        if self.ns != other.ns || self.name != other.name {
            return false;
        }
        if self.attrs.len() != other.attrs.len() {
            return false;
        }

        let mut self_attrs = self.attrs.clone();
        let mut other_attrs = other.attrs.clone();
        self_attrs.sort();
        other_attrs.sort();

        self_attrs == other_attrs
    }
}

impl<Handle> fmt::Debug for StackEntry<Handle> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StackEntry")
            .field("group", &self.group)
            .field("ns", &self.ns)
            .field("name", &self.name)
            .field("pop_name", &self.pop_name)
            .field("attrs", &self.attrs.len())
            .finish()
    }
}

/// Handle to a live `StackEntry` inside an `EntryArena`.
///
/// The generation makes a handle to a freed entry detectable even after its
/// slot has been reused.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
pub struct EntryId {
    index: u32,
    generation: u32,
}

struct Slot<Handle> {
    generation: u32,
    refcount: u32,
    entry: Option<StackEntry<Handle>>,
}

/// Owner of every `StackEntry`, with one holder count per entry.
pub struct EntryArena<Handle> {
    slots: Vec<Slot<Handle>>,
    free: Vec<u32>,
    live: usize,
}

impl<Handle> Default for EntryArena<Handle> {
    fn default() -> EntryArena<Handle> {
        EntryArena::new()
    }
}

impl<Handle> EntryArena<Handle> {
    pub fn new() -> EntryArena<Handle> {
        EntryArena {
            slots: vec![],
            free: vec![],
            live: 0,
        }
    }

    /// Store `entry` with a holder count of one; the caller owns that share.
    pub fn insert(&mut self, entry: StackEntry<Handle>) -> EntryId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.entry.is_none());
            slot.refcount = 1;
            slot.entry = Some(entry);
            return EntryId {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("stack entry arena overflow");
        self.slots.push(Slot {
            generation: 0,
            refcount: 1,
            entry: Some(entry),
        });
        EntryId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: EntryId) -> &Slot<Handle> {
        let slot = &self.slots[id.index as usize];
        assert!(
            slot.generation == id.generation && slot.entry.is_some(),
            "use of a destroyed stack entry"
        );
        slot
    }

    fn slot_mut(&mut self, id: EntryId) -> &mut Slot<Handle> {
        let slot = &mut self.slots[id.index as usize];
        assert!(
            slot.generation == id.generation && slot.entry.is_some(),
            "use of a destroyed stack entry"
        );
        slot
    }

    pub fn get(&self, id: EntryId) -> &StackEntry<Handle> {
        self.slot(id).entry.as_ref().expect("checked by slot()")
    }

    /// Add a holder.
    pub fn retain(&mut self, id: EntryId) {
        self.slot_mut(id).refcount += 1;
    }

    /// Drop a holder; returns true if this was the last one and the entry
    /// was destroyed.
    pub fn release(&mut self, id: EntryId) -> bool {
        let slot = self.slot_mut(id);
        debug_assert!(slot.refcount > 0);
        slot.refcount -= 1;
        if slot.refcount > 0 {
            return false;
        }

        let entry = slot.entry.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        drop(entry);
        true
    }

    pub fn refcount(&self, id: EntryId) -> u32 {
        self.slot(id).refcount
    }

    pub fn is_live(&self, id: EntryId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.entry.is_some())
    }

    /// Number of entries not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use markup5ever::{local_name, namespace_url, ns, Attribute, LocalName, QualName};
    use markup5ever::tendril::StrTendril;

    use super::{EntryArena, StackEntry};
    use crate::descriptor::{foreign_descriptor, html_descriptor};

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: StrTendril::from(value),
        }
    }

    #[test]
    fn destroyed_after_last_release() {
        let node = Rc::new("b");
        let mut arena = EntryArena::new();
        let entry = StackEntry::from_descriptor(
            &html_descriptor(local_name!("b")),
            node.clone(),
            vec![],
        );
        let id = arena.insert(entry);
        assert_eq!(arena.refcount(id), 1);
        assert_eq!(Rc::strong_count(&node), 2);

        arena.retain(id);
        arena.retain(id);
        assert_eq!(arena.refcount(id), 3);
        // Retains never clone the node.
        assert_eq!(Rc::strong_count(&node), 2);

        assert!(!arena.release(id));
        assert!(!arena.release(id));
        assert!(arena.is_live(id));
        assert!(arena.release(id));
        assert!(!arena.is_live(id));
        assert_eq!(arena.live_count(), 0);
        assert_eq!(Rc::strong_count(&node), 1);
    }

    #[test]
    #[should_panic(expected = "use of a destroyed stack entry")]
    fn double_release_is_fatal() {
        let mut arena = EntryArena::new();
        let id = arena.insert(StackEntry::from_descriptor(
            &html_descriptor(local_name!("p")),
            (),
            vec![],
        ));
        arena.release(id);
        arena.release(id);
    }

    #[test]
    fn reused_slot_does_not_resurrect_old_id() {
        let mut arena = EntryArena::new();
        let old = arena.insert(StackEntry::from_descriptor(
            &html_descriptor(local_name!("p")),
            1u32,
            vec![],
        ));
        arena.release(old);
        let new = arena.insert(StackEntry::from_descriptor(
            &html_descriptor(local_name!("div")),
            2u32,
            vec![],
        ));
        assert_ne!(old, new);
        assert!(!arena.is_live(old));
        assert_eq!(arena.get(new).node, 2);
    }

    #[test]
    fn construction_variants() {
        let desc = foreign_descriptor(ns!(mathml), local_name!("mi"));
        let plain = StackEntry::from_descriptor(&desc, (), vec![]);
        assert_eq!(plain.pop_name, plain.name);
        assert!(plain.scoping && plain.special);

        let renamed = StackEntry::with_pop_name(&desc, (), local_name!("annotation-xml"), vec![]);
        assert_eq!(renamed.name, local_name!("mi"));
        assert_eq!(renamed.pop_name, local_name!("annotation-xml"));
        assert!(renamed.special);

        let boundary =
            StackEntry::scope_boundary(&html_descriptor(local_name!("table")), (), local_name!("table"), true);
        assert!(boundary.scoping);
        assert!(!boundary.special && !boundary.foster_parenting);

        let unscoped =
            StackEntry::scope_boundary(&html_descriptor(local_name!("td")), (), local_name!("td"), false);
        assert!(!unscoped.scoping);
    }

    #[test]
    fn equivalence_ignores_attribute_order() {
        let desc = html_descriptor(local_name!("a"));
        let x = StackEntry::from_descriptor(&desc, (), vec![attr("href", "/"), attr("class", "c")]);
        let y = StackEntry::from_descriptor(&desc, (), vec![attr("class", "c"), attr("href", "/")]);
        let z = StackEntry::from_descriptor(&desc, (), vec![attr("href", "/x"), attr("class", "c")]);
        assert!(x.equiv_modulo_attr_order(&y));
        assert!(!x.equiv_modulo_attr_order(&z));

        let b = StackEntry::from_descriptor(&html_descriptor(local_name!("b")), (), vec![]);
        assert!(!b.equiv_modulo_attr_order(&x));
        assert!(b.is_formatting());
    }
}
