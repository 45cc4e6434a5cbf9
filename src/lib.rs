// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Element bookkeeping for an HTML5 tree builder: the stack of open
//! elements, the list of active formatting elements, and snapshots of both
//! for speculative parsing.
//!
//! Entries are shared between the stack, the list and any number of
//! snapshots through an [`EntryArena`], which destroys an entry once its
//! last holder lets go of it. DOM work is delegated to an [`ElementSink`].

#![crate_name = "html5stack"]

pub use markup5ever::{Attribute, LocalName, Namespace, QualName};

pub use descriptor::{foreign_descriptor, html_descriptor, ElementDescriptor, ElementGroup};
pub use entry::{EntryArena, EntryId, StackEntry};
pub use formatting::{ActiveFormattingList, FormatEntry};
pub use interface::ElementSink;
pub use snapshot::Snapshot;
pub use stack::{InsertionPoint, OpenElementsStack, Position, ScopeKind};
pub use state::{AdoptionOutcome, TreeState, TreeStateOpts};

pub mod descriptor;
pub mod entry;
pub mod formatting;
pub mod interface;
pub mod snapshot;
pub mod stack;
pub mod state;

#[cfg(test)]
mod test_util;
