// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod util;

use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use html5stack::{
    html_descriptor, EntryArena, FormatEntry, LocalName, OpenElementsStack, Snapshot,
    StackEntry,
};
use html5stack::ActiveFormattingList;
use util::{attr, Builder};

#[test]
fn misnested_anchor_and_paragraph() {
    let mut b = Builder::new();
    b.start("a");
    b.text("1");
    b.start("p");
    b.text("2");
    b.end("a");
    b.text("3");
    b.end("p");

    assert_eq!(
        b.markup(),
        "<html><body><a>1</a><p><a>2</a>3</p></body></html>"
    );
    assert_eq!(
        *b.sink.errors.borrow(),
        ["Formatting element a not current node"]
    );
}

#[test]
fn formatting_reopens_in_next_paragraph() {
    let mut b = Builder::new();
    b.start("p");
    b.start("b");
    b.text("x");
    b.end("p");
    b.start("p");
    b.text("y");

    assert_eq!(
        b.markup(),
        "<html><body><p><b>x</b></p><p><b>y</b></p></body></html>"
    );
}

#[test]
fn nested_formatting_survives_block_boundary() {
    let mut b = Builder::new();
    b.start("b");
    b.start("i");
    b.text("1");
    b.start("div");
    b.text("2");
    b.end("b");
    b.text("3");

    assert_eq!(
        b.markup(),
        "<html><body><b><i>1</i></b><i><div><b>2</b>3</div></i></body></html>"
    );
}

#[test]
fn noahs_ark_limits_reconstruction_to_three() {
    let mut b = Builder::new();
    b.start("p");
    for _ in 0..4 {
        b.start_with_attrs("b", vec![attr("class", "x")]);
    }
    b.text("X");
    b.end("p");
    b.start("p");
    b.text("X");

    let b4 = r#"<b class="x">"#;
    assert_eq!(
        b.markup(),
        format!(
            "<html><body><p>{b4}{b4}{b4}{b4}X</b></b></b></b></p>\
             <p>{b4}{b4}{b4}X</b></b></b></p></body></html>"
        )
    );
}

#[test]
fn foster_parented_formatting_element() {
    let mut b = Builder::new();
    b.start("table");
    b.state.set_foster_parenting(true);
    b.start("b");
    b.state.set_foster_parenting(false);
    b.text("x");

    assert_eq!(
        b.markup(),
        "<html><body><b>x</b><table></table></body></html>"
    );
}

#[test]
fn template_contents_receive_children() {
    let mut b = Builder::new();
    b.start("template");
    b.start("span");
    b.text("t");

    assert_eq!(
        b.markup(),
        "<html><body><template><span>t</span></template></body></html>"
    );
}

#[test]
fn speculative_parse_rolls_back() {
    let mut b = Builder::new();
    b.start("em");
    b.state.insert_marker();
    let stack_before: Vec<_> = b.state.open_elems().iter().collect();
    let list_before = b.state.active_formatting().as_slice().to_vec();
    let live_before = b.state.arena().live_count();

    let snapshot = b.state.snapshot();
    b.start("s");
    b.start("table");
    b.end("em");
    b.state.clear_active_formatting_to_marker();

    b.state.restore_and_discard(snapshot);
    assert_eq!(b.state.open_elems().iter().collect::<Vec<_>>(), stack_before);
    assert_eq!(b.state.active_formatting().as_slice(), list_before);
    assert_eq!(b.state.arena().live_count(), live_before);
}

#[test]
fn end_releases_every_node() {
    let mut b = Builder::new();
    b.start("a");
    b.start("div");
    b.end("a");
    let body = b.state.open_elems().get(1);
    let body_node = b.state.entry(body).node.clone();
    assert!(Rc::strong_count(&body_node) > 2);

    b.state.end();
    assert_eq!(b.state.arena().live_count(), 0);
    // Only the DOM parent and this test still point at the node.
    assert_eq!(Rc::strong_count(&body_node), 2);
}

#[test]
fn snapshot_crosses_threads() {
    let mut arena = EntryArena::new();
    let mut stack = OpenElementsStack::new();
    let mut list = ActiveFormattingList::new();
    for name in ["html", "body", "b"] {
        let desc = html_descriptor(LocalName::from(name));
        let id = arena.insert(StackEntry::from_descriptor(&desc, Arc::<str>::from(name), vec![]));
        stack.push(id);
        if desc.group.is_formatting() {
            list.append(&mut arena, id);
        }
    }
    let form = Arc::<str>::from("form");
    let snapshot = Snapshot::capture(&mut arena, &stack, &list, Some(&form));

    let snapshot = thread::spawn(move || {
        assert_eq!(snapshot.open_elems().len(), 3);
        assert!(matches!(snapshot.active_formatting(), [FormatEntry::Element(_)]));
        snapshot
    })
    .join()
    .expect("snapshot thread panicked");

    assert_eq!(snapshot.form_elem().map(|f| &**f), Some("form"));
    snapshot.discard(&mut arena);
    list.teardown(&mut arena);
    stack.teardown(&mut arena);
    assert_eq!(arena.live_count(), 0);
}
