// Copyright 2014-2025 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Element-name descriptors: the fixed classification of an element name
//! that the stack and scope algorithms dispatch on.
//!
//! The HTML vocabulary is a compile-time perfect hash table. Anything not in
//! it (custom elements, unknown tags) is `ElementGroup::Other` with every flag
//! cleared.

use markup5ever::{namespace_url, ns, LocalName, Namespace};
use phf::phf_map;

/// Dispatch class of an element.
///
/// The discriminant is the integer class used by insertion-mode tables;
/// `group as u8` is stable.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
#[repr(u8)]
pub enum ElementGroup {
    Other = 0,
    Html,
    Head,
    Body,
    Frameset,
    Form,
    P,
    Li,
    DdOrDt,
    OlOrUl,
    Heading,
    Button,
    Select,
    Optgroup,
    Option,
    Table,
    Caption,
    Colgroup,
    Col,
    TbodyOrTheadOrTfoot,
    Tr,
    TdOrTh,
    Template,
    ObjectOrMarqueeOrApplet,
    A,
    Font,
    Nobr,
    /// b, big, code, em, i, s, small, strike, strong, tt, u
    Formatting,
    /// rb, rp, rt, rtc
    Ruby,
}

impl ElementGroup {
    /// <https://html.spec.whatwg.org/#formatting>
    pub fn is_formatting(self) -> bool {
        matches!(
            self,
            ElementGroup::A | ElementGroup::Font | ElementGroup::Nobr | ElementGroup::Formatting
        )
    }

    /// <https://html.spec.whatwg.org/#generate-implied-end-tags>
    pub fn implies_end_tag(self) -> bool {
        matches!(
            self,
            ElementGroup::DdOrDt
                | ElementGroup::Li
                | ElementGroup::Optgroup
                | ElementGroup::Option
                | ElementGroup::P
                | ElementGroup::Ruby
        )
    }

    /// <https://html.spec.whatwg.org/#generate-all-implied-end-tags-thoroughly>
    pub fn implies_end_tag_thoroughly(self) -> bool {
        self.implies_end_tag()
            || matches!(
                self,
                ElementGroup::Caption
                    | ElementGroup::Colgroup
                    | ElementGroup::TbodyOrTheadOrTfoot
                    | ElementGroup::TdOrTh
                    | ElementGroup::Tr
            )
    }
}

#[derive(Copy, Clone, Debug)]
struct Flags {
    group: ElementGroup,
    scoping: bool,
    special: bool,
    foster_parenting: bool,
}

const fn plain(group: ElementGroup) -> Flags {
    Flags {
        group,
        scoping: false,
        special: false,
        foster_parenting: false,
    }
}

const fn special(group: ElementGroup) -> Flags {
    Flags {
        group,
        scoping: false,
        special: true,
        foster_parenting: false,
    }
}

const fn scoping(group: ElementGroup) -> Flags {
    Flags {
        group,
        scoping: true,
        special: true,
        foster_parenting: false,
    }
}

const fn foster(group: ElementGroup) -> Flags {
    Flags {
        group,
        scoping: false,
        special: true,
        foster_parenting: true,
    }
}

const TABLE: Flags = Flags {
    group: ElementGroup::Table,
    scoping: true,
    special: true,
    foster_parenting: true,
};

static HTML_ELEMENTS: phf::Map<&'static str, Flags> = phf_map! {
    "html" => scoping(ElementGroup::Html),
    "head" => special(ElementGroup::Head),
    "body" => special(ElementGroup::Body),
    "frameset" => special(ElementGroup::Frameset),
    "form" => special(ElementGroup::Form),
    "p" => special(ElementGroup::P),
    "li" => special(ElementGroup::Li),
    "dd" => special(ElementGroup::DdOrDt),
    "dt" => special(ElementGroup::DdOrDt),
    "ol" => special(ElementGroup::OlOrUl),
    "ul" => special(ElementGroup::OlOrUl),
    "h1" => special(ElementGroup::Heading),
    "h2" => special(ElementGroup::Heading),
    "h3" => special(ElementGroup::Heading),
    "h4" => special(ElementGroup::Heading),
    "h5" => special(ElementGroup::Heading),
    "h6" => special(ElementGroup::Heading),
    "button" => special(ElementGroup::Button),
    "select" => special(ElementGroup::Select),
    "optgroup" => plain(ElementGroup::Optgroup),
    "option" => plain(ElementGroup::Option),
    "table" => TABLE,
    "caption" => scoping(ElementGroup::Caption),
    "colgroup" => special(ElementGroup::Colgroup),
    "col" => special(ElementGroup::Col),
    "tbody" => foster(ElementGroup::TbodyOrTheadOrTfoot),
    "thead" => foster(ElementGroup::TbodyOrTheadOrTfoot),
    "tfoot" => foster(ElementGroup::TbodyOrTheadOrTfoot),
    "tr" => foster(ElementGroup::Tr),
    "td" => scoping(ElementGroup::TdOrTh),
    "th" => scoping(ElementGroup::TdOrTh),
    "template" => scoping(ElementGroup::Template),
    "applet" => scoping(ElementGroup::ObjectOrMarqueeOrApplet),
    "marquee" => scoping(ElementGroup::ObjectOrMarqueeOrApplet),
    "object" => scoping(ElementGroup::ObjectOrMarqueeOrApplet),
    "a" => plain(ElementGroup::A),
    "font" => plain(ElementGroup::Font),
    "nobr" => plain(ElementGroup::Nobr),
    "b" => plain(ElementGroup::Formatting),
    "big" => plain(ElementGroup::Formatting),
    "code" => plain(ElementGroup::Formatting),
    "em" => plain(ElementGroup::Formatting),
    "i" => plain(ElementGroup::Formatting),
    "s" => plain(ElementGroup::Formatting),
    "small" => plain(ElementGroup::Formatting),
    "strike" => plain(ElementGroup::Formatting),
    "strong" => plain(ElementGroup::Formatting),
    "tt" => plain(ElementGroup::Formatting),
    "u" => plain(ElementGroup::Formatting),
    "rb" => plain(ElementGroup::Ruby),
    "rp" => plain(ElementGroup::Ruby),
    "rt" => plain(ElementGroup::Ruby),
    "rtc" => plain(ElementGroup::Ruby),
    "address" => special(ElementGroup::Other),
    "area" => special(ElementGroup::Other),
    "article" => special(ElementGroup::Other),
    "aside" => special(ElementGroup::Other),
    "base" => special(ElementGroup::Other),
    "basefont" => special(ElementGroup::Other),
    "bgsound" => special(ElementGroup::Other),
    "blockquote" => special(ElementGroup::Other),
    "br" => special(ElementGroup::Other),
    "center" => special(ElementGroup::Other),
    "details" => special(ElementGroup::Other),
    "dir" => special(ElementGroup::Other),
    "div" => special(ElementGroup::Other),
    "dl" => special(ElementGroup::Other),
    "embed" => special(ElementGroup::Other),
    "fieldset" => special(ElementGroup::Other),
    "figcaption" => special(ElementGroup::Other),
    "figure" => special(ElementGroup::Other),
    "footer" => special(ElementGroup::Other),
    "frame" => special(ElementGroup::Other),
    "header" => special(ElementGroup::Other),
    "hgroup" => special(ElementGroup::Other),
    "hr" => special(ElementGroup::Other),
    "iframe" => special(ElementGroup::Other),
    "img" => special(ElementGroup::Other),
    "input" => special(ElementGroup::Other),
    "keygen" => special(ElementGroup::Other),
    "link" => special(ElementGroup::Other),
    "listing" => special(ElementGroup::Other),
    "main" => special(ElementGroup::Other),
    "menu" => special(ElementGroup::Other),
    "meta" => special(ElementGroup::Other),
    "nav" => special(ElementGroup::Other),
    "noembed" => special(ElementGroup::Other),
    "noframes" => special(ElementGroup::Other),
    "noscript" => special(ElementGroup::Other),
    "param" => special(ElementGroup::Other),
    "plaintext" => special(ElementGroup::Other),
    "pre" => special(ElementGroup::Other),
    "script" => special(ElementGroup::Other),
    "search" => special(ElementGroup::Other),
    "section" => special(ElementGroup::Other),
    "source" => special(ElementGroup::Other),
    "style" => special(ElementGroup::Other),
    "summary" => special(ElementGroup::Other),
    "textarea" => special(ElementGroup::Other),
    "title" => special(ElementGroup::Other),
    "track" => special(ElementGroup::Other),
    "wbr" => special(ElementGroup::Other),
    "xmp" => special(ElementGroup::Other),
};

/// The `(group, name, scoping, special, fosterParenting)` classification of
/// an element name.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ElementDescriptor {
    pub group: ElementGroup,
    pub ns: Namespace,
    pub name: LocalName,
    pub scoping: bool,
    pub special: bool,
    pub foster_parenting: bool,
}

impl ElementDescriptor {
    pub fn new(
        group: ElementGroup,
        ns: Namespace,
        name: LocalName,
        scoping: bool,
        special: bool,
        foster_parenting: bool,
    ) -> ElementDescriptor {
        ElementDescriptor {
            group,
            ns,
            name,
            scoping,
            special,
            foster_parenting,
        }
    }

    fn from_flags(ns: Namespace, name: LocalName, flags: Flags) -> ElementDescriptor {
        ElementDescriptor::new(
            flags.group,
            ns,
            name,
            flags.scoping,
            flags.special,
            flags.foster_parenting,
        )
    }
}

/// Look up an element in the HTML namespace.
///
/// `name` must already be ASCII-lowercased, as the tokenizer emits it.
pub fn html_descriptor(name: LocalName) -> ElementDescriptor {
    let flags = HTML_ELEMENTS
        .get(&*name)
        .copied()
        .unwrap_or(plain(ElementGroup::Other));
    ElementDescriptor::from_flags(ns!(html), name, flags)
}

/// Look up an element in the SVG or MathML namespace.
///
/// Only the elements that bound the default scope (and are therefore also
/// special) get flags; everything else is a plain `Other`.
pub fn foreign_descriptor(ns: Namespace, name: LocalName) -> ElementDescriptor {
    let boundary = if ns == ns!(mathml) {
        matches!(&*name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
    } else if ns == ns!(svg) {
        matches!(&*name, "foreignObject" | "desc" | "title")
    } else {
        false
    };
    let flags = if boundary {
        scoping(ElementGroup::Other)
    } else {
        plain(ElementGroup::Other)
    };
    ElementDescriptor::from_flags(ns, name, flags)
}
