// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory document host.
//!
//! [`Document`] implements [`Host`] without a browser. Nodes live in
//! struct-of-arrays storage addressed by [`NodeId`] handles. Each element
//! carries two style maps: *declared* styles stand in for author stylesheet
//! rules and are set with [`Document::set_style`]; *inline* styles are what
//! the engine reads and writes through [`Host`]. Computed values resolve
//! inline first, then declared, then the initial value.
//!
//! Layout is a positioned-box model, not flow layout: every element is a
//! `width × height` box placed at its containing block's origin plus its
//! margin (and `left`/`top` unless `position: static`). Absolutely
//! positioned elements resolve against their offset parent, static and
//! relative ones against their parent. CSS transforms apply about each box's
//! `transform-origin`, so bounding rectangles match what a browser reports
//! for the same boxes.
//!
//! The document also keeps injected stylesheets, a queue of deferred inline
//! writes (flushed with [`Document::flush_deferred`]) and a manual clock
//! (advanced with [`Document::advance`]).

mod id;
mod layout;
mod traverse;

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Rect, Vec2};

pub use id::{NodeId, SheetId};
pub use traverse::{Ancestors, Children};

use crate::backend::Host;
use crate::time::{Duration, HostTime};
use id::INVALID;

/// What a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element with a tag, styles and attributes.
    Element,
    /// A text node.
    Text,
}

type StyleMap = BTreeMap<String, String>;

#[derive(Clone, Debug)]
struct Deferred {
    node: u32,
    property: String,
    value: String,
}

/// Struct-of-arrays storage for an in-memory document.
///
/// A fresh document holds a single `body` element, returned by
/// [`body`](Self::body). Nodes created afterwards are detached until
/// appended somewhere.
#[derive(Debug)]
pub struct Document {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Node data --
    kind: Vec<NodeKind>,
    tag: Vec<String>,
    svg: Vec<bool>,
    text: Vec<String>,
    declared: Vec<StyleMap>,
    inline: Vec<StyleMap>,
    attributes: Vec<StyleMap>,
    scroll: Vec<Vec2>,

    // -- Document state --
    body: u32,
    page_offset: Vec2,
    stylesheets: Vec<Option<String>>,
    deferred: Vec<Deferred>,
    clock: HostTime,
    keyframes_supported: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document containing only a `body` element.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            tag: Vec::new(),
            svg: Vec::new(),
            text: Vec::new(),
            declared: Vec::new(),
            inline: Vec::new(),
            attributes: Vec::new(),
            scroll: Vec::new(),
            body: INVALID,
            page_offset: Vec2::ZERO,
            stylesheets: Vec::new(),
            deferred: Vec::new(),
            clock: HostTime(0),
            keyframes_supported: true,
        };
        doc.body = doc.alloc(NodeKind::Element, "body", false, "");
        doc
    }

    // -- Allocation API --

    /// Creates a detached HTML element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        NodeId(self.alloc(NodeKind::Element, tag, false, ""))
    }

    /// Creates a detached element in the SVG namespace.
    pub fn create_svg_element(&mut self, tag: &str) -> NodeId {
        NodeId(self.alloc(NodeKind::Element, tag, true, ""))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        NodeId(self.alloc(NodeKind::Text, "", false, text))
    }

    fn alloc(&mut self, kind: NodeKind, tag: &str, svg: bool, text: &str) -> u32 {
        let idx = u32::try_from(self.kind.len()).unwrap_or(INVALID - 1);
        self.parent.push(INVALID);
        self.first_child.push(INVALID);
        self.next_sibling.push(INVALID);
        self.prev_sibling.push(INVALID);
        self.kind.push(kind);
        self.tag.push(tag.to_ascii_lowercase());
        self.svg.push(svg);
        self.text.push(text.to_owned());
        self.declared.push(StyleMap::new());
        self.inline.push(StyleMap::new());
        self.attributes.push(StyleMap::new());
        self.scroll.push(Vec2::ZERO);
        idx
    }

    // -- Topology API --

    /// Returns the `body` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        NodeId(self.body)
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let p = parent.0;
        let c = child.0;
        if self.parent[c as usize] != INVALID {
            self.unlink_from_parent(c);
        }

        self.parent[c as usize] = p;
        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Detaches a node (and its subtree) from its parent.
    pub fn detach(&mut self, node: NodeId) {
        if self.parent[node.0 as usize] != INVALID {
            self.unlink_from_parent(node.0);
        }
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        let p = self.parent[node.0 as usize];
        (p != INVALID).then_some(NodeId(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn child_nodes(&self, node: NodeId) -> Children<'_> {
        Children::new(self, self.first_child[node.0 as usize])
    }

    /// Returns an iterator from `node` up to the top of its tree.
    #[must_use]
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, node.0)
    }

    /// Returns `true` if the node is connected to the body.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n.0 == self.body)
    }

    /// Returns what kind of node this is.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.kind[node.0 as usize]
    }

    /// Returns the text of a text node (empty for elements).
    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        &self.text[node.0 as usize]
    }

    // -- Style API --

    /// Sets a declared (author) style. An empty value removes it.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        write_style(&mut self.declared[node.0 as usize], property, value);
    }

    /// Sets several declared styles at once.
    pub fn set_styles(&mut self, node: NodeId, styles: &[(&str, &str)]) {
        for (property, value) in styles {
            self.set_style(node, property, value);
        }
    }

    /// Sets an element's scroll offset.
    pub fn set_scroll(&mut self, node: NodeId, offset: Vec2) {
        self.scroll[node.0 as usize] = offset;
    }

    /// Sets the document scroll offset.
    pub fn set_page_offset(&mut self, offset: Vec2) {
        self.page_offset = offset;
    }

    // -- Host state --

    /// Advances the clock.
    pub fn advance(&mut self, by: Duration) {
        self.clock = self.clock.saturating_add(by);
    }

    /// Controls whether [`Host::supports_keyframes`] reports native keyframe
    /// support. Defaults to `true`.
    pub fn set_keyframes_supported(&mut self, supported: bool) {
        self.keyframes_supported = supported;
    }

    /// Returns the live stylesheets in insertion order.
    pub fn stylesheets(&self) -> impl Iterator<Item = &str> + '_ {
        self.stylesheets.iter().filter_map(Option::as_deref)
    }

    /// Applies every deferred inline write in the order it was queued.
    pub fn flush_deferred(&mut self) {
        for write in core::mem::take(&mut self.deferred) {
            write_style(&mut self.inline[write.node as usize], &write.property, &write.value);
        }
    }

    /// Returns the number of queued deferred writes.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    // -- Internal helpers --

    fn is_element_at(&self, idx: u32) -> bool {
        self.kind[idx as usize] == NodeKind::Element
    }

    /// Resolves a computed value: inline, then declared, then initial.
    pub(crate) fn computed(&self, idx: u32, property: &str) -> String {
        if !self.is_element_at(idx) {
            return String::new();
        }
        let i = idx as usize;
        let raw = self.inline[i]
            .get(property)
            .or_else(|| self.declared[i].get(property));
        match property {
            "transform" => raw
                .or_else(|| self.svg[i].then(|| self.attributes[i].get("transform")).flatten())
                .and_then(|v| normalize_transform(v))
                .unwrap_or_else(|| "none".to_owned()),
            "transform-origin" => match raw {
                Some(v) => v.clone(),
                None if self.viewport_of(idx).is_some() => "0px 0px".to_owned(),
                None => {
                    let size = self.layout_box(idx).size();
                    format!("{}px {}px", size.width / 2.0, size.height / 2.0)
                }
            },
            "border-top-left-radius"
            | "border-top-right-radius"
            | "border-bottom-right-radius"
            | "border-bottom-left-radius" => raw.cloned().unwrap_or_else(|| {
                self.computed_shorthand(i, "border-radius")
                    .and_then(|s| radius_longhand(s, corner_index(property)))
                    .unwrap_or_else(|| "0px".to_owned())
            }),
            _ => raw
                .cloned()
                .unwrap_or_else(|| initial_value(property).to_owned()),
        }
    }

    fn computed_shorthand(&self, i: usize, property: &str) -> Option<&str> {
        self.inline[i]
            .get(property)
            .or_else(|| self.declared[i].get(property))
            .map(String::as_str)
    }

    /// Removes `idx` from its parent's child list.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

impl Host for Document {
    type Node = NodeId;
    type Sheet = SheetId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parent_of(*node)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.child_nodes(*node).collect()
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.is_element_at(node.0)
    }

    fn is_svg(&self, node: &NodeId) -> bool {
        self.svg[node.0 as usize]
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.tag[node.0 as usize].clone()
    }

    fn computed_style(&self, node: &NodeId, property: &str) -> String {
        self.computed(node.0, property)
    }

    fn computed_css_text(&self, node: &NodeId) -> String {
        let i = node.0 as usize;
        let mut merged = self.declared[i].clone();
        merged.extend(self.inline[i].iter().map(|(k, v)| (k.clone(), v.clone())));
        serialize_declarations(&merged)
    }

    fn inline_style(&self, node: &NodeId, property: &str) -> String {
        self.inline[node.0 as usize]
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_inline_style(&mut self, node: &NodeId, property: &str, value: &str) {
        write_style(&mut self.inline[node.0 as usize], property, value);
    }

    fn defer_inline_style(&mut self, node: &NodeId, property: &str, value: &str) {
        self.deferred.push(Deferred {
            node: node.0,
            property: property.to_owned(),
            value: value.to_owned(),
        });
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let i = node.0 as usize;
        if name == "style" {
            let inline = &self.inline[i];
            return (!inline.is_empty()).then(|| serialize_declarations(inline));
        }
        self.attributes[i].get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        let i = node.0 as usize;
        if name == "style" {
            self.inline[i] = parse_declarations(value);
        } else {
            self.attributes[i].insert(name.to_owned(), value.to_owned());
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        let i = node.0 as usize;
        if name == "style" {
            self.inline[i].clear();
        } else {
            self.attributes[i].remove(name);
        }
    }

    fn bounding_client_rect(&self, node: &NodeId) -> Rect {
        if !self.is_element_at(node.0) {
            return Rect::ZERO;
        }
        let bbox = self
            .world_transform(node.0)
            .transform_rect_bbox(self.layout_box(node.0));
        bbox - self.page_offset
    }

    fn offset_parent(&self, node: &NodeId) -> Option<NodeId> {
        self.offset_parent_idx(node.0).map(NodeId)
    }

    fn scroll_offset(&self, node: &NodeId) -> Vec2 {
        self.scroll[node.0 as usize]
    }

    fn svg_ctm(&self, node: &NodeId) -> Option<Affine> {
        self.svg_ctm_idx(node.0)
    }

    fn page_offset(&self) -> Vec2 {
        self.page_offset
    }

    fn root(&self) -> NodeId {
        NodeId(self.body)
    }

    fn clone_shallow(&mut self, node: &NodeId) -> Option<NodeId> {
        let src = node.0 as usize;
        let tag = self.tag[src].clone();
        let text = self.text[src].clone();
        let idx = self.alloc(self.kind[src], &tag, self.svg[src], &text);
        let dst = idx as usize;
        self.declared[dst] = self.declared[src].clone();
        self.inline[dst] = self.inline[src].clone();
        self.attributes[dst] = self.attributes[src].clone();
        Some(NodeId(idx))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.append(*parent, *child);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn insert_stylesheet(&mut self, css: &str) -> Option<SheetId> {
        let id = u32::try_from(self.stylesheets.len()).ok()?;
        self.stylesheets.push(Some(css.to_owned()));
        Some(SheetId(id))
    }

    fn remove_stylesheet(&mut self, sheet: SheetId) {
        if let Some(slot) = self.stylesheets.get_mut(sheet.0 as usize) {
            *slot = None;
        }
    }

    fn supports_keyframes(&self) -> bool {
        self.keyframes_supported
    }

    fn now(&self) -> HostTime {
        self.clock
    }
}

fn write_style(map: &mut StyleMap, property: &str, value: &str) {
    if value.is_empty() {
        map.remove(property);
    } else {
        map.insert(property.to_owned(), value.to_owned());
    }
}

fn initial_value(property: &str) -> &'static str {
    match property {
        "opacity" => "1",
        "position" => "static",
        "display" => "block",
        "z-index" | "left" | "top" | "isolation" | "will-change" | "-webkit-overflow-scrolling" => {
            "auto"
        }
        "filter" | "animation-name" => "none",
        "mix-blend-mode" => "normal",
        "background-color" => "rgba(0, 0, 0, 0)",
        "border-radius" | "width" | "height" | "margin-top" | "margin-right"
        | "margin-bottom" | "margin-left" => "0px",
        _ => "",
    }
}

/// Serializes a transform the way browsers report it: `none` or a single
/// `matrix()`. Unparseable values compute to `none`.
fn normalize_transform(value: &str) -> Option<String> {
    if value.trim() == "none" {
        return None;
    }
    crate::style::parse_transform(value)
        .map(|m| format!("{}", crate::transform::CssMatrix(m)))
}

fn corner_index(property: &str) -> usize {
    match property {
        "border-top-left-radius" => 0,
        "border-top-right-radius" => 1,
        "border-bottom-right-radius" => 2,
        _ => 3,
    }
}

/// Picks one corner out of a `border-radius` shorthand.
fn radius_longhand(shorthand: &str, corner: usize) -> Option<String> {
    let (horizontal, vertical) = match shorthand.split_once('/') {
        Some((h, v)) => (h, Some(v)),
        None => (shorthand, None),
    };
    let pick = |list: &str| -> Option<String> {
        let values: Vec<&str> = list.split_whitespace().collect();
        let i = match (values.len(), corner) {
            (1, _) | (2, 0 | 2) | (3, 0) => 0,
            (2, _) | (3, 1 | 3) => 1,
            (3, _) => 2,
            (4, c) => c,
            _ => return None,
        };
        values.get(i).map(|v| (*v).to_owned())
    };
    let x = pick(horizontal)?;
    let y = match vertical {
        Some(v) => pick(v)?,
        None => x.clone(),
    };
    Some(if x == y { x } else { format!("{x} {y}") })
}

fn parse_declarations(css: &str) -> StyleMap {
    css.split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty() && !v.is_empty()).then(|| (k.to_owned(), v.to_owned()))
        })
        .collect()
}

fn serialize_declarations(map: &StyleMap) -> String {
    let decls: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v};")).collect();
    decls.join(" ")
}
