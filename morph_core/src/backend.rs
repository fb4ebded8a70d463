// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for document integrations.
//!
//! The engine never touches a concrete DOM. Everything it reads or writes
//! goes through the [`Host`] trait, which a backend implements over its
//! document model:
//!
//! - **Tree** — parent/children navigation, element and SVG detection.
//! - **Style** — computed values (as the host serializes them), inline
//!   declarations, and deferred inline writes (a zero-delay timer on the
//!   web).
//! - **Geometry** — client bounding rectangles, offset parents, scroll
//!   offsets and the SVG `getCTM` matrix.
//! - **Mutation** — shallow cloning, appending and removing nodes.
//! - **Stylesheets** — injecting and removing `@keyframes` rules.
//! - **Time** — a monotonic [`HostTime`] clock and whether native keyframe
//!   animation is available.
//!
//! # Crate boundaries
//!
//! `morph_core` owns the algorithms and ships one host,
//! [`Document`](crate::document::Document), an in-memory document used for
//! headless runs and tests. Backend crates (for example `morph_backend_web`)
//! implement [`Host`] over a real DOM and drive [`Player::tick`] and
//! [`Player::animation_ended`] from the platform's frame and event loops.
//!
//! [`Player::tick`]: crate::player::Player::tick
//! [`Player::animation_ended`]: crate::player::Player::animation_ended

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect, Vec2};

use crate::time::HostTime;

/// A document the transition engine can measure and mutate.
///
/// Property names are CSS property names in kebab case (`transform-origin`,
/// `background-color`). An empty string means "unset" for inline styles, both
/// when reading and when writing.
pub trait Host {
    /// A handle to a node in the document. Comparison is identity.
    type Node: Clone + PartialEq + fmt::Debug;

    /// A handle to an injected stylesheet.
    type Sheet: fmt::Debug;

    /// Returns the parent node, or `None` at the top of the tree.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns the direct children of `node` in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Returns `true` for element nodes (as opposed to text nodes).
    fn is_element(&self, node: &Self::Node) -> bool;

    /// Returns `true` for elements in the SVG namespace.
    fn is_svg(&self, node: &Self::Node) -> bool;

    /// Returns the element's tag name in lower case (empty for non-elements).
    fn tag_name(&self, node: &Self::Node) -> String;

    /// Returns the computed value of a property.
    fn computed_style(&self, node: &Self::Node, property: &str) -> String;

    /// Returns the computed style serialized as a declaration block, suitable
    /// for use as a `style` attribute.
    fn computed_css_text(&self, node: &Self::Node) -> String;

    /// Returns the inline value of a property, or an empty string.
    fn inline_style(&self, node: &Self::Node, property: &str) -> String;

    /// Sets an inline property. An empty `value` removes the declaration.
    fn set_inline_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Sets an inline property after the current task completes, so that a
    /// pending style change is not animated by it.
    fn defer_inline_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Returns an attribute value.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Sets an attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Removes an attribute if present.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Returns the client-space bounding rectangle with every transform in
    /// effect.
    fn bounding_client_rect(&self, node: &Self::Node) -> Rect;

    /// Returns the element's offset parent, if it has one.
    fn offset_parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns the element's own scroll offset.
    fn scroll_offset(&self, node: &Self::Node) -> Vec2;

    /// Returns the current transform matrix of an SVG element (its user space
    /// mapped to the nearest viewport), or `None` for other nodes.
    fn svg_ctm(&self, node: &Self::Node) -> Option<Affine>;

    /// Returns the document scroll offset.
    fn page_offset(&self) -> Vec2;

    /// Returns the node new content is appended to when nothing more
    /// specific applies (the body on the web).
    fn root(&self) -> Self::Node;

    /// Clones a node without its children. `None` if the host refuses.
    fn clone_shallow(&mut self, node: &Self::Node) -> Option<Self::Node>;

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Removes `node` from its parent. A detached node is left alone.
    fn remove(&mut self, node: &Self::Node);

    /// Injects a stylesheet. `None` if the host cannot.
    fn insert_stylesheet(&mut self, css: &str) -> Option<Self::Sheet>;

    /// Removes a previously injected stylesheet.
    fn remove_stylesheet(&mut self, sheet: Self::Sheet);

    /// Returns `true` if the host runs CSS `@keyframes` animations natively.
    fn supports_keyframes(&self) -> bool;

    /// Returns the current monotonic time.
    fn now(&self) -> HostTime;
}
