// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Endpoint measurement.
//!
//! [`capture`] reads everything a transition needs from one endpoint into an
//! immutable [`Snapshot`]: its naked layout box, its own and cumulative
//! transform, opacity, background color, corner radii and margin.
//!
//! The naked box is measured by briefly replacing the node's inline
//! transform with the inverse of its parent's cumulative transform (about a
//! `0 0` origin), so that neither the node's own transform nor its
//! ancestors' distort the rectangle. The previous inline values are restored
//! before `capture` returns.

use alloc::string::ToString;

use kurbo::{Affine, Rect, Size, Vec2};
use thiserror::Error;

use crate::backend::Host;
use crate::style::{
    CornerRadii, Radius, Rgba, parse_color, parse_corner_radius, parse_float_prefix, parse_origin,
    parse_transform,
};
use crate::transform::{CssMatrix, IDENTITY, invert};

/// Why an endpoint could not be measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The cumulative transform of the node's parent has no inverse (for
    /// example an ancestor with `scale(0)`), so the naked box is undefined.
    #[error("parent transform of the node is not invertible")]
    SingularParentTransform,
}

/// Geometry and appearance of one endpoint, taken before the transition
/// mutates anything.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<N> {
    /// The measured node.
    pub node: N,
    /// Layout box in client coordinates with transforms neutralized.
    pub bounding_box: Rect,
    /// The node's own origin-compensated transform (identity if none).
    pub transform: Affine,
    /// Parent cumulative transform composed with [`transform`](Self::transform).
    pub ctm: Affine,
    /// Inverse of the parent's cumulative transform.
    pub inverted_parent_ctm: Affine,
    /// Computed opacity.
    pub opacity: f64,
    /// Computed background color, if it parsed.
    pub background_color: Option<Rgba>,
    /// Computed corner radii in px.
    pub border_radius: CornerRadii,
    /// Left and top margins in px.
    pub margin: Vec2,
}

/// Measures a node.
///
/// The node's inline `transform` and `transform-origin` are modified and
/// restored; no other node is touched.
///
/// # Errors
///
/// [`ProbeError::SingularParentTransform`] if the parent's cumulative
/// transform cannot be inverted.
pub fn capture<H: Host>(host: &mut H, node: &H::Node) -> Result<Snapshot<H::Node>, ProbeError> {
    let parent_ctm = host
        .parent(node)
        .map_or(IDENTITY, |p| cumulative_transform(&*host, &p));
    let inverted_parent_ctm = invert(parent_ctm).ok_or(ProbeError::SingularParentTransform)?;
    let transform = local_transform(&*host, node).unwrap_or(IDENTITY);
    let bounding_box = naked_rect(host, node, inverted_parent_ctm);

    let size = bounding_box.size();
    let corner = |property: &str| corner_radius(&*host, node, property, size);
    let border_radius = CornerRadii {
        top_left: corner("border-top-left-radius"),
        top_right: corner("border-top-right-radius"),
        bottom_right: corner("border-bottom-right-radius"),
        bottom_left: corner("border-bottom-left-radius"),
    };

    Ok(Snapshot {
        node: node.clone(),
        bounding_box,
        transform,
        ctm: parent_ctm * transform,
        inverted_parent_ctm,
        opacity: host
            .computed_style(node, "opacity")
            .trim()
            .parse()
            .unwrap_or(1.0),
        background_color: parse_color(&host.computed_style(node, "background-color")),
        border_radius,
        margin: margin(&*host, node),
    })
}

/// Measures a node's client rectangle with `inverted_parent_ctm` as its
/// inline transform about a `0 0` origin, then restores its inline styles
/// and any `transform` attribute.
pub fn naked_rect<H: Host>(host: &mut H, node: &H::Node, inverted_parent_ctm: Affine) -> Rect {
    let origin = host.inline_style(node, "transform-origin");
    let transform = host.inline_style(node, "transform");
    let attribute = host.attribute(node, "transform");

    host.set_inline_style(node, "transform-origin", "0 0");
    host.set_inline_style(node, "transform", &CssMatrix(inverted_parent_ctm).to_string());
    let rect = host.bounding_client_rect(node);

    host.set_inline_style(node, "transform-origin", &origin);
    host.set_inline_style(node, "transform", &transform);
    if let Some(attribute) = attribute {
        host.set_attribute(node, "transform", &attribute);
    }
    rect
}

/// Returns the product of every local transform from `node` outwards.
///
/// SVG elements report the host's CTM directly when it has one. Non-element
/// nodes end the walk.
pub fn cumulative_transform<H: Host>(host: &H, node: &H::Node) -> Affine {
    if host.is_svg(node) {
        if let Some(ctm) = host.svg_ctm(node) {
            return ctm;
        }
    }
    let mut matrix = IDENTITY;
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if !host.is_element(&n) {
            break;
        }
        if let Some(local) = local_transform(host, &n) {
            matrix = local * matrix;
        }
        current = transform_parent(host, &n);
    }
    matrix
}

/// Returns an element's own transform in its parent's coordinates, or
/// `None` when it has none.
///
/// HTML transforms are compensated for `transform-origin`. SVG transforms are
/// derived from the CTMs of the element and its parent, and count as none
/// when the host has no CTM for the element. Unparseable transforms count as
/// none.
pub fn local_transform<H: Host>(host: &H, node: &H::Node) -> Option<Affine> {
    if host.is_svg(node) {
        // Not `cumulative_transform`, which walks back through here.
        let ctm = host.svg_ctm(node)?;
        let parent_ctm = host
            .parent(node)
            .map_or(IDENTITY, |p| cumulative_transform(host, &p));
        return invert(parent_ctm).map(|inv| inv * ctm);
    }

    let transform = host.computed_style(node, "transform");
    if transform.trim() == "none" {
        return None;
    }
    let matrix = parse_transform(&transform)?;
    let origin = parse_origin(&host.computed_style(node, "transform-origin")).unwrap_or(Vec2::ZERO);
    Some(Affine::translate(origin) * matrix * Affine::translate(-origin))
}

/// The node whose coordinate space `node`'s transform is expressed in: the
/// parent, or for SVG content the nearest `<svg>` ancestor.
pub fn transform_parent<H: Host>(host: &H, node: &H::Node) -> Option<H::Node> {
    if host.is_svg(node) && host.tag_name(node) != "svg" {
        return find_ancestor_by_tag(host, node, "svg");
    }
    host.parent(node)
}

/// Returns the nearest proper ancestor with the given tag.
pub fn find_ancestor_by_tag<H: Host>(host: &H, node: &H::Node, tag: &str) -> Option<H::Node> {
    let mut current = host.parent(node);
    while let Some(n) = current {
        if host.tag_name(&n) == tag {
            return Some(n);
        }
        current = host.parent(&n);
    }
    None
}

/// Left and top margins in px. Unparseable margins count as zero.
pub fn margin<H: Host>(host: &H, node: &H::Node) -> Vec2 {
    let px = |property: &str| parse_float_prefix(&host.computed_style(node, property)).unwrap_or(0.0);
    Vec2::new(px("margin-left"), px("margin-top"))
}

fn corner_radius<H: Host>(host: &H, node: &H::Node, property: &str, size: Size) -> Radius {
    parse_corner_radius(&host.computed_style(node, property), size).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;
    use crate::document::{Document, NodeId, SheetId};
    use crate::time::HostTime;

    const EPS: f64 = 1e-9;

    fn child(doc: &mut Document, parent: NodeId, styles: &[(&str, &str)]) -> NodeId {
        let node = doc.create_element("div");
        doc.set_styles(node, styles);
        doc.append(parent, node);
        node
    }

    fn assert_affine_close(a: Affine, b: Affine) {
        let (a, b) = (a.as_coeffs(), b.as_coeffs());
        for i in 0..6 {
            assert!((a[i] - b[i]).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn plain_box() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = child(
            &mut doc,
            body,
            &[
                ("margin-left", "10px"),
                ("margin-top", "4px"),
                ("width", "100px"),
                ("height", "50px"),
                ("opacity", "0.5"),
                ("background-color", "rgb(255, 0, 0)"),
                ("border-radius", "5px 10%"),
            ],
        );
        let snap = capture(&mut doc, &node).unwrap();
        assert_eq!(snap.bounding_box, Rect::new(10.0, 4.0, 110.0, 54.0));
        assert_eq!(snap.transform, IDENTITY);
        assert_eq!(snap.ctm, IDENTITY);
        assert!((snap.opacity - 0.5).abs() < EPS);
        assert_eq!(snap.margin, Vec2::new(10.0, 4.0));
        assert_eq!(
            snap.background_color,
            Some(Rgba {
                r: 255.0,
                g: 0.0,
                b: 0.0,
                alpha: 1.0
            })
        );
        assert_eq!(snap.border_radius.top_left, Radius { x: 5.0, y: 5.0 });
        assert_eq!(
            snap.border_radius.top_right,
            Radius { x: 10.0, y: 5.0 },
            "percentages resolve against the box"
        );
    }

    #[test]
    fn own_transform_is_neutralized() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = child(
            &mut doc,
            body,
            &[("width", "100px"), ("height", "100px"), ("transform", "rotate(30deg) scale(2)")],
        );
        let snap = capture(&mut doc, &node).unwrap();
        assert_eq!(snap.bounding_box, Rect::new(0.0, 0.0, 100.0, 100.0));
        // The stored transform acts about the box's top-left corner.
        let center = snap.transform * Point::new(50.0, 50.0);
        assert!((center - Point::new(50.0, 50.0)).hypot() < EPS, "{center:?}");
        assert_affine_close(snap.ctm, snap.transform);
    }

    #[test]
    fn inline_styles_are_restored() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = child(&mut doc, body, &[("width", "10px"), ("height", "10px")]);
        doc.set_inline_style(&node, "transform", "translateX(5px)");
        let _ = capture(&mut doc, &node).unwrap();
        assert_eq!(doc.inline_style(&node, "transform"), "translateX(5px)");
        assert_eq!(doc.inline_style(&node, "transform-origin"), "");
    }

    #[test]
    fn ancestor_transforms_compose() {
        let mut doc = Document::new();
        let body = doc.body();
        let parent = child(
            &mut doc,
            body,
            &[("width", "100px"), ("height", "100px"), ("transform", "translate(10px, 20px)")],
        );
        let node = child(
            &mut doc,
            parent,
            &[("width", "10px"), ("height", "10px"), ("transform", "scale(2)")],
        );
        let snap = capture(&mut doc, &node).unwrap();
        assert_eq!(snap.bounding_box, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_affine_close(snap.inverted_parent_ctm, Affine::translate((-10.0, -20.0)));
        assert_affine_close(
            snap.ctm,
            Affine::translate((10.0, 20.0)) * Affine::translate((-5.0, -5.0)) * Affine::scale(2.0),
        );
    }

    #[test]
    fn singular_parent_is_an_error() {
        let mut doc = Document::new();
        let body = doc.body();
        let parent = child(&mut doc, body, &[("transform", "scale(0)")]);
        let node = child(&mut doc, parent, &[]);
        assert_eq!(
            capture(&mut doc, &node),
            Err(ProbeError::SingularParentTransform)
        );
    }

    #[test]
    fn svg_content_uses_ctm() {
        let mut doc = Document::new();
        let body = doc.body();
        let svg = doc.create_svg_element("svg");
        doc.set_styles(svg, &[("margin-left", "100px"), ("width", "200px"), ("height", "200px")]);
        doc.append(body, svg);
        let group = doc.create_svg_element("g");
        doc.set_attribute(&group, "transform", "translate(10, 20)");
        doc.append(svg, group);
        let rect = doc.create_svg_element("rect");
        for (name, value) in [("x", "5"), ("y", "5"), ("width", "30"), ("height", "40")] {
            doc.set_attribute(&rect, name, value);
        }
        doc.append(group, rect);

        assert_eq!(transform_parent(&doc, &rect), Some(svg));
        let snap = capture(&mut doc, &rect).unwrap();
        assert_affine_close(snap.transform, IDENTITY);
        assert_affine_close(snap.ctm, Affine::translate((10.0, 20.0)));
        assert_eq!(snap.bounding_box, Rect::new(105.0, 5.0, 135.0, 45.0));
        assert_eq!(doc.attribute(&rect, "transform"), None);

        let group_snap = capture(&mut doc, &group).unwrap();
        assert_affine_close(group_snap.transform, Affine::translate((10.0, 20.0)));
        assert_eq!(
            doc.attribute(&group, "transform").as_deref(),
            Some("translate(10, 20)")
        );
    }

    /// A document that reports no SVG CTM, like an unrendered `<svg>`.
    #[derive(Debug)]
    struct Unrendered(Document);

    impl Host for Unrendered {
        type Node = NodeId;
        type Sheet = SheetId;

        fn parent(&self, node: &NodeId) -> Option<NodeId> {
            self.0.parent(node)
        }
        fn children(&self, node: &NodeId) -> Vec<NodeId> {
            self.0.children(node)
        }
        fn is_element(&self, node: &NodeId) -> bool {
            self.0.is_element(node)
        }
        fn is_svg(&self, node: &NodeId) -> bool {
            self.0.is_svg(node)
        }
        fn tag_name(&self, node: &NodeId) -> String {
            self.0.tag_name(node)
        }
        fn computed_style(&self, node: &NodeId, property: &str) -> String {
            self.0.computed_style(node, property)
        }
        fn computed_css_text(&self, node: &NodeId) -> String {
            self.0.computed_css_text(node)
        }
        fn inline_style(&self, node: &NodeId, property: &str) -> String {
            self.0.inline_style(node, property)
        }
        fn set_inline_style(&mut self, node: &NodeId, property: &str, value: &str) {
            self.0.set_inline_style(node, property, value);
        }
        fn defer_inline_style(&mut self, node: &NodeId, property: &str, value: &str) {
            self.0.defer_inline_style(node, property, value);
        }
        fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
            self.0.attribute(node, name)
        }
        fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
            self.0.set_attribute(node, name, value);
        }
        fn remove_attribute(&mut self, node: &NodeId, name: &str) {
            self.0.remove_attribute(node, name);
        }
        fn bounding_client_rect(&self, node: &NodeId) -> Rect {
            self.0.bounding_client_rect(node)
        }
        fn offset_parent(&self, node: &NodeId) -> Option<NodeId> {
            self.0.offset_parent(node)
        }
        fn scroll_offset(&self, node: &NodeId) -> Vec2 {
            self.0.scroll_offset(node)
        }
        fn svg_ctm(&self, _node: &NodeId) -> Option<Affine> {
            None
        }
        fn page_offset(&self) -> Vec2 {
            self.0.page_offset()
        }
        fn root(&self) -> NodeId {
            self.0.root()
        }
        fn clone_shallow(&mut self, node: &NodeId) -> Option<NodeId> {
            self.0.clone_shallow(node)
        }
        fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
            self.0.append_child(parent, child);
        }
        fn remove(&mut self, node: &NodeId) {
            self.0.remove(node);
        }
        fn insert_stylesheet(&mut self, css: &str) -> Option<SheetId> {
            self.0.insert_stylesheet(css)
        }
        fn remove_stylesheet(&mut self, sheet: SheetId) {
            self.0.remove_stylesheet(sheet);
        }
        fn supports_keyframes(&self) -> bool {
            self.0.supports_keyframes()
        }
        fn now(&self) -> HostTime {
            self.0.now()
        }
    }

    #[test]
    fn svg_without_ctm_has_no_local_transform() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = child(&mut doc, body, &[("transform", "translate(3px, 4px)")]);
        let svg = doc.create_svg_element("svg");
        doc.append(outer, svg);
        let rect = doc.create_svg_element("rect");
        doc.set_attribute(&rect, "transform", "translate(10, 20)");
        doc.append(svg, rect);
        let mut host = Unrendered(doc);

        assert_eq!(local_transform(&host, &rect), None);
        assert_eq!(local_transform(&host, &svg), None);
        assert_affine_close(
            cumulative_transform(&host, &rect),
            Affine::translate((3.0, 4.0)),
        );
        let snap = capture(&mut host, &rect).unwrap();
        assert_eq!(snap.transform, IDENTITY);
        assert_affine_close(snap.inverted_parent_ctm, Affine::translate((-3.0, -4.0)));
    }
}
