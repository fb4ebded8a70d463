// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box placement and transform composition for [`Document`].
//!
//! All boxes are in document coordinates (before the page offset is
//! subtracted). HTML elements are placed by their containing block. SVG
//! descendants are placed in the user space of their nearest `<svg>`
//! viewport by their `x`, `y`, `width` and `height` attributes, and transform
//! about that viewport's origin.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size, Vec2};

use super::Document;
use super::id::{INVALID, NodeId};
use crate::style::{parse_origin, parse_px, parse_transform};

impl Document {
    /// Returns the untransformed border box of an element.
    pub(crate) fn layout_box(&self, idx: u32) -> Rect {
        if !self.is_element_at(idx) {
            return Rect::ZERO;
        }
        if let Some(viewport) = self.viewport_of(idx) {
            let origin = self.layout_box(viewport).origin();
            let at = Vec2::new(self.svg_attr(idx, "x"), self.svg_attr(idx, "y"));
            let size = Size::new(
                self.svg_length(idx, "width"),
                self.svg_length(idx, "height"),
            );
            return Rect::from_origin_size(origin + at, size);
        }

        let position = self.computed(idx, "position");
        let containing = match position.as_str() {
            "fixed" => self.page_offset.to_point(),
            "absolute" => match self.positioned_ancestor(idx) {
                Some(cb) => self.layout_box(cb).origin() - self.margin(cb) - self.scroll[cb as usize],
                None => Point::ZERO,
            },
            _ => match self.parent[idx as usize] {
                INVALID => Point::ZERO,
                p => self.layout_box(p).origin() - self.scroll[p as usize],
            },
        };
        let mut origin = containing + self.margin(idx);
        if position != "static" {
            origin += Vec2::new(self.length(idx, "left"), self.length(idx, "top"));
        }
        let size = Size::new(self.length(idx, "width"), self.length(idx, "height"));
        Rect::from_origin_size(origin, size)
    }

    /// The element's offset parent: the nearest positioned ancestor, or the
    /// body. `None` for fixed, detached and body elements.
    pub(crate) fn offset_parent_idx(&self, idx: u32) -> Option<u32> {
        if idx == self.body
            || !self.is_attached(NodeId(idx))
            || self.computed(idx, "position") == "fixed"
        {
            return None;
        }
        self.positioned_ancestor(idx)
    }

    /// Nearest ancestor with a non-static position, else the top of the
    /// node's tree.
    fn positioned_ancestor(&self, idx: u32) -> Option<u32> {
        let mut top = None;
        let mut current = self.parent[idx as usize];
        while current != INVALID {
            if current == self.body || self.computed(current, "position") != "static" {
                return Some(current);
            }
            top = Some(current);
            current = self.parent[current as usize];
        }
        top
    }

    /// Maps an element's local space to document space, composing every
    /// ancestor's transform.
    pub(crate) fn world_transform(&self, idx: u32) -> Affine {
        let chain: Vec<u32> = self.ancestors(NodeId(idx)).map(|n| n.0).collect();
        chain.iter().rev().fold(Affine::IDENTITY, |world, &i| {
            world * self.placed_transform(i)
        })
    }

    /// An element's transform positioned about its reference point in
    /// document space.
    fn placed_transform(&self, idx: u32) -> Affine {
        if !self.is_element_at(idx) {
            return Affine::IDENTITY;
        }
        let reference = match self.viewport_of(idx) {
            Some(viewport) => self.layout_box(viewport).origin(),
            None => self.layout_box(idx).origin(),
        };
        let offset = reference.to_vec2();
        Affine::translate(offset) * self.local_matrix(idx) * Affine::translate(-offset)
    }

    /// `translate(origin) · transform · translate(-origin)` in the element's
    /// own coordinates.
    fn local_matrix(&self, idx: u32) -> Affine {
        let matrix = parse_transform(&self.computed(idx, "transform")).unwrap_or(Affine::IDENTITY);
        let origin = parse_origin(&self.computed(idx, "transform-origin")).unwrap_or(Vec2::ZERO);
        Affine::translate(origin) * matrix * Affine::translate(-origin)
    }

    /// User space to viewport for SVG elements. The outermost `<svg>` is its
    /// own viewport and reports the identity.
    pub(crate) fn svg_ctm_idx(&self, idx: u32) -> Option<Affine> {
        if !self.svg[idx as usize] {
            return None;
        }
        let mut ctm = Affine::IDENTITY;
        let mut current = idx;
        while current != INVALID && self.viewport_of(current).is_some() {
            ctm = self.local_matrix(current) * ctm;
            current = self.parent[current as usize];
        }
        Some(ctm)
    }

    /// The nearest `<svg>` ancestor of an SVG element.
    pub(super) fn viewport_of(&self, idx: u32) -> Option<u32> {
        if !self.svg[idx as usize] {
            return None;
        }
        let mut current = self.parent[idx as usize];
        while current != INVALID && self.svg[current as usize] {
            if self.tag[current as usize] == "svg" {
                return Some(current);
            }
            current = self.parent[current as usize];
        }
        None
    }

    fn margin(&self, idx: u32) -> Vec2 {
        Vec2::new(self.length(idx, "margin-left"), self.length(idx, "margin-top"))
    }

    fn length(&self, idx: u32, property: &str) -> f64 {
        parse_px(&self.computed(idx, property)).unwrap_or(0.0)
    }

    fn svg_attr(&self, idx: u32, name: &str) -> f64 {
        self.attributes[idx as usize]
            .get(name)
            .and_then(|v| parse_px(v))
            .unwrap_or(0.0)
    }

    fn svg_length(&self, idx: u32, name: &str) -> f64 {
        self.attributes[idx as usize]
            .get(name)
            .and_then(|v| parse_px(v))
            .unwrap_or_else(|| self.length(idx, name))
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Vec2};

    use crate::backend::Host;
    use crate::document::Document;

    #[test]
    fn relative_offsets_do_not_move_children_twice() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = doc.create_element("div");
        doc.set_styles(outer, &[("position", "relative"), ("left", "10px")]);
        doc.append(body, outer);
        let inner = doc.create_element("div");
        doc.set_styles(inner, &[("width", "5px"), ("height", "5px"), ("margin-left", "3px")]);
        doc.append(outer, inner);
        assert_eq!(doc.bounding_client_rect(&inner), Rect::new(13.0, 0.0, 18.0, 5.0));
    }

    #[test]
    fn fixed_elements_ignore_page_scroll() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.create_element("div");
        doc.set_styles(
            node,
            &[("position", "fixed"), ("top", "10px"), ("width", "1px"), ("height", "1px")],
        );
        doc.append(body, node);
        doc.set_page_offset(Vec2::new(0.0, 500.0));
        assert_eq!(doc.bounding_client_rect(&node), Rect::new(0.0, 10.0, 1.0, 11.0));
        assert_eq!(doc.offset_parent(&node), None);
    }

    #[test]
    fn svg_children_use_viewport_space() {
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

        assert_eq!(doc.svg_ctm(&svg), Some(kurbo::Affine::IDENTITY));
        assert_eq!(
            doc.svg_ctm(&rect),
            Some(kurbo::Affine::translate((10.0, 20.0)))
        );
        assert_eq!(
            doc.bounding_client_rect(&rect),
            Rect::new(115.0, 25.0, 145.0, 65.0)
        );
        assert_eq!(doc.svg_ctm(&body), None);
    }
}
