// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Host`] over the browser DOM.
//!
//! Reads go through `getComputedStyle`, `getBoundingClientRect` and
//! `getCTM`; writes go through the element's inline style. DOM exceptions
//! from writes are ignored: a node that cannot take a style simply keeps
//! its old one.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Affine, Rect, Vec2};
use morph_core::backend::Host;
use morph_core::time::HostTime;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CssStyleDeclaration, Document, Element, HtmlElement, Node, SvgElement, SvgGraphicsElement,
    Window,
};

use crate::raf::performance_now;

/// The browser document as a transition host.
///
/// Cloning is cheap; every clone refers to the same document.
#[derive(Clone, Debug)]
pub struct WebHost {
    window: Window,
    document: Document,
    keyframes: bool,
}

impl WebHost {
    /// Connects to the global `window` and its document. `None` outside a
    /// browsing context.
    #[must_use]
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let keyframes = detect_keyframes(&document);
        Some(Self {
            window,
            document,
            keyframes,
        })
    }

    /// The document this host operates on.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn computed(&self, node: &Node) -> Option<CssStyleDeclaration> {
        let element = node.dyn_ref::<Element>()?;
        self.window.get_computed_style(element).ok().flatten()
    }
}

/// `@keyframes` playback needs both `transform` and `animation` on a
/// style declaration.
fn detect_keyframes(document: &Document) -> bool {
    let Ok(probe) = document.create_element("div") else {
        return false;
    };
    let Ok(probe) = probe.dyn_into::<HtmlElement>() else {
        return false;
    };
    let style = probe.style();
    ["transform", "animation"]
        .into_iter()
        .all(|name| js_sys::Reflect::has(&style, &name.into()).unwrap_or(false))
}

fn inline(node: &Node) -> Option<CssStyleDeclaration> {
    if let Some(element) = node.dyn_ref::<HtmlElement>() {
        return Some(element.style());
    }
    node.dyn_ref::<SvgElement>().map(SvgElement::style)
}

impl Host for WebHost {
    type Node = Node;
    type Sheet = Element;

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn is_element(&self, node: &Node) -> bool {
        node.node_type() == Node::ELEMENT_NODE
    }

    fn is_svg(&self, node: &Node) -> bool {
        node.dyn_ref::<SvgElement>().is_some()
    }

    fn tag_name(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(|element| element.tag_name().to_lowercase())
            .unwrap_or_default()
    }

    fn computed_style(&self, node: &Node, property: &str) -> String {
        self.computed(node)
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn computed_css_text(&self, node: &Node) -> String {
        let Some(style) = self.computed(node) else {
            return String::new();
        };
        // Chrome serializes computed declarations with an empty `cssText`,
        // so the declaration is walked property by property.
        let mut text = String::new();
        for i in 0..style.length() {
            let name = style.item(i);
            let value = style.get_property_value(&name).unwrap_or_default();
            text.push_str(&format!("{name}: {value}; "));
        }
        text
    }

    fn inline_style(&self, node: &Node, property: &str) -> String {
        inline(node)
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_inline_style(&mut self, node: &Node, property: &str, value: &str) {
        let Some(style) = inline(node) else {
            return;
        };
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn defer_inline_style(&mut self, node: &Node, property: &str, value: &str) {
        let Some(style) = inline(node) else {
            return;
        };
        let property = property.to_string();
        let value = value.to_string();
        let callback = Closure::once_into_js(move || {
            let _ = style.set_property(&property, &value);
        });
        let _ = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0);
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            let _ = element.set_attribute(name, value);
        }
    }

    fn remove_attribute(&mut self, node: &Node, name: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            let _ = element.remove_attribute(name);
        }
    }

    fn bounding_client_rect(&self, node: &Node) -> Rect {
        node.dyn_ref::<Element>()
            .map(|element| {
                let r = element.get_bounding_client_rect();
                Rect::new(r.left(), r.top(), r.right(), r.bottom())
            })
            .unwrap_or(Rect::ZERO)
    }

    fn offset_parent(&self, node: &Node) -> Option<Node> {
        node.dyn_ref::<HtmlElement>()?.offset_parent().map(Into::into)
    }

    fn scroll_offset(&self, node: &Node) -> Vec2 {
        node.dyn_ref::<Element>()
            .map(|element| {
                Vec2::new(
                    f64::from(element.scroll_left()),
                    f64::from(element.scroll_top()),
                )
            })
            .unwrap_or(Vec2::ZERO)
    }

    fn svg_ctm(&self, node: &Node) -> Option<Affine> {
        let m = node.dyn_ref::<SvgGraphicsElement>()?.get_ctm()?;
        Some(Affine::new([
            f64::from(m.a()),
            f64::from(m.b()),
            f64::from(m.c()),
            f64::from(m.d()),
            f64::from(m.e()),
            f64::from(m.f()),
        ]))
    }

    fn page_offset(&self) -> Vec2 {
        Vec2::new(
            self.window.page_x_offset().unwrap_or(0.0),
            self.window.page_y_offset().unwrap_or(0.0),
        )
    }

    fn root(&self) -> Node {
        match self.document.body() {
            Some(body) => body.into(),
            None => self.document.clone().into(),
        }
    }

    fn clone_shallow(&mut self, node: &Node) -> Option<Node> {
        node.clone_node().ok()
    }

    fn append_child(&mut self, parent: &Node, child: &Node) {
        let _ = parent.append_child(child);
    }

    fn remove(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }

    fn insert_stylesheet(&mut self, css: &str) -> Option<Element> {
        let head = self.document.head()?;
        let sheet = self.document.create_element("style").ok()?;
        sheet.set_text_content(Some(css));
        head.append_child(&sheet).ok()?;
        Some(sheet)
    }

    fn remove_stylesheet(&mut self, sheet: Element) {
        sheet.remove();
    }

    fn supports_keyframes(&self) -> bool {
        self.keyframes
    }

    fn now(&self) -> HostTime {
        HostTime::from_millis_f64(performance_now())
    }
}
