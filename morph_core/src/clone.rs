// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stand-in clones of the transition endpoints.
//!
//! The animation never touches the real `from` and `to` nodes beyond hiding
//! them. Instead each endpoint gets a deep clone whose every element carries
//! its source's computed style inline, so the clone looks the same wherever
//! it is inserted. [`Proxy`] owns such a clone, places it absolutely at the
//! endpoint's measured box inside the endpoint's offset parent, and exposes
//! the style writes the player performs on it.

use alloc::format;
use alloc::string::ToString;

use kurbo::Vec2;
use thiserror::Error;

use crate::backend::Host;
use crate::interpolate::TransformFrame;
use crate::probe::{Snapshot, cumulative_transform, find_ancestor_by_tag, margin, naked_rect};
use crate::style::{CornerRadii, Rgba};
use crate::time::Duration;
use crate::transform::{IDENTITY, invert};

/// Why a clone could not be produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CloneError {
    /// The host declined to clone a node.
    #[error("host refused to clone the node")]
    Refused,
}

/// Deep-clones a node, writing each element's computed style into its
/// `style` attribute.
///
/// Elements whose parent is in the SVG namespace also keep their inline
/// `width` and `height`, which SVG layout does not reflect in the computed
/// declaration block.
///
/// # Errors
///
/// [`CloneError::Refused`] if the host refuses to clone any node of the
/// subtree.
pub fn clone_tree<H: Host>(host: &mut H, node: &H::Node) -> Result<H::Node, CloneError> {
    let clone = host.clone_shallow(node).ok_or(CloneError::Refused)?;
    if !host.is_element(node) {
        return Ok(clone);
    }

    let width = host.inline_style(node, "width");
    let height = host.inline_style(node, "height");
    let css = host.computed_css_text(node);
    host.set_attribute(&clone, "style", &css);
    if host.parent(node).is_some_and(|p| host.is_svg(&p)) {
        host.set_inline_style(&clone, "width", &width);
        host.set_inline_style(&clone, "height", &height);
    }

    for child in host.children(node) {
        let child_clone = clone_tree(host, &child)?;
        host.append_child(&clone, &child_clone);
    }
    Ok(clone)
}

/// Deep-clones a node as-is, without inlining any style.
///
/// # Errors
///
/// [`CloneError::Refused`] if the host refuses to clone any node of the
/// subtree.
pub fn clone_plain<H: Host>(host: &mut H, node: &H::Node) -> Result<H::Node, CloneError> {
    let clone = host.clone_shallow(node).ok_or(CloneError::Refused)?;
    for child in host.children(node) {
        let child_clone = clone_plain(host, &child)?;
        host.append_child(&clone, &child_clone);
    }
    Ok(clone)
}

/// A styled clone of one endpoint, owned by a player.
#[derive(Clone, Debug)]
pub struct Proxy<N> {
    source: N,
    clone: N,
    root: N,
    attached: bool,
}

impl<N: Clone + PartialEq> Proxy<N> {
    /// Clones `source` with [`clone_tree`]. The clone is not yet attached.
    ///
    /// # Errors
    ///
    /// [`CloneError::Refused`] if the host refuses to clone.
    pub fn new<H: Host<Node = N>>(host: &mut H, source: &N) -> Result<Self, CloneError> {
        let clone = clone_tree(host, source)?;
        Ok(Self {
            source: source.clone(),
            root: clone.clone(),
            clone,
            attached: false,
        })
    }

    /// The node this proxy stands in for.
    pub fn source(&self) -> &N {
        &self.source
    }

    /// The styled clone.
    pub fn clone_node(&self) -> &N {
        &self.clone
    }

    /// The node inserted into the document: the clone itself, or the `<svg>`
    /// wrapper around an SVG clone.
    pub fn root(&self) -> &N {
        &self.root
    }

    /// Returns `true` while the clone is in the document.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns `true` if `node` is this proxy's clone or its wrapper.
    pub fn owns(&self, node: &N) -> bool {
        *node == self.clone || *node == self.root
    }

    /// Inserts the clone into the source's offset parent (the host root when
    /// there is none) so that it covers the snapshot's box.
    ///
    /// # Errors
    ///
    /// [`CloneError::Refused`] if an SVG wrapper cannot be cloned.
    pub fn insert<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        snapshot: &Snapshot<N>,
    ) -> Result<(), CloneError> {
        if self.attached {
            return Ok(());
        }
        let container = host
            .offset_parent(&self.source)
            .unwrap_or_else(|| host.root());

        if host.is_svg(&self.source) && host.tag_name(&self.source) != "svg" {
            if let Some(svg) = find_ancestor_by_tag(&*host, &self.source, "svg") {
                let wrapper = host.clone_shallow(&svg).ok_or(CloneError::Refused)?;
                host.append_child(&wrapper, &self.clone);
                self.root = wrapper;
            }
        }

        let container_ctm = host
            .parent(&container)
            .map_or(IDENTITY, |p| cumulative_transform(&*host, &p));
        let container_box = naked_rect(host, &container, invert(container_ctm).unwrap_or(IDENTITY));
        let container_margin = margin(&*host, &container);
        let scroll = host.scroll_offset(&container);

        let at = snapshot.bounding_box.origin().to_vec2() - snapshot.margin
            - (container_box.origin().to_vec2() - container_margin)
            + scroll;
        place(host, &self.root, at);
        host.append_child(&container, &self.root);
        self.attached = true;
        Ok(())
    }

    /// Removes the clone from the document. Safe to call repeatedly.
    pub fn detach<H: Host<Node = N>>(&mut self, host: &mut H) {
        if self.attached {
            host.remove(&self.root);
            self.attached = false;
        }
    }

    /// Sets the clone's inline opacity.
    pub fn set_opacity<H: Host<Node = N>>(&self, host: &mut H, opacity: f64) {
        host.set_inline_style(&self.clone, "opacity", &format!("{opacity}"));
    }

    /// Sets the clone's inline transform.
    pub fn set_transform<H: Host<Node = N>>(&self, host: &mut H, transform: &TransformFrame) {
        host.set_inline_style(&self.clone, "transform", &transform.to_string());
    }

    /// Sets the clone's inline background color.
    pub fn set_background_color<H: Host<Node = N>>(&self, host: &mut H, color: Rgba) {
        host.set_inline_style(&self.clone, "background-color", &color.to_string());
    }

    /// Sets the clone's inline border radius.
    pub fn set_border_radius<H: Host<Node = N>>(&self, host: &mut H, radii: &CornerRadii) {
        host.set_inline_style(&self.clone, "border-radius", &radii.to_string());
    }

    /// Runs the named `@keyframes` animation once over `duration`, linearly.
    pub fn animate_with_keyframes<H: Host<Node = N>>(
        &self,
        host: &mut H,
        name: &str,
        duration: Duration,
    ) {
        let seconds = duration.as_millis_f64() / 1000.0;
        for (property, value) in [
            ("animation-direction", "alternate"),
            ("animation-duration", &format!("{seconds}s")),
            ("animation-iteration-count", "1"),
            ("animation-name", name),
            ("animation-timing-function", "linear"),
        ] {
            host.set_inline_style(&self.clone, property, value);
        }
    }

    /// Copies the currently rendered animated properties into inline styles
    /// and stops any keyframe animation.
    pub fn freeze<H: Host<Node = N>>(&self, host: &mut H) {
        for property in ["opacity", "transform", "background-color", "border-radius"] {
            let value = host.computed_style(&self.clone, property);
            host.set_inline_style(&self.clone, property, &value);
        }
        for property in [
            "animation-direction",
            "animation-duration",
            "animation-iteration-count",
            "animation-name",
            "animation-timing-function",
        ] {
            host.set_inline_style(&self.clone, property, "");
        }
        host.set_inline_style(&self.clone, "animation", "none");
    }
}

fn place<H: Host>(host: &mut H, node: &H::Node, at: Vec2) {
    host.set_inline_style(node, "position", "absolute");
    host.set_inline_style(node, "transform-origin", "0 0");
    host.set_inline_style(node, "left", &format!("{}px", at.x));
    host.set_inline_style(node, "top", &format!("{}px", at.y));
}
