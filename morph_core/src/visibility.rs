// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hiding the real endpoints while their clones animate.
//!
//! [`hide`] zeroes a node's inline opacity with any inline `transition`
//! switched off, so the change is instant. The previous inline values are
//! stashed in data attributes. [`show`] puts the opacity back immediately
//! and restores the `transition` one task later, so restoring it does not
//! animate the reveal.

use crate::backend::Host;

const OPACITY_ATTRIBUTE: &str = "data-morph-opacity";
const TRANSITION_ATTRIBUTE: &str = "data-morph-transition";

/// Hides every node. Hiding an already hidden node keeps the originally
/// stashed values.
pub fn hide<H: Host>(host: &mut H, nodes: &[H::Node]) {
    for node in nodes {
        if host.attribute(node, OPACITY_ATTRIBUTE).is_some() {
            continue;
        }
        let opacity = host.inline_style(node, "opacity");
        let transition = host.inline_style(node, "transition");
        host.set_attribute(node, OPACITY_ATTRIBUTE, &opacity);
        host.set_attribute(node, TRANSITION_ATTRIBUTE, &transition);
        host.set_inline_style(node, "transition", "");
        host.set_inline_style(node, "opacity", "0");
    }
}

/// Reveals nodes hidden by [`hide`]. Other nodes are left alone.
pub fn show<H: Host>(host: &mut H, nodes: &[H::Node]) {
    for node in nodes {
        let Some(opacity) = host.attribute(node, OPACITY_ATTRIBUTE) else {
            continue;
        };
        let transition = host
            .attribute(node, TRANSITION_ATTRIBUTE)
            .unwrap_or_default();
        host.set_inline_style(node, "transition", "");
        host.set_inline_style(node, "opacity", &opacity);
        if !transition.is_empty() {
            host.defer_inline_style(node, "transition", &transition);
        }
        host.remove_attribute(node, OPACITY_ATTRIBUTE);
        host.remove_attribute(node, TRANSITION_ATTRIBUTE);
    }
}

/// Returns `true` if `node` is currently hidden by [`hide`].
pub fn is_hidden<H: Host>(host: &H, node: &H::Node) -> bool {
    host.attribute(node, OPACITY_ATTRIBUTE).is_some()
}
