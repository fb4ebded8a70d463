// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint-order comparison between two nodes.
//!
//! Two nodes anywhere in a document are compared by walking both ancestor
//! chains, discarding the shared tail, and comparing the outermost stacking
//! context on each remaining branch. Higher `z-index` wins; on a tie, the
//! branch whose root comes later among the common ancestor's children paints
//! on top.

use alloc::vec::Vec;

use thiserror::Error;

use crate::backend::Host;

/// Whether the first node of a comparison renders above or below the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackingOrder {
    /// The first node paints on top.
    Above,
    /// The second node paints on top.
    Below,
}

impl StackingOrder {
    /// `1` for [`Above`](Self::Above), `-1` for [`Below`](Self::Below).
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Above => 1,
            Self::Below => -1,
        }
    }

    /// The order seen from the other node.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
        }
    }
}

/// Why two nodes could not be compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StackingError {
    /// Both arguments are the same node.
    #[error("cannot compare a node with itself")]
    SameNode,
    /// The nodes are in different trees.
    #[error("nodes share no common ancestor")]
    Disconnected,
}

/// Properties whose presence in `will-change` creates a stacking context.
const WILL_CHANGE_PROPERTIES: [&str; 9] = [
    "position",
    "z-index",
    "opacity",
    "transform",
    "-webkit-transform",
    "mix-blend-mode",
    "filter",
    "-webkit-filter",
    "isolation",
];

/// Determines whether `a` renders above or below `b`.
///
/// When one node contains the other, the ancestor's side counts as z-index
/// 0, and the descendant is on top unless its outermost stacking context
/// has a negative z-index.
///
/// # Errors
///
/// [`StackingError::SameNode`] if `a == b`, [`StackingError::Disconnected`]
/// if the nodes are not in the same tree.
pub fn compare<H: Host>(
    host: &H,
    a: &H::Node,
    b: &H::Node,
) -> Result<StackingOrder, StackingError> {
    if a == b {
        return Err(StackingError::SameNode);
    }

    let mut branch_a = ancestor_chain(host, a);
    let mut branch_b = ancestor_chain(host, b);

    let mut common = None;
    while let (Some(x), Some(y)) = (branch_a.last(), branch_b.last()) {
        if x != y {
            break;
        }
        common = branch_a.pop();
        branch_b.pop();
    }
    let common = common.ok_or(StackingError::Disconnected)?;

    // An ancestor's branch is empty and counts as z-index 0.
    let z_a = outermost_context(host, &branch_a).map_or(0.0, |n| z_index(host, n));
    let z_b = outermost_context(host, &branch_b).map_or(0.0, |n| z_index(host, n));
    if z_a > z_b {
        return Ok(StackingOrder::Above);
    }
    if z_a < z_b {
        return Ok(StackingOrder::Below);
    }

    let (Some(root_a), Some(root_b)) = (branch_a.last(), branch_b.last()) else {
        // `a` is the common ancestor iff its branch is now empty.
        return Ok(if branch_a.is_empty() {
            StackingOrder::Below
        } else {
            StackingOrder::Above
        });
    };

    for child in host.children(&common).iter().rev() {
        if child == root_a {
            return Ok(StackingOrder::Above);
        }
        if child == root_b {
            return Ok(StackingOrder::Below);
        }
    }
    Err(StackingError::Disconnected)
}

/// Returns `true` if the element establishes a stacking context.
pub fn creates_stacking_context<H: Host>(host: &H, node: &H::Node) -> bool {
    if !host.is_element(node) {
        return false;
    }
    let style = |property: &str| host.computed_style(node, property);

    let position = style("position");
    if position == "fixed" {
        return true;
    }
    if (style("z-index") != "auto" && position != "static") || is_flex_item(host, node) {
        return true;
    }
    if style("opacity").trim().parse::<f64>().is_ok_and(|o| o < 1.0) {
        return true;
    }
    if style("transform") != "none" || style("filter") != "none" {
        return true;
    }
    if style("mix-blend-mode") != "normal" || style("isolation") == "isolate" {
        return true;
    }
    if style("will-change")
        .split(',')
        .any(|p| WILL_CHANGE_PROPERTIES.contains(&p.trim()))
    {
        return true;
    }
    style("-webkit-overflow-scrolling") == "touch"
}

fn is_flex_item<H: Host>(host: &H, node: &H::Node) -> bool {
    host.parent(node).is_some_and(|p| {
        host.is_element(&p) && matches!(host.computed_style(&p, "display").as_str(), "flex" | "inline-flex")
    })
}

/// `[node, parent, ..., top]`.
fn ancestor_chain<H: Host>(host: &H, node: &H::Node) -> Vec<H::Node> {
    let mut chain = Vec::new();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        current = host.parent(&n);
        chain.push(n);
    }
    chain
}

/// Scans a branch from its root inwards for the first stacking context.
fn outermost_context<'a, H: Host>(host: &H, branch: &'a [H::Node]) -> Option<&'a H::Node> {
    branch
        .iter()
        .rev()
        .find(|n| creates_stacking_context(host, n))
}

fn z_index<H: Host>(host: &H, node: &H::Node) -> f64 {
    host.computed_style(node, "z-index")
        .trim()
        .parse()
        .unwrap_or(0.0)
}
