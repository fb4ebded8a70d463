// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Id-keyed shared elements across mounts.
//!
//! A [`Registry`] remembers, for every id, the node most recently mounted
//! under it and where that node was on the page. When another node is
//! mounted under a known id, the registry recreates the previous node as a
//! plain clone at its remembered placement and transitions from that clone
//! to the new node. This is how a view that replaces its content can still
//! morph "the same" element from its old position to its new one.
//!
//! The registry is an ordinary owned value; independent registries never
//! see each other's ids.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::Rect;

use crate::backend::Host;
use crate::clone::clone_plain;
use crate::player::{Player, Tick};
use crate::probe::margin;
use crate::transition::{TransitionError, TransitionOptions, transition};
use crate::visibility::{hide, show};

/// Attribute marking the stand-in for a previous mount.
pub const CLONE_ATTRIBUTE: &str = "data-clone";

/// Where a registered node was last seen.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// Margin-adjusted box in page coordinates (client box plus page
    /// offset, minus the left and top margins).
    pub rect: Rect,
    /// Computed `border-radius`.
    pub border_radius: String,
}

impl Placement {
    /// Measures a node.
    pub fn of<H: Host>(host: &H, node: &H::Node) -> Self {
        let rect = host.bounding_client_rect(node) + host.page_offset() - margin(host, node);
        Self {
            rect,
            border_radius: host.computed_style(node, "border-radius"),
        }
    }

    /// Writes the placement as absolute positioning.
    fn apply<H: Host>(&self, host: &mut H, node: &H::Node) {
        let rect = self.rect;
        host.set_inline_style(node, "position", "absolute");
        host.set_inline_style(node, "left", &format!("{}px", rect.x0));
        host.set_inline_style(node, "top", &format!("{}px", rect.y0));
        host.set_inline_style(node, "width", &format!("{}px", rect.width()));
        host.set_inline_style(node, "height", &format!("{}px", rect.height()));
        host.set_inline_style(node, "border-radius", &self.border_radius);
    }
}

/// Result of [`Registry::mount`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mounted {
    /// The id was new; the node is now registered.
    Registered,
    /// A transition from the previous mount started.
    Transitioning,
}

#[derive(Debug)]
struct Entry<N> {
    node: N,
    placement: Placement,
}

#[derive(Debug)]
struct Active<H: Host> {
    player: Player<H>,
    leftover: H::Node,
    node: H::Node,
}

/// Tracks shared elements by id and runs their transitions.
#[derive(Debug)]
pub struct Registry<H: Host> {
    entries: BTreeMap<String, Entry<H::Node>>,
    active: BTreeMap<String, Active<H>>,
}

impl<H: Host> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Registry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            active: BTreeMap::new(),
        }
    }

    /// Mounts `node` under `id`.
    ///
    /// For a new id the node is simply registered. For a known id, a plain
    /// clone of the previous node is placed where that node was last seen
    /// (marked with [`CLONE_ATTRIBUTE`]), a transition from it to `node`
    /// starts, and both are hidden until it completes. A transition already
    /// running for `id` is torn down first.
    ///
    /// # Errors
    ///
    /// Any [`TransitionError`]. The node is registered regardless, so the
    /// next mount can still transition from it.
    pub fn mount(
        &mut self,
        host: &mut H,
        id: &str,
        node: &H::Node,
        options: impl Into<TransitionOptions>,
    ) -> Result<Mounted, TransitionError> {
        self.unmount(host, id);
        let Some(entry) = self.entries.get(id) else {
            self.register(host, id, node);
            return Ok(Mounted::Registered);
        };

        let leftover = match clone_plain(host, &entry.node) {
            Ok(leftover) => leftover,
            Err(err) => {
                self.register(host, id, node);
                return Err(err.into());
            }
        };
        host.set_attribute(&leftover, CLONE_ATTRIBUTE, id);
        entry.placement.apply(host, &leftover);
        let root = host.root();
        host.append_child(&root, &leftover);

        match transition(host, &leftover, node, options) {
            Ok(player) => {
                hide(host, &[leftover.clone(), node.clone()]);
                self.active.insert(
                    id.to_string(),
                    Active {
                        player,
                        leftover,
                        node: node.clone(),
                    },
                );
                Ok(Mounted::Transitioning)
            }
            Err(err) => {
                host.remove(&leftover);
                self.register(host, id, node);
                Err(err)
            }
        }
    }

    /// Tears down any transition running for `id`.
    ///
    /// The node it was heading to is shown again and becomes the
    /// registration for `id`, measured where it is now.
    pub fn unmount(&mut self, host: &mut H, id: &str) {
        if let Some(mut active) = self.active.remove(id) {
            active.player.teardown(host);
            host.remove(&active.leftover);
            show(host, core::slice::from_ref(&active.node));
            self.register(host, id, &active.node);
        }
    }

    /// Advances every timer-driven transition. Returns the ids that
    /// completed.
    pub fn tick(&mut self, host: &mut H) -> Vec<String> {
        let finished: Vec<String> = self
            .active
            .iter_mut()
            .filter_map(|(id, active)| {
                (active.player.tick(host) == Tick::Finished).then(|| id.clone())
            })
            .collect();
        for id in &finished {
            self.complete(host, id);
        }
        finished
    }

    /// Routes a keyframe end event. Returns the id whose transition it
    /// completed, if any.
    pub fn animation_ended(&mut self, host: &mut H, target: &H::Node) -> Option<String> {
        let id = self
            .active
            .iter()
            .find(|(_, active)| active.player.owns(target))
            .map(|(id, _)| id.clone())?;
        let finished = self
            .active
            .get_mut(&id)
            .is_some_and(|active| active.player.animation_ended(host, target));
        if finished {
            self.complete(host, &id);
            return Some(id);
        }
        None
    }

    /// Returns `true` if a transition is running for `id`.
    #[must_use]
    pub fn is_animating(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    /// Returns `true` if any transition is running.
    #[must_use]
    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// The player of the transition running for `id`.
    #[must_use]
    pub fn player(&self, id: &str) -> Option<&Player<H>> {
        self.active.get(id).map(|active| &active.player)
    }

    /// The player of the transition running for `id`, for pausing or
    /// seeking.
    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player<H>> {
        self.active.get_mut(id).map(|active| &mut active.player)
    }

    /// The node registered under `id`.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&H::Node> {
        self.entries.get(id).map(|entry| &entry.node)
    }

    /// Where the node registered under `id` was last seen.
    #[must_use]
    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.entries.get(id).map(|entry| &entry.placement)
    }

    /// Tears down every transition and forgets every id.
    pub fn clear(&mut self, host: &mut H) {
        let ids: Vec<String> = self.active.keys().cloned().collect();
        for id in &ids {
            self.unmount(host, id);
        }
        self.entries.clear();
    }

    fn register(&mut self, host: &H, id: &str, node: &H::Node) {
        let placement = Placement::of(host, node);
        self.entries.insert(
            id.to_string(),
            Entry {
                node: node.clone(),
                placement,
            },
        );
    }

    fn complete(&mut self, host: &mut H, id: &str) {
        if let Some(active) = self.active.remove(id) {
            host.remove(&active.leftover);
            show(host, core::slice::from_ref(&active.node));
            self.register(host, id, &active.node);
        }
    }
}
