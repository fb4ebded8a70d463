// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::Document;
use super::id::{INVALID, NodeId};

/// An iterator over the direct children of a node.
///
/// Created by [`Document::child_nodes`].
#[derive(Debug)]
pub struct Children<'a> {
    doc: &'a Document,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(doc: &'a Document, first: u32) -> Self {
        Self {
            doc,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.doc.next_sibling[idx as usize];
        Some(NodeId(idx))
    }
}

/// An iterator from a node up through its ancestors, the node included.
///
/// Created by [`Document::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(doc: &'a Document, start: u32) -> Self {
        Self {
            doc,
            current: start,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.doc.parent[idx as usize];
        Some(NodeId(idx))
    }
}
