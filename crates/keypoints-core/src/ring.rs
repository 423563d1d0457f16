//! Circular point ring with O(1) neighbor lookup and removal.
//!
//! Nodes live in flat arrays indexed by their position in the input
//! sequence; `prev`/`next` hold indices rather than pointers. Removing a
//! node splices it out of both link arrays and marks its slot dead, so a
//! [`NodeId`] that outlives its node is detected instead of dereferenced.
//!
//! The ring is circular from construction: a single point links to itself,
//! and no operation can linearise the chain.

use std::fmt;
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::types::{KeypointsError, Point, Polyline};

/// Handle to one node of a [`Ring`].
///
/// Equal to the node's position in the sequence the ring was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[cfg(test)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position of this node in the original input sequence.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A circular, singly traversed, doubly linked sequence of points.
#[derive(Debug, Clone)]
pub struct Ring {
    points: Vec<Point>,
    prev: Vec<usize>,
    next: Vec<usize>,
    live: Vec<bool>,
    head: usize,
    len: usize,
}

// A ring is never empty, so `is_empty` would always be false.
#[allow(clippy::len_without_is_empty)]
impl Ring {
    /// Build a ring that visits `points` in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`KeypointsError::EmptyInput`] if `points` is empty and
    /// [`KeypointsError::InvalidPoint`] for the first point that is not
    /// finite or exceeds [`Point::MAX_COORDINATE`].
    pub fn build(points: &[Point]) -> Result<Self, KeypointsError> {
        let n = points.len();
        if n == 0 {
            return Err(KeypointsError::EmptyInput);
        }
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.is_in_range()) {
            return Err(KeypointsError::InvalidPoint {
                index,
                x: p.x.to_string(),
                y: p.y.to_string(),
            });
        }

        Ok(Self {
            points: points.to_vec(),
            prev: (0..n).map(|i| (i + n - 1) % n).collect(),
            next: (0..n).map(|i| (i + 1) % n).collect(),
            live: vec![true; n],
            head: 0,
            len: n,
        })
    }

    /// Number of nodes currently in the ring.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Number of nodes the ring was built with.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.points.len()
    }

    /// The node traversal starts from.
    ///
    /// Starts at the first input point. When the head node is removed the
    /// head moves to its successor, which keeps traversal order identical
    /// to ascending input position.
    #[must_use]
    pub const fn head(&self) -> NodeId {
        NodeId(self.head)
    }

    /// Returns `true` if `node` is still part of the ring.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.live.get(node.0).copied().unwrap_or(false)
    }

    /// The point stored at `node`, or `None` if the node has been removed.
    #[must_use]
    pub fn point(&self, node: NodeId) -> Option<Point> {
        self.contains(node).then(|| self.points[node.0])
    }

    /// Immediate predecessor and successor of `node` in the current ring.
    ///
    /// In a one-node ring both are the node itself; in a two-node ring both
    /// are the other node.
    ///
    /// # Errors
    ///
    /// Returns [`KeypointsError::StaleNode`] if `node` has been removed.
    pub fn neighbors_of(&self, node: NodeId) -> Result<(NodeId, NodeId), KeypointsError> {
        self.check_live(node)?;
        Ok((NodeId(self.prev[node.0]), NodeId(self.next[node.0])))
    }

    /// Splice `node` out of the ring and return its point.
    ///
    /// # Errors
    ///
    /// Returns [`KeypointsError::RingTooSmall`] if the ring holds two
    /// nodes or fewer, and [`KeypointsError::StaleNode`] if `node` has
    /// already been removed.
    pub fn remove(&mut self, node: NodeId) -> Result<Point, KeypointsError> {
        if self.len <= 2 {
            return Err(KeypointsError::RingTooSmall { size: self.len });
        }
        self.check_live(node)?;

        let i = node.0;
        let (p, n) = (self.prev[i], self.next[i]);
        self.next[p] = n;
        self.prev[n] = p;
        self.live[i] = false;
        self.len -= 1;
        if self.head == i {
            self.head = n;
        }

        Ok(self.points[i])
    }

    /// Node handles in traversal order, starting at [`head`](Self::head).
    #[must_use]
    pub const fn nodes(&self) -> Nodes<'_> {
        Nodes {
            ring: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Points in traversal order, starting at [`head`](Self::head).
    ///
    /// Every call starts a fresh walk; the iterator visits each live node
    /// exactly once.
    pub fn traverse(&self) -> impl ExactSizeIterator<Item = Point> + FusedIterator + '_ {
        self.nodes().map(|node| self.points[node.0])
    }

    /// Snapshot of the current ring contents in traversal order.
    #[must_use]
    pub fn to_polyline(&self) -> Polyline {
        Polyline::new(self.traverse().collect())
    }

    /// Check the ring invariants from every live node.
    ///
    /// Following `next` `len()` times must return to the starting node,
    /// every node on the way must be live, and `prev` must undo `next`.
    #[must_use]
    pub fn is_closed_loop(&self) -> bool {
        let live_count = self.live.iter().filter(|&&l| l).count();
        if live_count != self.len || !self.live.get(self.head).copied().unwrap_or(false) {
            return false;
        }

        (0..self.points.len())
            .filter(|&i| self.live[i])
            .all(|start| {
                let mut cursor = start;
                for _ in 0..self.len {
                    let n = self.next[cursor];
                    if !self.live[n] || self.prev[n] != cursor {
                        return false;
                    }
                    cursor = n;
                }
                cursor == start
            })
    }

    fn check_live(&self, node: NodeId) -> Result<(), KeypointsError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(KeypointsError::StaleNode(node))
        }
    }
}

/// Iterator over ring nodes in traversal order. See [`Ring::nodes`].
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    ring: &'a Ring,
    cursor: usize,
    remaining: usize,
}

impl Iterator for Nodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let node = NodeId(self.cursor);
        self.cursor = self.ring.next[self.cursor];
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Nodes<'_> {}

impl FusedIterator for Nodes<'_> {}
