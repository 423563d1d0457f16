//! Importance reduction: shrink a ring to a target size by repeatedly
//! discarding its least important point.
//!
//! This module defines the [`Reducer`] trait for pluggable selection
//! strategies and the [`ReducerKind`] enum for choosing one at runtime.
//! Every strategy removes exactly the same points in exactly the same
//! order; they differ only in how they find the minimum each step.
//!
//! # Small rings
//!
//! Scoring needs three distinct nodes (prior, current, next), so the last
//! possible removal takes a ring from three nodes to two. Targets below
//! [`MIN_REDUCED_SIZE`] are rejected before the ring is touched unless the
//! ring is already at the target.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::importance::{Score, compare_values, lowest, score_node, score_ring};
use crate::ring::Ring;
use crate::types::{KeypointsError, Point, ReduceConfig, Removal};

/// Smallest ring size reduction can reach.
pub const MIN_REDUCED_SIZE: usize = 2;

/// Ring size above which the rescan strategy logs a quadratic-cost warning.
pub const LARGE_RING_WARNING: usize = 10_000;

/// Selects how the least important point is found each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReducerKind {
    /// Re-score every node and scan for the minimum on every step.
    ///
    /// O(n) per step, O(n^2) per run. Nothing is carried between steps.
    #[default]
    Rescan,

    /// Keep scores in a binary heap and re-score only the two neighbors
    /// of each removed node. Outdated heap entries are skipped on pop.
    ///
    /// O(log n) per step. Ties resolve the same way as [`Rescan`](Self::Rescan).
    LazyHeap,
}

impl ReducerKind {
    /// Short human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rescan => "rescan",
            Self::LazyHeap => "lazy-heap",
        }
    }
}

/// Trait for reduction strategies.
pub trait Reducer {
    /// Remove nodes from `ring` until it holds `target_size` of them.
    ///
    /// Returns the removals in the order they happened.
    ///
    /// # Errors
    ///
    /// Returns [`KeypointsError::TargetOutOfRange`] if `target_size` is
    /// zero or larger than the ring, and
    /// [`KeypointsError::UnreachableTarget`] if it is below
    /// [`MIN_REDUCED_SIZE`]. In both cases the ring is left untouched.
    fn reduce(&self, ring: &mut Ring, target_size: usize) -> Result<Vec<Removal>, KeypointsError>;
}

impl Reducer for ReducerKind {
    fn reduce(&self, ring: &mut Ring, target_size: usize) -> Result<Vec<Removal>, KeypointsError> {
        match *self {
            Self::Rescan => reduce_rescan(ring, target_size),
            Self::LazyHeap => reduce_lazy_heap(ring, target_size),
        }
    }
}

/// Reduce `ring` to `target_size` points with the default strategy.
///
/// # Errors
///
/// See [`Reducer::reduce`].
pub fn reduce(ring: &mut Ring, target_size: usize) -> Result<Vec<Removal>, KeypointsError> {
    ReducerKind::default().reduce(ring, target_size)
}

/// Reduce `ring` as described by `config`.
///
/// # Errors
///
/// Everything [`Reducer::reduce`] returns, plus
/// [`KeypointsError::RemovalBudgetExceeded`] when the run would need more
/// removals than `config.max_removals`. All of these are raised before
/// the first removal.
pub fn reduce_with_config(
    ring: &mut Ring,
    config: &ReduceConfig,
) -> Result<Vec<Removal>, KeypointsError> {
    let required = removals_needed(ring, config.target_size)?;
    if let Some(budget) = config.max_removals
        && required > budget
    {
        return Err(KeypointsError::RemovalBudgetExceeded { required, budget });
    }
    config.reducer.reduce(ring, config.target_size)
}

/// Validate `target_size` against the ring and return how many removals
/// reaching it takes.
///
/// # Errors
///
/// See [`Reducer::reduce`].
pub fn removals_needed(ring: &Ring, target_size: usize) -> Result<usize, KeypointsError> {
    let size = ring.len();
    if target_size < 1 || target_size > size {
        return Err(KeypointsError::TargetOutOfRange {
            target: target_size,
            size,
        });
    }
    if target_size < size && target_size < MIN_REDUCED_SIZE {
        return Err(KeypointsError::UnreachableTarget {
            target: target_size,
            minimum: MIN_REDUCED_SIZE,
        });
    }
    Ok(size - target_size)
}

fn record(step: usize, score: Score, point: Point) -> Removal {
    log::debug!(
        "step {step}: removed {} ({:.1}, {:.1}) importance {:.4}",
        score.node,
        point.x,
        point.y,
        score.value,
    );
    Removal {
        step,
        node: score.node,
        point,
        importance: score.value,
    }
}

/// Score everything, remove the minimum, repeat.
fn reduce_rescan(ring: &mut Ring, target_size: usize) -> Result<Vec<Removal>, KeypointsError> {
    let required = removals_needed(ring, target_size)?;
    if ring.len() > LARGE_RING_WARNING {
        log::warn!(
            "rescan reduction of {} points is quadratic; consider the lazy-heap reducer",
            ring.len(),
        );
    }

    let mut removals = Vec::with_capacity(required);
    while ring.len() > target_size {
        let scores = score_ring(ring)?;
        let Some(min) = lowest(&scores) else {
            return Err(KeypointsError::RingTooSmall { size: ring.len() });
        };
        let point = ring.remove(min.node)?;
        removals.push(record(removals.len(), min, point));
    }

    debug_assert!(ring.is_closed_loop(), "ring links broken by reduction");
    Ok(removals)
}

/// Heap entry for the lazy-heap strategy.
///
/// Ordered so the heap's maximum is the lowest score, and among equal
/// scores the node latest in traversal order (highest input position).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: Score,
    version: u32,
}

impl Candidate {
    const fn new(score: Score, version: u32) -> Self {
        Self { score, version }
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(other.score.value, self.score.value)
            .then_with(|| self.score.node.cmp(&other.score.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Heap of scores with per-node versions; re-score only the neighbors of
/// each removed node.
///
/// Traversal order always equals ascending input position (see
/// [`Ring::head`]), so "later in traversal order" is "higher [`NodeId`]"
/// and the heap ordering reproduces the rescan tie-break exactly.
///
/// [`NodeId`]: crate::ring::NodeId
fn reduce_lazy_heap(ring: &mut Ring, target_size: usize) -> Result<Vec<Removal>, KeypointsError> {
    let required = removals_needed(ring, target_size)?;
    if required == 0 {
        return Ok(Vec::new());
    }

    let mut versions = vec![0_u32; ring.capacity()];
    let mut heap: BinaryHeap<Candidate> = score_ring(ring)?
        .into_iter()
        .map(|score| Candidate::new(score, 0))
        .collect();

    let mut removals = Vec::with_capacity(required);
    while ring.len() > target_size {
        let candidate = loop {
            match heap.pop() {
                Some(c)
                    if ring.contains(c.score.node)
                        && versions[c.score.node.index()] == c.version =>
                {
                    break c;
                }
                Some(_) => {}
                None => return Err(KeypointsError::RingTooSmall { size: ring.len() }),
            }
        };

        let node = candidate.score.node;
        let (prior, next) = ring.neighbors_of(node)?;
        let point = ring.remove(node)?;
        removals.push(record(removals.len(), candidate.score, point));

        if ring.len() >= 3 {
            for neighbor in [prior, next] {
                let version = {
                    let slot = &mut versions[neighbor.index()];
                    *slot += 1;
                    *slot
                };
                heap.push(Candidate::new(score_node(ring, neighbor)?, version));
            }
        }
    }

    debug_assert!(ring.is_closed_loop(), "ring links broken by reduction");
    Ok(removals)
}
