//! Importance scoring and minimum selection.
//!
//! A point's importance is the extra path length it contributes to the
//! outline: walking prior -> current -> next instead of prior -> next.
//! Points lying on the straight line between their neighbors score zero
//! and are the first to go.

use std::cmp::Ordering;

use crate::ring::{NodeId, Ring};
use crate::types::{KeypointsError, Point};

/// Importance score of one ring node at one moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// The scored node.
    pub node: NodeId,
    /// Its importance given its neighbors at scoring time.
    pub value: f64,
}

/// Added path length of visiting `current` between `prior` and `next`.
///
/// Non-negative up to floating-point rounding (triangle inequality).
#[must_use]
pub fn importance(prior: Point, current: Point, next: Point) -> f64 {
    current.distance(prior) + current.distance(next) - prior.distance(next)
}

/// Score a single live node against its current neighbors.
///
/// # Errors
///
/// Returns [`KeypointsError::RingTooSmall`] if the ring has fewer than
/// three nodes, and [`KeypointsError::StaleNode`] if `node` was removed.
pub fn score_node(ring: &Ring, node: NodeId) -> Result<Score, KeypointsError> {
    if ring.len() < 3 {
        return Err(KeypointsError::RingTooSmall { size: ring.len() });
    }
    let (p, n) = ring.neighbors_of(node)?;
    // Live handles from the ring itself, so all three lookups succeed.
    let (Some(prior), Some(current), Some(next)) = (ring.point(p), ring.point(node), ring.point(n))
    else {
        return Err(KeypointsError::StaleNode(node));
    };
    Ok(Score {
        node,
        value: importance(prior, current, next),
    })
}

/// Score every node in traversal order, starting at the ring head.
///
/// # Errors
///
/// Returns [`KeypointsError::RingTooSmall`] if the ring has fewer than
/// three nodes: with two, prior and next coincide and the metric
/// degenerates.
pub fn score_ring(ring: &Ring) -> Result<Vec<Score>, KeypointsError> {
    ring.nodes().map(|node| score_node(ring, node)).collect()
}

/// Total order on score values shared by every reducer.
///
/// Agrees with `<` on finite values, treats `-0.0` and `0.0` as equal, and
/// still gives a fixed answer if a non-finite value ever shows up.
pub(crate) fn compare_values(a: f64, b: f64) -> Ordering {
    (a + 0.0).total_cmp(&(b + 0.0))
}

/// Pick the lowest score.
///
/// Scans in order and lets any later score that is less than or equal to
/// the running minimum replace it, so among equal scores the last one in
/// traversal order wins.
#[must_use]
pub fn lowest(scores: &[Score]) -> Option<Score> {
    let (&first, rest) = scores.split_first()?;
    Some(rest.iter().fold(first, |min, &s| {
        if compare_values(s.value, min.value).is_le() {
            s
        } else {
            min
        }
    }))
}
