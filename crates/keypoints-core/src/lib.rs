//! keypoints-core: importance-based outline reduction (sans-IO).
//!
//! Reduces a closed outline to its most important points:
//! build a circular ring -> score every point against its neighbors ->
//! drop the lowest -> repeat until the target count remains.
//!
//! This crate has **no I/O dependencies** -- it parses shape text that the
//! caller has already read and returns structured data. Reading files and
//! writing images lives in the `keypoints` CLI and `keypoints-export`.

pub mod diagnostics;
pub mod importance;
pub mod reduce;
pub mod ring;
pub mod shape;
pub mod types;

pub use reduce::{MIN_REDUCED_SIZE, Reducer, ReducerKind, reduce, reduce_with_config};
pub use ring::{NodeId, Ring};
pub use shape::parse_points;
pub use types::{
    Dimensions, ErrorKind, KeypointsError, Point, Polyline, ReduceConfig, Reduction, Removal,
};

/// Reduce an outline to `config.target_size` points.
///
/// Builds a ring from `points` (kept in the given order), runs the
/// configured reducer, and returns the untouched input alongside the
/// surviving outline and the removals in the order they happened.
///
/// # Errors
///
/// Returns [`KeypointsError::EmptyInput`] if `points` is empty,
/// [`KeypointsError::InvalidPoint`] for a non-finite or out-of-range point,
/// [`KeypointsError::TargetOutOfRange`] or
/// [`KeypointsError::UnreachableTarget`] if the target cannot be reached,
/// and [`KeypointsError::RemovalBudgetExceeded`] if the run needs more
/// removals than `config.max_removals`.
pub fn simplify(points: &[Point], config: &ReduceConfig) -> Result<Reduction, KeypointsError> {
    let mut ring = Ring::build(points)?;
    let removals = reduce_with_config(&mut ring, config)?;
    Ok(Reduction {
        initial: Polyline::new(points.to_vec()),
        outline: ring.to_polyline(),
        removals,
    })
}
