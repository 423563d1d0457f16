//! Shared types for outline reduction.

use serde::{Deserialize, Serialize};

use crate::reduce::ReducerKind;
use crate::ring::NodeId;

/// A 2D point in shape coordinates.
///
/// Shape files carry integer coordinates; they are stored exactly as `f64`
/// so every distance computation happens in double precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position (grows downward on screen).
    pub y: f64,
}

impl Point {
    /// Largest coordinate magnitude a ring accepts.
    ///
    /// Keeps every squared distance between two accepted points finite,
    /// so importance scores never overflow to `inf` or `NaN`.
    pub const MAX_COORDINATE: f64 = 1e150;

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both coordinates are finite and within
    /// [`MAX_COORDINATE`](Self::MAX_COORDINATE).
    #[must_use]
    pub fn is_in_range(self) -> bool {
        self.x.abs() <= Self::MAX_COORDINATE && self.y.abs() <= Self::MAX_COORDINATE
    }
}

/// An ordered sequence of points.
///
/// Used for the untouched input snapshot and for the reduced outline.
/// Outlines are closed: consumers connect the last point back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consecutive point pairs including the closing pair (last, first).
    ///
    /// A single point yields one degenerate segment from the point to
    /// itself; an empty polyline yields nothing.
    pub fn closed_segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }

    /// Length of the closed outline through every point.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.closed_segments().map(|(a, b)| a.distance(b)).sum()
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Canvas size the reference shapes are laid out for.
    pub const DEFAULT_SIZE: u32 = 800;

    /// Smallest canvas anchored at the origin that contains every point
    /// plus `margin` pixels on the right and bottom.
    ///
    /// Negative coordinates are clipped by renderers; they do not grow the
    /// canvas.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn enclosing(points: &[Point], margin: u32) -> Self {
        let max_x = points.iter().map(|p| p.x).fold(0.0_f64, f64::max);
        let max_y = points.iter().map(|p| p.y).fold(0.0_f64, f64::max);
        let extent = |v: f64| (v.ceil().min(f64::from(u32::MAX - margin)) as u32 + margin).max(1);
        Self {
            width: extent(max_x),
            height: extent(max_y),
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_SIZE,
        }
    }
}

/// Configuration for a reduction run.
///
/// Replaces what would otherwise be process-wide state: the target count,
/// the scan strategy, and an optional cap on the number of removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    /// Number of points that should survive the reduction.
    pub target_size: usize,

    /// Which strategy finds the least important point each step.
    pub reducer: ReducerKind,

    /// Upper bound on removals a single run may perform.
    ///
    /// The removal count is known before the run starts (`len - target`),
    /// so an oversized request is rejected without touching the ring.
    pub max_removals: Option<usize>,
}

impl ReduceConfig {
    /// Default number of surviving points.
    pub const DEFAULT_TARGET_SIZE: usize = 40;

    /// Default reduction strategy.
    pub const DEFAULT_REDUCER: ReducerKind = ReducerKind::Rescan;

    /// Configuration reducing to `target_size` with default settings.
    #[must_use]
    pub fn with_target(target_size: usize) -> Self {
        Self {
            target_size,
            ..Self::default()
        }
    }
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            target_size: Self::DEFAULT_TARGET_SIZE,
            reducer: Self::DEFAULT_REDUCER,
            max_removals: None,
        }
    }
}

/// One step of a reduction: the node that was discarded and why.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Removal {
    /// Zero-based step number.
    pub step: usize,
    /// Handle of the removed node (its position in the input).
    pub node: NodeId,
    /// Coordinates of the removed point.
    pub point: Point,
    /// Importance score the point had when it was selected.
    pub importance: f64,
}

/// Result of a complete reduction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    /// The input points, untouched, in input order.
    pub initial: Polyline,
    /// Surviving points walked from the ring head. Closed.
    pub outline: Polyline,
    /// Discarded points in the order they were removed.
    pub removals: Vec<Removal>,
}

impl Reduction {
    /// Coordinates of the discarded points in removal order.
    #[must_use]
    pub fn discarded(&self) -> Vec<Point> {
        self.removals.iter().map(|r| r.point).collect()
    }
}

/// Broad classification of a [`KeypointsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The point sequence was empty or malformed.
    InvalidInput,
    /// A caller-supplied count was out of range.
    InvalidArgument,
    /// An operation would break a ring invariant. Indicates a logic error
    /// in the caller rather than bad user input.
    InvalidState,
}

/// Errors raised while parsing, building, or reducing an outline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeypointsError {
    /// No points were supplied.
    #[error("point sequence is empty")]
    EmptyInput,

    /// Shape text could not be parsed.
    #[error("malformed input on line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A point handed to ring construction is not finite or lies beyond
    /// [`Point::MAX_COORDINATE`].
    #[error("point {index} ({x}, {y}) is outside the supported coordinate range")]
    InvalidPoint {
        /// Position of the point in the input sequence.
        index: usize,
        /// Offending x coordinate, as written.
        x: String,
        /// Offending y coordinate, as written.
        y: String,
    },

    /// The requested target size is outside `1..=size`.
    #[error("target size {target} is outside the valid range 1..={size}")]
    TargetOutOfRange {
        /// Requested number of surviving points.
        target: usize,
        /// Ring size at call time.
        size: usize,
    },

    /// The run would need more removals than the configured cap.
    #[error("reduction needs {required} removals but the budget is {budget}")]
    RemovalBudgetExceeded {
        /// Removals the run would perform.
        required: usize,
        /// Configured maximum.
        budget: usize,
    },

    /// The target is in range but below the smallest ring the importance
    /// metric can still shrink to.
    #[error("cannot reduce below {minimum} points (requested {target})")]
    UnreachableTarget {
        /// Requested number of surviving points.
        target: usize,
        /// Smallest reachable ring size.
        minimum: usize,
    },

    /// Scoring or removal attempted on a ring too small for it.
    #[error("ring of {size} points is too small for this operation")]
    RingTooSmall {
        /// Ring size at call time.
        size: usize,
    },

    /// A node handle refers to a node that has already been removed.
    #[error("node {0} is no longer part of the ring")]
    StaleNode(NodeId),
}

impl KeypointsError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput | Self::MalformedInput { .. } | Self::InvalidPoint { .. } => {
                ErrorKind::InvalidInput
            }
            Self::TargetOutOfRange { .. } | Self::RemovalBudgetExceeded { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::UnreachableTarget { .. } | Self::RingTooSmall { .. } | Self::StaleNode(_) => {
                ErrorKind::InvalidState
            }
        }
    }
}
