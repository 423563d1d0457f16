//! Reduction diagnostics: timing and score statistics for a run.
//!
//! Timing goes through the [`Clock`] trait so this crate stays free of
//! platform time APIs; the CLI supplies an `Instant`-backed clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reduce::reduce_with_config;
use crate::ring::Ring;
use crate::types::{KeypointsError, Point, ReduceConfig, Reduction, Removal};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single reduction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionDiagnostics {
    /// Strategy that selected the removals.
    pub reducer: String,
    /// Points in the input.
    pub initial_size: usize,
    /// Requested number of surviving points.
    pub target_size: usize,
    /// Points left in the ring after the run.
    pub final_size: usize,
    /// Wall-clock duration of ring construction plus reduction (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Statistics over the importance scores of removed points.
    pub scores: ScoreSummary,
    /// Closed-outline length before reduction.
    pub initial_perimeter: f64,
    /// Closed-outline length after reduction.
    pub final_perimeter: f64,
}

/// Summary of the importance scores at which points were removed.
///
/// All fields are zero when nothing was removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Lowest importance among removed points.
    pub min: f64,
    /// Highest importance among removed points.
    pub max: f64,
    /// Mean importance among removed points.
    pub mean: f64,
    /// Importance of the final removal, the costliest cut of a typical run.
    pub last: f64,
}

impl ScoreSummary {
    /// Summarize the importance values of `removals`.
    #[must_use]
    pub fn from_removals(removals: &[Removal]) -> Self {
        let Some(last) = removals.last() else {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                last: 0.0,
            };
        };
        let values = removals.iter().map(|r| r.importance);
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let mean = values.sum::<f64>() / removals.len() as f64;
        Self {
            min,
            max,
            mean,
            last: last.importance,
        }
    }
}

impl ReductionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Reduction Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Reducer: {}", self.reducer));
        lines.push(format!(
            "Points: {} -> {} (target {})",
            self.initial_size, self.final_size, self.target_size,
        ));
        lines.push(format!(
            "Removed: {}",
            self.initial_size - self.final_size
        ));
        lines.push(format!("Duration: {:.3}ms", duration_ms(self.duration)));
        lines.push(format!(
            "Perimeter: {:.1} -> {:.1} ({:.1}% retained)",
            self.initial_perimeter,
            self.final_perimeter,
            retained_pct(self.initial_perimeter, self.final_perimeter),
        ));
        lines.push(format!(
            "Importance of removed points: min={:.4} mean={:.4} max={:.4} last={:.4}",
            self.scores.min, self.scores.mean, self.scores.max, self.scores.last,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn retained_pct(before: f64, after: f64) -> f64 {
    if before > 0.0 {
        after / before * 100.0
    } else {
        100.0
    }
}

/// Run [`simplify`](crate::simplify) and collect diagnostics alongside
/// the result.
///
/// # Errors
///
/// Same as [`simplify`](crate::simplify).
pub fn simplify_with_diagnostics<C: Clock>(
    points: &[Point],
    config: &ReduceConfig,
    clock: &C,
) -> Result<(Reduction, ReductionDiagnostics), KeypointsError> {
    let start = clock.now();
    let mut ring = Ring::build(points)?;
    let removals = reduce_with_config(&mut ring, config)?;
    let outline = ring.to_polyline();
    let duration = clock.elapsed(&start);

    let reduction = Reduction {
        initial: points.to_vec().into(),
        outline,
        removals,
    };
    let diagnostics = ReductionDiagnostics {
        reducer: config.reducer.name().to_string(),
        initial_size: reduction.initial.len(),
        target_size: config.target_size,
        final_size: reduction.outline.len(),
        duration,
        scores: ScoreSummary::from_removals(&reduction.removals),
        initial_perimeter: reduction.initial.perimeter(),
        final_perimeter: reduction.outline.perimeter(),
    };
    Ok((reduction, diagnostics))
}
