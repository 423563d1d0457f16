//! Shape text parsing.
//!
//! Shape files list one outline as whitespace-separated numbers read in
//! `x y` pairs. The reference files hold one pair per line, but a line may
//! carry several pairs. Blank lines are ignored.

use crate::types::{KeypointsError, Point};

/// Parse shape text into points, preserving order.
///
/// # Errors
///
/// Returns [`KeypointsError::MalformedInput`] for a line with an odd number
/// of values, a value that is not a number, or a non-finite value, and
/// [`KeypointsError::EmptyInput`] if the text holds no values at all.
pub fn parse_points(text: &str) -> Result<Vec<Point>, KeypointsError> {
    let mut points = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let values = line
            .split_whitespace()
            .map(|token| parse_coordinate(token, line_no))
            .collect::<Result<Vec<f64>, _>>()?;

        if values.len() % 2 != 0 {
            return Err(KeypointsError::MalformedInput {
                line: line_no,
                reason: format!("expected x/y pairs, found {} values", values.len()),
            });
        }

        points.extend(values.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1])));
    }

    if points.is_empty() {
        return Err(KeypointsError::EmptyInput);
    }
    Ok(points)
}

fn parse_coordinate(token: &str, line: usize) -> Result<f64, KeypointsError> {
    let value: f64 = token
        .parse()
        .map_err(|e| KeypointsError::MalformedInput {
            line,
            reason: format!("invalid number '{token}': {e}"),
        })?;
    if !value.is_finite() {
        return Err(KeypointsError::MalformedInput {
            line,
            reason: format!("coordinate '{token}' is not finite"),
        });
    }
    Ok(value)
}
