//! Min-max feature scaling.

use tracing::debug;

use crate::matrix::MetricMatrix;

/// Rescale one column into `[0, 1]` over its present values.
///
/// Returns `false` and blanks the column when it has no values, when its
/// min equals its max, or when it holds an infinite value.
///
/// A span wider than `f64::MAX` is scaled in halves.
pub fn min_max_scale(values: &mut [Option<f64>]) -> bool {
    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if max <= min {
        values.iter_mut().for_each(|v| *v = None);
        return false;
    }

    let (halve, range) = match max - min {
        range if range.is_finite() => (1.0, range),
        _ => (0.5, max * 0.5 - min * 0.5),
    };
    if !range.is_finite() {
        values.iter_mut().for_each(|v| *v = None);
        return false;
    }
    for v in values.iter_mut().flatten() {
        *v = ((*v * halve - min * halve) / range).clamp(0.0, 1.0);
    }
    true
}

/// Scale every column of the matrix independently. Returns the names of
/// the columns that were blanked.
pub fn normalize(matrix: &mut MetricMatrix) -> Vec<String> {
    let mut degenerate = Vec::new();
    for (name, values) in matrix.columns_mut() {
        if !min_max_scale(values) {
            debug!(column = %name, "constant or empty column marked missing");
            degenerate.push(name.to_string());
        }
    }
    degenerate
}
