//! Gap filling along the time axis.

use crate::matrix::MetricMatrix;

/// Forward fill, then backward fill.
///
/// Any column with at least one value ends up fully dense; an all-missing
/// column is left untouched.
pub fn forward_backward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for v in values.iter_mut() {
        match *v {
            Some(x) => last = Some(x),
            None => *v = last,
        }
    }

    let mut next = None;
    for v in values.iter_mut().rev() {
        match *v {
            Some(x) => next = Some(x),
            None => *v = next,
        }
    }
}

/// Fill every column of the matrix.
pub fn fill_gaps(matrix: &mut MetricMatrix) {
    for (_, values) in matrix.columns_mut() {
        forward_backward_fill(values);
    }
}
