//! Pearson correlation between numeric columns.

use crate::types::CorrelationMatrix;
use anofox_statistics::correlation::pearson as pearson_test;

/// Pearson correlation over rows where both values are present.
///
/// Returns `None` with fewer than two paired rows or zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    match xs.len() {
        0 | 1 => None,
        // The test needs three rows; two distinct points correlate perfectly.
        2 => {
            let slope = (xs[1] - xs[0]) * (ys[1] - ys[0]);
            (slope != 0.0).then(|| slope.signum())
        }
        _ => {
            let r = pearson_test(&xs, &ys, Some(0.95)).ok()?.estimate;
            r.is_finite().then(|| r.clamp(-1.0, 1.0))
        }
    }
}

/// Build the symmetric correlation matrix for the given columns.
///
/// The diagonal is always 1.0.
pub fn correlation_matrix(columns: Vec<String>, values: &[Vec<Option<f64>>]) -> CorrelationMatrix {
    let size = columns.len();
    let mut matrix = vec![vec![None; size]; size];

    for i in 0..size {
        matrix[i][i] = Some(1.0);
        for j in (i + 1)..size {
            let r = pearson(&values[i], &values[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns,
        values: matrix,
    }
}
