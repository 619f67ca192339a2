//! Uniform grids used for re-sampling fitted curves and picking export indices.

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// Matches the usual `linspace` conventions: `steps == 1` yields `[min]`,
/// `steps == 0` yields an empty vector.
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (steps as f64 - 1.0);
            let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
            // Pin the end point exactly.
            out[steps - 1] = max;
            out
        }
    }
}

/// Evenly spaced integer indices in `[first, last]`, rounded half to even.
pub fn linspace_indices(first: usize, last: usize, steps: usize) -> Vec<usize> {
    linspace(first as f64, last as f64, steps)
        .into_iter()
        .map(|v| v.round_ties_even() as usize)
        .collect()
}
