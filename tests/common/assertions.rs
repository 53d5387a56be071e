//! Assertion utilities for testing.
//!
//! Floating-point comparisons plus checks on break edges and bin indices.

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that two slices are approximately element-wise equal.
pub fn assert_array_approx_eq(actual: &[f64], expected: &[f64], epsilon: Option<f64>) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Arrays have different lengths: actual = {:?}, expected = {:?}",
        actual,
        expected
    );

    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= eps,
            "Arrays differ at index {}: actual = {}, expected = {}, epsilon = {}",
            i,
            a,
            e,
            eps
        );
    }
}

/// Assert that break edges never decrease and span `[min, max]` of `values`
pub fn assert_edges_cover(edges: &[f64], values: &[f64]) {
    assert!(edges.len() >= 2, "Need at least two edges, got {:?}", edges);
    for pair in edges.windows(2) {
        assert!(pair[0] <= pair[1], "Edges decrease: {:?}", edges);
    }

    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    assert_approx_eq(edges[0], min, None);
    assert_approx_eq(edges[edges.len() - 1], max, None);
}

/// Assert that every assigned bin lies in `[0, n_col - 1]`
pub fn assert_bins_within(bins: &[Option<usize>], n_col: usize) {
    for (i, bin) in bins.iter().enumerate() {
        if let Some(bin) = bin {
            assert!(*bin < n_col, "Unit {} in bin {} of {}", i, bin, n_col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_edges_cover() {
        assert_edges_cover(&[1.0, 2.0, 2.0, 4.0], &[4.0, 1.0, f64::NAN, 3.0]);
    }

    #[test]
    #[should_panic]
    fn test_assert_bins_within_rejects_overflow() {
        assert_bins_within(&[Some(0), None, Some(3)], 3);
    }
}
