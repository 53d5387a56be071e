//! Break computation and bin assignment.
//!
//! Turns a value array into `n_col + 1` ordered bin edges and locates each
//! value among them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::{MapError, Result};

/// Decimal places kept for equal-width edges
const EQUAL_DIGITS: i32 = 6;

/// Decimal places kept for quantile edges
const QUANTILE_DIGITS: i32 = 2;

/// Policy for choosing bin edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakStrategy {
    /// Uniform spacing between the minimum and maximum
    Equal,
    /// Empirical quantiles at `i / n_col`
    Quantile,
    /// Caller-supplied edges, used verbatim
    User(Vec<f64>),
}

impl BreakStrategy {
    /// Short name used in logs and configuration
    pub fn name(&self) -> &'static str {
        match self {
            BreakStrategy::Equal => "equal",
            BreakStrategy::Quantile => "quantile",
            BreakStrategy::User(_) => "user",
        }
    }
}

impl FromStr for BreakStrategy {
    type Err = MapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equal" => Ok(BreakStrategy::Equal),
            "quantile" => Ok(BreakStrategy::Quantile),
            "user" => Err(MapError::invalid_parameter(
                "strategy",
                "user breaks must be supplied as BreakStrategy::User(cuts)",
            )),
            other => Err(MapError::invalid_parameter(
                "strategy",
                format!("Unknown break strategy: {}. Must be one of: equal, quantile", other),
            )),
        }
    }
}

/// Compute `n_col + 1` bin edges for `values`
pub fn compute_breaks(values: &[f64], n_col: usize, strategy: &BreakStrategy) -> Result<Vec<f64>> {
    if n_col == 0 {
        return Err(MapError::invalid_parameter(
            "n_col",
            "number of classes must be at least 1",
        ));
    }

    if let BreakStrategy::User(cuts) = strategy {
        if cuts.len() != n_col + 1 {
            return Err(MapError::length_mismatch("user cuts", n_col + 1, cuts.len()));
        }
        return Ok(cuts.clone());
    }

    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(MapError::EmptyValues {
            what: "break computation".to_string(),
        });
    }
    finite.sort_by(f64::total_cmp);

    let edges = if *strategy == BreakStrategy::Equal {
        equal_breaks(&finite, n_col)
    } else {
        (0..=n_col)
            .map(|i| round_to(quantile_sorted(&finite, i as f64 / n_col as f64), QUANTILE_DIGITS))
            .collect()
    };

    debug!(
        strategy = strategy.name(),
        n_col = n_col,
        edges = ?edges,
        "Computed bin edges"
    );

    Ok(edges)
}

/// Linearly spaced edges; interior edges are rounded, the ends stay exact
///
/// The ends are left unrounded on purpose: rounding them could put the
/// minimum or maximum outside `[edges[0], edges[n_col]]`.
fn equal_breaks(sorted: &[f64], n_col: usize) -> Vec<f64> {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let step = (max - min) / n_col as f64;

    (0..=n_col)
        .map(|i| match i {
            0 => min,
            i if i == n_col => max,
            i => round_to(min + step * i as f64, EQUAL_DIGITS),
        })
        .collect()
}

/// Empirical quantile of already sorted data, interpolating between order statistics
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    if lo >= n - 1 {
        return sorted[n - 1];
    }
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Locate each value among `edges`.
///
/// The bin of `x` is the last `i` with `edges[i] <= x`, clamped to
/// `[0, edges.len() - 2]`. Non-finite values have no bin.
pub fn assign_bins(values: &[f64], edges: &[f64]) -> Vec<Option<usize>> {
    let n_bins = edges.len().saturating_sub(1).max(1);
    values
        .iter()
        .map(|&x| {
            if !x.is_finite() {
                return None;
            }
            let at_or_below = edges.partition_point(|&e| e <= x);
            Some(at_or_below.saturating_sub(1).min(n_bins - 1))
        })
        .collect()
}
