//! Discrete and continuous shading of value arrays.

use serde::Serialize;
use tracing::debug;

use crate::binning::{assign_bins, round_to};
use crate::colormaps::{Colormap, Rgba, MISSING_COLOR};
use crate::error::{MapError, Result};

/// Number of representative entries in a continuous legend
pub const CONTINUOUS_LEGEND_SAMPLES: usize = 5;

/// Per-value colors for a discrete map, plus the bin each value fell in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscreteShading {
    pub bins: Vec<Option<usize>>,
    pub colors: Vec<Rgba>,
}

/// Shade each value by its bin. `palette[0]` is the darkest shade and
/// colors the lowest bin.
pub fn assign_colors(values: &[f64], edges: &[f64], palette: &[Rgba]) -> Result<DiscreteShading> {
    let n_bins = edges.len().saturating_sub(1);
    if n_bins == 0 {
        return Err(MapError::invalid_parameter(
            "edges",
            "at least two bin edges are required",
        ));
    }
    if palette.len() != n_bins {
        return Err(MapError::length_mismatch("palette", n_bins, palette.len()));
    }

    let bins = assign_bins(values, edges);
    let colors = bins
        .iter()
        .map(|bin| bin.map_or(MISSING_COLOR, |i| palette[i]))
        .collect();

    Ok(DiscreteShading { bins, colors })
}

/// One entry of a continuous legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSample {
    pub value: f64,
    pub color: Rgba,
}

/// Per-value colors for a continuous map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousShading {
    /// Rank of each value among the unique values, `None` when missing
    pub ranks: Vec<Option<usize>>,
    pub colors: Vec<Rgba>,
    /// Number of ramp steps (unique values across data and scale reference)
    pub steps: usize,
    /// Representative samples, highest value first
    pub legend_samples: Vec<LegendSample>,
}

/// Shade each value by its rank among the unique values of `values` and the
/// optional `scale_values` reference. Equal values share a ramp step.
pub fn assign_continuous_colors(
    values: &[f64],
    scale_values: Option<&[f64]>,
    ramp: &dyn Colormap,
) -> Result<ContinuousShading> {
    let mut unique: Vec<f64> = values
        .iter()
        .chain(scale_values.unwrap_or(&[]).iter())
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if unique.is_empty() {
        return Err(MapError::EmptyValues {
            what: "continuous shading".to_string(),
        });
    }
    unique.sort_by(f64::total_cmp);
    unique.dedup();

    let steps = unique.len();
    let palette = ramp.sample(steps);

    let ranks: Vec<Option<usize>> = values
        .iter()
        .map(|&v| v.is_finite().then(|| unique.partition_point(|&u| u < v)))
        .collect();
    let colors = ranks
        .iter()
        .map(|rank| rank.map_or(MISSING_COLOR, |r| palette[r]))
        .collect();

    let legend_samples = sample_positions(steps)
        .into_iter()
        .rev()
        .map(|pos| LegendSample {
            value: round_to(unique[pos], 2),
            color: palette[pos],
        })
        .collect();

    debug!(
        ramp = ramp.name(),
        steps = steps,
        "Assigned continuous colors"
    );

    Ok(ContinuousShading {
        ranks,
        colors,
        steps,
        legend_samples,
    })
}

/// Evenly spaced ramp positions for the legend, lowest first
fn sample_positions(steps: usize) -> Vec<usize> {
    let last = (CONTINUOUS_LEGEND_SAMPLES - 1) as f64;
    (0..CONTINUOUS_LEGEND_SAMPLES)
        .map(|j| ((j as f64) * (steps - 1) as f64 / last).round() as usize)
        .collect()
}
