//! Legend label formatting and legend specifications.
//!
//! Auto-derived labels use bracket notation: every bin is half-open on the
//! right except the last, which is closed. Labels are listed highest bin
//! first so they read top-down like the map's value scale.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::colormaps::Rgba;
use crate::error::{MapError, Result};

/// Keywords accepted for named legend positions
pub const LEGEND_POSITIONS: &[&str] = &[
    "bottomright",
    "bottom",
    "bottomleft",
    "left",
    "topleft",
    "top",
    "topright",
    "right",
    "center",
];

/// Where legend labels come from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendLabels {
    /// Derive bracket labels from the bin edges
    #[default]
    Auto,
    /// Do not draw a legend
    Hidden,
    /// Caller-supplied labels, one per bin
    Custom(Vec<String>),
}

/// Legend placement inside a layout cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LegendPosition {
    /// Keyword such as `bottomleft` or `topright`
    Named(String),
    /// Top-left corner as fractions of the cell width and height
    At(f64, f64),
}

impl LegendPosition {
    /// Top-left anchor as cell fractions for a legend box of the given
    /// fractional size
    pub fn anchor(&self, box_width: f64, box_height: f64) -> (f64, f64) {
        let margin = 0.02;
        let left = margin;
        let right = (1.0 - margin - box_width).max(0.0);
        let center_x = ((1.0 - box_width) / 2.0).max(0.0);
        let top = margin;
        let bottom = (1.0 - margin - box_height).max(0.0);
        let center_y = ((1.0 - box_height) / 2.0).max(0.0);

        match self {
            LegendPosition::At(x, y) => (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)),
            LegendPosition::Named(name) => match name.as_str() {
                "bottomright" => (right, bottom),
                "bottom" => (center_x, bottom),
                "bottomleft" => (left, bottom),
                "left" => (left, center_y),
                "topleft" => (left, top),
                "top" => (center_x, top),
                "topright" => (right, top),
                "right" => (right, center_y),
                _ => (center_x, center_y),
            },
        }
    }
}

impl FromStr for LegendPosition {
    type Err = MapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        if LEGEND_POSITIONS.contains(&lowered.as_str()) {
            return Ok(LegendPosition::Named(lowered));
        }

        // "x,y" pair of cell fractions
        if let Some((x, y)) = s.split_once(',') {
            if let (Ok(x), Ok(y)) = (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
                return Ok(LegendPosition::At(x, y));
            }
        }

        Err(MapError::invalid_parameter(
            "legend position",
            format!(
                "Unknown legend position: {}. Use one of {} or 'x,y'",
                s,
                LEGEND_POSITIONS.join(", ")
            ),
        ))
    }
}

/// Styling shared by every legend a call draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendStyle {
    pub position: LegendPosition,
    pub font_scale: f64,
    pub columns: usize,
    pub horizontal: bool,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            position: LegendPosition::Named("bottomleft".to_string()),
            font_scale: 0.8,
            columns: 1,
            horizontal: false,
        }
    }
}

/// Everything a renderer needs to draw one legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSpec {
    pub position: LegendPosition,
    pub labels: Vec<String>,
    pub fills: Vec<Rgba>,
    pub font_scale: f64,
    pub columns: usize,
    pub horizontal: bool,
    pub bordered: bool,
}

impl LegendSpec {
    /// Pair labels with fills under the given style. Legends never carry a border.
    pub fn new(labels: Vec<String>, fills: Vec<Rgba>, style: &LegendStyle) -> Result<Self> {
        if labels.len() != fills.len() {
            return Err(MapError::length_mismatch("legend fills", labels.len(), fills.len()));
        }
        Ok(Self {
            position: style.position.clone(),
            labels,
            fills,
            font_scale: style.font_scale,
            columns: style.columns.max(1),
            horizontal: style.horizontal,
            bordered: false,
        })
    }
}

/// Legend labels for `n_col` bins, highest bin first.
///
/// Returns `Ok(None)` when the legend is hidden.
pub fn format_labels(edges: &[f64], n_col: usize, labels: &LegendLabels) -> Result<Option<Vec<String>>> {
    match labels {
        LegendLabels::Hidden => Ok(None),
        LegendLabels::Custom(custom) => {
            if custom.len() != n_col {
                return Err(MapError::length_mismatch("legend labels", n_col, custom.len()));
            }
            Ok(Some(custom.clone()))
        }
        LegendLabels::Auto => {
            if edges.len() != n_col + 1 {
                return Err(MapError::length_mismatch("bin edges", n_col + 1, edges.len()));
            }
            let mut derived: Vec<String> = (0..n_col)
                .map(|i| {
                    let close = if i + 1 == n_col { ']' } else { ')' };
                    format!("[{},{}{}", edges[i], edges[i + 1], close)
                })
                .collect();
            derived.reverse();
            Ok(Some(derived))
        }
    }
}

/// Bin fills in legend order (highest bin first)
pub fn legend_fills(palette: &[Rgba]) -> Vec<Rgba> {
    palette.iter().rev().copied().collect()
}
