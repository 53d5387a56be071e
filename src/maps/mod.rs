//! Choropleth map entry points.
//!
//! - [`plot_map`]: one map shaded by binned values
//! - [`plot_map_continuous`]: one map shaded by value rank on a color ramp
//! - [`plot_maps`]: one map per column (or row) of a value table

pub mod continuous;
pub mod panels;
pub mod single;

use serde::Serialize;

use crate::binning::BreakStrategy;
use crate::colormaps::{get_colormap, parse_color, Rgba};
use crate::config::Config;
use crate::error::Result;
use crate::legend::{LegendLabels, LegendStyle};
use crate::render::{LayoutSpec, LineStyle, TitleStyle};

pub use continuous::{plot_map_continuous, ContinuousSummary};
pub use panels::{plot_maps, OnPanelError, PanelAxis, PanelReport};
pub use single::plot_map;

/// Options for a discrete (binned) map
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub n_col: usize,
    pub strategy: BreakStrategy,
    pub labels: LegendLabels,
    /// Colormap sampled into `n_col` shades, darkest (lowest bin) first
    pub palette: String,
    pub legend: LegendStyle,
    pub title: TitleStyle,
    pub line: LineStyle,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            n_col: 5,
            strategy: BreakStrategy::Quantile,
            labels: LegendLabels::Auto,
            palette: "grayscale".to_string(),
            legend: LegendStyle::default(),
            title: TitleStyle::default(),
            line: LineStyle::default(),
        }
    }
}

impl MapOptions {
    /// Options taken from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            n_col: config.shading.n_col,
            strategy: config.break_strategy()?,
            labels: LegendLabels::Auto,
            palette: config.shading.palette.clone(),
            legend: legend_style(config)?,
            title: title_style(config),
            line: line_style(config)?,
        })
    }

    /// Shades for `n_col` bins
    pub fn shades(&self) -> Result<Vec<Rgba>> {
        Ok(get_colormap(&self.palette)?.sample(self.n_col))
    }
}

/// Options for a continuous (ranked) map
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousOptions {
    pub ramp: String,
    /// Custom labels must hold exactly five entries, highest first
    pub labels: LegendLabels,
    pub legend: LegendStyle,
    pub title: TitleStyle,
    pub line: LineStyle,
}

impl Default for ContinuousOptions {
    fn default() -> Self {
        Self {
            ramp: "yl_or_rd".to_string(),
            labels: LegendLabels::Auto,
            legend: LegendStyle::default(),
            title: TitleStyle::default(),
            line: LineStyle::default(),
        }
    }
}

impl ContinuousOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            ramp: config.shading.ramp.clone(),
            labels: LegendLabels::Auto,
            legend: legend_style(config)?,
            title: title_style(config),
            line: line_style(config)?,
        })
    }
}

/// Options for a multi-panel figure
#[derive(Debug, Clone, PartialEq)]
pub struct PanelOptions {
    pub map: MapOptions,
    pub axis: PanelAxis,
    pub shared_legend: bool,
    /// Explicit grid; `None` picks a near-square one
    pub layout: Option<LayoutSpec>,
    pub on_error: OnPanelError,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            axis: PanelAxis::Columns,
            shared_legend: false,
            layout: None,
            on_error: OnPanelError::Continue,
        }
    }
}

impl PanelOptions {
    pub fn from_config(config: &Config, shared_legend: bool) -> Result<Self> {
        Ok(Self {
            map: MapOptions::from_config(config)?,
            shared_legend,
            ..Self::default()
        })
    }
}

/// Result of one discrete map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub edges: Vec<f64>,
    pub bins: Vec<Option<usize>>,
    pub colors: Vec<Rgba>,
    /// Labels drawn in the map's own legend, highest bin first
    pub legend: Option<Vec<String>>,
}

fn legend_style(config: &Config) -> Result<LegendStyle> {
    Ok(LegendStyle {
        position: config.legend_position()?,
        font_scale: config.legend.font_scale,
        columns: config.legend.columns,
        horizontal: config.legend.horizontal,
    })
}

fn title_style(config: &Config) -> TitleStyle {
    TitleStyle {
        font_scale: config.figure.title_font_scale,
        line_offset: config.figure.title_line,
    }
}

fn line_style(config: &Config) -> Result<LineStyle> {
    Ok(LineStyle {
        color: parse_color(&config.figure.border_color)?,
        width: config.figure.border_width,
    })
}
