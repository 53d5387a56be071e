//! Rendering collaborators.
//!
//! The map functions only talk to the [`Renderer`] trait: they lay out a
//! figure grid, pick a cell, fill polygons, and add a title and a legend.
//! [`RasterRenderer`] draws into an RGBA image; [`RecordingRenderer`] keeps
//! the calls for inspection.

pub mod raster;
pub mod recording;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::colormaps::Rgba;
use crate::error::{MapError, Result};
use crate::layer::SpatialLayer;
use crate::legend::LegendSpec;

pub use raster::{Annotation, FigureAnnotations, RasterRenderer};
pub use recording::{DrawCall, RecordingRenderer};
pub use text::{find_system_font, load_font};

/// Drawing surface used by the map functions
pub trait Renderer {
    /// Reset the surface to an empty `rows x cols` grid of cells
    fn begin_figure(&mut self, layout: &LayoutSpec) -> Result<()>;

    /// Direct subsequent drawing to cell `index` (row-major)
    fn select_cell(&mut self, index: usize) -> Result<()>;

    /// Fill every unit of `layer` with its color and outline it, without axes
    fn draw_polygons(&mut self, layer: &SpatialLayer, fills: &[Rgba], line: &LineStyle) -> Result<()>;

    /// Title for the current cell
    fn draw_title(&mut self, title: &str, font_scale: f64, line_offset: f64) -> Result<()>;

    /// Legend for the current cell
    fn draw_legend(&mut self, legend: &LegendSpec) -> Result<()>;
}

/// Grid of figure cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub rows: usize,
    pub cols: usize,
}

impl LayoutSpec {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MapError::invalid_parameter(
                "layout",
                format!("layout must have at least one cell, got {}x{}", rows, cols),
            ));
        }
        Ok(Self { rows, cols })
    }

    /// A single cell
    pub fn single() -> Self {
        Self { rows: 1, cols: 1 }
    }

    /// Near-square grid holding `panels` maps, plus one cell for a shared legend
    pub fn for_panels(panels: usize, shared_legend: bool) -> Self {
        let cells = (panels + usize::from(shared_legend)).max(1);
        let cols = (cells as f64).sqrt().ceil() as usize;
        let rows = cells.div_ceil(cols);
        Self { rows, cols }
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Polygon outline style; a zero width draws no outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Rgba,
    pub width: u32,
}

impl LineStyle {
    pub fn none() -> Self {
        Self {
            color: [0, 0, 0, 0],
            width: 0,
        }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            width: 1,
        }
    }
}

/// Title font size and offset, in the renderer's relative units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TitleStyle {
    pub font_scale: f64,
    pub line_offset: f64,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            font_scale: 1.0,
            line_offset: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_panels() {
        assert_eq!(LayoutSpec::for_panels(1, false), LayoutSpec { rows: 1, cols: 1 });
        assert_eq!(LayoutSpec::for_panels(3, false), LayoutSpec { rows: 2, cols: 2 });
        assert_eq!(LayoutSpec::for_panels(3, true), LayoutSpec { rows: 2, cols: 2 });
        assert_eq!(LayoutSpec::for_panels(5, false), LayoutSpec { rows: 2, cols: 3 });
        assert!(LayoutSpec::for_panels(7, true).cells() >= 8);
    }

    #[test]
    fn test_layout_new_rejects_empty() {
        assert!(LayoutSpec::new(0, 2).is_err());
        assert_eq!(LayoutSpec::new(2, 2).unwrap().cells(), 4);
    }
}
