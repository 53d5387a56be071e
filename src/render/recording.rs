//! A renderer that records draw calls instead of drawing.

use serde::Serialize;

use super::{LayoutSpec, LineStyle, Renderer};
use crate::colormaps::Rgba;
use crate::error::{MapError, Result};
use crate::layer::SpatialLayer;
use crate::legend::LegendSpec;

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DrawCall {
    BeginFigure { layout: LayoutSpec },
    SelectCell { index: usize },
    Polygons { units: usize, fills: Vec<Rgba>, line: LineStyle },
    Title { text: String, font_scale: f64, line_offset: f64 },
    Legend { legend: LegendSpec },
}

/// Keeps every call in order; useful for dry runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    layout: Option<LayoutSpec>,
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles in drawing order
    pub fn titles(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Title { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Legends in drawing order
    pub fn legends(&self) -> Vec<&LegendSpec> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Legend { legend } => Some(legend),
                _ => None,
            })
            .collect()
    }

    /// Fill arrays passed to each polygon call
    pub fn polygon_fills(&self) -> Vec<&[Rgba]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Polygons { fills, .. } => Some(fills.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Recorded calls as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.calls)?)
    }
}

impl Renderer for RecordingRenderer {
    fn begin_figure(&mut self, layout: &LayoutSpec) -> Result<()> {
        let layout = LayoutSpec::new(layout.rows, layout.cols)?;
        self.layout = Some(layout);
        self.calls.push(DrawCall::BeginFigure { layout });
        Ok(())
    }

    fn select_cell(&mut self, index: usize) -> Result<()> {
        let cells = self.layout.map_or(1, |l| l.cells());
        if index >= cells {
            return Err(MapError::Render {
                message: format!("cell {} outside a layout of {} cells", index, cells),
            });
        }
        self.calls.push(DrawCall::SelectCell { index });
        Ok(())
    }

    fn draw_polygons(&mut self, layer: &SpatialLayer, fills: &[Rgba], line: &LineStyle) -> Result<()> {
        if fills.len() != layer.len() {
            return Err(MapError::length_mismatch("polygon fills", layer.len(), fills.len()));
        }
        self.calls.push(DrawCall::Polygons {
            units: layer.len(),
            fills: fills.to_vec(),
            line: *line,
        });
        Ok(())
    }

    fn draw_title(&mut self, title: &str, font_scale: f64, line_offset: f64) -> Result<()> {
        self.calls.push(DrawCall::Title {
            text: title.to_string(),
            font_scale,
            line_offset,
        });
        Ok(())
    }

    fn draw_legend(&mut self, legend: &LegendSpec) -> Result<()> {
        self.calls.push(DrawCall::Legend {
            legend: legend.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::LegendStyle;

    #[test]
    fn test_records_in_order() {
        let mut renderer = RecordingRenderer::new();
        let layer = SpatialLayer::grid(1, 2);
        renderer.begin_figure(&LayoutSpec { rows: 1, cols: 2 }).unwrap();
        renderer.select_cell(1).unwrap();
        renderer
            .draw_polygons(&layer, &[[0, 0, 0, 255], [9, 9, 9, 255]], &LineStyle::default())
            .unwrap();
        renderer.draw_title("Cases", 1.0, 1.0).unwrap();
        let legend =
            LegendSpec::new(vec!["a".into()], vec![[1, 1, 1, 255]], &LegendStyle::default()).unwrap();
        renderer.draw_legend(&legend).unwrap();

        assert_eq!(renderer.calls.len(), 5);
        assert_eq!(renderer.titles(), vec!["Cases"]);
        assert_eq!(renderer.legends().len(), 1);
        assert_eq!(renderer.polygon_fills()[0].len(), 2);
        assert!(renderer.to_json().unwrap().contains("\"call\": \"title\""));
    }

    #[test]
    fn test_select_cell_bounds() {
        let mut renderer = RecordingRenderer::new();
        assert!(renderer.select_cell(0).is_ok());
        assert!(renderer.select_cell(1).is_err());
    }
}
