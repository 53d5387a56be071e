//! Raster renderer backed by the `image` and `imageproc` crates.
//!
//! Each unit is filled through an even-odd mask so holes stay empty, then
//! outlined with line segments. Titles and legend labels are drawn with a
//! TrueType font when one is available and are always kept as
//! [`Annotation`]s, written as JSON beside the PNG.

use chrono::{DateTime, Utc};
use image::{GenericImage, GrayImage, ImageBuffer, Luma, Rgba as Pixel, RgbaImage, SubImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect as PixelRect;
use once_cell::sync::Lazy;
use rusttype::{Font, Scale};
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use super::text::{find_system_font, load_font};
use super::{LayoutSpec, LineStyle, Renderer};
use crate::colormaps::Rgba;
use crate::config::Config;
use crate::error::{MapError, Result};
use crate::layer::{Bounds, SpatialLayer};
use crate::legend::{LegendPosition, LegendSpec};
use crate::logging::generate_operation_id;

const BACKGROUND: Rgba = [255, 255, 255, 255];

const TEXT_COLOR: Rgba = [0, 0, 0, 255];

/// Identifies every figure written by this process
static SESSION_ID: Lazy<String> = Lazy::new(generate_operation_id);

/// Fraction of the cell height reserved for the title
const TITLE_BAND: f64 = 0.12;

/// Fraction of the cell width kept free around the map
const MARGIN: f64 = 0.04;

/// Fraction of the cell width reserved beside each swatch for its label
const LABEL_SPACE: f64 = 0.22;

/// Text drawn on a figure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Annotation {
    Title {
        cell: usize,
        text: String,
        font_scale: f64,
        line_offset: f64,
    },
    Legend {
        cell: usize,
        labels: Vec<String>,
        position: LegendPosition,
        /// Pixel box `[x, y, width, height]` covered by the swatches and labels
        bounds: [u32; 4],
    },
}

/// JSON sidecar describing a rendered figure
#[derive(Debug, Clone, Serialize)]
pub struct FigureAnnotations {
    pub session_id: String,
    pub rendered_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    /// Whether titles and labels were rasterized
    pub text_drawn: bool,
    pub layout: LayoutSpec,
    pub annotations: Vec<Annotation>,
}

/// Pixel rectangle with whole-pixel corners
#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Renders figures into an RGBA canvas of `layout.cols x layout.rows` cells
pub struct RasterRenderer {
    cell_width: u32,
    cell_height: u32,
    layout: LayoutSpec,
    canvas: RgbaImage,
    cell: usize,
    font: Option<Font<'static>>,
    annotations: Vec<Annotation>,
}

impl RasterRenderer {
    /// Create a renderer whose cells are `cell_width x cell_height` pixels.
    ///
    /// Text uses the first system font found; without one, titles and labels
    /// only reach the annotations.
    pub fn new(cell_width: u32, cell_height: u32) -> Result<Self> {
        if cell_width < 16 || cell_height < 16 {
            return Err(MapError::invalid_parameter(
                "cell size",
                format!(
                    "cells must be at least 16x16 pixels, got {}x{}",
                    cell_width, cell_height
                ),
            ));
        }
        let font = find_system_font();
        if font.is_none() {
            warn!("No system font found, titles and legend labels are not rasterized");
        }
        Ok(Self {
            cell_width,
            cell_height,
            layout: LayoutSpec::single(),
            canvas: blank_canvas(cell_width, cell_height),
            cell: 0,
            font,
            annotations: Vec::new(),
        })
    }

    /// Renderer sized and fonted from the `figure` section
    pub fn from_config(config: &Config) -> Result<Self> {
        let renderer = Self::new(config.figure.cell_width, config.figure.cell_height)?;
        match &config.figure.font {
            Some(path) => Ok(renderer.with_font(load_font(path)?)),
            None => Ok(renderer),
        }
    }

    pub fn with_font(mut self, font: Font<'static>) -> Self {
        self.font = Some(font);
        self
    }

    /// Keep text out of the raster
    pub fn without_font(mut self) -> Self {
        self.font = None;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// The rendered canvas
    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Titles and legend labels recorded so far
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Sidecar describing the current figure
    pub fn figure_annotations(&self) -> FigureAnnotations {
        FigureAnnotations {
            session_id: SESSION_ID.clone(),
            rendered_at: Utc::now(),
            width: self.canvas.width(),
            height: self.canvas.height(),
            text_drawn: self.has_font(),
            layout: self.layout,
            annotations: self.annotations.clone(),
        }
    }

    /// Encode the canvas as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.canvas
            .write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| MapError::Render {
                message: format!("Failed to encode PNG: {}", e),
            })?;
        Ok(buffer.into_inner())
    }

    /// Write the PNG to `path` and the annotations to `path` with a `.json` extension
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        let json = serde_json::to_string_pretty(&self.figure_annotations())?;
        std::fs::write(path.with_extension("json"), json)?;
        debug!(path = %path.display(), "Figure saved");
        Ok(())
    }

    fn cell_rect(&self) -> Rect {
        let col = self.cell % self.layout.cols;
        let row = self.cell / self.layout.cols;
        Rect {
            x: (col as u32 * self.cell_width) as f64,
            y: (row as u32 * self.cell_height) as f64,
            w: self.cell_width as f64,
            h: self.cell_height as f64,
        }
    }

    fn plot_rect(&self) -> Rect {
        let cell = self.cell_rect();
        let margin = MARGIN * cell.w;
        let band = TITLE_BAND * cell.h;
        Rect {
            x: cell.x + margin,
            y: cell.y + band,
            w: (cell.w - 2.0 * margin).max(1.0),
            h: (cell.h - band - margin).max(1.0),
        }
    }
}

impl Renderer for RasterRenderer {
    fn begin_figure(&mut self, layout: &LayoutSpec) -> Result<()> {
        let layout = LayoutSpec::new(layout.rows, layout.cols)?;
        self.layout = layout;
        self.canvas = blank_canvas(
            self.cell_width * layout.cols as u32,
            self.cell_height * layout.rows as u32,
        );
        self.cell = 0;
        self.annotations.clear();
        debug!(rows = layout.rows, cols = layout.cols, "Figure started");
        Ok(())
    }

    fn select_cell(&mut self, index: usize) -> Result<()> {
        if index >= self.layout.cells() {
            return Err(MapError::Render {
                message: format!(
                    "cell {} outside a {}x{} layout",
                    index, self.layout.rows, self.layout.cols
                ),
            });
        }
        self.cell = index;
        Ok(())
    }

    fn draw_polygons(&mut self, layer: &SpatialLayer, fills: &[Rgba], line: &LineStyle) -> Result<()> {
        if fills.len() != layer.len() {
            return Err(MapError::length_mismatch("polygon fills", layer.len(), fills.len()));
        }
        let Some(bounds) = layer.bounds() else {
            return Ok(());
        };

        let project = projection(bounds, self.plot_rect());
        let clip = self.cell_rect();

        for (unit, &fill) in layer.units.iter().zip(fills) {
            let rings: Vec<Vec<(f64, f64)>> = unit
                .polygons
                .iter()
                .flat_map(|p| p.rings())
                .map(|r| r.iter().map(|v| project(v[0], v[1])).collect())
                .collect();

            if fill[3] > 0 {
                fill_rings(&mut self.canvas, &rings, fill, clip);
            }
            if line.width > 0 {
                for ring in &rings {
                    stroke_ring(&mut self.canvas, ring, line, clip);
                }
            }
        }
        Ok(())
    }

    fn draw_title(&mut self, title: &str, font_scale: f64, line_offset: f64) -> Result<()> {
        let cell = self.cell_rect();
        if let Some(font) = &self.font {
            let band = TITLE_BAND * cell.h;
            let scale = Scale::uniform((0.6 * band * font_scale).max(6.0) as f32);
            let (w, h) = text_size(scale, font, title);
            // `line_offset` lifts the title off the map in steps of a fifth of the band
            let x = ((cell.w - w as f64) / 2.0).max(0.0);
            let y = (band - h as f64 - 0.2 * band * line_offset).max(0.0);
            draw_text_mut(
                &mut *cell_view(&mut self.canvas, cell),
                Pixel(TEXT_COLOR),
                x as i32,
                y as i32,
                scale,
                font,
                title,
            );
        }
        self.annotations.push(Annotation::Title {
            cell: self.cell,
            text: title.to_string(),
            font_scale,
            line_offset,
        });
        Ok(())
    }

    fn draw_legend(&mut self, legend: &LegendSpec) -> Result<()> {
        let n = legend.labels.len();
        if n == 0 {
            return Ok(());
        }

        let cell = self.cell_rect();
        let swatch = (0.06 * cell.w.min(cell.h) * legend.font_scale).max(6.0);
        let gap = (swatch * 0.3).max(2.0);
        let item_w = swatch + gap + LABEL_SPACE * cell.w;
        let item_h = swatch + gap;

        let (cols, rows) = if legend.horizontal {
            (n, 1)
        } else {
            let cols = legend.columns.clamp(1, n);
            (cols, n.div_ceil(cols))
        };

        let box_w = cols as f64 * item_w;
        let box_h = rows as f64 * item_h;
        let (fx, fy) = legend.position.anchor(box_w / cell.w, box_h / cell.h);
        let left = fx * cell.w;
        let top = fy * cell.h;
        let label_scale = Scale::uniform((swatch * 0.9) as f32);
        let side = swatch.round() as u32;

        let mut view = cell_view(&mut self.canvas, cell);
        for (i, (fill, label)) in legend.fills.iter().zip(&legend.labels).enumerate() {
            // Column-major when stacked vertically, like a multi-column key
            let (col, row) = if legend.horizontal { (i, 0) } else { (i / rows, i % rows) };
            let x = left + col as f64 * item_w;
            let y = top + row as f64 * item_h;

            let square = PixelRect::at(x as i32, y as i32).of_size(side, side);
            draw_filled_rect_mut(&mut *view, square, Pixel(*fill));
            draw_hollow_rect_mut(&mut *view, square, Pixel(TEXT_COLOR));
            if let Some(font) = &self.font {
                draw_text_mut(
                    &mut *view,
                    Pixel(TEXT_COLOR),
                    (x + swatch + gap) as i32,
                    y as i32,
                    label_scale,
                    font,
                    label,
                );
            }
        }
        if legend.bordered {
            let frame = PixelRect::at(left as i32, top as i32)
                .of_size(box_w.max(1.0) as u32, box_h.max(1.0) as u32);
            draw_hollow_rect_mut(&mut *view, frame, Pixel(TEXT_COLOR));
        }

        self.annotations.push(Annotation::Legend {
            cell: self.cell,
            labels: legend.labels.clone(),
            position: legend.position.clone(),
            bounds: [
                (cell.x + left).max(0.0) as u32,
                (cell.y + top).max(0.0) as u32,
                box_w as u32,
                box_h as u32,
            ],
        });
        Ok(())
    }
}

fn blank_canvas(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::from_pixel(width, height, Pixel(BACKGROUND))
}

/// Drawing surface limited to `rect`, with its own origin
fn cell_view(canvas: &mut RgbaImage, rect: Rect) -> SubImage<&mut RgbaImage> {
    canvas.sub_image(rect.x as u32, rect.y as u32, rect.w as u32, rect.h as u32)
}

/// Ring corners relative to `origin`, without repeats or a closing point
fn ring_points(ring: &[(f64, f64)], origin: Rect) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = ring
        .iter()
        .map(|&(x, y)| Point::new((x - origin.x).round() as i32, (y - origin.y).round() as i32))
        .collect();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Fill the rings of one unit with the even-odd rule, clipped to `clip`
fn fill_rings(canvas: &mut RgbaImage, rings: &[Vec<(f64, f64)>], color: Rgba, clip: Rect) {
    let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
    let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in rings.iter().flatten() {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    let left = x0.floor().max(clip.x);
    let top = y0.floor().max(clip.y);
    let right = (x1.ceil() + 1.0).min(clip.x + clip.w);
    let bottom = (y1.ceil() + 1.0).min(clip.y + clip.h);
    if !(right > left && bottom > top) {
        return;
    }
    let area = Rect {
        x: left,
        y: top,
        w: right - left,
        h: bottom - top,
    };
    let (w, h) = (area.w as u32, area.h as u32);

    // Pixels covered by an odd number of rings are inside
    let mut mask = GrayImage::new(w, h);
    for ring in rings {
        let points = ring_points(ring, area);
        if points.len() < 3 {
            continue;
        }
        let mut layer = GrayImage::new(w, h);
        draw_polygon_mut(&mut layer, &points, Luma([255u8]));
        for (m, l) in mask.pixels_mut().zip(layer.pixels()) {
            m.0[0] ^= l.0[0];
        }
    }

    let mut view = cell_view(canvas, area);
    for (x, y, m) in mask.enumerate_pixels() {
        if m.0[0] != 0 {
            view.put_pixel(x, y, Pixel(color));
        }
    }
}

fn stroke_ring(canvas: &mut RgbaImage, ring: &[(f64, f64)], line: &LineStyle, clip: Rect) {
    if ring.len() < 2 {
        return;
    }
    let half = (line.width as i32 - 1) / 2;
    let mut view = cell_view(canvas, clip);
    for (a, b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
        for ox in -half..=half {
            for oy in -half..=half {
                let shift = |p: &(f64, f64)| {
                    (
                        (p.0 - clip.x) as f32 + ox as f32,
                        (p.1 - clip.y) as f32 + oy as f32,
                    )
                };
                draw_line_segment_mut(&mut *view, shift(a), shift(b), Pixel(line.color));
            }
        }
    }
}

/// Aspect-preserving map from layer coordinates to pixels, north up
fn projection(bounds: Bounds, plot: Rect) -> impl Fn(f64, f64) -> (f64, f64) {
    let bw = bounds.width();
    let bh = bounds.height();
    let scale = match (bw > 0.0, bh > 0.0) {
        (true, true) => (plot.w / bw).min(plot.h / bh),
        (true, false) => plot.w / bw,
        (false, true) => plot.h / bh,
        (false, false) => 1.0,
    };
    let pad_x = (plot.w - bw * scale) / 2.0;
    let pad_y = (plot.h - bh * scale) / 2.0;

    move |x, y| {
        (
            plot.x + pad_x + (x - bounds.min_x) * scale,
            plot.y + pad_y + (bounds.max_y - y) * scale,
        )
    }
}
