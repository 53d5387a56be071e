//! Single discrete choropleth.

use tracing::{debug, info};

use super::{MapOptions, MapSummary};
use crate::binning::compute_breaks;
use crate::error::{MapError, Result};
use crate::layer::SpatialLayer;
use crate::legend::{format_labels, legend_fills, LegendSpec};
use crate::logging::Operation;
use crate::render::{LayoutSpec, Renderer};
use crate::shading::assign_colors;

/// Bin `values`, shade `layer` in gray levels and draw a title and legend.
///
/// The figure is a single cell. Any mismatch (user cuts, legend labels,
/// value count) is returned before anything is drawn.
pub fn plot_map<R: Renderer + ?Sized>(
    renderer: &mut R,
    layer: &SpatialLayer,
    title: &str,
    values: &[f64],
    options: &MapOptions,
) -> Result<MapSummary> {
    let operation = Operation::start("plot_map", title);
    operation.finish(render_single(renderer, layer, title, values, options))
}

fn render_single<R: Renderer + ?Sized>(
    renderer: &mut R,
    layer: &SpatialLayer,
    title: &str,
    values: &[f64],
    options: &MapOptions,
) -> Result<MapSummary> {
    check_unit_count(layer, values)?;
    let edges = compute_breaks(values, options.n_col, &options.strategy)?;

    renderer.begin_figure(&LayoutSpec::single())?;
    renderer.select_cell(0)?;
    draw_discrete(renderer, layer, title, values, edges, options, true)
}

pub(crate) fn check_unit_count(layer: &SpatialLayer, values: &[f64]) -> Result<()> {
    if values.len() != layer.len() {
        return Err(MapError::length_mismatch("values per unit", layer.len(), values.len()));
    }
    Ok(())
}

/// Shade and draw one map into the current cell using precomputed edges
pub(crate) fn draw_discrete<R: Renderer + ?Sized>(
    renderer: &mut R,
    layer: &SpatialLayer,
    title: &str,
    values: &[f64],
    edges: Vec<f64>,
    options: &MapOptions,
    with_legend: bool,
) -> Result<MapSummary> {
    let shades = options.shades()?;
    let labels = if with_legend {
        format_labels(&edges, options.n_col, &options.labels)?
    } else {
        None
    };
    let shading = assign_colors(values, &edges, &shades)?;

    renderer.draw_polygons(layer, &shading.colors, &options.line)?;
    renderer.draw_title(title, options.title.font_scale, options.title.line_offset)?;

    match &labels {
        Some(labels) => {
            let spec = LegendSpec::new(labels.clone(), legend_fills(&shades), &options.legend)?;
            renderer.draw_legend(&spec)?;
        }
        None if with_legend => info!(title = title, "Legend hidden, not drawn"),
        None => {}
    }

    debug!(
        title = title,
        edges = ?edges,
        units = layer.len(),
        "Map drawn"
    );

    Ok(MapSummary {
        edges,
        bins: shading.bins,
        colors: shading.colors,
        legend: labels,
    })
}
