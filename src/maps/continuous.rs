//! Single choropleth on a continuous color ramp.

use serde::Serialize;
use tracing::info;

use super::single::check_unit_count;
use super::ContinuousOptions;
use crate::colormaps::get_colormap;
use crate::error::{MapError, Result};
use crate::layer::SpatialLayer;
use crate::legend::{LegendLabels, LegendSpec};
use crate::logging::Operation;
use crate::render::{LayoutSpec, Renderer};
use crate::shading::{assign_continuous_colors, ContinuousShading, CONTINUOUS_LEGEND_SAMPLES};

/// Result of one continuous map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousSummary {
    pub shading: ContinuousShading,
    /// Labels drawn in the legend, highest value first
    pub legend: Option<Vec<String>>,
}

/// Shade `layer` by the rank of each value on a color ramp.
///
/// `scale_values` joins the ranking without being drawn, so several figures
/// sharing the same reference get the same color for the same value.
pub fn plot_map_continuous<R: Renderer + ?Sized>(
    renderer: &mut R,
    layer: &SpatialLayer,
    title: &str,
    values: &[f64],
    scale_values: Option<&[f64]>,
    options: &ContinuousOptions,
) -> Result<ContinuousSummary> {
    let operation = Operation::start("plot_map_continuous", title);
    operation.finish(render_continuous(renderer, layer, title, values, scale_values, options))
}

fn render_continuous<R: Renderer + ?Sized>(
    renderer: &mut R,
    layer: &SpatialLayer,
    title: &str,
    values: &[f64],
    scale_values: Option<&[f64]>,
    options: &ContinuousOptions,
) -> Result<ContinuousSummary> {
    check_unit_count(layer, values)?;
    let ramp = get_colormap(&options.ramp)?;
    let shading = assign_continuous_colors(values, scale_values, ramp.as_ref())?;

    let labels = match &options.labels {
        LegendLabels::Hidden => None,
        LegendLabels::Custom(custom) => {
            if custom.len() != CONTINUOUS_LEGEND_SAMPLES {
                return Err(MapError::length_mismatch(
                    "legend labels",
                    CONTINUOUS_LEGEND_SAMPLES,
                    custom.len(),
                ));
            }
            Some(custom.clone())
        }
        LegendLabels::Auto => Some(
            shading
                .legend_samples
                .iter()
                .map(|s| s.value.to_string())
                .collect(),
        ),
    };

    renderer.begin_figure(&LayoutSpec::single())?;
    renderer.select_cell(0)?;
    renderer.draw_polygons(layer, &shading.colors, &options.line)?;
    renderer.draw_title(title, options.title.font_scale, options.title.line_offset)?;

    match &labels {
        Some(labels) => {
            let fills = shading.legend_samples.iter().map(|s| s.color).collect();
            let spec = LegendSpec::new(labels.clone(), fills, &options.legend)?;
            renderer.draw_legend(&spec)?;
        }
        None => info!(title = title, "Legend hidden, not drawn"),
    }

    Ok(ContinuousSummary {
        shading,
        legend: labels,
    })
}
