//! Multi-panel choropleths from a value table.
//!
//! Each panel is one slice of the table along the panel axis. With a shared
//! legend, breaks come from the whole table and a single legend gets its own
//! layout cell after the maps. Otherwise every panel is binned on its own.

use ndarray::{ArrayView2, ArrayViewD, Axis, Ix1, Ix2};
use tracing::{debug, info, warn};

use super::single::draw_discrete;
use super::{MapSummary, PanelOptions};
use crate::binning::compute_breaks;
use crate::error::{MapError, Result};
use crate::layer::SpatialLayer;
use crate::legend::{format_labels, legend_fills, LegendPosition, LegendSpec, LegendStyle};
use crate::logging::{FigureStats, Operation};
use crate::render::{LayoutSpec, Renderer};

/// Which axis of a 2-D table enumerates panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAxis {
    /// Each column is a panel; rows are geographic units
    Columns,
    /// Each row is a panel; columns are geographic units
    Rows,
}

impl PanelAxis {
    /// Guess the panel axis from the table shape: the axis whose length is
    /// not the unit count. Refuses shapes where both axes match.
    pub fn infer(shape: &[usize], n_units: usize) -> Result<Self> {
        match shape {
            [_] => Ok(PanelAxis::Columns),
            [rows, cols] => match (*rows == n_units, *cols == n_units) {
                (true, true) => Err(MapError::AmbiguousAxis { units: n_units }),
                (true, false) => Ok(PanelAxis::Columns),
                (false, true) => Ok(PanelAxis::Rows),
                (false, false) => Err(MapError::length_mismatch("units in value table", n_units, *rows)),
            },
            _ => Err(MapError::DimensionMismatch { ndim: shape.len() }),
        }
    }
}

/// What to do after a panel fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnPanelError {
    /// Record the failure and render the remaining panels
    Continue,
    /// Record the failure and skip the remaining panels
    Stop,
}

/// Outcome of a multi-panel call
#[derive(Debug)]
pub struct PanelReport {
    /// Edges used by every panel when the legend is shared
    pub shared_edges: Option<Vec<f64>>,
    /// Labels of the shared legend, if one was drawn
    pub shared_legend: Option<Vec<String>>,
    /// One entry per attempted panel, in panel order
    pub panels: Vec<Result<MapSummary>>,
    /// Panels not attempted after a failure under [`OnPanelError::Stop`]
    pub skipped: usize,
}

impl PanelReport {
    pub fn succeeded(&self) -> usize {
        self.panels.iter().filter(|p| p.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.panels.len() - self.succeeded()
    }
}

/// Draw one map per panel of `table`.
///
/// Shape errors, title count mismatches, and shared breaks or shared labels
/// that cannot be built fail the whole call before drawing. Failures inside
/// a single panel are recorded in the report.
pub fn plot_maps<R, S>(
    renderer: &mut R,
    layer: &SpatialLayer,
    titles: &[S],
    table: ArrayViewD<'_, f64>,
    options: &PanelOptions,
) -> Result<PanelReport>
where
    R: Renderer + ?Sized,
    S: AsRef<str>,
{
    let operation = Operation::start(
        "plot_maps",
        if options.shared_legend { "shared legend" } else { "per-panel legends" },
    );

    let result = render_panels(renderer, layer, titles, table, options);

    if let Ok(report) = &result {
        operation.record_figure(FigureStats {
            panels: report.panels.len(),
            failed: report.failed(),
            units: layer.len(),
            n_col: options.map.n_col,
        });
    }
    operation.finish(result)
}

/// Split the table into one value vector per panel
pub fn panel_values(table: ArrayViewD<'_, f64>, axis: PanelAxis, n_units: usize) -> Result<Vec<Vec<f64>>> {
    let ndim = table.ndim();
    let (matrix, axis): (ArrayView2<'_, f64>, PanelAxis) = match ndim {
        1 => {
            let column = table
                .into_dimensionality::<Ix1>()
                .map_err(|_| MapError::DimensionMismatch { ndim })?;
            (column.insert_axis(Axis(1)), PanelAxis::Columns)
        }
        2 => (
            table
                .into_dimensionality::<Ix2>()
                .map_err(|_| MapError::DimensionMismatch { ndim })?,
            axis,
        ),
        _ => return Err(MapError::DimensionMismatch { ndim }),
    };

    let (unit_axis, panel_axis) = match axis {
        PanelAxis::Columns => (Axis(0), Axis(1)),
        PanelAxis::Rows => (Axis(1), Axis(0)),
    };
    let units = matrix.len_of(unit_axis);
    if units != n_units {
        return Err(MapError::length_mismatch("units in value table", n_units, units));
    }

    Ok(matrix
        .axis_iter(panel_axis)
        .map(|lane| lane.iter().copied().collect())
        .collect())
}

fn render_panels<R, S>(
    renderer: &mut R,
    layer: &SpatialLayer,
    titles: &[S],
    table: ArrayViewD<'_, f64>,
    options: &PanelOptions,
) -> Result<PanelReport>
where
    R: Renderer + ?Sized,
    S: AsRef<str>,
{
    let panels = panel_values(table, options.axis, layer.len())?;
    if titles.len() != panels.len() {
        return Err(MapError::length_mismatch("panel titles", panels.len(), titles.len()));
    }

    let layout = options
        .layout
        .unwrap_or_else(|| LayoutSpec::for_panels(panels.len(), options.shared_legend));
    let needed = panels.len() + usize::from(options.shared_legend);
    if layout.cells() < needed {
        return Err(MapError::invalid_parameter(
            "layout",
            format!(
                "{}x{} layout has {} cells, {} needed",
                layout.rows,
                layout.cols,
                layout.cells(),
                needed
            ),
        ));
    }

    let map = &options.map;
    let shared = if options.shared_legend {
        let all: Vec<f64> = panels.iter().flatten().copied().collect();
        let edges = compute_breaks(&all, map.n_col, &map.strategy)?;
        let labels = format_labels(&edges, map.n_col, &map.labels)?;
        debug!(edges = ?edges, "Shared breaks computed from the whole table");
        Some((edges, labels))
    } else {
        None
    };

    renderer.begin_figure(&layout)?;

    let mut report = PanelReport {
        shared_edges: shared.as_ref().map(|(edges, _)| edges.clone()),
        shared_legend: None,
        panels: Vec::with_capacity(panels.len()),
        skipped: 0,
    };

    for (index, (values, title)) in panels.iter().zip(titles).enumerate() {
        let title: &str = title.as_ref();
        renderer.select_cell(index)?;

        let outcome = match &shared {
            Some((edges, _)) => draw_discrete(renderer, layer, title, values, edges.clone(), map, false),
            None => compute_breaks(values, map.n_col, &map.strategy)
                .and_then(|edges| draw_discrete(&mut *renderer, layer, title, values, edges, map, true)),
        };

        let failed = outcome.is_err();
        if let Err(e) = &outcome {
            warn!(panel = index, title = title, error = %e, "Panel not rendered");
        }
        report.panels.push(outcome);

        if failed && options.on_error == OnPanelError::Stop {
            report.skipped = panels.len() - index - 1;
            info!(skipped = report.skipped, "Stopping after failed panel");
            break;
        }
    }

    if let Some((_, Some(labels))) = &shared {
        renderer.select_cell(panels.len())?;
        let style = LegendStyle {
            position: LegendPosition::Named("center".to_string()),
            ..map.legend.clone()
        };
        let spec = LegendSpec::new(labels.clone(), legend_fills(&map.shades()?), &style)?;
        renderer.draw_legend(&spec)?;
        report.shared_legend = Some(labels.clone());
    } else if options.shared_legend {
        info!("Shared legend hidden, not drawn");
    }

    Ok(report)
}
