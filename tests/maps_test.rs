//! Integration tests for the map entry points
//!
//! These tests drive binning, shading, legends and layout end-to-end through
//! both renderers.

mod common;

use common::assertions::{assert_array_approx_eq, assert_bins_within, assert_edges_cover};
use common::image_utils::{
    assert_image_dimensions, assert_image_format, count_color, count_color_in_cell,
    load_image_from_bytes,
};
use common::layers::{lake_and_islands, smr_table};
use diseasemap::colormaps::grayscale_palette;
use diseasemap::layer::{GeoUnit, Polygon};
use diseasemap::legend::LegendPosition;
use diseasemap::maps::{
    plot_map, plot_map_continuous, plot_maps, ContinuousOptions, MapOptions, OnPanelError,
    PanelAxis, PanelOptions,
};
use diseasemap::render::{
    find_system_font, Annotation, DrawCall, LayoutSpec, RasterRenderer, RecordingRenderer,
};
use diseasemap::{compute_breaks, BreakStrategy, Config, LegendLabels, MapError, SpatialLayer};
use image::ImageFormat;
use ndarray::{Array2, Axis};
use pretty_assertions::assert_eq;

fn equal_options(n_col: usize) -> MapOptions {
    MapOptions {
        n_col,
        strategy: BreakStrategy::Equal,
        ..MapOptions::default()
    }
}

#[test]
fn test_equal_breaks_cover_range_and_bins_stay_in_bounds() {
    let values = [3.2, 0.4, 7.9, 5.5, 1.1, 9.6, 2.2, 4.8, 6.3];
    let layer = SpatialLayer::grid(3, 3);

    for n_col in 1..=6 {
        let mut renderer = RecordingRenderer::new();
        let summary = plot_map(&mut renderer, &layer, "SMR", &values, &equal_options(n_col)).unwrap();

        assert_eq!(summary.edges.len(), n_col + 1);
        assert_edges_cover(&summary.edges, &values);
        assert_bins_within(&summary.bins, n_col);
        assert_eq!(summary.legend.as_ref().map(Vec::len), Some(n_col));
    }
}

#[test]
fn test_quantile_breaks_on_one_to_eight() {
    let values: Vec<f64> = (1..=8).map(f64::from).collect();
    let layer = SpatialLayer::grid(2, 4);
    let options = MapOptions {
        n_col: 4,
        strategy: BreakStrategy::Quantile,
        ..MapOptions::default()
    };

    let mut renderer = RecordingRenderer::new();
    let summary = plot_map(&mut renderer, &layer, "Cases", &values, &options).unwrap();

    assert_array_approx_eq(&summary.edges, &[1.0, 2.75, 4.5, 6.25, 8.0], None);
    assert_eq!(
        summary.legend.unwrap(),
        vec!["[6.25,8]", "[4.5,6.25)", "[2.75,4.5)", "[1,2.75)"]
    );
    // Darkest shade for the lowest class
    let palette = grayscale_palette(4);
    assert_eq!(summary.colors[0], palette[0]);
    assert_eq!(summary.colors[7], palette[3]);
}

#[test]
fn test_wrong_length_user_cuts_produce_nothing() {
    let layer = SpatialLayer::grid(1, 4);
    let options = MapOptions {
        n_col: 3,
        strategy: BreakStrategy::User(vec![0.0, 1.0, 2.0]),
        ..MapOptions::default()
    };
    let mut renderer = RecordingRenderer::new();

    let err = plot_map(&mut renderer, &layer, "t", &[0.1, 0.5, 1.5, 1.9], &options).unwrap_err();
    assert!(matches!(err, MapError::LengthMismatch { expected: 4, actual: 3, .. }));
    assert!(renderer.calls.is_empty());
}

#[test]
fn test_user_cuts_are_used_verbatim() {
    let layer = SpatialLayer::grid(1, 4);
    let options = MapOptions {
        n_col: 3,
        strategy: BreakStrategy::User(vec![0.0, 0.8, 1.2, 3.0]),
        ..MapOptions::default()
    };
    let mut renderer = RecordingRenderer::new();

    let summary = plot_map(&mut renderer, &layer, "SMR", &[0.5, 0.9, 1.5, 2.5], &options).unwrap();
    assert_eq!(summary.edges, vec![0.0, 0.8, 1.2, 3.0]);
    assert_eq!(summary.bins, vec![Some(0), Some(1), Some(2), Some(2)]);
    assert_eq!(summary.legend.unwrap()[0], "[1.2,3]");
}

#[test]
fn test_shared_legend_panels_share_edges() {
    let table = smr_table();
    let layer = SpatialLayer::grid(3, 3);
    let titles = ["1990", "2000", "2010"];
    let options = PanelOptions {
        map: equal_options(4),
        shared_legend: true,
        ..PanelOptions::default()
    };
    let mut renderer = RecordingRenderer::new();

    let report = plot_maps(&mut renderer, &layer, &titles, table.view().into_dyn(), &options).unwrap();

    let all: Vec<f64> = table.iter().copied().collect();
    let shared = report.shared_edges.clone().unwrap();
    assert_edges_cover(&shared, &all);
    assert_eq!(report.succeeded(), 3);
    for panel in &report.panels {
        let summary = panel.as_ref().unwrap();
        assert_eq!(summary.edges, shared);
        assert!(summary.legend.is_none());
    }

    // Maps in cells 0..3, one legend in its own cell afterwards
    assert_eq!(renderer.titles(), titles.to_vec());
    assert_eq!(renderer.legends().len(), 1);
    assert_eq!(renderer.legends()[0].position, LegendPosition::Named("center".to_string()));
    assert!(renderer
        .calls
        .iter()
        .any(|call| matches!(call, DrawCall::SelectCell { index: 3 })));
    assert_eq!(report.shared_legend.unwrap().len(), 4);
}

#[test]
fn test_independent_panels_match_single_maps() {
    let table = smr_table();
    let layer = SpatialLayer::grid(3, 3);
    let titles = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let options = PanelOptions {
        map: MapOptions {
            n_col: 3,
            ..MapOptions::default()
        },
        ..PanelOptions::default()
    };
    let mut renderer = RecordingRenderer::new();

    let report = plot_maps(&mut renderer, &layer, &titles, table.view().into_dyn(), &options).unwrap();
    assert!(report.shared_edges.is_none());
    assert_eq!(renderer.legends().len(), 3);

    for (column, panel) in table.axis_iter(Axis(1)).zip(&report.panels) {
        let values = column.to_vec();
        let mut single = RecordingRenderer::new();
        let expected = plot_map(&mut single, &layer, "x", &values, &options.map).unwrap();
        assert_eq!(panel.as_ref().unwrap(), &expected);
    }
}

#[test]
fn test_rows_as_panels() {
    let by_row = smr_table().reversed_axes();
    let layer = SpatialLayer::grid(3, 3);
    let options = PanelOptions {
        axis: PanelAxis::infer(by_row.shape(), layer.len()).unwrap(),
        map: equal_options(2),
        ..PanelOptions::default()
    };
    assert_eq!(options.axis, PanelAxis::Rows);

    let mut renderer = RecordingRenderer::new();
    let report = plot_maps(&mut renderer, &layer, &["x", "y", "z"], by_row.view().into_dyn(), &options)
        .unwrap();
    assert_eq!(report.panels.len(), 3);
}

#[test]
fn test_failed_panel_does_not_stop_the_rest() {
    let mut table = smr_table();
    table.column_mut(1).fill(f64::NAN);
    let layer = SpatialLayer::grid(3, 3);
    let titles = ["ok", "empty", "ok too"];
    let mut renderer = RecordingRenderer::new();

    let report = plot_maps(
        &mut renderer,
        &layer,
        &titles,
        table.view().into_dyn(),
        &PanelOptions::default(),
    )
    .unwrap();
    assert_eq!(report.succeeded(), 2);
    assert!(matches!(report.panels[1], Err(MapError::EmptyValues { .. })));
    assert_eq!(renderer.titles(), vec!["ok", "ok too"]);

    let stop = PanelOptions {
        on_error: OnPanelError::Stop,
        ..PanelOptions::default()
    };
    let mut renderer = RecordingRenderer::new();
    let report = plot_maps(&mut renderer, &layer, &titles, table.view().into_dyn(), &stop).unwrap();
    assert_eq!(report.panels.len(), 2);
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_panel_shape_errors() {
    let layer = SpatialLayer::grid(3, 3);
    let mut renderer = RecordingRenderer::new();
    let options = PanelOptions::default();

    let wrong_units = Array2::<f64>::zeros((8, 2));
    assert!(plot_maps(&mut renderer, &layer, &["a", "b"], wrong_units.view().into_dyn(), &options).is_err());

    let table = smr_table();
    let err = plot_maps(&mut renderer, &layer, &["only one"], table.view().into_dyn(), &options).unwrap_err();
    assert!(matches!(err, MapError::LengthMismatch { expected: 3, actual: 1, .. }));

    let cramped = PanelOptions {
        layout: Some(LayoutSpec { rows: 1, cols: 2 }),
        ..PanelOptions::default()
    };
    assert!(plot_maps(&mut renderer, &layer, &["a", "b", "c"], table.view().into_dyn(), &cramped).is_err());
    assert!(renderer.calls.is_empty());
}

#[test]
fn test_raster_panels_fill_every_cell() {
    let table = smr_table();
    let layer = SpatialLayer::grid(3, 3);
    let options = PanelOptions {
        map: equal_options(3),
        shared_legend: true,
        ..PanelOptions::default()
    };
    let mut renderer = RasterRenderer::new(120, 100).unwrap();

    plot_maps(&mut renderer, &layer, &["a", "b", "c"], table.view().into_dyn(), &options).unwrap();

    // Three maps and a legend on a 2x2 grid
    let bytes = renderer.encode_png().unwrap();
    assert_image_format(&bytes, ImageFormat::Png).unwrap();
    let image = load_image_from_bytes(&bytes).unwrap();
    assert_image_dimensions(&image, 240, 200).unwrap();

    let darkest = grayscale_palette(3)[0];
    for (row, col) in [(0, 0), (0, 1), (1, 0)] {
        assert!(count_color_in_cell(renderer.image(), 120, 100, row, col, darkest) > 0);
    }

    let legend_cells: Vec<usize> = renderer
        .annotations()
        .iter()
        .filter_map(|a| match a {
            Annotation::Legend { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(legend_cells, vec![3]);
}

#[test]
fn test_raster_title_is_drawn_above_the_map() {
    let Some(font) = find_system_font() else {
        eprintln!("no system font, skipping");
        return;
    };
    let layer = SpatialLayer::grid(2, 2);
    let options = MapOptions {
        labels: LegendLabels::Hidden,
        ..equal_options(2)
    };
    let inked_rows = |title: &str| {
        let mut renderer = RasterRenderer::new(200, 200).unwrap().with_font(font.clone());
        plot_map(&mut renderer, &layer, title, &[1.0, 2.0, 3.0, 4.0], &options).unwrap();
        (0..20u32)
            .filter(|&y| (0..200u32).any(|x| renderer.image().get_pixel(x, y).0 != [255, 255, 255, 255]))
            .count()
    };

    assert_eq!(inked_rows(""), 0);
    assert!(inked_rows("Standardized ratio") > 3);
}

#[test]
fn test_raster_holes_and_multipolygons() {
    let layer = lake_and_islands();
    let options = MapOptions {
        n_col: 2,
        strategy: BreakStrategy::Equal,
        labels: LegendLabels::Hidden,
        ..MapOptions::default()
    };
    let mut with_lake = RasterRenderer::new(200, 200).unwrap();
    let summary = plot_map(&mut with_lake, &layer, "Lakes", &[1.0, 2.0], &options).unwrap();
    let lake_fill = summary.colors[0];

    let mut filled = lake_and_islands();
    filled.units[0] = GeoUnit {
        id: "no lake".to_string(),
        polygons: vec![Polygon::new(layer.units[0].polygons[0].exterior.clone())],
    };
    let mut without_lake = RasterRenderer::new(200, 200).unwrap();
    plot_map(&mut without_lake, &filled, "Lakes", &[1.0, 2.0], &options).unwrap();

    let holed = count_color(with_lake.image(), lake_fill);
    let solid = count_color(without_lake.image(), lake_fill);
    assert!(holed > 0 && holed < solid, "holed {} vs solid {}", holed, solid);
    assert!(count_color(with_lake.image(), summary.colors[1]) > 0);
}

#[test]
fn test_continuous_map_from_config() {
    let mut config = Config::default();
    config.shading.ramp = "viridis".to_string();
    config.legend.position = "topright".to_string();
    let options = ContinuousOptions::from_config(&config).unwrap();

    let layer = SpatialLayer::grid(2, 3);
    let values = [0.12, 0.5, 0.33, 0.91, 0.5, 0.07];
    let mut renderer = RecordingRenderer::new();
    let summary = plot_map_continuous(&mut renderer, &layer, "Posterior", &values, None, &options).unwrap();

    // Equal values get equal colors
    assert_eq!(summary.shading.colors[1], summary.shading.colors[4]);
    assert_eq!(summary.legend.as_ref().unwrap().len(), 5);
    assert_eq!(summary.legend.unwrap()[0], "0.91");
    assert_eq!(renderer.legends()[0].position, LegendPosition::Named("topright".to_string()));
}

#[test]
fn test_breaks_match_map_edges() {
    let values = [2.0, 4.0, 4.0, 10.0];
    let edges = compute_breaks(&values, 2, &BreakStrategy::Equal).unwrap();
    let layer = SpatialLayer::grid(2, 2);
    let mut renderer = RecordingRenderer::new();
    let summary = plot_map(&mut renderer, &layer, "t", &values, &equal_options(2)).unwrap();
    assert_eq!(summary.edges, edges);
    assert_eq!(edges, vec![2.0, 6.0, 10.0]);
}
