//! render_demo - draws diseasemap figures for a synthetic lattice of areas
//!
//! Writes a multi-panel PNG, a continuous-ramp PNG beside it, each with a
//! JSON annotation sidecar, and prints a quartile comparison of the first
//! panel as JSON.

use anyhow::{Context, Result};
use ndarray::Array2;
use std::path::PathBuf;
use tracing::{error, info};

use diseasemap::assess::{assess_map, AdjacencyGraph, GaussianFixedEffects, Grouping};
use diseasemap::maps::{plot_map_continuous, plot_maps, ContinuousOptions, PanelOptions};
use diseasemap::render::RasterRenderer;
use diseasemap::{init_tracing, Config, SpatialLayer};

fn main() -> Result<()> {
    let (config, args) = Config::load().context("failed to load configuration")?;
    init_tracing(&config.log_level);

    info!("Starting render_demo v{}", env!("CARGO_PKG_VERSION"));

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    if args.grid == 0 || args.panels == 0 {
        anyhow::bail!("--grid and --panels must be positive");
    }

    let layer = SpatialLayer::grid(args.grid, args.grid);
    let table = synthetic_table(args.grid, args.panels);
    let titles: Vec<String> = (1..=args.panels).map(|year| format!("Period {}", year)).collect();

    // One map per column
    let mut renderer = RasterRenderer::from_config(&config)?;
    let options = PanelOptions::from_config(&config, args.shared_legend)?;
    let report = plot_maps(&mut renderer, &layer, &titles, table.view().into_dyn(), &options)?;
    for (index, outcome) in report.panels.iter().enumerate() {
        if let Err(e) = outcome {
            error!(panel = index, "Panel failed: {}", e);
        }
    }
    renderer
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Panel figure written"
    );

    // First column on a continuous ramp, ranked against the whole table
    let first: Vec<f64> = table.column(0).to_vec();
    let reference: Vec<f64> = table.iter().copied().collect();
    let continuous_path = sibling(&args.output, "continuous");
    let mut renderer = RasterRenderer::from_config(&config)?;
    plot_map_continuous(
        &mut renderer,
        &layer,
        &titles[0],
        &first,
        Some(&reference),
        &ContinuousOptions::from_config(&config)?,
    )?;
    renderer
        .save(&continuous_path)
        .with_context(|| format!("failed to write {}", continuous_path.display()))?;
    info!(path = %continuous_path.display(), "Continuous figure written");

    // Compare the first panel across quartiles of the spatial pattern
    let graph_path = args.output.with_extension("graph");
    AdjacencyGraph::lattice(args.grid, args.grid)
        .write(&graph_path)
        .with_context(|| format!("failed to write {}", graph_path.display()))?;
    let (u, v) = spatial_effects(args.grid);
    let assessment = assess_map(
        &GaussianFixedEffects::new(),
        &u,
        &v,
        &first,
        &Grouping::Quartile,
        &graph_path,
    )?;
    println!("{}", serde_json::to_string_pretty(&assessment.table)?);

    Ok(())
}

/// `output` with `suffix` appended to its file stem
fn sibling(output: &std::path::Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "figure".to_string());
    output.with_file_name(format!("{}_{}.png", stem, suffix))
}

/// Unstructured and structured effects of the synthetic lattice
fn spatial_effects(side: usize) -> (Vec<f64>, Vec<f64>) {
    let mut u = Vec::with_capacity(side * side);
    let mut v = Vec::with_capacity(side * side);
    for r in 0..side {
        for c in 0..side {
            u.push(0.05 * jitter(r, c, 0));
            v.push(pattern(r, c, side));
        }
    }
    (u, v)
}

/// Relative risks per unit (rows) and period (columns)
fn synthetic_table(side: usize, periods: usize) -> Array2<f64> {
    Array2::from_shape_fn((side * side, periods), |(unit, period)| {
        let (r, c) = (unit / side, unit % side);
        let drift = 1.0 + 0.1 * period as f64;
        (1.0 + pattern(r, c, side) * drift + 0.1 * jitter(r, c, period + 1)).max(0.0)
    })
}

/// Smooth gradient from the top-left corner
fn pattern(r: usize, c: usize, side: usize) -> f64 {
    let scale = side.max(1) as f64;
    0.6 * ((r + c) as f64 / scale - 1.0) + 0.2 * (r as f64 * 0.7).sin() * (c as f64 * 0.5).cos()
}

/// Deterministic noise in [-1, 1]
fn jitter(r: usize, c: usize, seed: usize) -> f64 {
    let mut h = (r as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (c as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (seed as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    (h % 2001) as f64 / 1000.0 - 1.0
}
