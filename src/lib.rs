//! # diseasemap
//!
//! Choropleth helpers for disease mapping.
//!
//! This library turns per-area values (case counts, standardized ratios,
//! posterior means) into shaded maps, and compares disease rates across
//! groups of a fitted spatial effect.
//!
//! ## Key Features
//!
//! - **Binning**: equal-width, quantile or user-supplied class breaks
//! - **Shading**: gray-level classes or rank-based continuous color ramps
//! - **Legends**: interval labels formatted from the breaks, highest class first
//! - **Multi-panel figures**: one map per table column with shared or independent legends
//! - **Group comparison**: regression of rates on ordinal groups of a random effect
//!
//! ## Architecture
//!
//! - **Classification**: [`binning`], [`shading`] and [`legend`] are pure functions
//! - **Drawing**: [`maps`] drives a [`render::Renderer`], either the PNG
//!   [`render::RasterRenderer`] or the [`render::RecordingRenderer`]
//! - **Inference**: [`assess`] hands a [`assess::ModelSpec`] to an
//!   [`assess::InferenceEngine`]

pub mod assess;
pub mod binning;
pub mod colormaps;
pub mod config;
pub mod error;
pub mod layer;
pub mod legend;
pub mod logging;
pub mod maps;
pub mod render;
pub mod shading;

pub use assess::{assess_map, Assessment, CoefficientTable, GaussianFixedEffects, Grouping};
pub use binning::{assign_bins, compute_breaks, BreakStrategy};
pub use config::Config;
pub use error::{MapError, Result};
pub use layer::{GeoUnit, Polygon, SpatialLayer};
pub use legend::{format_labels, LegendLabels};
pub use logging::{generate_operation_id, init_tracing, FigureStats, Operation};
pub use maps::{plot_map, plot_map_continuous, plot_maps, MapOptions, PanelOptions};
pub use render::{RasterRenderer, RecordingRenderer, Renderer};
