//! Configuration management for diseasemap.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::binning::BreakStrategy;
use crate::colormaps::{is_known_colormap, parse_color};
use crate::error::{MapError, Result};
use crate::legend::LegendPosition;

/// Command-line arguments for the demo renderer
#[derive(Parser, Debug)]
#[command(name = "render_demo")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path of the PNG to write (annotations go beside it as JSON)
    pub output: PathBuf,

    /// Path to JSON configuration file
    #[arg(short, long, env = "DISEASEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of classes per map
    #[arg(short, long, env = "DISEASEMAP_N_COL")]
    pub n_col: Option<usize>,

    /// Break strategy (equal, quantile)
    #[arg(short, long, env = "DISEASEMAP_STRATEGY")]
    pub strategy: Option<String>,

    /// Share one legend and one set of breaks across all panels
    #[arg(long, env = "DISEASEMAP_SHARED_LEGEND")]
    pub shared_legend: bool,

    /// Number of panels to render
    #[arg(short, long, default_value = "4")]
    pub panels: usize,

    /// Side length of the synthetic square lattice
    #[arg(short, long, default_value = "12")]
    pub grid: usize,

    /// Font file for titles and legend labels
    #[arg(long, env = "DISEASEMAP_FONT")]
    pub font: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DISEASEMAP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Figure configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Width of one layout cell in pixels
    #[serde(default = "default_cell_size")]
    pub cell_width: u32,

    /// Height of one layout cell in pixels
    #[serde(default = "default_cell_size")]
    pub cell_height: u32,

    /// Title font scale
    #[serde(default = "default_title_font_scale")]
    pub title_font_scale: f64,

    /// Title offset in lines above the map
    #[serde(default = "default_title_line")]
    pub title_line: f64,

    /// Polygon border color
    #[serde(default = "default_border_color")]
    pub border_color: String,

    /// Polygon border width in pixels (0 disables borders)
    #[serde(default = "default_border_width")]
    pub border_width: u32,

    /// TrueType font for titles and legend labels; a system font is searched when unset
    #[serde(default)]
    pub font: Option<PathBuf>,
}

/// Legend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendConfig {
    /// Keyword (bottomleft, topright, ...) or "x,y" cell fractions
    #[serde(default = "default_legend_position")]
    pub position: String,

    /// Legend font scale
    #[serde(default = "default_legend_font_scale")]
    pub font_scale: f64,

    /// Number of legend columns
    #[serde(default = "default_legend_columns")]
    pub columns: usize,

    /// Lay legend entries out horizontally
    #[serde(default)]
    pub horizontal: bool,
}

/// Shading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadingConfig {
    /// Number of classes
    #[serde(default = "default_n_col")]
    pub n_col: usize,

    /// Break strategy (equal, quantile)
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Palette for discrete maps
    #[serde(default = "default_palette")]
    pub palette: String,

    /// Ramp for continuous maps
    #[serde(default = "default_ramp")]
    pub ramp: String,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub figure: FigureConfig,

    #[serde(default)]
    pub legend: LegendConfig,

    #[serde(default)]
    pub shading: ShadingConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process arguments with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args))
    }

    /// Build configuration from already parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = &args.config {
            config = Self::load_from_file(config_path)?;
        }

        if let Some(n_col) = args.n_col {
            config.shading.n_col = n_col;
        }
        if let Some(strategy) = &args.strategy {
            config.shading.strategy = strategy.clone();
        }
        if let Some(font) = &args.font {
            config.figure.font = Some(font.clone());
        }
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Parsed break strategy
    pub fn break_strategy(&self) -> Result<BreakStrategy> {
        self.shading.strategy.parse()
    }

    /// Parsed legend position
    pub fn legend_position(&self) -> Result<LegendPosition> {
        self.legend.position.parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.figure.cell_width < 16 || self.figure.cell_height < 16 {
            return Err(MapError::Config {
                message: format!(
                    "Cell size must be at least 16x16 pixels, got {}x{}",
                    self.figure.cell_width, self.figure.cell_height
                ),
            });
        }

        if !(self.figure.title_font_scale > 0.0) || !(self.legend.font_scale > 0.0) {
            return Err(MapError::Config {
                message: "Font scales must be positive".to_string(),
            });
        }

        if self.shading.n_col == 0 {
            return Err(MapError::Config {
                message: "Number of classes (n_col) must be at least 1".to_string(),
            });
        }

        if self.legend.columns == 0 {
            return Err(MapError::Config {
                message: "Legend must have at least one column".to_string(),
            });
        }

        self.break_strategy().map_err(|e| MapError::Config {
            message: e.to_string(),
        })?;
        self.legend_position().map_err(|e| MapError::Config {
            message: e.to_string(),
        })?;
        if let Some(font) = &self.figure.font {
            if !font.is_file() {
                return Err(MapError::Config {
                    message: format!("Font file {} does not exist", font.display()),
                });
            }
        }

        parse_color(&self.figure.border_color).map_err(|e| MapError::Config {
            message: e.to_string(),
        })?;

        for (what, name) in [("palette", &self.shading.palette), ("ramp", &self.shading.ramp)] {
            if !is_known_colormap(name) {
                return Err(MapError::Config {
                    message: format!("Unknown {}: {}", what, name),
                });
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(MapError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            figure: FigureConfig::default(),
            legend: LegendConfig::default(),
            shading: ShadingConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            cell_width: default_cell_size(),
            cell_height: default_cell_size(),
            title_font_scale: default_title_font_scale(),
            title_line: default_title_line(),
            border_color: default_border_color(),
            border_width: default_border_width(),
            font: None,
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            position: default_legend_position(),
            font_scale: default_legend_font_scale(),
            columns: default_legend_columns(),
            horizontal: false,
        }
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            n_col: default_n_col(),
            strategy: default_strategy(),
            palette: default_palette(),
            ramp: default_ramp(),
        }
    }
}

// Default value functions for serde
fn default_cell_size() -> u32 {
    400
}

fn default_title_font_scale() -> f64 {
    1.0
}

fn default_title_line() -> f64 {
    1.0
}

fn default_border_color() -> String {
    "#000000".to_string()
}

fn default_border_width() -> u32 {
    1
}

fn default_legend_position() -> String {
    "bottomleft".to_string()
}

fn default_legend_font_scale() -> f64 {
    0.8
}

fn default_legend_columns() -> usize {
    1
}

fn default_n_col() -> usize {
    5
}

fn default_strategy() -> String {
    "quantile".to_string()
}

fn default_palette() -> String {
    "grayscale".to_string()
}

fn default_ramp() -> String {
    "yl_or_rd".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
