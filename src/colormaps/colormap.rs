//! Colormap trait and utilities.
//!
//! This module defines the common interface shared by the discrete shade
//! palettes and the continuous color ramps.

use crate::error::{MapError, Result};

/// An RGBA color as stored in the rendered figure
pub type Rgba = [u8; 4];

/// Fill used for missing (non-finite) values
pub const MISSING_COLOR: Rgba = [0, 0, 0, 0];

/// Trait for color mapping implementations
pub trait Colormap {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> Rgba;

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> Rgba {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Sample `n` evenly spaced colors from the start to the end of the map
    fn sample(&self, n: usize) -> Vec<Rgba> {
        match n {
            0 => Vec::new(),
            1 => vec![self.map_normalized(0.0)],
            _ => (0..n)
                .map(|i| self.map_normalized(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// Get a colormap by name
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    let lowered = name.to_lowercase();
    if lowered == "grayscale" || lowered == "grey" || lowered == "gray" {
        return Ok(Box::new(super::grayscale::Grayscale::default()));
    }

    match super::ramps::GradientColormap::from_name(&lowered) {
        Some(ramp) => Ok(Box::new(ramp)),
        None => Err(MapError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!("Unknown colormap: {}", name),
        }),
    }
}

/// Check a colormap name without building it
pub fn is_known_colormap(name: &str) -> bool {
    get_colormap(name).is_ok()
}

/// Parse an HTML color string such as `#1f77b4` or `black`
pub fn parse_color(text: &str) -> Result<Rgba> {
    colorgrad::Color::from_html(text)
        .map(|c| c.to_rgba8())
        .map_err(|e| MapError::InvalidParameter {
            param: "color".to_string(),
            message: format!("Invalid color '{}': {}", text, e),
        })
}
