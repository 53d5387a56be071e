//! Colormap implementations for choropleth shading.
//!
//! Discrete maps use gray shades; continuous maps use colorgrad ramps.

pub mod colormap;
pub mod grayscale;
pub mod ramps;

pub use colormap::{get_colormap, is_known_colormap, parse_color, Colormap, Rgba, MISSING_COLOR};
pub use grayscale::{grayscale_palette, Grayscale};
pub use ramps::{GradientColormap, RAMP_NAMES};
