//! Continuous color ramps backed by `colorgrad` presets.

use colorgrad::Gradient;

use super::colormap::{Colormap, Rgba};

/// Names accepted by [`GradientColormap::from_name`]
pub const RAMP_NAMES: &[&str] = &[
    "viridis", "inferno", "magma", "plasma", "cividis", "turbo", "greys", "reds", "blues",
    "yl_or_rd", "spectral", "rd_yl_bu",
];

/// A named colorgrad gradient
pub struct GradientColormap {
    name: &'static str,
    gradient: Gradient,
}

impl GradientColormap {
    /// Look up a preset gradient by name
    pub fn from_name(name: &str) -> Option<Self> {
        let (name, gradient) = match name {
            "viridis" => ("viridis", colorgrad::viridis()),
            "inferno" => ("inferno", colorgrad::inferno()),
            "magma" => ("magma", colorgrad::magma()),
            "plasma" => ("plasma", colorgrad::plasma()),
            "cividis" => ("cividis", colorgrad::cividis()),
            "turbo" => ("turbo", colorgrad::turbo()),
            "greys" => ("greys", colorgrad::greys()),
            "reds" => ("reds", colorgrad::reds()),
            "blues" => ("blues", colorgrad::blues()),
            "yl_or_rd" => ("yl_or_rd", colorgrad::yl_or_rd()),
            "spectral" => ("spectral", colorgrad::spectral()),
            "rd_yl_bu" => ("rd_yl_bu", colorgrad::rd_yl_bu()),
            _ => return None,
        };
        Some(Self { name, gradient })
    }
}

impl Colormap for GradientColormap {
    fn map_normalized(&self, value: f64) -> Rgba {
        self.gradient.at(value.clamp(0.0, 1.0)).to_rgba8()
    }

    fn name(&self) -> &str {
        self.name
    }
}
