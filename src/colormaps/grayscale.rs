//! Gamma-corrected gray shades for discrete choropleths.
//!
//! Shades run from dark to light; the lowest bin of a map takes the darkest.

use super::colormap::{Colormap, Rgba};

/// Gray ramp interpolated linearly in gamma-encoded space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grayscale {
    /// Gray level of the darkest shade (0 = black, 1 = white)
    pub start: f64,
    /// Gray level of the lightest shade
    pub end: f64,
    /// Gamma used to space the intermediate levels
    pub gamma: f64,
}

impl Default for Grayscale {
    fn default() -> Self {
        Self {
            start: 0.3,
            end: 0.9,
            gamma: 2.2,
        }
    }
}

impl Colormap for Grayscale {
    fn map_normalized(&self, value: f64) -> Rgba {
        let t = value.clamp(0.0, 1.0);
        let lo = self.start.powf(self.gamma);
        let hi = self.end.powf(self.gamma);
        let level = (lo + t * (hi - lo)).powf(1.0 / self.gamma);
        let v = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
        [v, v, v, 255]
    }

    fn name(&self) -> &str {
        "grayscale"
    }
}

/// `n` gray shades ordered darkest to lightest
pub fn grayscale_palette(n: usize) -> Vec<Rgba> {
    Grayscale::default().sample(n)
}
