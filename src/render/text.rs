//! Fonts for titles and legend labels.
//!
//! No font ships with the crate. A path can be configured; otherwise the
//! first readable file from [`FONT_SEARCH_PATHS`] is used.

use rusttype::Font;
use std::path::Path;
use tracing::debug;

use crate::error::{MapError, Result};

/// Common locations of a sans-serif TrueType font
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a TrueType or OpenType font file
pub fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes).ok_or_else(|| MapError::Render {
        message: format!("{} is not a usable font file", path.display()),
    })
}

/// First font found under [`FONT_SEARCH_PATHS`]
pub fn find_system_font() -> Option<Font<'static>> {
    FONT_SEARCH_PATHS.iter().find_map(|candidate| {
        let path = Path::new(candidate);
        if !path.is_file() {
            return None;
        }
        match load_font(path) {
            Ok(font) => {
                debug!(path = candidate, "Using font");
                Some(font)
            }
            Err(e) => {
                debug!(path = candidate, "Skipping font: {}", e);
                None
            }
        }
    })
}
