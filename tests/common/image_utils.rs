//! Image inspection utilities for testing.

use diseasemap::colormaps::Rgba;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, RgbaImage};

/// Load an image from a byte array
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Check that encoded bytes are of the expected format
pub fn assert_image_format(bytes: &[u8], expected_format: ImageFormat) -> Result<(), String> {
    let actual_format =
        image::guess_format(bytes).map_err(|_| "Could not detect image format".to_string())?;

    if actual_format != expected_format {
        return Err(format!(
            "Image format differs: actual = {:?}, expected = {:?}",
            actual_format, expected_format
        ));
    }
    Ok(())
}

/// Check if an image has the expected dimensions
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }
    Ok(())
}

/// Number of pixels exactly matching `color`
pub fn count_color(image: &RgbaImage, color: Rgba) -> usize {
    image.pixels().filter(|p| p.0 == color).count()
}

/// Number of pixels matching `color` inside one `cell_width x cell_height` cell
pub fn count_color_in_cell(
    image: &RgbaImage,
    cell_width: u32,
    cell_height: u32,
    row: u32,
    col: u32,
    color: Rgba,
) -> usize {
    let mut count = 0;
    for y in row * cell_height..((row + 1) * cell_height).min(image.height()) {
        for x in col * cell_width..((col + 1) * cell_width).min(image.width()) {
            if image.get_pixel(x, y).0 == color {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba as Pixel};

    #[test]
    fn test_count_color_in_cell() {
        let mut img: RgbaImage = ImageBuffer::from_pixel(4, 4, Pixel([255, 255, 255, 255]));
        img.put_pixel(3, 3, Pixel([1, 2, 3, 255]));

        assert_eq!(count_color(&img, [1, 2, 3, 255]), 1);
        assert_eq!(count_color_in_cell(&img, 2, 2, 1, 1, [1, 2, 3, 255]), 1);
        assert_eq!(count_color_in_cell(&img, 2, 2, 0, 0, [1, 2, 3, 255]), 0);
    }
}
