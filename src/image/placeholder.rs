//! Placeholder rasters shown instead of a blank canvas

use super::Raster;
use super::glyphs::{GLYPH_HEIGHT, draw_text_centered};

pub const PLACEHOLDER_SIZE: u32 = 512;
const TEXT_SCALE: u32 = 2;
/// Error messages are cut to this many characters
const MESSAGE_LIMIT: usize = 40;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const ERROR_BACKGROUND: [u8; 4] = [0x1a, 0x1a, 0x1a, 255];
const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Two centered lines of text on a solid background
fn two_lines(background: [u8; 4], first: &str, second: &str) -> Raster {
    let mut raster = Raster::filled(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, background);
    let center_x = i64::from(PLACEHOLDER_SIZE / 2);
    let center_y = i64::from(PLACEHOLDER_SIZE / 2);
    let line_height = i64::from(GLYPH_HEIGHT * TEXT_SCALE);

    draw_text_centered(&mut raster, center_x, center_y - 10 - line_height, first, TEXT_SCALE, TEXT_COLOR);
    draw_text_centered(&mut raster, center_x, center_y + 10, second, TEXT_SCALE, TEXT_COLOR);
    raster
}

/// Shown when a file decoded but has no usable samples
#[must_use]
pub fn placeholder_missing_pixels() -> Raster {
    two_lines(BLACK, "DICOM file loaded", "Processing pixel data...")
}

/// Shown in place of a file that failed to decode
#[must_use]
pub fn placeholder_for_error(message: &str) -> Raster {
    let message: String = message.chars().take(MESSAGE_LIMIT).collect();
    two_lines(ERROR_BACKGROUND, "Error loading DICOM file", &message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_color(raster: &Raster, color: [u8; 4]) -> usize {
        raster
            .pixels()
            .chunks_exact(4)
            .filter(|px| *px == color)
            .count()
    }

    #[test]
    fn test_missing_pixels_placeholder() {
        let raster = placeholder_missing_pixels();
        assert_eq!((raster.width(), raster.height()), (512, 512));
        assert_eq!(raster.pixel(0, 0), Some(BLACK));
        // the message is actually drawn
        assert!(count_color(&raster, TEXT_COLOR) > 0);
    }

    #[test]
    fn test_error_placeholder() {
        let raster = placeholder_for_error("Malformed DICOM data at byte 1024: element truncated");
        assert_eq!(raster.pixel(511, 511), Some(ERROR_BACKGROUND));
        assert!(count_color(&raster, TEXT_COLOR) > 0);
    }

    #[test]
    fn test_error_message_is_truncated() {
        let long = "x".repeat(200);
        let truncated = "x".repeat(MESSAGE_LIMIT);
        assert_eq!(placeholder_for_error(&long), placeholder_for_error(&truncated));
    }
}
