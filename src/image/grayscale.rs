//! Window/level mapping of calibrated samples to 8-bit grayscale

use super::Raster;
use super::placeholder::placeholder_missing_pixels;

/// Map one calibrated sample into [0, 255] for the window `[lo, hi]`
#[inline(always)]
#[must_use]
pub fn window_intensity(sample: f64, lo: f64, hi: f64) -> u8 {
    if sample <= lo {
        0
    } else if sample >= hi {
        255
    } else {
        (255.0 * (sample - lo) / (hi - lo)).round().clamp(0.0, 255.0) as u8
    }
}

/// Render calibrated samples with the given window width and level.
///
/// Returns an RGBA raster with R = G = B and full opacity. A sample buffer
/// that does not match `width * height` yields the missing-pixels
/// placeholder instead of an error.
#[must_use]
pub fn render_window_level(samples: &[f64], width: u32, height: u32, window: f64, level: f64) -> Raster {
    let expected = width as usize * height as usize;
    if expected == 0 || samples.len() != expected {
        return placeholder_missing_pixels();
    }

    let window = if window > 0.0 { window } else { 1.0 };
    let lo = level - window / 2.0;
    let hi = level + window / 2.0;

    let pixels = samples
        .iter()
        .flat_map(|&sample| {
            let gray = window_intensity(sample, lo, hi);
            [gray, gray, gray, 255]
        })
        .collect();

    Raster::from_parts(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        // window 400, level 50: lo = -150, hi = 250
        assert_eq!(window_intensity(-1000.0, -150.0, 250.0), 0);
        assert_eq!(window_intensity(-150.0, -150.0, 250.0), 0);
        assert_eq!(window_intensity(250.0, -150.0, 250.0), 255);
        assert_eq!(window_intensity(3000.0, -150.0, 250.0), 255);
        assert_eq!(window_intensity(50.0, -150.0, 250.0), 128);
    }

    #[test]
    fn test_level_sample_renders_mid_gray() {
        let raster = render_window_level(&[40.0; 6], 3, 2, 80.0, 40.0);
        assert_eq!((raster.width(), raster.height()), (3, 2));
        assert!(raster.pixels().chunks_exact(4).all(|px| px == [128, 128, 128, 255]));
    }

    #[test]
    fn test_window_is_monotonic() {
        let samples: Vec<f64> = (-300..=300).map(f64::from).collect();
        for (window, level) in [(400.0, 50.0), (1.0, 0.0), (2000.0, -500.0), (80.0, 40.0)] {
            let lo = level - window / 2.0;
            let hi = level + window / 2.0;
            let rendered: Vec<u8> = samples.iter().map(|&s| window_intensity(s, lo, hi)).collect();
            assert!(
                rendered.windows(2).all(|pair| pair[0] <= pair[1]),
                "not monotonic for window={window}, level={level}"
            );
        }
    }

    #[test]
    fn test_mismatched_samples_render_placeholder() {
        let raster = render_window_level(&[0.0; 3], 2, 2, 400.0, 50.0);
        assert_eq!(raster, placeholder_missing_pixels());
    }

    #[test]
    fn test_render_is_pure() {
        let samples = [-100.0, 0.0, 75.5, 900.0];
        assert_eq!(
            render_window_level(&samples, 2, 2, 400.0, 50.0),
            render_window_level(&samples, 2, 2, 400.0, 50.0)
        );
    }
}
