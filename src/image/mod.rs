//! Rendering of decoded images into displayable RGBA rasters

mod filters;
mod glyphs;
mod grayscale;
pub mod overlay;
mod placeholder;

pub use filters::{Filters, apply_filters};
pub use grayscale::{render_window_level, window_intensity};
pub use placeholder::{PLACEHOLDER_SIZE, placeholder_for_error, placeholder_missing_pixels};

use crate::dicom::{DEFAULT_WINDOW_CENTER, DEFAULT_WINDOW_WIDTH, DecodedImage};
use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Smallest window width a user can set
pub const MIN_WINDOW: f64 = 1.0;

/// An RGBA raster, `width * height * 4` bytes, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Raster of a single color
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }

    /// Wrap an RGBA buffer; callers guarantee `pixels.len() == width * height * 4`
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        Self::from_parts(image.width(), image.height(), image.as_raw().clone())
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Pixel at (x, y), `None` outside the raster
    #[must_use]
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Set a pixel; writes outside the raster are ignored
    pub fn put_pixel(&mut self, x: i64, y: i64, rgba: [u8; 4]) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }

    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        // dimensions and length always agree
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    #[must_use]
    pub fn to_dynamic_image(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.to_rgba_image())
    }

    /// Write the raster as PNG
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write PNG: {}", path.display()))
    }
}

/// User-controlled window/level plus display filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParameters {
    pub window: f64,
    pub level: f64,
    pub filters: Filters,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW_WIDTH,
            level: DEFAULT_WINDOW_CENTER,
            filters: Filters::default(),
        }
    }
}

impl RenderParameters {
    /// Start from the image's default window
    #[must_use]
    pub fn for_image(image: &DecodedImage) -> Self {
        let mut params = Self::default();
        params.set_window(image.window_width_default());
        params.level = image.window_center_default();
        params
    }

    pub fn set_window(&mut self, window: f64) {
        if window.is_finite() {
            self.window = window.max(MIN_WINDOW);
        }
    }

    pub fn adjust_window(&mut self, delta: f64) {
        self.set_window(self.window + delta);
    }

    pub fn adjust_level(&mut self, delta: f64) {
        self.level += delta;
    }

    /// Back to the default 400 / 50 window with no filters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Window at least `MIN_WINDOW` and a finite level
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if !self.window.is_finite() {
            self.window = defaults.window;
        }
        self.window = self.window.max(MIN_WINDOW);
        if !self.level.is_finite() {
            self.level = defaults.level;
        }
        self
    }
}

impl fmt::Display for RenderParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W {window:.0} L {level:.0}", window = self.window, level = self.level)?;
        if self.filters.invert {
            write!(f, " inverted")?;
        }
        Ok(())
    }
}

/// Window, then filter. `None` renders the missing-pixels placeholder.
#[must_use]
pub fn render(image: Option<&DecodedImage>, params: &RenderParameters) -> Raster {
    let Some(image) = image else {
        return placeholder_missing_pixels();
    };

    let windowed = render_window_level(
        image.calibrated_samples(),
        image.width(),
        image.height(),
        params.window,
        params.level,
    );
    apply_filters(&windowed, &params.filters)
}
