//! Display filters over a windowed 8-bit raster
//!
//! Filters are always applied to the windowed raster, never to a raster
//! that was already filtered: `apply_filters` takes the source by reference
//! and returns a new raster.

use super::Raster;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub invert: bool,
    /// Contrast in [-1, 1]; 0 leaves the raster unchanged
    pub contrast: f64,
    /// Offset added to every channel, in 8-bit levels
    pub brightness: f64,
}

impl Filters {
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        !self.invert && self.contrast == 0.0 && self.brightness == 0.0
    }

    /// Standard contrast correction factor for `c` in [-1, 1]
    #[inline]
    #[must_use]
    pub fn contrast_factor(&self) -> f64 {
        let c = self.contrast.clamp(-1.0, 1.0) * 255.0;
        (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
    }

    #[inline]
    fn apply_channel(&self, value: u8, factor: f64) -> u8 {
        let mut v = f64::from(value);
        if self.invert {
            v = 255.0 - v;
        }
        v = (v + self.brightness).clamp(0.0, 255.0);
        v = factor.mul_add(v - 128.0, 128.0).clamp(0.0, 255.0);
        v.round() as u8
    }
}

/// Apply invert, then brightness, then contrast to the color channels.
/// Alpha is left untouched.
#[must_use]
pub fn apply_filters(windowed: &Raster, filters: &Filters) -> Raster {
    if filters.is_identity() {
        return windowed.clone();
    }

    let factor = filters.contrast_factor();
    let pixels = windowed
        .pixels()
        .chunks_exact(4)
        .flat_map(|px| {
            [
                filters.apply_channel(px[0], factor),
                filters.apply_channel(px[1], factor),
                filters.apply_channel(px[2], factor),
                px[3],
            ]
        })
        .collect();

    Raster::from_parts(windowed.width(), windowed.height(), pixels)
}
