//! Screen / image coordinate mapping and the display transform
//!
//! Both spaces are center-relative: (0, 0) is the center of the canvas in
//! screen space and the center of the image in image space. Rotation is a
//! display transform only and is deliberately absent from the coordinate
//! math used for measurements.

use crate::image::Raster;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 5.0;
pub const ZOOM_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({x:.1}, {y:.1})", x = self.x, y = self.y)
    }
}

/// Zoom, pan and rotation of the displayed image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTransform {
    zoom: f64,
    pub pan: Point,
    /// Degrees, a multiple of 90 in [0, 360)
    rotation: i32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            rotation: 0,
        }
    }
}

impl ViewTransform {
    /// A non-positive or non-finite zoom falls back to 1.0
    #[must_use]
    pub fn new(zoom: f64, pan: Point) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        Self {
            zoom,
            pan,
            rotation: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Screen point (canvas-center relative) to image space
    #[inline]
    #[must_use]
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// Image point back to screen space, used to place overlays
    #[inline]
    #[must_use]
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x.mul_add(self.zoom, self.pan.x),
            image.y.mul_add(self.zoom, self.pan.y),
        )
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-ZOOM_STEP);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Rotate clockwise by a multiple of 90 degrees
    pub fn rotate_by(&mut self, degrees: i32) {
        let quarter_turns = (degrees as f64 / 90.0).round() as i32;
        self.rotation = (self.rotation + quarter_turns * 90).rem_euclid(360);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zoom back in range and rotation snapped to a quarter turn, for a
    /// transform that did not go through the setters
    #[must_use]
    pub fn normalized(self) -> Self {
        let pan = if self.pan.x.is_finite() && self.pan.y.is_finite() {
            self.pan
        } else {
            Point::default()
        };
        let mut view = Self::new(self.zoom, pan);
        view.set_zoom(view.zoom);
        view.rotate_by(self.rotation);
        view
    }

    /// Render the visible canvas: the source raster zoomed and panned into a
    /// `width` x `height` canvas (nearest neighbour), then rotated.
    #[must_use]
    pub fn compose(&self, source: &Raster, width: u32, height: u32, background: [u8; 4]) -> Raster {
        let mut canvas = Raster::filled(width, height, background);
        let canvas_cx = f64::from(width) / 2.0;
        let canvas_cy = f64::from(height) / 2.0;

        for y in 0..height {
            for x in 0..width {
                let screen = Point::new(f64::from(x) + 0.5 - canvas_cx, f64::from(y) + 0.5 - canvas_cy);
                let pixel = image_to_pixel(self.screen_to_image(screen), source.width(), source.height());
                if let Some(rgba) = source.pixel(pixel.x.floor() as i64, pixel.y.floor() as i64) {
                    canvas.put_pixel(i64::from(x), i64::from(y), rgba);
                }
            }
        }

        match self.rotation {
            90 => Raster::from_rgba_image(&imageops::rotate90(&canvas.to_rgba_image())),
            180 => Raster::from_rgba_image(&imageops::rotate180(&canvas.to_rgba_image())),
            270 => Raster::from_rgba_image(&imageops::rotate270(&canvas.to_rgba_image())),
            _ => canvas,
        }
    }
}

impl fmt::Display for ViewTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zoom {zoom:.1}x, pan {pan}, rotation {rotation}°",
            zoom = self.zoom,
            pan = self.pan,
            rotation = self.rotation
        )
    }
}

/// Center-relative image coordinates to pixel coordinates (origin top-left)
#[inline]
#[must_use]
pub fn image_to_pixel(point: Point, width: u32, height: u32) -> Point {
    Point::new(point.x + f64::from(width) / 2.0, point.y + f64::from(height) / 2.0)
}

/// Pixel coordinates (origin top-left) to center-relative image coordinates
#[inline]
#[must_use]
pub fn pixel_to_image(point: Point, width: u32, height: u32) -> Point {
    Point::new(point.x - f64::from(width) / 2.0, point.y - f64::from(height) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_screen_image_round_trip() {
        let screens = [
            Point::new(0.0, 0.0),
            Point::new(123.25, -47.5),
            Point::new(-300.0, 512.0),
        ];
        for zoom in [0.01, 0.5, 1.0, 2.7, 5.0, 37.0] {
            for pan in [Point::new(0.0, 0.0), Point::new(-12.5, 40.0), Point::new(1e4, -3e3)] {
                let view = ViewTransform::new(zoom, pan);
                for screen in screens {
                    let back = view.image_to_screen(view.screen_to_image(screen));
                    assert_relative_eq!(back.x, screen.x, epsilon = 1e-9, max_relative = 1e-12);
                    assert_relative_eq!(back.y, screen.y, epsilon = 1e-9, max_relative = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_screen_to_image() {
        let view = ViewTransform::new(2.0, Point::new(10.0, -20.0));
        assert_eq!(view.screen_to_image(Point::new(30.0, 0.0)), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_invalid_zoom_falls_back() {
        assert_eq!(ViewTransform::new(0.0, Point::default()).zoom(), 1.0);
        assert_eq!(ViewTransform::new(-2.0, Point::default()).zoom(), 1.0);
        assert_eq!(ViewTransform::new(f64::NAN, Point::default()).zoom(), 1.0);
    }

    #[test]
    fn test_zoom_steps_are_clamped() {
        let mut view = ViewTransform::default();
        for _ in 0..100 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), MAX_ZOOM);
        for _ in 0..100 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_rotation_and_reset() {
        let mut view = ViewTransform::new(2.0, Point::new(5.0, 5.0));
        view.rotate_by(90);
        view.rotate_by(180);
        assert_eq!(view.rotation(), 270);
        view.rotate_by(180);
        assert_eq!(view.rotation(), 90);
        view.rotate_by(-180);
        assert_eq!(view.rotation(), 270);

        view.reset();
        assert_eq!(view, ViewTransform::default());
    }

    #[test]
    fn test_rotation_does_not_affect_mapping() {
        let mut view = ViewTransform::new(1.5, Point::new(3.0, 4.0));
        let before = view.screen_to_image(Point::new(20.0, -8.0));
        view.rotate_by(90);
        assert_eq!(view.screen_to_image(Point::new(20.0, -8.0)), before);
    }

    #[test]
    fn test_pixel_conversions() {
        let pixel = image_to_pixel(Point::new(0.0, 0.0), 512, 256);
        assert_eq!(pixel, Point::new(256.0, 128.0));
        assert_eq!(pixel_to_image(pixel, 512, 256), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_compose_identity_and_rotation() {
        // 2x1 source: black then white
        let source = Raster::from_parts(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]);
        let view = ViewTransform::default();
        assert_eq!(view.compose(&source, 2, 1, [9, 9, 9, 255]), source);

        let mut rotated = view;
        rotated.rotate_by(90);
        let canvas = rotated.compose(&source, 2, 1, [9, 9, 9, 255]);
        assert_eq!((canvas.width(), canvas.height()), (1, 2));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_compose_zoom_fills_background() {
        let source = Raster::filled(2, 2, [200, 200, 200, 255]);
        let view = ViewTransform::new(0.5, Point::default());
        let canvas = view.compose(&source, 4, 4, [0, 0, 0, 255]);
        // the 2x2 image shrinks to the canvas center
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 1), Some([200, 200, 200, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([0, 0, 0, 255]));
    }
}
