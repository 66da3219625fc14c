//! Measurement overlay drawn onto a rendered raster

use super::Raster;
use super::glyphs::draw_text;
use crate::measurement::Measurement;
use crate::viewport::{Point, image_to_pixel};

const LINE_COLOR: [u8; 4] = [255, 214, 0, 255];
const PENDING_COLOR: [u8; 4] = [0, 200, 255, 255];
const CURSOR_COLOR: [u8; 4] = [255, 64, 64, 255];
const CURSOR_ARM: i64 = 6;
const LABEL_OFFSET: i64 = 4;

/// Draw every measurement (segment, endpoint markers, distance label) and
/// the pending first point, if any. Points are center-relative image
/// coordinates.
#[must_use]
pub fn draw_measurements(source: &Raster, measurements: &[Measurement], pending: Option<Point>) -> Raster {
    let mut raster = source.clone();
    let (width, height) = (raster.width(), raster.height());
    let to_pixel = |p: Point| {
        let px = image_to_pixel(p, width, height);
        (px.x.floor() as i64, px.y.floor() as i64)
    };

    for m in measurements {
        let a = to_pixel(m.point_a);
        let b = to_pixel(m.point_b);
        draw_line(&mut raster, a, b, LINE_COLOR);
        draw_marker(&mut raster, a, LINE_COLOR);
        draw_marker(&mut raster, b, LINE_COLOR);

        let label = format!("{:.1}{}", m.distance_mm, m.unit);
        draw_text(&mut raster, b.0 + LABEL_OFFSET, b.1 + LABEL_OFFSET, &label, 1, LINE_COLOR);
    }

    if let Some(point) = pending {
        draw_marker(&mut raster, to_pixel(point), PENDING_COLOR);
    }

    raster
}

/// Crosshair at a center-relative image point, marking where a click lands
pub fn draw_cursor(raster: &mut Raster, point: Point) {
    let px = image_to_pixel(point, raster.width(), raster.height());
    let (x, y) = (px.x.floor() as i64, px.y.floor() as i64);
    draw_line(raster, (x - CURSOR_ARM, y), (x + CURSOR_ARM, y), CURSOR_COLOR);
    draw_line(raster, (x, y - CURSOR_ARM), (x, y + CURSOR_ARM), CURSOR_COLOR);
}

/// Bresenham line, clipped to the raster
fn draw_line(raster: &mut Raster, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: [u8; 4]) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;

    loop {
        raster.put_pixel(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// 3x3 square centered on the point
fn draw_marker(raster: &mut Raster, (x, y): (i64, i64), color: [u8; 4]) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            raster.put_pixel(x + dx, y + dy, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::UNIT_MM;

    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn measurement(a: Point, b: Point) -> Measurement {
        Measurement {
            id: 0,
            point_a: a,
            point_b: b,
            distance_mm: 1.0,
            unit: UNIT_MM.to_string(),
        }
    }

    #[test]
    fn test_horizontal_measurement() {
        let source = Raster::filled(32, 32, BLACK);
        // image (-8, 0) .. (8, 0) is pixel row 16, columns 8..=24
        let drawn = draw_measurements(&source, &[measurement(Point::new(-8.0, 0.0), Point::new(8.0, 0.0))], None);

        for x in 8..=24 {
            assert_eq!(drawn.pixel(x, 16), Some(LINE_COLOR), "column {x}");
        }
        assert_eq!(drawn.pixel(7, 15), Some(LINE_COLOR));
        assert_eq!(drawn.pixel(4, 16), Some(BLACK));
        // source untouched
        assert_eq!(source.pixel(16, 16), Some(BLACK));
    }

    #[test]
    fn test_diagonal_line_endpoints() {
        let mut raster = Raster::filled(10, 10, BLACK);
        draw_line(&mut raster, (1, 1), (7, 4), LINE_COLOR);
        assert_eq!(raster.pixel(1, 1), Some(LINE_COLOR));
        assert_eq!(raster.pixel(7, 4), Some(LINE_COLOR));
        assert_eq!(raster.pixel(9, 9), Some(BLACK));
    }

    #[test]
    fn test_pending_point_marker() {
        let source = Raster::filled(8, 8, BLACK);
        let drawn = draw_measurements(&source, &[], Some(Point::new(0.0, 0.0)));
        assert_eq!(drawn.pixel(4, 4), Some(PENDING_COLOR));
        assert_eq!(drawn.pixel(3, 3), Some(PENDING_COLOR));
        assert_eq!(drawn.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn test_cursor_crosshair() {
        let mut raster = Raster::filled(20, 20, BLACK);
        draw_cursor(&mut raster, Point::new(0.0, 0.0));
        assert_eq!(raster.pixel(10, 10), Some(CURSOR_COLOR));
        assert_eq!(raster.pixel(4, 10), Some(CURSOR_COLOR));
        assert_eq!(raster.pixel(10, 16), Some(CURSOR_COLOR));
        assert_eq!(raster.pixel(12, 12), Some(BLACK));
    }

    #[test]
    fn test_offscreen_points_are_clipped() {
        let source = Raster::filled(8, 8, BLACK);
        let drawn = draw_measurements(
            &source,
            &[measurement(Point::new(-100.0, -100.0), Point::new(100.0, 100.0))],
            None,
        );
        // the diagonal still crosses the raster
        assert_eq!(drawn.pixel(4, 4), Some(LINE_COLOR));
    }
}
