//! Two-point distance measurements in image space

use crate::types::PixelSpacing;
use crate::viewport::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const UNIT_MM: &str = "mm";

/// A completed measurement. Never edited once created, only deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: u64,
    pub point_a: Point,
    pub point_b: Point,
    pub distance_mm: f64,
    pub unit: String,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{id}: {a} -> {b} = {distance:.2} {unit}",
            id = self.id,
            a = self.point_a,
            b = self.point_b,
            distance = self.distance_mm,
            unit = self.unit
        )
    }
}

/// Physical distance between two image-space points.
///
/// `dx` scales by the column spacing, `dy` by the row spacing.
#[inline]
#[must_use]
pub fn physical_distance(a: Point, b: Point, spacing: PixelSpacing) -> f64 {
    let dx = (b.x - a.x) * spacing.x();
    let dy = (b.y - a.y) * spacing.y();
    dx.hypot(dy)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pan,
    Measure,
}

/// Where the in-progress measurement stands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementState {
    Empty,
    OnePointPlaced(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not in measure mode
    Ignored,
    FirstPointPlaced,
    Completed(u64),
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementEngine {
    tool: Tool,
    pending: Option<Point>,
    measurements: Vec<Measurement>,
    next_id: u64,
}

impl MeasurementEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switching tools discards a half-placed measurement
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.pending = None;
        }
        self.tool = tool;
    }

    #[must_use]
    pub fn state(&self) -> MeasurementState {
        self.pending
            .map_or(MeasurementState::Empty, MeasurementState::OnePointPlaced)
    }

    #[inline]
    #[must_use]
    pub fn pending_point(&self) -> Option<Point> {
        self.pending
    }

    #[inline]
    #[must_use]
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Handle a click at an image-space point
    pub fn click(&mut self, point: Point, spacing: PixelSpacing) -> ClickOutcome {
        if self.tool != Tool::Measure {
            return ClickOutcome::Ignored;
        }

        let Some(first) = self.pending.take() else {
            self.pending = Some(point);
            return ClickOutcome::FirstPointPlaced;
        };

        let id = self.next_id;
        self.next_id += 1;
        let measurement = Measurement {
            id,
            point_a: first,
            point_b: point,
            distance_mm: physical_distance(first, point, spacing),
            unit: UNIT_MM.to_string(),
        };
        debug!(%measurement, "measurement completed");
        self.measurements.push(measurement);

        ClickOutcome::Completed(id)
    }

    /// Drop the pending point, if any
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Remove a measurement by id; returns whether it existed
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.measurements.len();
        self.measurements.retain(|m| m.id != id);
        self.measurements.len() != before
    }

    pub fn clear(&mut self) {
        self.measurements.clear();
        self.pending = None;
    }

    /// Replace the list with saved measurements; new ids continue after them
    pub fn restore(&mut self, measurements: Vec<Measurement>) {
        self.next_id = measurements
            .iter()
            .map(|m| m.id + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_id);
        self.measurements = measurements;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    #[test]
    fn test_distance_uses_pixel_spacing() {
        let d = physical_distance(Point::new(0.0, 0.0), Point::new(10.0, 0.0), PixelSpacing::new(2.0, 2.0));
        assert_relative_eq!(d, 20.0);

        // x follows column spacing, y follows row spacing
        let spacing = PixelSpacing::new(0.5, 3.0);
        assert_relative_eq!(physical_distance(Point::new(0.0, 0.0), Point::new(1.0, 0.0), spacing), 3.0);
        assert_relative_eq!(physical_distance(Point::new(0.0, 0.0), Point::new(0.0, 1.0), spacing), 0.5);
        assert_relative_eq!(
            physical_distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0), PixelSpacing::unit()),
            5.0
        );
    }

    #[test]
    fn test_two_clicks_complete_a_measurement() {
        let mut engine = MeasurementEngine::new();
        engine.set_tool(Tool::Measure);

        assert_eq!(engine.click(Point::new(0.0, 0.0), PixelSpacing::new(2.0, 2.0)), ClickOutcome::FirstPointPlaced);
        assert_matches!(engine.state(), MeasurementState::OnePointPlaced(_));

        let outcome = engine.click(Point::new(10.0, 0.0), PixelSpacing::new(2.0, 2.0));
        assert_eq!(outcome, ClickOutcome::Completed(0));
        assert_eq!(engine.state(), MeasurementState::Empty);

        let m = &engine.measurements()[0];
        assert_relative_eq!(m.distance_mm, 20.0);
        assert_eq!(m.unit, "mm");
        assert_eq!(m.point_b, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_clicks_ignored_outside_measure_mode() {
        let mut engine = MeasurementEngine::new();
        assert_eq!(engine.click(Point::default(), PixelSpacing::unit()), ClickOutcome::Ignored);
        assert!(engine.measurements().is_empty());
    }

    #[test]
    fn test_cancel_and_tool_switch_discard_pending() {
        let mut engine = MeasurementEngine::new();
        engine.set_tool(Tool::Measure);

        engine.click(Point::new(1.0, 1.0), PixelSpacing::unit());
        engine.cancel();
        assert_eq!(engine.state(), MeasurementState::Empty);

        engine.click(Point::new(1.0, 1.0), PixelSpacing::unit());
        engine.set_tool(Tool::Pan);
        engine.set_tool(Tool::Measure);
        assert_eq!(engine.state(), MeasurementState::Empty);
        assert!(engine.measurements().is_empty());
    }

    #[test]
    fn test_ids_increase_and_delete() {
        let mut engine = MeasurementEngine::new();
        engine.set_tool(Tool::Measure);
        for i in 0..3 {
            engine.click(Point::new(0.0, 0.0), PixelSpacing::unit());
            engine.click(Point::new(f64::from(i), 1.0), PixelSpacing::unit());
        }
        let ids: Vec<u64> = engine.measurements().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        assert!(engine.delete(1));
        assert!(!engine.delete(1));
        assert_eq!(engine.measurements().len(), 2);

        // ids are never reused
        engine.click(Point::new(0.0, 0.0), PixelSpacing::unit());
        assert_eq!(engine.click(Point::new(2.0, 0.0), PixelSpacing::unit()), ClickOutcome::Completed(3));

        engine.clear();
        assert!(engine.measurements().is_empty());
    }

    #[test]
    fn test_restore_continues_ids() {
        let mut engine = MeasurementEngine::new();
        engine.restore(vec![Measurement {
            id: 7,
            point_a: Point::new(0.0, 0.0),
            point_b: Point::new(1.0, 0.0),
            distance_mm: 1.0,
            unit: UNIT_MM.to_string(),
        }]);
        engine.set_tool(Tool::Measure);
        engine.click(Point::new(0.0, 0.0), PixelSpacing::unit());
        assert_eq!(engine.click(Point::new(0.0, 1.0), PixelSpacing::unit()), ClickOutcome::Completed(8));
    }
}
