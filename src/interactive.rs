//! Keyboard-driven terminal viewer
//!
//! Keys:
//!
//! | key              | action                                   |
//! |------------------|------------------------------------------|
//! | Left / Right     | previous / next slice                    |
//! | Space            | play / pause                             |
//! | `+` `=` / `-`    | zoom in / out                            |
//! | `,` / `.`        | narrower / wider window                  |
//! | `[` / `]`        | lower / raise level                      |
//! | `i`              | invert                                   |
//! | `o`              | rotate 90° clockwise                     |
//! | `r`              | reset view and window/level              |
//! | `m`              | toggle the measure tool                  |
//! | `h` `j` `k` `l`  | move the cursor                          |
//! | `H` `J` `K` `L`  | pan                                      |
//! | Enter            | place a measurement point at the cursor  |
//! | `c` / Esc        | cancel a half-placed measurement         |
//! | `x` / `X`        | delete the last / all measurements       |
//! | `q` / Ctrl-C     | quit                                     |

use crate::batch::render_slice;
use crate::cli::Args;
use crate::image::overlay::{draw_cursor, draw_measurements};
use crate::image::{Raster, RenderParameters, placeholder_missing_pixels};
use crate::measurement::{ClickOutcome, MeasurementEngine, Tool};
use crate::series::SeriesState;
use crate::types::PixelSpacing;
use crate::viewport::{Point, ViewTransform};
use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::debug;

const WINDOW_STEP: f64 = 50.0;
const LEVEL_STEP: f64 = 10.0;
const CURSOR_STEP: f64 = 8.0;
const PAN_STEP: f64 = 16.0;
const IDLE_POLL: Duration = Duration::from_millis(250);
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Previous,
    Next,
    TogglePlayback,
    ZoomIn,
    ZoomOut,
    AdjustWindow(f64),
    AdjustLevel(f64),
    ToggleInvert,
    Rotate,
    Reset,
    ToggleMeasure,
    MoveCursor(f64, f64),
    Pan(f64, f64),
    Click,
    Cancel,
    DeleteLast,
    ClearMeasurements,
}

/// Map a key press to a viewer action
#[must_use]
pub fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Left => Action::Previous,
        KeyCode::Right => Action::Next,
        KeyCode::Enter => Action::Click,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char(c) => match c {
            ' ' => Action::TogglePlayback,
            '+' | '=' => Action::ZoomIn,
            '-' => Action::ZoomOut,
            ',' => Action::AdjustWindow(-WINDOW_STEP),
            '.' => Action::AdjustWindow(WINDOW_STEP),
            '[' => Action::AdjustLevel(-LEVEL_STEP),
            ']' => Action::AdjustLevel(LEVEL_STEP),
            'i' => Action::ToggleInvert,
            'o' => Action::Rotate,
            'r' => Action::Reset,
            'm' => Action::ToggleMeasure,
            'h' => Action::MoveCursor(-CURSOR_STEP, 0.0),
            'l' => Action::MoveCursor(CURSOR_STEP, 0.0),
            'k' => Action::MoveCursor(0.0, -CURSOR_STEP),
            'j' => Action::MoveCursor(0.0, CURSOR_STEP),
            'H' => Action::Pan(-PAN_STEP, 0.0),
            'L' => Action::Pan(PAN_STEP, 0.0),
            'K' => Action::Pan(0.0, -PAN_STEP),
            'J' => Action::Pan(0.0, PAN_STEP),
            'c' => Action::Cancel,
            'x' => Action::DeleteLast,
            'X' => Action::ClearMeasurements,
            _ => return None,
        },
        _ => return None,
    };
    Some(action)
}

#[inline]
fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Everything the interactive viewer mutates
#[derive(Debug)]
pub struct Viewer {
    pub series: SeriesState,
    pub render: RenderParameters,
    pub view: ViewTransform,
    pub engine: MeasurementEngine,
    /// Screen-space cursor, center-relative
    pub cursor: Point,
    pub status: String,
}

impl Viewer {
    #[must_use]
    pub fn new(series: SeriesState, render: RenderParameters) -> Self {
        Self {
            series,
            render,
            view: ViewTransform::default(),
            engine: MeasurementEngine::new(),
            cursor: Point::default(),
            status: String::new(),
        }
    }

    fn current_spacing(&self) -> PixelSpacing {
        self.series
            .current()
            .and_then(|slice| slice.image())
            .map_or_else(PixelSpacing::unit, |image| image.pixel_spacing())
    }

    /// Apply one action; returns whether the frame must be redrawn
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Previous => return self.series.previous(),
            Action::Next => return self.series.next(),
            Action::TogglePlayback => self.series.toggle_playback(),
            Action::ZoomIn => self.view.zoom_in(),
            Action::ZoomOut => self.view.zoom_out(),
            Action::AdjustWindow(delta) => self.render.adjust_window(delta),
            Action::AdjustLevel(delta) => self.render.adjust_level(delta),
            Action::ToggleInvert => self.render.filters.invert = !self.render.filters.invert,
            Action::Rotate => self.view.rotate_by(90),
            Action::Reset => {
                self.view.reset();
                self.render.reset();
            }
            Action::ToggleMeasure => {
                let tool = match self.engine.tool() {
                    Tool::Measure => Tool::Pan,
                    Tool::Pan => Tool::Measure,
                };
                self.engine.set_tool(tool);
            }
            Action::MoveCursor(dx, dy) => {
                self.cursor.x += dx;
                self.cursor.y += dy;
            }
            Action::Pan(dx, dy) => self.view.pan_by(dx, dy),
            Action::Click => {
                let point = self.view.screen_to_image(self.cursor);
                match self.engine.click(point, self.current_spacing()) {
                    ClickOutcome::Completed(id) => {
                        if let Some(m) = self.engine.measurements().iter().find(|m| m.id == id) {
                            self.status = format!("{m}");
                        }
                    }
                    ClickOutcome::FirstPointPlaced => self.status = format!("first point at {point}"),
                    ClickOutcome::Ignored => self.status = "press m to measure".to_string(),
                }
            }
            Action::Cancel => self.engine.cancel(),
            Action::DeleteLast => {
                if let Some(id) = self.engine.measurements().last().map(|m| m.id) {
                    self.engine.delete(id);
                }
            }
            Action::ClearMeasurements => self.engine.clear(),
        }
        true
    }

    /// Render the current slice with overlays and the display transform
    #[must_use]
    pub fn frame(&self) -> Raster {
        let Some(slice) = self.series.current() else {
            return placeholder_missing_pixels();
        };

        let base = render_slice(slice, &self.render);
        let mut annotated = draw_measurements(&base, self.engine.measurements(), self.engine.pending_point());
        if self.engine.tool() == Tool::Measure {
            draw_cursor(&mut annotated, self.view.screen_to_image(self.cursor));
        }

        self.view
            .compose(&annotated, annotated.width(), annotated.height(), BACKGROUND)
    }

    #[must_use]
    pub fn status_line(&self) -> String {
        let label = self.series.current().map_or("", |s| s.label());
        let mut line = format!(
            "{label} [{}/{}] | {} | {} | {}",
            self.series.current_index() + 1,
            self.series.len(),
            self.render,
            self.view,
            match self.engine.tool() {
                Tool::Measure => "measure",
                Tool::Pan => "pan",
            }
        );
        if self.series.is_playing() {
            line.push_str(&format!(" | playing {} fps", self.series.fps()));
        }
        if !self.status.is_empty() {
            line.push_str(" | ");
            line.push_str(&self.status);
        }
        line
    }

    fn draw(&self, args: &Args) -> Result<()> {
        let mut stdout = std::io::stdout();
        execute!(
            stdout,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )
        .context("Failed to clear terminal")?;
        write!(stdout, "{}\r\n", self.status_line()).context("Failed to write status line")?;
        stdout.flush().context("Failed to flush stdout")?;

        let (width, height) = crate::display::terminal_size(args, self.current_spacing());
        let config = viuer::Config {
            width,
            height,
            absolute_offset: true,
            x: 0,
            y: 1,
            ..Default::default()
        };
        viuer::print(&self.frame().to_dynamic_image(), &config)
            .map_err(|e| anyhow!("Failed to display image: {e}"))?;
        Ok(())
    }
}

/// Raw mode and the alternate screen for as long as the guard lives
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(std::io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)
            .context("Failed to enter alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(std::io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the key loop until the user quits
pub fn run(viewer: &mut Viewer, args: &Args) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut dirty = true;

    loop {
        if dirty {
            viewer.draw(args)?;
            dirty = false;
        }

        let timeout = if viewer.series.is_playing() {
            viewer.series.frame_interval()
        } else {
            IDLE_POLL
        };

        if event::poll(timeout).context("Failed to poll terminal events")? {
            match event::read().context("Failed to read terminal event")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if is_quit(&key) {
                        debug!("quit requested");
                        break;
                    }
                    if let Some(action) = action_for(key.code) {
                        dirty |= viewer.apply(action);
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        dirty |= viewer.series.tick(Instant::now());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::decode_bytes;
    use crate::dicom::test_support::synthetic_u16;
    use crate::series::Slice;
    use approx::assert_relative_eq;

    fn viewer() -> Viewer {
        let slices = (0..3)
            .map(|i| {
                let image = decode_bytes(&synthetic_u16(64, 64, "2\\2", None, &[50; 64 * 64])).unwrap();
                Slice::Decoded {
                    label: format!("{i}.dcm"),
                    image: Box::new(image),
                }
            })
            .collect();
        Viewer::new(SeriesState::new(slices), RenderParameters::default())
    }

    #[test]
    fn test_key_map() {
        assert_eq!(action_for(KeyCode::Right), Some(Action::Next));
        assert_eq!(action_for(KeyCode::Char('=')), Some(Action::ZoomIn));
        assert_eq!(action_for(KeyCode::Char(']')), Some(Action::AdjustLevel(LEVEL_STEP)));
        assert_eq!(action_for(KeyCode::Char('z')), None);
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_navigation_is_noop_at_boundaries() {
        let mut v = viewer();
        assert!(!v.apply(Action::Previous));
        assert!(v.apply(Action::Next));
        assert!(v.apply(Action::Next));
        assert!(!v.apply(Action::Next));
        assert_eq!(v.series.current_index(), 2);
    }

    #[test]
    fn test_measure_with_cursor() {
        let mut v = viewer();
        v.apply(Action::ToggleMeasure);
        v.apply(Action::Click);
        for _ in 0..5 {
            v.apply(Action::MoveCursor(CURSOR_STEP, 0.0));
        }
        v.apply(Action::Click);

        let m = &v.engine.measurements()[0];
        // 40 screen pixels at zoom 1 and 2 mm spacing
        assert_relative_eq!(m.distance_mm, 80.0);
        assert!(v.status.contains("80.00 mm"));
    }

    #[test]
    fn test_zoom_changes_measurement_scale() {
        let mut v = viewer();
        v.view.set_zoom(2.0);
        v.apply(Action::ToggleMeasure);
        v.apply(Action::Click);
        v.apply(Action::MoveCursor(CURSOR_STEP, 0.0));
        v.apply(Action::Click);
        assert_relative_eq!(v.engine.measurements()[0].distance_mm, 8.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut v = viewer();
        v.apply(Action::ZoomIn);
        v.apply(Action::Rotate);
        v.apply(Action::AdjustWindow(-WINDOW_STEP));
        v.apply(Action::ToggleInvert);
        v.apply(Action::Reset);

        assert_eq!(v.view, ViewTransform::default());
        assert_eq!(v.render, RenderParameters::default());
    }

    #[test]
    fn test_frame_and_status() {
        let mut v = viewer();
        let frame = v.frame();
        assert_eq!((frame.width(), frame.height()), (64, 64));
        // sample 50 at the default 400/50 window
        assert_eq!(frame.pixel(0, 0), Some([128, 128, 128, 255]));

        v.apply(Action::TogglePlayback);
        let status = v.status_line();
        assert!(status.starts_with("0.dcm [1/3]"));
        assert!(status.contains("playing 10 fps"));
    }
}
