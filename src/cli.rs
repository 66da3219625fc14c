use crate::image::RenderParameters;
use crate::viewport::Point;
use clap::Parser;
use std::path::PathBuf;

/// A terminal DICOM viewer with window/level, measurements and series playback
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DICOM file path(s), shown as one series in the given order
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output width in terminal columns
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Output height in terminal rows
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Show DICOM metadata and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Window width, overriding the file's default
    #[arg(long, value_name = "W")]
    pub window: Option<f64>,

    /// Window level (center), overriding the file's default
    #[arg(long, value_name = "L", allow_negative_numbers = true)]
    pub level: Option<f64>,

    /// Invert the windowed image
    #[arg(long)]
    pub invert: bool,

    /// Brightness offset in 8-bit levels
    #[arg(long, value_name = "B", allow_negative_numbers = true, default_value_t = 0.0)]
    pub brightness: f64,

    /// Contrast in [-1, 1]
    #[arg(long, value_name = "C", allow_negative_numbers = true, default_value_t = 0.0)]
    pub contrast: f64,

    /// Write rendered PNGs to this directory instead of printing
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Add a measurement between two image-space points (center-relative)
    #[arg(long, value_name = "X1,Y1,X2,Y2", value_parser = parse_segment, allow_hyphen_values = true)]
    pub measure: Vec<(Point, Point)>,

    /// Print the records payload (JSON) for the first file
    #[arg(long)]
    pub payload: bool,

    /// Load the viewer session from this file and save it back on exit
    #[arg(long, value_name = "FILE")]
    pub session: Option<PathBuf>,

    /// Keyboard-driven viewer
    #[arg(short, long)]
    pub interactive: bool,

    /// Playback rate in frames per second
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub fps: Option<u32>,
}

impl Args {
    /// Apply the window/level and filter options that were given on top of
    /// `params`. Options left out keep the value `params` already has.
    pub fn apply_render_overrides(&self, params: &mut RenderParameters) {
        if let Some(window) = self.window {
            params.set_window(window);
        }
        if let Some(level) = self.level {
            params.level = level;
        }
        if self.invert {
            params.filters.invert = true;
        }
        if self.brightness != 0.0 {
            params.filters.brightness = self.brightness;
        }
        if self.contrast != 0.0 {
            params.filters.contrast = self.contrast;
        }
    }
}

fn parse_segment(s: &str) -> Result<(Point, Point), String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("invalid coordinate {v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    match values[..] {
        [x1, y1, x2, y2] => Ok((Point::new(x1, y1), Point::new(x2, y2))),
        _ => Err(format!("expected X1,Y1,X2,Y2, got {} values", values.len())),
    }
}
