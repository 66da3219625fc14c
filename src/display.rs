use crate::cli::Args;
use crate::image::Raster;
use crate::types::PixelSpacing;
use anyhow::{Result, anyhow};
use std::io::{IsTerminal, Write};
use viuer::{Config as ViuerConfig, print};

/// Terminal size (columns, rows) requested by the options, corrected for
/// non-square pixels when only the height is given
#[must_use]
pub fn terminal_size(args: &Args, spacing: PixelSpacing) -> (Option<u32>, Option<u32>) {
    // row/column spacing: (1,1) = square, (2,1) = pixels twice as tall
    let par_ratio = spacing.aspect_ratio();
    let par_ratio = if par_ratio.is_finite() && par_ratio > 0.0 { par_ratio } else { 1.0 };

    match (args.width, args.height) {
        (Some(w), ..) => (Some(w), None),
        (None, Some(h)) => (None, Some((f64::from(h) * par_ratio).round() as u32)),
        (None, None) => (Some(24), None),
    }
}

pub fn print_raster(raster: &Raster, spacing: PixelSpacing, args: &Args) -> Result<()> {
    let is_tty = std::io::stdout().is_terminal();
    let (width, height) = terminal_size(args, spacing);

    let config = ViuerConfig {
        width,
        height,
        absolute_offset: false,
        use_kitty: is_tty,
        use_iterm: is_tty,
        use_sixel: is_tty,
        ..Default::default()
    };

    std::io::stdout()
        .flush()
        .map_err(|e| anyhow!("Failed to flush stdout: {e}"))?;

    print(&raster.to_dynamic_image(), &config).map_err(|e| anyhow!("Failed to display image: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_size() {
        let square = PixelSpacing::unit();
        assert_eq!(terminal_size(&Args::default(), square), (Some(24), None));

        let args = Args {
            width: Some(80),
            height: Some(40),
            ..Args::default()
        };
        assert_eq!(terminal_size(&args, square), (Some(80), None));

        let args = Args {
            height: Some(20),
            ..Args::default()
        };
        assert_eq!(terminal_size(&args, PixelSpacing::new(1.0, 0.5)), (None, Some(40)));
        assert_eq!(terminal_size(&args, PixelSpacing::new(1.0, 0.0)), (None, Some(20)));
    }
}
