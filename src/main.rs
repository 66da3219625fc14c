use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use dcmview::batch::{filter_candidates, load_series_with, output_file_name, parameters_for, render_slice};
use dcmview::cli::Args;
use dcmview::display;
use dcmview::dicom::DecodedImage;
use dcmview::image::{Raster, RenderParameters};
use dcmview::image::overlay::draw_measurements;
use dcmview::interactive::{self, Viewer};
use dcmview::measurement::{ClickOutcome, MeasurementEngine, Tool};
use dcmview::payload::RecordsPayload;
use dcmview::series::{SeriesState, Slice};
use dcmview::session::ViewerSession;
use dcmview::types::PixelSpacing;
use dcmview::viewport::ViewTransform;
use std::path::Path;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();

    if args.files.is_empty() {
        let _ = Args::command().print_help();
        println!();
        return;
    }

    init_logging(args.verbose);

    match run(&args) {
        Ok(any_failed) => {
            if any_failed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            println!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Could not set up global logging subscriber: {e}");
    });
}

/// Run the viewer; returns whether any file failed to decode
fn run(args: &Args) -> Result<bool> {
    let paths = filter_candidates(&args.files);
    if paths.is_empty() {
        bail!("no DICOM files among the given paths");
    }

    let saved = args.session.as_deref().and_then(|path| {
        ViewerSession::load(path).unwrap_or_else(|e| {
            warn!("ignoring saved session: {e:#}");
            None
        })
    });

    let multiple_files = paths.len() > 1;
    let mut series = load_series_with(&paths, |index, slice| {
        if multiple_files && !args.interactive {
            match slice.error() {
                Some(message) => println!("[{}/{}] {}: {message}", index + 1, paths.len(), slice.label()),
                None => println!("[{}/{}] {}", index + 1, paths.len(), slice.label()),
            }
        }
    });
    let any_failed = series.slices().iter().any(|slice| slice.error().is_some());

    let mut render = parameters_for(current_image(&series), None);
    let mut view = ViewTransform::default();
    let mut engine = MeasurementEngine::new();

    if let Some(session) = &saved {
        session.restore(&mut series, &mut render, &mut view, &mut engine);
    }
    args.apply_render_overrides(&mut render);
    if let Some(fps) = args.fps {
        series.set_fps(fps);
    }

    add_cli_measurements(args, &series, &mut engine);

    if args.interactive {
        let mut viewer = Viewer::new(series, render);
        viewer.view = view;
        viewer.engine = engine;
        interactive::run(&mut viewer, args)?;
        (series, render, view, engine) = (viewer.series, viewer.render, viewer.view, viewer.engine);
    } else {
        show_series(args, &series, &render, &engine)?;
    }

    if args.payload {
        match RecordsPayload::from_series(&series) {
            Some(payload) => println!("{}", payload.to_json()?),
            None => warn!("first file did not decode, no payload to print"),
        }
    }

    if let Some(path) = &args.session {
        ViewerSession::capture(&series, &render, &view, &engine).save(path)?;
    }

    Ok(any_failed)
}

#[inline]
fn current_image(series: &SeriesState) -> Option<&DecodedImage> {
    series.current().and_then(Slice::image)
}

fn add_cli_measurements(args: &Args, series: &SeriesState, engine: &mut MeasurementEngine) {
    if args.measure.is_empty() {
        return;
    }

    let spacing = current_image(series).map_or_else(PixelSpacing::unit, |image| image.pixel_spacing());
    let previous_tool = engine.tool();
    engine.set_tool(Tool::Measure);
    for &(a, b) in &args.measure {
        engine.click(a, spacing);
        if let ClickOutcome::Completed(id) = engine.click(b, spacing)
            && let Some(m) = engine.measurements().iter().find(|m| m.id == id)
        {
            println!("{m}");
        }
    }
    engine.set_tool(previous_tool);
}

/// Render every slice, then print it to the terminal or write it as PNG
fn show_series(
    args: &Args,
    series: &SeriesState,
    render: &RenderParameters,
    engine: &MeasurementEngine,
) -> Result<()> {
    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let multiple_files = series.len() > 1;
    for (idx, slice) in series.slices().iter().enumerate() {
        if args.verbose
            && let Some(image) = slice.image()
        {
            dcmview::print_metadata(image);
        }

        let raster = draw_measurements(&render_slice(slice, render), engine.measurements(), None);

        match &args.output {
            Some(dir) => write_png(&dir.join(output_file_name(idx, slice.label())), &raster)?,
            None => {
                let spacing = slice.image().map_or_else(PixelSpacing::unit, |image| image.pixel_spacing());
                if multiple_files {
                    println!("{}", slice.label());
                }
                display::print_raster(&raster, spacing, args)?;
                if multiple_files && idx < series.len() - 1 {
                    println!();
                }
            }
        }
    }

    Ok(())
}

fn write_png(path: &Path, raster: &Raster) -> Result<()> {
    raster.save_png(path)?;
    println!("{}", path.display());
    Ok(())
}

