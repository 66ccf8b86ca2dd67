mod output;
mod source;

use anyhow::{Context, Result};
use clap::Parser;
use lane_track::render::{self, Annotator, OverlayOptions};
use lane_track::{
    Calibration, FeatureImage, FrameResult, LaneConfig, LaneFinder, SearchParams,
    TrackingContext,
};
use output::{ImageDirOutput, OutputSink};
use rayon::prelude::*;
use source::{FrameSource, MaskDirectory};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of bird's-eye binary masks, processed in filename order
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory for rendered overlays
    /// If not provided, results are only logged
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of sliding windows per lane side
    #[arg(long, default_value_t = 9)]
    n_windows: usize,

    /// Half width of each sliding window in pixels
    #[arg(long, default_value_t = 120)]
    window_half_width: u32,

    /// Pixels a window must exceed before the next one is re-centered
    #[arg(long, default_value_t = 50)]
    min_pixel: usize,

    /// Number of frames averaged for the smoothed lane fill
    #[arg(long, default_value_t = 5)]
    history: usize,

    /// Meters per pixel along x
    #[arg(long, default_value_t = 3.7 / 700.0)]
    xm_per_pix: f64,

    /// Meters per pixel along y
    #[arg(long, default_value_t = 30.0 / 720.0)]
    ym_per_pix: f64,

    /// Treat every mask as an independent still image (no smoothing, parallel)
    #[arg(long)]
    stills: bool,

    /// Draw the mask underneath the overlay instead of a black canvas
    #[arg(long)]
    on_mask: bool,

    /// Highlight the pixels matched to each side
    #[arg(long)]
    draw_pixels: bool,

    /// Outline the search windows
    #[arg(long)]
    draw_windows: bool,

    /// Skip the smoothed lane fill
    #[arg(long)]
    no_fill: bool,

    /// TrueType font for curvature/offset text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn lane_config(&self) -> LaneConfig {
        LaneConfig {
            search: SearchParams {
                n_windows: self.n_windows,
                window_half_width: self.window_half_width,
                min_pixel_to_recenter: self.min_pixel,
            },
            calibration: Calibration {
                xm_per_pix: self.xm_per_pix,
                ym_per_pix: self.ym_per_pix,
            },
            history_capacity: if self.stills { 1 } else { self.history },
        }
    }

    fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            draw_pixels: self.draw_pixels,
            draw_lane_fill: !self.no_fill,
            draw_windows: self.draw_windows,
        }
    }
}

/// Per-frame rendering settings shared by both run modes.
struct Renderer {
    options: OverlayOptions,
    on_mask: bool,
    annotator: Option<Annotator>,
}

impl Renderer {
    fn render(
        &self,
        mask: &FeatureImage,
        result: &FrameResult,
        ctx: &TrackingContext,
    ) -> image::RgbImage {
        let base = self.on_mask.then(|| mask.as_gray());
        let overlay = render::visualize(result, base, ctx, self.options);
        match &self.annotator {
            Some(annotator) => annotator.annotate(overlay, result),
            None => overlay,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = args.lane_config();
    tracing::info!("lane-track starting");
    tracing::info!(
        "Windows: {} x ±{}px, recenter above {} px",
        config.search.n_windows,
        config.search.window_half_width,
        config.search.min_pixel_to_recenter
    );
    tracing::info!(
        "Calibration: {:.6} m/px (x), {:.6} m/px (y), history {}",
        config.calibration.xm_per_pix,
        config.calibration.ym_per_pix,
        config.history_capacity
    );

    let finder = LaneFinder::new(config).context("Invalid lane configuration")?;

    let annotator = match &args.font {
        Some(path) => Some(load_annotator(path)?),
        None => {
            tracing::info!("No font given, curvature text is logged only");
            None
        }
    };
    let renderer = Renderer {
        options: args.overlay_options(),
        on_mask: args.on_mask,
        annotator,
    };

    let mut source = MaskDirectory::new(&args.input_dir).context("Failed to open mask source")?;
    let output = args
        .output_dir
        .as_ref()
        .map(ImageDirOutput::new)
        .transpose()
        .context("Failed to initialize overlay output")?;

    if args.stills {
        run_stills(&finder, &source, output.as_ref(), &renderer)
    } else {
        run_sequence(&finder, &mut source, output, &renderer)
    }
}

fn load_annotator(path: &Path) -> Result<Annotator> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    Annotator::from_bytes(bytes).with_context(|| format!("Invalid font {}", path.display()))
}

fn log_result(name: &str, result: &FrameResult) {
    let [left, right, offset] = render::info_lines(result);
    tracing::debug!("{}: {} | {} | {}", name, left, right, offset);
    for side in [&result.left, &result.right] {
        if let Err(e) = &side.geometry {
            tracing::debug!("{}: {}", name, e);
        }
    }
}

fn run_sequence<S, O>(
    finder: &LaneFinder,
    source: &mut S,
    mut output: Option<O>,
    renderer: &Renderer,
) -> Result<()>
where
    S: FrameSource,
    O: OutputSink,
{
    let mut ctx = finder.new_context();
    let mut frame_count = 0u64;
    let mut skipped = 0u64;
    let mut total_find_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!(
        "Starting sequence over {} masks",
        source.remaining().unwrap_or_default()
    );

    while let Some(frame) = source.next_frame().context("Failed to read mask")? {
        let mask = match FeatureImage::try_from(&frame.image) {
            Ok(mask) => mask,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", frame.name, e);
                skipped += 1;
                continue;
            }
        };

        // Find and track
        let find_start = Instant::now();
        let result = finder.track(&mask, &mut ctx);
        total_find_time += find_start.elapsed();
        log_result(&frame.name, &result);

        // Render and write
        if let Some(ref mut output) = output {
            let output_start = Instant::now();
            let overlay = renderer.render(&mask, &result, &ctx);
            output
                .write_frame(&overlay)
                .with_context(|| format!("Failed to write overlay for {}", frame.name))?;
            total_output_time += output_start.elapsed();
        }

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_find_ms = total_find_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let [left, right, offset] = render::info_lines(&result);
            tracing::info!(
                "Frame {}: find={:.1}ms, output={:.1}ms | {} | {} | {}",
                frame_count,
                avg_find_ms,
                avg_output_ms,
                left,
                right,
                offset
            );
        }
    }

    tracing::info!(
        "Processed {} frames, skipped {}, wrote {}",
        frame_count,
        skipped,
        output.as_ref().map(|o| o.frames_written()).unwrap_or(0)
    );
    Ok(())
}

fn run_stills(
    finder: &LaneFinder,
    source: &MaskDirectory,
    output: Option<&ImageDirOutput>,
    renderer: &Renderer,
) -> Result<()> {
    let start = Instant::now();
    let processed = source
        .paths()
        .par_iter()
        .enumerate()
        .filter(|(index, path)| {
            match process_still(finder, path, *index as u64, output, renderer) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    false
                }
            }
        })
        .count();

    tracing::info!(
        "Processed {} of {} stills in {:.1}ms",
        processed,
        source.paths().len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn process_still(
    finder: &LaneFinder,
    path: &Path,
    index: u64,
    output: Option<&ImageDirOutput>,
    renderer: &Renderer,
) -> Result<()> {
    let frame = source::load_frame(path)?;
    let mask = FeatureImage::try_from(&frame.image)
        .with_context(|| format!("Skipping {}", frame.name))?;

    let mut ctx = finder.new_context();
    let result = finder.track(&mask, &mut ctx);
    log_result(&frame.name, &result);

    if let Some(output) = output {
        let overlay = renderer.render(&mask, &result, &ctx);
        output.write_frame_at(index, &overlay)?;
    }
    Ok(())
}
