mod capture;
mod output;
mod segmentation;
mod tint;

use anyhow::{Context, Result};
use capture::{FrameSource, WebcamSource};
use clap::Parser;
use output::{LoopbackOutput, OutputSink};
use segmentation::{Preprocessor, Segmenter};
use std::time::{Duration, Instant};
use tint::{BlendMode, TintConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    output_device: String,

    /// Capture resolution width
    #[arg(long, default_value_t = 1280)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 720)]
    capture_height: u32,

    /// Output resolution width
    #[arg(long, default_value_t = 1280)]
    output_width: u32,

    /// Output resolution height
    #[arg(long, default_value_t = 720)]
    output_height: u32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Path to hair segmentation model (ONNX file)
    /// If not provided, runs in passthrough mode without recoloring
    #[arg(long)]
    model: Option<String>,

    /// Tint hue in degrees [0, 360)
    #[arg(long, default_value_t = 220.0)]
    hue: f64,

    /// Tint saturation in percent [0, 100]
    #[arg(long, default_value_t = 80.0)]
    saturation: f64,

    /// Tint lightness in percent [0, 100]
    #[arg(long, default_value_t = 50.0)]
    lightness: f64,

    /// Tint opacity in percent [0, 100]
    #[arg(long, default_value_t = 60.0)]
    opacity: f64,

    /// Feather (edge blur) radius in pixels; overlay path only
    #[arg(long, default_value_t = 4)]
    feather: u32,

    /// Blend mode for combining the tint with the frame
    #[arg(long, value_enum, default_value_t = BlendMode::Normal)]
    blend: BlendMode,

    /// Paint hair pixels directly instead of building a feathered overlay
    #[arg(long)]
    direct: bool,

    /// Show the segmentation mask (black/white) instead of the tinted video
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Resolve the slider-style percent/degree arguments into a tint config.
    fn tint_config(&self) -> TintConfig {
        let h = (self.hue.rem_euclid(360.0)) / 360.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        TintConfig {
            color: tint::hsl_to_rgb(h, s, l),
            opacity: (self.opacity / 100.0).clamp(0.0, 1.0) as f32,
            blend: self.blend,
            feather: self.feather,
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

    tracing::info!("hairtint starting");
    tracing::info!("Capture: {}x{}", args.capture_width, args.capture_height);
    tracing::info!("Output: {}x{}", args.output_width, args.output_height);
    tracing::info!("Target FPS: {}", args.fps);

    // Initialize capture
    let mut capture =
        WebcamSource::new(args.input_device, args.capture_width, args.capture_height)
            .context("Failed to initialize webcam capture")?;

    // Initialize output
    let mut output = LoopbackOutput::new(&args.output_device, args.output_width, args.output_height)
        .context("Failed to initialize v4l2loopback output")?;

    // Initialize segmentation model if provided
    let model: Option<Box<dyn Segmenter>> = if let Some(model_path) = &args.model {
        let model = segmentation::create_default_model(model_path)
            .context("Failed to load hair segmentation model")?;
        Some(model)
    } else {
        tracing::info!("Running in passthrough mode (no segmentation model)");
        None
    };

    let config = args.tint_config();
    if model.is_some() {
        tracing::info!(
            "Tint color rgb({}, {}, {}), opacity {:.0}%, blend {:?}, feather {}px",
            config.color[0],
            config.color[1],
            config.color[2],
            config.opacity * 100.0,
            config.blend,
            config.feather
        );
        if args.direct && args.feather > 0 {
            tracing::warn!("--feather has no effect with --direct");
        }
    }

    run_pipeline(
        &mut capture,
        &mut output,
        model,
        &config,
        args.fps,
        args.direct,
        args.show_mask,
    )
}

fn run_pipeline<C, O>(
    capture: &mut C,
    output: &mut O,
    mut model: Option<Box<dyn Segmenter>>,
    config: &TintConfig,
    target_fps: u32,
    direct: bool,
    show_mask: bool,
) -> Result<()>
where
    C: FrameSource,
    O: OutputSink,
{
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps as f32);
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_segment_time = Duration::ZERO;
    let mut total_tint_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop");
    tracing::info!("Press Ctrl+C to stop");

    loop {
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let mut frame = capture.capture_frame().context("Failed to capture frame")?;
        total_capture_time += capture_start.elapsed();

        // Segment and recolor (if a model is loaded)
        if let Some(ref mut model) = model {
            let segment_start = Instant::now();
            let mask = model.segment(&frame).context("Failed to segment frame")?;
            total_segment_time += segment_start.elapsed();

            let tint_start = Instant::now();
            if show_mask {
                frame = Preprocessor::mask_to_rgb(&mask);
            } else if direct {
                tint::paint_mask(&mut frame, &mask, config)?;
            } else {
                let mut overlay = tint::mask_to_overlay(&mask, config.color);
                tint::feather_alpha(&mut overlay, config.color, config.feather);
                tint::composite_overlay(&mut frame, &overlay, config.opacity, config.blend)?;
            }
            total_tint_time += tint_start.elapsed();
        }

        // Output frame
        let output_start = Instant::now();
        output
            .write_frame(&frame)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_ms =
                |total: Duration| total.as_secs_f64() * 1000.0 / frame_count as f64;
            let capture_ms = avg_ms(total_capture_time);
            let segment_ms = avg_ms(total_segment_time);
            let tint_ms = avg_ms(total_tint_time);
            let output_ms = avg_ms(total_output_time);
            let total_ms = capture_ms + segment_ms + tint_ms + output_ms;

            tracing::info!(
                "Frame {}: capture={:.1}ms, segment={:.1}ms, tint={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}",
                frame_count,
                capture_ms,
                segment_ms,
                tint_ms,
                output_ms,
                total_ms,
                1000.0 / total_ms
            );
        }

        // Frame rate limiting
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }
}
