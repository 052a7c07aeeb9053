// Example runner: feeds still frames from disk through the pipeline with fixed
// eye regions standing in for an external eye detector.

use anyhow::Context;
use clap::Parser;
use flexi_logger::Logger;
use log::info;
use pupil_vision::core_modules::eye::TrackingRecord;
use pupil_vision::core_modules::geometry::Rectangle;
use pupil_vision::core_modules::region::{DEFAULT_MAX_WORK_SIZE, RegionProposal, working_scale};
use pupil_vision::{EyePipeline, PipelineConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pupil_vision", about = "Locate and track pupils across a sequence of frames")]
struct Args {
    /// Frames to process, in order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// JSON pipeline configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Eye region as x,y,width,height. Repeat for several eyes.
    #[arg(long = "region", value_parser = parse_region, required = true)]
    regions: Vec<Rectangle>,

    /// Factor mapping the regions to frame resolution, if they were found on a downscaled frame.
    #[arg(long, conflicts_with = "downscaled")]
    region_scale: Option<f64>,

    /// The regions were found on each frame shrunk to fit within `--max-work-size`.
    #[arg(long)]
    downscaled: bool,

    /// Largest side of the working resolution used with `--downscaled`.
    #[arg(long, default_value_t = DEFAULT_MAX_WORK_SIZE)]
    max_work_size: u32,

    /// Log specification, e.g. `info` or `debug,pupil_vision::core_modules=trace`.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_region(text: &str) -> Result<Rectangle, String> {
    let values: Vec<u32> = text
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid region '{text}': {e}"))?;
    match values.as_slice() {
        [x, y, width, height] => Ok(Rectangle::new(*x, *y, *width, *height)),
        _ => Err(format!("region '{text}' must have four values: x,y,width,height")),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_str(&args.log_level)?.log_to_stderr().start()?;

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut pipeline = EyePipeline::new(config)?;

    let mut record = TrackingRecord::new();
    for (index, path) in args.frames.iter().enumerate() {
        let frame = image::open(path)
            .with_context(|| format!("reading frame {}", path.display()))?
            .to_luma8();

        let factor = match args.region_scale {
            Some(factor) => factor,
            None if args.downscaled => {
                let (width, height) = frame.dimensions();
                1.0 / working_scale(width, height, args.max_work_size)
            }
            None => 1.0,
        };
        let proposals: Vec<RegionProposal> = args
            .regions
            .iter()
            .map(|rect| RegionProposal::new(*rect).scaled(factor))
            .collect();

        let report = pipeline.process_frame(&frame, &proposals, record)?;

        for eye in report.eyes() {
            let id = eye.id().map(|id| id.to_string()).unwrap_or_default();
            match (eye.pupil_center_in_frame(), eye.smoothed_centroid, eye.threshold_band) {
                (Some(pupil), Some(smoothed), Some(band)) => println!(
                    "frame {index}: eye {id} pupil=({}, {}) smoothed=({}, {}) band={}..={}",
                    pupil.x, pupil.y, smoothed.x, smoothed.y, band.min, band.max
                ),
                _ => println!("frame {index}: eye {id} no pupil"),
            }
        }
        for gone in &report.lost {
            if let Some(id) = gone.id() {
                info!("frame {index}: lost eye {id}");
            }
        }

        record = report.record;
    }

    info!("Processing complete: {} frames", args.frames.len());
    Ok(())
}
