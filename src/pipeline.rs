// THEORY:
// The `pipeline` module is the top-level API for the engine. It strings the layers
// together into a single frame cycle:
//
//   region proposals -> per-region pupil selection -> identity matching against the
//   previous frame -> per-id temporal smoothing -> report
//
// The pipeline itself holds only configuration and the id source. Everything that
// must survive from one frame to the next lives in the `TrackingRecord` the caller
// passes in and gets back in the `FrameReport`. A cycle always runs to completion.
// Dropping a frame is simply not calling `process_frame` for it.

use crate::core_modules::eye::{Eye, EyeId, TrackingRecord};
use crate::core_modules::geometry::Rectangle;
use crate::core_modules::identity_tracker::{IdGenerator, IdentityTracker, RandomIdGenerator};
use crate::core_modules::pupil_selector::{PupilSelector, SelectorConfig};
use crate::core_modules::region::{RegionProposal, normalize_region_sizes};
use crate::core_modules::smoother::{DEFAULT_SMOOTHING_LENGTH, MovingAverageSmoother};
use crate::error::{PipelineError, Result};
use image::{DynamicImage, GrayImage, RgbaImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Configuration for the EyePipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub selector: SelectorConfig,
    /// Window length of the per-eye moving average.
    pub smoothing_length: usize,
    /// Resize every proposal of a frame to the smallest one before searching it.
    pub normalize_regions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            selector: SelectorConfig::default(),
            smoothing_length: DEFAULT_SMOOTHING_LENGTH,
            normalize_regions: false,
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON configuration; missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.selector.validate().map_err(PipelineError::InvalidConfig)?;
        if self.smoothing_length == 0 {
            return Err(PipelineError::InvalidConfig(
                "smoothing_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The outcome of one frame cycle.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// The record to hand back in with the next frame.
    pub record: TrackingRecord,
    /// Eyes of the previous frame that were not seen again.
    pub lost: Vec<Eye>,
}

impl FrameReport {
    pub fn eyes(&self) -> &[Eye] {
        self.record.eyes()
    }
}

/// The main, top-level struct for the tracking engine.
pub struct EyePipeline<G: IdGenerator = RandomIdGenerator> {
    config: PipelineConfig,
    selector: PupilSelector,
    tracker: IdentityTracker<G>,
}

impl EyePipeline<RandomIdGenerator> {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_id_generator(config, RandomIdGenerator)
    }
}

impl<G: IdGenerator> EyePipeline<G> {
    pub fn with_id_generator(config: PipelineConfig, ids: G) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            selector: PupilSelector::new(config.selector.clone()),
            tracker: IdentityTracker::new(ids),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one cycle on a raw RGBA frame buffer.
    pub fn process_rgba(
        &mut self,
        frame_buffer: &[u8],
        width: u32,
        height: u32,
        proposals: &[RegionProposal],
        previous: TrackingRecord,
    ) -> Result<FrameReport> {
        let expected = width as usize * height as usize * 4;
        let size_error = || PipelineError::FrameSize {
            width,
            height,
            expected,
            actual: frame_buffer.len(),
        };
        if frame_buffer.len() != expected {
            return Err(size_error());
        }
        let rgba = RgbaImage::from_raw(width, height, frame_buffer.to_vec()).ok_or_else(size_error)?;
        let gray = DynamicImage::ImageRgba8(rgba).to_luma8();
        self.process_frame(&gray, proposals, previous)
    }

    /// Runs one cycle on a grayscale frame.
    pub fn process_frame(
        &mut self,
        frame: &GrayImage,
        proposals: &[RegionProposal],
        mut previous: TrackingRecord,
    ) -> Result<FrameReport> {
        // Stage 1: Region preparation
        let regions = self.prepare_regions(frame, proposals);

        // Stage 2: Pupil selection
        let mut eyes: Vec<Eye> = regions
            .into_iter()
            .map(|region| {
                let mut eye = Eye::new(region);
                if let Some(candidate) = self.selector.select(frame, region) {
                    eye.pupil = Some(candidate.blob);
                    eye.threshold_band = Some(candidate.band);
                }
                eye
            })
            .collect();

        // Stage 3: Identity
        let lost = self.tracker.assign_ids(&mut eyes, previous.eyes());

        // Stage 4: Carry over and smoothing
        let mut smoothers = previous.take_smoothers();
        for eye in eyes.iter_mut() {
            let Some(id) = eye.id() else {
                continue;
            };
            if eye.pupil.is_none() {
                Self::retain_previous(eye, previous.eye(&id));
                continue;
            }
            self.smooth(eye, id, &mut smoothers);
        }

        for gone in &lost {
            if let Some(id) = gone.id() {
                smoothers.remove(&id);
            }
        }

        debug!(
            "frame processed: {} eyes, {} lost, {} smoothers alive",
            eyes.len(),
            lost.len(),
            smoothers.len()
        );

        Ok(FrameReport {
            record: TrackingRecord::from_eyes(eyes, smoothers),
            lost,
        })
    }

    fn prepare_regions(&self, frame: &GrayImage, proposals: &[RegionProposal]) -> Vec<Rectangle> {
        let rects: Vec<Rectangle> = proposals.iter().map(|p| p.rect).collect();
        let rects = if self.config.normalize_regions {
            normalize_region_sizes(&rects)
        } else {
            rects
        };

        let (width, height) = frame.dimensions();
        rects
            .into_iter()
            .filter_map(|rect| {
                let clamped = rect.clamp_to(width, height);
                if clamped.is_none() {
                    warn!("dropping region {:?} outside the {}x{} frame", rect, width, height);
                }
                clamped
            })
            .collect()
    }

    /// No pupil this frame: the eye keeps what its predecessor knew. The pupil is
    /// re-expressed relative to the new region so it stays put in the frame.
    fn retain_previous(eye: &mut Eye, predecessor: Option<&Eye>) {
        let Some(predecessor) = predecessor else {
            return;
        };
        let shift = predecessor.region.origin() - eye.region.origin();
        eye.pupil = predecessor.pupil.as_ref().map(|blob| blob.translated(shift));
        eye.threshold_band = predecessor.threshold_band;
        eye.smoothed_centroid = predecessor.smoothed_centroid;
    }

    fn smooth(
        &self,
        eye: &mut Eye,
        id: EyeId,
        smoothers: &mut HashMap<EyeId, MovingAverageSmoother>,
    ) {
        let Some(center) = eye.pupil_center_in_frame() else {
            return;
        };
        let anchor = eye.region_centroid();
        let smoother = smoothers
            .entry(id)
            .or_insert_with(|| MovingAverageSmoother::new(center, self.config.smoothing_length));
        eye.smoothed_centroid = Some(smoother.compound(center, anchor));
    }
}
