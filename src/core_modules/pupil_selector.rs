// THEORY:
// The `PupilSelector` decides which dark blob inside an eye region is the pupil. A
// single fixed threshold is fragile because lighting and skin tone change how dark
// the pupil looks, so the selector sweeps a whole band of (min, max) intensity pairs
// and lets every pair contribute candidates.
//
// Key architectural principles & algorithm steps:
// 1.  **Multi-Threshold Search**: For every pair in the configured band the region
//     is binarized (foreground iff min <= v <= max) and labeled. Each surviving blob
//     is remembered together with the band that produced it.
// 2.  **Weighted Scoring**: Each candidate is scored on two priors of equal weight:
//     - size: relative deviation of its area from the expected pupil area;
//     - position: how far the angles from its centroid to the four region corners
//       stray from 45 degrees. A point in the middle of a square sees every corner
//       at 45 degrees, so this measures how centered the candidate is.
// 3.  **Deterministic Choice**: The lowest score wins. Ties go to the candidate seen
//     first in (min, max, blob) enumeration order.
// 4.  **Soft Failure**: A region where no pair yields a blob simply has no pupil
//     this frame. That is a normal outcome, reported as `None`.

use crate::core_modules::blob::Blob;
use crate::core_modules::connected_components::labeler;
use crate::core_modules::eye::ThresholdBand;
use crate::core_modules::geometry::{Point, Rectangle};
use crate::core_modules::stats;
use image::GrayImage;
use image::imageops;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

const SIZE_WEIGHT: f64 = 50.0;
const ANGLE_WEIGHT: f64 = 50.0;
const CENTERED_ANGLE_DEGREES: f64 = 45.0;

/// Tunables of the threshold sweep and the scoring priors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Lowest intensity the sweep starts at.
    pub min_intensity: u8,
    /// Highest intensity a band may reach.
    pub max_intensity: u8,
    /// Distance between consecutive band edges.
    pub step: u8,
    /// Pupil area, in pixels, the size prior expects.
    pub expected_area: f64,
    /// Blobs of this many pixels or fewer are ignored.
    pub min_blob_area: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_intensity: 0,
            max_intensity: 35,
            step: 5,
            expected_area: 20_000.0,
            min_blob_area: 1,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.step == 0 {
            return Err("selector step must be greater than zero".to_string());
        }
        if self.min_intensity >= self.max_intensity {
            return Err(format!(
                "selector band is empty: min_intensity {} must be below max_intensity {}",
                self.min_intensity, self.max_intensity
            ));
        }
        if !(self.expected_area > 0.0) {
            return Err(format!(
                "expected_area must be positive, got {}",
                self.expected_area
            ));
        }
        Ok(())
    }
}

/// A scored pupil candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PupilCandidate {
    /// The blob, in region-local coordinates.
    pub blob: Blob,
    pub band: ThresholdBand,
    pub score: f64,
}

pub struct PupilSelector {
    config: SelectorConfig,
}

impl PupilSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Finds the pupil inside `region` of a full grayscale `frame`.
    /// `region` must lie inside the frame.
    pub fn select(&self, frame: &GrayImage, region: Rectangle) -> Option<PupilCandidate> {
        let sub_image =
            imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image();
        self.select_in(&sub_image, region)
    }

    /// Finds the pupil in an already cropped `sub_image` that was cut out of `region`.
    pub fn select_in(&self, sub_image: &GrayImage, region: Rectangle) -> Option<PupilCandidate> {
        let mut best: Option<PupilCandidate> = None;
        for (blob, band) in self.candidates(sub_image) {
            let score = self.score(&blob, region);
            trace!(
                "candidate area={} centroid=({}, {}) band={}..={} score={:.3}",
                blob.area(),
                blob.centroid().x,
                blob.centroid().y,
                band.min,
                band.max,
                score
            );
            let better = match &best {
                Some(current) => score < current.score,
                None => true,
            };
            if better {
                best = Some(PupilCandidate { blob, band, score });
            }
        }

        match &best {
            Some(winner) => debug!(
                "pupil in {:?}: area={} band={}..={} score={:.3}",
                region, winner.blob.area(), winner.band.min, winner.band.max, winner.score
            ),
            None => debug!("no pupil found in {:?}", region),
        }
        best
    }

    /// Every surviving blob of every band, in enumeration order.
    pub fn candidates(&self, sub_image: &GrayImage) -> Vec<(Blob, ThresholdBand)> {
        let mut found = Vec::new();
        for band in self.threshold_pairs() {
            let binary = binarize_in_range(sub_image, band);
            let blobs = labeler::find_blobs(&binary, self.config.min_blob_area);
            trace!("band {}..={} produced {} blobs", band.min, band.max, blobs.len());
            found.extend(blobs.into_iter().map(|blob| (blob, band)));
        }
        found
    }

    /// The (min, max) pairs swept across the configured band, min-major.
    pub fn threshold_pairs(&self) -> Vec<ThresholdBand> {
        let step = self.config.step.max(1) as u16;
        let lowest = self.config.min_intensity as u16;
        let highest = self.config.max_intensity as u16;

        let mut pairs = Vec::new();
        let mut min = lowest;
        while min < highest {
            let mut max = min + step;
            while max <= highest {
                pairs.push(ThresholdBand {
                    min: min as u8,
                    max: max as u8,
                });
                max += step;
            }
            min += step;
        }
        pairs
    }

    /// Weighted error of `blob` as a pupil of `region`. Lower is better.
    pub fn score(&self, blob: &Blob, region: Rectangle) -> f64 {
        let expected = self.config.expected_area;
        let size_error = (blob.area() as f64 - expected).abs() / expected;
        let center = blob.centroid() + region.origin();
        let angle_error = average_angle_deviation(center, region) / CENTERED_ANGLE_DEGREES;
        SIZE_WEIGHT * size_error + ANGLE_WEIGHT * angle_error
    }
}

/// Mean of `|45 - angle(point -> corner)|` over the four corners of `region`.
pub fn average_angle_deviation(point: Point, region: Rectangle) -> f64 {
    let deviations: Vec<f64> = region
        .corners()
        .iter()
        .map(|corner| (CENTERED_ANGLE_DEGREES - angle_degrees(point, *corner)).abs())
        .collect();
    stats::mean(&deviations)
}

/// Angle of the segment between two points against the horizontal, folded into [0, 90].
pub fn angle_degrees(from: Point, to: Point) -> f64 {
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    dy.atan2(dx).to_degrees()
}

/// Foreground (255) where `band.min <= v <= band.max`, background (0) elsewhere.
pub fn binarize_in_range(gray: &GrayImage, band: ThresholdBand) -> GrayImage {
    let mut binary = gray.clone();
    for pixel in binary.pixels_mut() {
        let value = pixel.0[0];
        pixel.0[0] = if value >= band.min && value <= band.max { 255 } else { 0 };
    }
    binary
}
