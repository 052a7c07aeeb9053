// THEORY:
// Region proposals come from an external eye detector that usually runs on a
// downscaled "working resolution" copy of the frame. This module holds the thin
// glue between that detector and the tracker: the proposal type itself, the scale
// factor between working and frame resolution, and a size normalization that gives
// every proposal of a frame the same footprint so both eyes are searched alike.

use crate::core_modules::geometry::Rectangle;

/// The largest side, in pixels, detectors are expected to work at.
pub const DEFAULT_MAX_WORK_SIZE: u32 = 160;

/// An externally detected rectangle presumed to bound an eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionProposal {
    pub rect: Rectangle,
    pub confidence: Option<f64>,
}

impl RegionProposal {
    pub fn new(rect: Rectangle) -> Self {
        Self {
            rect,
            confidence: None,
        }
    }

    pub fn with_confidence(rect: Rectangle, confidence: f64) -> Self {
        Self {
            rect,
            confidence: Some(confidence),
        }
    }

    /// Maps a proposal found at working resolution back to frame resolution.
    /// `factor` is frame size divided by working size.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |v: u32| (v as f64 * factor).round().max(0.0) as u32;
        Self {
            rect: Rectangle::new(
                scale(self.rect.x),
                scale(self.rect.y),
                scale(self.rect.width),
                scale(self.rect.height),
            ),
            confidence: self.confidence,
        }
    }
}

/// Factor that shrinks a `width` x `height` frame so its larger side fits in `max_work_size`.
pub fn working_scale(width: u32, height: u32, max_work_size: u32) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    (max_work_size as f64 / width as f64).min(max_work_size as f64 / height as f64)
}

/// Resizes every rectangle to the size of the smallest-area one, keeping each
/// rectangle's own center. Coordinates saturate at zero.
pub fn normalize_region_sizes(rects: &[Rectangle]) -> Vec<Rectangle> {
    let Some(smallest) = rects.iter().min_by_key(|rect| rect.area()) else {
        return Vec::new();
    };
    let (width, height) = (smallest.width, smallest.height);

    rects
        .iter()
        .map(|rect| {
            let center = rect.centroid();
            let x = (center.x - width as f64 / 2.0).round().max(0.0) as u32;
            let y = (center.y - height as f64 / 2.0).round().max(0.0) as u32;
            Rectangle::new(x, y, width, height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_scale_fits_larger_side() {
        assert_eq!(working_scale(640, 480, 160), 0.25);
        assert_eq!(working_scale(0, 480, 160), 1.0);
    }

    #[test]
    fn scaling_back_to_frame_resolution() {
        let proposal = RegionProposal::with_confidence(Rectangle::new(10, 5, 8, 4), 0.9);
        let scaled = proposal.scaled(4.0);
        assert_eq!(scaled.rect, Rectangle::new(40, 20, 32, 16));
        assert_eq!(scaled.confidence, Some(0.9));
    }

    #[test]
    fn normalization_uses_smallest_rectangle() {
        let rects = [Rectangle::new(0, 0, 20, 20), Rectangle::new(100, 100, 10, 10)];
        let normalized = normalize_region_sizes(&rects);
        assert_eq!(
            normalized,
            vec![Rectangle::new(5, 5, 10, 10), Rectangle::new(100, 100, 10, 10)]
        );
    }

    #[test]
    fn normalization_saturates_at_origin() {
        // The smallest area is the wide, flat one; the narrow one cannot re-center.
        let rects = [Rectangle::new(0, 0, 2, 10), Rectangle::new(50, 0, 8, 1)];
        let normalized = normalize_region_sizes(&rects);
        assert_eq!(normalized[0], Rectangle::new(0, 5, 8, 1));
        assert!(normalize_region_sizes(&[]).is_empty());
    }
}
