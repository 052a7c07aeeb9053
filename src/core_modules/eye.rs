// THEORY:
// The `eye` module holds the per-frame records that tie the layers together. An
// `Eye` is one region proposal plus everything learned about it this frame: which
// pupil blob won, at which threshold band, under which persistent id, and where the
// smoothed pupil center sits. A `TrackingRecord` is the collection of eyes for a
// frame, indexed by id, plus the per-id smoothers that must outlive a single frame.
//
// The record is the only state carried from one frame cycle to the next. The caller
// owns it and hands it back in, so there is no hidden tracking memory anywhere else.

use crate::core_modules::blob::Blob;
use crate::core_modules::geometry::{Point, Rectangle};
use crate::core_modules::smoother::MovingAverageSmoother;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// An opaque identifier for a continuously tracked eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EyeId(Uuid);

impl EyeId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for EyeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The inclusive intensity band a pupil was binarized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThresholdBand {
    pub min: u8,
    pub max: u8,
}

/// Distances from the pupil center to each corner of the eye region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerDistances {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_left: f64,
    pub bottom_right: f64,
}

/// One detected eye for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Eye {
    id: Option<EyeId>,
    /// The eye region in frame pixels.
    pub region: Rectangle,
    /// The winning pupil blob, in region-local coordinates.
    pub pupil: Option<Blob>,
    pub threshold_band: Option<ThresholdBand>,
    /// Smoothed pupil center, in frame coordinates.
    pub smoothed_centroid: Option<Point>,
}

impl Eye {
    pub fn new(region: Rectangle) -> Self {
        Self {
            id: None,
            region,
            pupil: None,
            threshold_band: None,
            smoothed_centroid: None,
        }
    }

    pub fn id(&self) -> Option<EyeId> {
        self.id
    }

    /// Gives the eye its id. An eye that already has an id keeps it; returns
    /// `false` in that case.
    pub fn assign_id(&mut self, id: EyeId) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(id);
        true
    }

    /// Center of the region; this is what identities are matched on.
    pub fn region_centroid(&self) -> Point {
        self.region.centroid()
    }

    /// Pupil centroid translated into frame coordinates.
    pub fn pupil_center_in_frame(&self) -> Option<Point> {
        self.pupil
            .as_ref()
            .map(|pupil| pupil.centroid() + self.region.origin())
    }

    pub fn corner_distances(&self) -> Option<CornerDistances> {
        let center = self.pupil_center_in_frame()?;
        let [top_left, top_right, bottom_left, bottom_right] = self.region.corners();
        Some(CornerDistances {
            top_left: center.distance_to(&top_left),
            top_right: center.distance_to(&top_right),
            bottom_left: center.distance_to(&bottom_left),
            bottom_right: center.distance_to(&bottom_right),
        })
    }

    /// Sum of the vectors from each region corner to the pupil centroid.
    /// Zero when the pupil sits in the middle of the region; it points towards
    /// the side the pupil has moved to, which makes it a crude gaze direction.
    pub fn resultant_vector(&self) -> Option<Point> {
        let centroid = self.pupil.as_ref()?.centroid();
        let local = Rectangle::new(0, 0, self.region.width, self.region.height);
        Some(
            local
                .corners()
                .iter()
                .fold(Point::default(), |sum, corner| sum + (centroid - *corner)),
        )
    }
}

/// Eyes of one frame, their id index, and the smoothers keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TrackingRecord {
    eyes: Vec<Eye>,
    id_map: HashMap<EyeId, usize>,
    smoothers: HashMap<EyeId, MovingAverageSmoother>,
}

impl TrackingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record around `eyes`, indexing every eye that carries an id.
    pub fn from_eyes(eyes: Vec<Eye>, smoothers: HashMap<EyeId, MovingAverageSmoother>) -> Self {
        let id_map = eyes
            .iter()
            .enumerate()
            .filter_map(|(index, eye)| eye.id().map(|id| (id, index)))
            .collect();
        Self {
            eyes,
            id_map,
            smoothers,
        }
    }

    pub fn eyes(&self) -> &[Eye] {
        &self.eyes
    }

    pub fn eye(&self, id: &EyeId) -> Option<&Eye> {
        self.id_map.get(id).map(|&index| &self.eyes[index])
    }

    pub fn ids(&self) -> impl Iterator<Item = &EyeId> + '_ {
        self.id_map.keys()
    }

    pub fn len(&self) -> usize {
        self.eyes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eyes.is_empty()
    }

    pub fn smoother(&self, id: &EyeId) -> Option<&MovingAverageSmoother> {
        self.smoothers.get(id)
    }

    /// Hands the smoothers over to the next frame's record.
    pub fn take_smoothers(&mut self) -> HashMap<EyeId, MovingAverageSmoother> {
        std::mem::take(&mut self.smoothers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye_with_pupil(region: Rectangle, centroid: Point) -> Eye {
        let mut eye = Eye::new(region);
        eye.pupil = Some(Blob::new(centroid, vec![0], 1));
        eye
    }

    #[test]
    fn id_is_assigned_once() {
        let mut eye = Eye::new(Rectangle::new(0, 0, 10, 10));
        let first = EyeId::new(Uuid::from_u128(1));
        assert!(eye.assign_id(first));
        assert!(!eye.assign_id(EyeId::new(Uuid::from_u128(2))));
        assert_eq!(eye.id(), Some(first));
    }

    #[test]
    fn pupil_center_is_translated_to_frame() {
        let eye = eye_with_pupil(Rectangle::new(100, 40, 20, 10), Point::new(5.0, 5.0));
        assert_eq!(eye.pupil_center_in_frame(), Some(Point::new(105.0, 45.0)));
    }

    #[test]
    fn centered_pupil_has_zero_resultant_and_equal_corner_distances() {
        let eye = eye_with_pupil(Rectangle::new(30, 30, 20, 10), Point::new(10.0, 5.0));
        assert_eq!(eye.resultant_vector(), Some(Point::default()));
        let d = eye.corner_distances().unwrap();
        assert_eq!(d.top_left, d.bottom_right);
        assert_eq!(d.top_right, d.bottom_left);
        assert_eq!(d.top_left, d.top_right);
    }

    #[test]
    fn off_center_pupil_points_towards_its_side() {
        let eye = eye_with_pupil(Rectangle::new(0, 0, 20, 10), Point::new(15.0, 5.0));
        assert_eq!(eye.resultant_vector(), Some(Point::new(20.0, 0.0)));
    }

    #[test]
    fn no_pupil_means_no_gaze_geometry() {
        let eye = Eye::new(Rectangle::new(0, 0, 20, 10));
        assert!(eye.corner_distances().is_none());
        assert!(eye.resultant_vector().is_none());
    }

    #[test]
    fn record_indexes_eyes_by_id() {
        let id = EyeId::new(Uuid::from_u128(9));
        let mut tracked = Eye::new(Rectangle::new(0, 0, 4, 4));
        tracked.assign_id(id);
        let record = TrackingRecord::from_eyes(
            vec![Eye::new(Rectangle::new(9, 9, 2, 2)), tracked.clone()],
            HashMap::new(),
        );
        assert_eq!(record.len(), 2);
        assert_eq!(record.eye(&id), Some(&tracked));
        assert_eq!(record.ids().count(), 1);
    }
}
