use image::{GrayImage, Luma};
use pupil_vision::core_modules::eye::{EyeId, ThresholdBand, TrackingRecord};
use pupil_vision::core_modules::geometry::{Point, Rectangle};
use pupil_vision::core_modules::identity_tracker::SequentialIdGenerator;
use pupil_vision::core_modules::pupil_selector::SelectorConfig;
use pupil_vision::core_modules::region::RegionProposal;
use pupil_vision::{EyePipeline, PipelineConfig, PipelineError};
use uuid::Uuid;

const WIDTH: u32 = 120;
const HEIGHT: u32 = 60;
const LEFT: Rectangle = Rectangle {
    x: 10,
    y: 10,
    width: 40,
    height: 40,
};
const RIGHT: Rectangle = Rectangle {
    x: 70,
    y: 10,
    width: 40,
    height: 40,
};

/// A bright frame with a dark 6x6 pupil centered on each given frame coordinate.
fn frame(pupils: &[(u32, u32)]) -> GrayImage {
    let mut image = GrayImage::from_pixel(WIDTH, HEIGHT, Luma([200]));
    for &(cx, cy) in pupils {
        for y in cy - 3..cy + 3 {
            for x in cx - 3..cx + 3 {
                image.put_pixel(x, y, Luma([8]));
            }
        }
    }
    image
}

fn config() -> PipelineConfig {
    PipelineConfig {
        selector: SelectorConfig {
            expected_area: 36.0,
            ..SelectorConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn pipeline() -> EyePipeline<SequentialIdGenerator> {
    EyePipeline::with_id_generator(config(), SequentialIdGenerator::new()).unwrap()
}

fn proposals(rects: &[Rectangle]) -> Vec<RegionProposal> {
    rects.iter().copied().map(RegionProposal::new).collect()
}

fn id(n: u128) -> EyeId {
    EyeId::new(Uuid::from_u128(n))
}

#[test]
fn first_frame_assigns_ids_and_finds_pupils() {
    let mut pipeline = pipeline();
    let report = pipeline
        .process_frame(&frame(&[(30, 30), (90, 30)]), &proposals(&[LEFT, RIGHT]), TrackingRecord::new())
        .unwrap();

    assert!(report.lost.is_empty());
    let eyes = report.eyes();
    assert_eq!(eyes.len(), 2);
    assert_eq!(eyes[0].id(), Some(id(1)));
    assert_eq!(eyes[1].id(), Some(id(2)));
    assert_eq!(eyes[0].pupil_center_in_frame(), Some(Point::new(30.0, 30.0)));
    assert_eq!(eyes[1].smoothed_centroid, Some(Point::new(90.0, 30.0)));
    assert_eq!(eyes[0].threshold_band, Some(ThresholdBand { min: 0, max: 10 }));
    assert!(report.record.smoother(&id(1)).is_some());
}

#[test]
fn ids_survive_across_frames_and_centroids_are_smoothed() {
    let mut pipeline = pipeline();
    let regions = proposals(&[LEFT, RIGHT]);

    let first = pipeline
        .process_frame(&frame(&[(30, 30), (90, 30)]), &regions, TrackingRecord::new())
        .unwrap();
    let second = pipeline
        .process_frame(&frame(&[(34, 30), (90, 30)]), &regions, first.record)
        .unwrap();

    assert!(second.lost.is_empty());
    let left = second.record.eye(&id(1)).unwrap();
    assert_eq!(left.pupil_center_in_frame(), Some(Point::new(34.0, 30.0)));
    assert_eq!(left.smoothed_centroid, Some(Point::new(31.0, 30.0)));
    assert_eq!(second.record.eye(&id(2)).unwrap().region, RIGHT);
}

#[test]
fn eye_without_pupil_keeps_previous_values() {
    let mut pipeline = pipeline();
    let regions = proposals(&[LEFT, RIGHT]);

    let first = pipeline
        .process_frame(&frame(&[(30, 30), (90, 30)]), &regions, TrackingRecord::new())
        .unwrap();
    let previous_left = first.record.eye(&id(1)).unwrap().clone();
    let second = pipeline
        .process_frame(&frame(&[(90, 30)]), &regions, first.record)
        .unwrap();

    let left = second.record.eye(&id(1)).unwrap();
    assert_eq!(left.pupil, previous_left.pupil);
    assert_eq!(left.threshold_band, previous_left.threshold_band);
    assert_eq!(left.smoothed_centroid, previous_left.smoothed_centroid);
}

#[test]
fn retained_pupil_stays_put_when_region_moves() {
    let mut pipeline = pipeline();

    let first = pipeline
        .process_frame(&frame(&[(30, 30)]), &proposals(&[LEFT]), TrackingRecord::new())
        .unwrap();
    let before = first.eyes()[0].pupil_center_in_frame();
    let moved = Rectangle::new(16, 12, 40, 40);
    let second = pipeline
        .process_frame(&frame(&[]), &proposals(&[moved]), first.record)
        .unwrap();

    let left = second.record.eye(&id(1)).unwrap();
    assert_eq!(left.region, moved);
    assert_eq!(before, Some(Point::new(30.0, 30.0)));
    assert_eq!(left.pupil_center_in_frame(), before);
    assert_eq!(left.smoothed_centroid, before);
}

#[test]
fn normalized_regions_share_the_smallest_size() {
    let mut config = config();
    config.normalize_regions = true;
    let mut pipeline = EyePipeline::with_id_generator(config, SequentialIdGenerator::new()).unwrap();
    // Centered on the same point as RIGHT, but larger.
    let wide_right = Rectangle::new(65, 5, 50, 50);

    let report = pipeline
        .process_frame(&frame(&[(30, 30), (90, 30)]), &proposals(&[LEFT, wide_right]), TrackingRecord::new())
        .unwrap();

    let eyes = report.eyes();
    assert_eq!(eyes[0].region, LEFT);
    assert_eq!(eyes[1].region, RIGHT);
    assert_eq!(eyes[1].pupil_center_in_frame(), Some(Point::new(90.0, 30.0)));
}

#[test]
fn disappearing_eye_is_reported_lost() {
    let mut pipeline = pipeline();

    let first = pipeline
        .process_frame(&frame(&[(30, 30), (90, 30)]), &proposals(&[LEFT, RIGHT]), TrackingRecord::new())
        .unwrap();
    let second = pipeline
        .process_frame(&frame(&[(90, 30)]), &proposals(&[RIGHT]), first.record)
        .unwrap();

    assert_eq!(second.lost.len(), 1);
    assert_eq!(second.lost[0].id(), Some(id(1)));
    assert_eq!(second.eyes()[0].id(), Some(id(2)));
    assert!(second.record.smoother(&id(1)).is_none());
    assert!(second.record.smoother(&id(2)).is_some());
}

#[test]
fn regions_outside_the_frame_are_dropped() {
    let mut pipeline = pipeline();
    let outside = Rectangle::new(WIDTH + 5, 0, 10, 10);
    let report = pipeline
        .process_frame(&frame(&[(30, 30)]), &proposals(&[LEFT, outside]), TrackingRecord::new())
        .unwrap();
    assert_eq!(report.eyes().len(), 1);
    assert_eq!(report.eyes()[0].region, LEFT);
}

#[test]
fn rgba_frames_are_converted_to_grayscale() {
    let mut pipeline = pipeline();
    let gray = frame(&[(30, 30)]);
    let rgba: Vec<u8> = gray
        .as_raw()
        .iter()
        .flat_map(|&v| [v, v, v, 255])
        .collect();

    let report = pipeline
        .process_rgba(&rgba, WIDTH, HEIGHT, &proposals(&[LEFT]), TrackingRecord::new())
        .unwrap();
    assert_eq!(report.eyes()[0].pupil_center_in_frame(), Some(Point::new(30.0, 30.0)));
}

#[test]
fn mis_sized_rgba_buffer_is_rejected() {
    let mut pipeline = pipeline();
    let result = pipeline.process_rgba(&[0u8; 10], WIDTH, HEIGHT, &[], TrackingRecord::new());
    assert!(matches!(result, Err(PipelineError::FrameSize { actual: 10, .. })));
}

#[test]
fn invalid_config_is_rejected() {
    let mut bad = config();
    bad.selector.step = 0;
    assert!(matches!(
        EyePipeline::new(bad),
        Err(PipelineError::InvalidConfig(_))
    ));

    let mut bad = config();
    bad.smoothing_length = 0;
    assert!(bad.validate().is_err());
}

#[test]
fn config_loads_from_partial_json() {
    let path = std::env::temp_dir().join(format!("pupil_vision_config_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "selector": { "expected_area": 400.0 }, "normalize_regions": true }"#).unwrap();

    let loaded = PipelineConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.selector.expected_area, 400.0);
    assert_eq!(loaded.selector.max_intensity, 35);
    assert_eq!(loaded.smoothing_length, 5);
    assert!(loaded.normalize_regions);
}
