// THEORY:
// The `MovingAverageSmoother` dampens the jitter of a per-frame pupil estimate. It
// keeps a fixed-length window of recent points (FIFO) and reports their mean, so a
// single noisy frame only moves the output by a fraction of its error.
//
// Gross misdetections (a glint on glasses, a blink, an eyelash blob) are rejected
// with a 3-sigma test on the distance of each buffered point to an anchor point.
// Points further away than mean + 3 * std_dev are left out of the average for this
// call only. They stay in the window and age out normally.

use crate::core_modules::geometry::Point;
use crate::core_modules::stats;
use std::collections::VecDeque;

pub const DEFAULT_SMOOTHING_LENGTH: usize = 5;
const ACCEPTABLE_STD_DEVS: f64 = 3.0;

/// Fixed-length moving average over points with outlier rejection.
#[derive(Debug, Clone)]
pub struct MovingAverageSmoother {
    window: VecDeque<Point>,
    last_mean: Option<Point>,
}

impl MovingAverageSmoother {
    /// Creates a window of `length` copies of `initial`. A length of zero is raised to one.
    pub fn new(initial: Point, length: usize) -> Self {
        let length = length.max(1);
        Self {
            window: std::iter::repeat_n(initial, length).collect(),
            last_mean: None,
        }
    }

    /// Pushes `value`, evicting the oldest point, and returns the outlier-filtered
    /// mean of the window. Distances for the outlier test are measured to `anchor`.
    pub fn compound(&mut self, value: Point, anchor: Point) -> Point {
        self.window.pop_front();
        self.window.push_back(value);

        let distances: Vec<f64> = self.window.iter().map(|p| p.distance_to(&anchor)).collect();
        let (mean_distance, std_dev) = stats::mean_and_std_dev(&distances);
        let limit = mean_distance + ACCEPTABLE_STD_DEVS * std_dev;

        let kept: Vec<Point> = self
            .window
            .iter()
            .zip(&distances)
            .filter(|(_, distance)| **distance <= limit)
            .map(|(point, _)| *point)
            .collect();

        let mean = if kept.is_empty() {
            Self::mean_point(self.window.iter())
        } else {
            Self::mean_point(kept.iter())
        };
        self.last_mean = Some(mean);
        mean
    }

    /// Result of the most recent `compound` call.
    pub fn last_result(&self) -> Option<Point> {
        self.last_mean
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.window.iter()
    }

    /// Resizes the window. Shrinking keeps the newest points, growing repeats the newest one.
    pub fn set_length(&mut self, length: usize) {
        let length = length.max(1);
        while self.window.len() > length {
            self.window.pop_front();
        }
        if let Some(&newest) = self.window.back() {
            while self.window.len() < length {
                self.window.push_back(newest);
            }
        }
    }

    fn mean_point<'a>(points: impl Iterator<Item = &'a Point>) -> Point {
        let (xs, ys): (Vec<f64>, Vec<f64>) = points.map(|p| (p.x, p.y)).unzip();
        Point::new(stats::mean(&xs), stats::mean(&ys)).rounded()
    }
}
