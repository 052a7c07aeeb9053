// THEORY:
// The `geometry` module holds the two "dumb" value types every other layer speaks:
// a `Point` on the image plane and an axis-aligned `Rectangle` describing an eye
// region. Like `Pixel` is to a chunk, these carry no behavior beyond the small,
// self-contained arithmetic needed to compare them (distance, translation, corners).
//
// Coordinates are `f64` for points because region centroids land on half pixels,
// while rectangles stay in whole pixels since they are used to crop raster data.

use std::ops::{Add, Sub};

/// A 2D point on the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Snaps both coordinates to the nearest whole pixel (halves round away from zero).
    pub fn rounded(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned region in frame pixels, as handed over by the region proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    pub fn centroid(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        let left = self.x as f64;
        let top = self.y as f64;
        let right = left + self.width as f64;
        let bottom = top + self.height as f64;
        [
            Point::new(left, top),
            Point::new(right, top),
            Point::new(left, bottom),
            Point::new(right, bottom),
        ]
    }

    /// Intersects the rectangle with a `width` x `height` frame.
    /// Returns `None` when nothing of the rectangle lies inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Rectangle> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped_width = self.width.min(width - self.x);
        let clamped_height = self.height.min(height - self.y);
        if clamped_width == 0 || clamped_height == 0 {
            return None;
        }
        Some(Rectangle::new(self.x, self.y, clamped_width, clamped_height))
    }
}
