// THEORY:
// A `Blob` is a single connected region of foreground pixels found in one binarized
// sub-image. It is a "dumb", immutable snapshot: once the moment extractor has
// summarized a pixel group into a centroid and an area, nothing downstream may
// change it. Selection and tracking only read blobs, they never edit them.
//
// The contour is kept as the raw list of linear pixel indices (row * width + col)
// in the order the labeler enumerated them, which is not necessarily raster order.

use crate::core_modules::geometry::Point;

/// A connected foreground region with its derived centroid and area.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    centroid: Point,
    contour: Vec<usize>,
    area: usize,
}

impl Blob {
    pub fn new(centroid: Point, contour: Vec<usize>, area: usize) -> Self {
        Self {
            centroid,
            contour,
            area,
        }
    }

    /// Centroid in the coordinates of the raster the blob was found in.
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Linear pixel indices making up the region.
    pub fn contour(&self) -> &[usize] {
        &self.contour
    }

    /// Pixel count.
    pub fn area(&self) -> usize {
        self.area
    }

    /// The same blob with its centroid moved by `offset`. The contour keeps
    /// indexing the raster the blob was found in.
    pub fn translated(&self, offset: Point) -> Blob {
        Blob {
            centroid: self.centroid + offset,
            contour: self.contour.clone(),
            area: self.area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_moves_only_the_centroid() {
        let blob = Blob::new(Point::new(4.0, 6.0), vec![1, 2, 3], 3);
        let moved = blob.translated(Point::new(-2.0, 5.0));
        assert_eq!(moved.centroid(), Point::new(2.0, 11.0));
        assert_eq!(moved.contour(), blob.contour());
        assert_eq!(moved.area(), 3);
    }
}
