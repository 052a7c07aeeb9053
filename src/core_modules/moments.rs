// THEORY:
// The `moments` module turns a bare list of pixel indices into a `Blob`. It computes
// the zeroth moment (area) and the two first-order moments (sum of columns, sum of
// rows) of a pixel group, which is all that is needed for an area and a centroid.
//
// Centroids are snapped to the pixel grid. Groups whose area does not exceed the
// caller's floor are dropped here and never become blobs, so tiny specks of noise
// stop at this layer instead of reaching pupil selection.

use crate::core_modules::blob::Blob;
use crate::core_modules::geometry::Point;

/// Summarizes one pixel-index group of a `width`-wide raster.
/// Returns `None` when the group's area is `min_area` or less.
pub fn blob_from_group(group: &[usize], width: u32, min_area: usize) -> Option<Blob> {
    let m00 = group.len();
    if m00 <= min_area || width == 0 {
        return None;
    }

    let width = width as usize;
    let mut m10 = 0usize;
    let mut m01 = 0usize;
    for index in group {
        m10 += index % width;
        m01 += index / width;
    }

    let centroid = Point::new(m10 as f64 / m00 as f64, m01 as f64 / m00 as f64).rounded();
    Some(Blob::new(centroid, group.to_vec(), m00))
}

/// Summarizes every group, keeping the input order for the survivors.
pub fn get_moments<G>(groups: &[G], width: u32, min_area: usize) -> Vec<Blob>
where
    G: AsRef<[usize]>,
{
    groups
        .iter()
        .filter_map(|group| blob_from_group(group.as_ref(), width, min_area))
        .collect()
}
