// THEORY:
// The connected-component labeler is the engine of the spatial grouping layer. It
// takes a binary raster (the output of thresholding an eye sub-image) and finds
// every 8-connected region of foreground pixels, which then become `Blob`s.
//
// Key architectural principles & algorithm steps:
// 1.  **Single Raster Pass**: Pixels are visited row by row, left to right. For each
//     foreground pixel only its causal neighborhood is inspected: the upper-left,
//     upper and upper-right pixels of the previous row and the pixel to its left.
//     Those are the only neighbors that already carry a label.
// 2.  **Provisional Labels**: A pixel with no labeled neighbor starts a new label
//     (its own index) and a singleton group. Otherwise it adopts the largest
//     neighbor label and every distinct neighbor label is unioned into its group.
// 3.  **Deferred Relabeling**: Label equivalences are resolved by the `UnionFind`
//     as they are discovered, and each group already owns its full member list.
//     Enumerating the groups after the scan gives each region's pixels directly,
//     so no second relabeling sweep is needed.
// 4.  **Stateless Utility**: Nothing survives between calls; one binary image in,
//     one list of groups or blobs out.

use crate::core_modules::blob::Blob;
use crate::core_modules::moments;
use crate::core_modules::union_find::UnionFind;
use image::GrayImage;

pub mod labeler {
    use super::*;

    /// Offsets (dx, dy) of the neighbors already visited in raster order.
    const CAUSAL_NEIGHBORS: [(i64, i64); 4] = [(-1, -1), (0, -1), (1, -1), (-1, 0)];

    /// Groups every 8-connected foreground region of `binary` into lists of
    /// linear pixel indices (`row * width + col`). Groups come out in ascending
    /// order of their leader index.
    pub fn label_groups(binary: &GrayImage) -> Vec<Vec<usize>> {
        let (width, height) = binary.dimensions();
        let width_usize = width as usize;
        let data = binary.as_raw();

        let mut labels: Vec<Option<usize>> = vec![None; data.len()];
        let mut uf: UnionFind<usize> = UnionFind::new();
        let mut neighbor_labels: Vec<usize> = Vec::with_capacity(CAUSAL_NEIGHBORS.len());

        for row in 0..height as i64 {
            for col in 0..width as i64 {
                let current = row as usize * width_usize + col as usize;
                if data[current] == 0 {
                    continue;
                }

                neighbor_labels.clear();
                for (dx, dy) in CAUSAL_NEIGHBORS {
                    let nx = col + dx;
                    let ny = row + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 {
                        continue;
                    }
                    let neighbor = ny as usize * width_usize + nx as usize;
                    if let Some(label) = labels[neighbor] {
                        if !neighbor_labels.contains(&label) {
                            neighbor_labels.push(label);
                        }
                    }
                }

                let Some(&label) = neighbor_labels.iter().max() else {
                    labels[current] = Some(current);
                    uf.make_singleton(current);
                    continue;
                };

                labels[current] = Some(label);
                uf.union(label, current);
                for &other in &neighbor_labels {
                    uf.union(label, other);
                }
            }
        }

        uf.into_groups()
    }

    /// Labels `binary` and summarizes each region whose area exceeds `min_area`.
    pub fn find_blobs(binary: &GrayImage, min_area: usize) -> Vec<Blob> {
        let groups = label_groups(binary);
        moments::get_moments(&groups, binary.width(), min_area)
    }
}
