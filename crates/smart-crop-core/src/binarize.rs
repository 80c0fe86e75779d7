//! Heatmap binarizer: thresholds the detector's per-pixel textness score
//! and dilates the result with a directional rectangular structuring
//! element, bridging characters along the reading axis while resisting
//! merges across it.

use crate::types::{Heatmap, Orientation};

fn threshold(score: f32, t: f32) -> u8 {
    if score >= t { 255 } else { 0 }
}

/// Dilates `mask` (row-major, 0/255) with a `(kw, kh)` rectangular
/// structuring element, `iterations` times, over a flat `Vec<u8>` mask.
fn dilate(mask: &[u8], width: u32, height: u32, kw: u32, kh: u32, iterations: u32) -> Vec<u8> {
    let (w, h) = (width as i32, height as i32);
    let half_kw = (kw / 2) as i32;
    let half_kh = (kh / 2) as i32;

    let mut current = mask.to_vec();
    for _ in 0..iterations {
        let mut next = vec![0u8; current.len()];
        for y in 0..h {
            for x in 0..w {
                if current[(y * w + x) as usize] == 0 {
                    continue;
                }
                let y0 = (y - half_kh).max(0);
                let y1 = (y + half_kh).min(h - 1);
                let x0 = (x - half_kw).max(0);
                let x1 = (x + half_kw).min(w - 1);
                for ny in y0..=y1 {
                    let row = (ny * w) as usize;
                    for nx in x0..=x1 {
                        next[row + nx as usize] = 255;
                    }
                }
            }
        }
        current = next;
    }
    current
}

/// Output of the binarizer: a flat 0/255 mask the same size as the heatmap.
pub struct BinaryMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Thresholds and dilates `heatmap` according to `orientation`.
///
/// Horizontal: threshold 0.3, kernel (5,3), 6 iterations.
/// Vertical: threshold 0.2, kernel (1,9), 8 iterations.
pub fn binarize(heatmap: &Heatmap, orientation: Orientation) -> BinaryMask {
    let (t, kw, kh, iterations) = match orientation {
        Orientation::Horizontal => (0.3_f32, 5, 3, 6),
        Orientation::Vertical => (0.2_f32, 1, 9, 8),
    };

    let thresholded: Vec<u8> = heatmap.data.iter().map(|&s| threshold(s, t)).collect();
    let dilated = dilate(
        &thresholded,
        heatmap.width,
        heatmap.height,
        kw,
        kh,
        iterations,
    );

    BinaryMask {
        width: heatmap.width,
        height: heatmap.height,
        data: dilated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_heatmap(w: u32, h: u32, on: &[(u32, u32)]) -> Heatmap {
        let mut data = vec![0.0f32; (w * h) as usize];
        for &(x, y) in on {
            data[(y * w + x) as usize] = 1.0;
        }
        Heatmap {
            width: w,
            height: h,
            data,
        }
    }

    #[test]
    fn horizontal_dilation_bridges_adjacent_pixels() {
        let hm = flat_heatmap(20, 10, &[(2, 5), (10, 5)]);
        let mask = binarize(&hm, Orientation::Horizontal);
        assert_eq!(mask.data[(5 * 20 + 6) as usize], 255);
    }

    #[test]
    fn empty_heatmap_yields_empty_mask() {
        let hm = flat_heatmap(10, 10, &[]);
        let mask = binarize(&hm, Orientation::Horizontal);
        assert!(mask.data.iter().all(|&v| v == 0));
    }
}
