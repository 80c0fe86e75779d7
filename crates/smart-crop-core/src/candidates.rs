//! Candidate extractor and single-candidate noise suppression.

use image::{GrayImage, Luma};
use imageproc::contours::find_contours;

use crate::binarize::BinaryMask;
use crate::types::{AnchorPos, Candidate, Orientation};

fn mask_to_gray_image(mask: &BinaryMask) -> GrayImage {
    GrayImage::from_raw(mask.width, mask.height, mask.data.clone())
        .expect("binary mask dimensions match its data buffer")
}

/// Pulls axis-aligned bounding rectangles of connected components out of
/// `mask`, applying the mode-specific aspect/scale filters.
pub fn extract_candidates(
    mask: &BinaryMask,
    target_w: u32,
    target_h: u32,
    typical_h: f64,
    orientation: Orientation,
) -> Vec<Candidate> {
    let image = mask_to_gray_image(mask);
    let contours = find_contours::<i32>(&image);

    let min_area = 1e-4 * (target_w as f64) * (target_h as f64);

    contours
        .into_iter()
        .filter_map(|contour| {
            if contour.points.is_empty() {
                return None;
            }
            let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
            let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
            for p in &contour.points {
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
                min_y = min_y.min(p.y);
                max_y = max_y.max(p.y);
            }
            let w = max_x - min_x + 1;
            let h = max_y - min_y + 1;
            if w <= 0 || h <= 0 {
                return None;
            }

            let candidate = Candidate {
                x: min_x,
                y: min_y,
                w,
                h,
                contour_points: contour.points.iter().map(|p| (p.x, p.y)).collect(),
            };

            if candidate.area() < min_area {
                return None;
            }

            let aspect = candidate.aspect();
            match orientation {
                Orientation::Horizontal => {
                    if aspect < 0.5 {
                        return None;
                    }
                }
                Orientation::Vertical => {
                    if aspect > 0.5 || candidate.w < 5 {
                        return None;
                    }
                }
            }

            if typical_h > 0.0 {
                let (low, high) = match orientation {
                    Orientation::Vertical => (0.4, 2.5),
                    Orientation::Horizontal => (0.7, 2.0),
                };
                let metric = match orientation {
                    Orientation::Vertical => candidate.w as f64,
                    Orientation::Horizontal => candidate.h as f64,
                };
                if metric < typical_h * low || metric > typical_h * high {
                    return None;
                }
            }

            Some(candidate)
        })
        .collect()
}

/// Drops an isolated single candidate that does not align with the running
/// dialogue anchor, almost always UI chrome rather than real dialogue.
/// Returns `true` when the candidate should be kept.
pub fn passes_singleton_suppression(
    candidate: &Candidate,
    anchor: AnchorPos,
    typical_h: f64,
    orientation: Orientation,
) -> bool {
    if typical_h <= 0.0 {
        return true;
    }

    match orientation {
        Orientation::Horizontal => {
            let dist_x = (candidate.x as f64 - anchor.x).abs();
            let near_start = anchor.is_set() && dist_x <= 3.0 * typical_h;
            candidate.w as f64 >= 5.0 * typical_h || near_start
        }
        Orientation::Vertical => (candidate.y as f64 - anchor.y).abs() <= 10.0 * typical_h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_rect(w: u32, h: u32, rx: u32, ry: u32, rw: u32, rh: u32) -> BinaryMask {
        let mut data = vec![0u8; (w * h) as usize];
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                data[(y * w + x) as usize] = 255;
            }
        }
        BinaryMask {
            width: w,
            height: h,
            data,
        }
    }

    #[test]
    fn extracts_wide_horizontal_block() {
        let mask = mask_with_rect(960, 960, 100, 100, 200, 30);
        let cands = extract_candidates(&mask, 960, 960, -1.0, Orientation::Horizontal);
        assert_eq!(cands.len(), 1);
        assert!(cands[0].w >= 199);
    }

    #[test]
    fn rejects_narrow_block_in_horizontal_mode() {
        let mask = mask_with_rect(960, 960, 100, 100, 10, 30);
        let cands = extract_candidates(&mask, 960, 960, -1.0, Orientation::Horizontal);
        assert!(cands.is_empty());
    }

    #[test]
    fn singleton_near_anchor_survives() {
        let candidate = Candidate {
            x: 300,
            y: 10,
            w: 80,
            h: 40,
            contour_points: vec![],
        };
        let anchor = AnchorPos { x: 300.0, y: 10.0 };
        assert!(passes_singleton_suppression(
            &candidate,
            anchor,
            40.0,
            Orientation::Horizontal
        ));
    }

    #[test]
    fn singleton_far_from_anchor_is_dropped() {
        let candidate = Candidate {
            x: 1500,
            y: 40,
            w: 80,
            h: 40,
            contour_points: vec![],
        };
        let anchor = AnchorPos { x: 300.0, y: 40.0 };
        assert!(!passes_singleton_suppression(
            &candidate,
            anchor,
            40.0,
            Orientation::Horizontal
        ));
    }
}
