//! Detect-cluster-select-merge text-region extractor for a screen-scraping
//! OCR/translation companion. Given a per-pixel textness heatmap for the
//! current frame, produces the bounding boxes belonging to the current
//! dialogue group (ADV) or every paragraph (NVL), continuously learning the
//! running title's character scale to reject UI chrome.
//!
//! This crate performs no I/O: it is a pure function of its inputs plus the
//! caller-owned [`types::ScaleTracker`]/[`types::AnchorPos`] state.

pub mod adv;
pub mod binarize;
pub mod candidates;
#[cfg(feature = "debug")]
pub mod debug;
pub mod grouper;
pub mod nvl;
pub mod postfilter;
pub mod resize;
pub mod scale_tracker;
pub mod types;

use image::RgbImage;

pub use types::{
    AnchorPos, Candidate, CropResult, Frame, Group, Heatmap, Mode, Orientation, OutputBox,
    Paragraph, ResizedFrame, ScaleTracker,
};

/// Runs the full pipeline for one request.
///
/// `frame_pixels` must already be in resized-frame space (same dimensions
/// as `heatmap`). It is used only for the ADV scorer's darkness term.
/// `anchor` is updated in place regardless of mode; the caller
/// commits the returned `pending_scale` to its [`ScaleTracker`] only once
/// downstream recognition confirms real text (see
/// [`scale_tracker::commit_if_confirmed`]).
pub fn compute(
    heatmap: &Heatmap,
    resized: ResizedFrame,
    frame_pixels: &RgbImage,
    mode: Mode,
    orientation: Orientation,
    typical_h: f64,
    anchor: &mut AnchorPos,
) -> CropResult {
    let mask = binarize::binarize(heatmap, orientation);
    let raw_candidates = candidates::extract_candidates(
        &mask,
        resized.target_w,
        resized.target_h,
        typical_h,
        orientation,
    );

    if raw_candidates.is_empty() {
        return CropResult::empty();
    }

    if raw_candidates.len() == 1
        && !candidates::passes_singleton_suppression(
            &raw_candidates[0],
            *anchor,
            typical_h,
            orientation,
        )
    {
        return CropResult::empty();
    }

    let selected: Vec<Candidate> = match mode {
        Mode::Adv => {
            let groups = grouper::group_candidates(&raw_candidates, orientation);
            let Some(best_idx) =
                adv::select_best(&groups, frame_pixels, resized.target_w, *anchor, orientation)
            else {
                return CropResult::empty();
            };
            let mut groups = groups;
            let seed = groups.remove(best_idx);
            adv::chain_merge(
                seed,
                groups,
                typical_h,
                resized.target_w,
                resized.target_h,
                orientation,
            )
        }
        Mode::Nvl => {
            let paragraphs = nvl::cluster_paragraphs(&raw_candidates);
            paragraphs.into_iter().flat_map(|p| p.0).collect()
        }
    };

    let filtered = postfilter::apply_final_size_filter(selected, typical_h, orientation);
    if filtered.is_empty() {
        return CropResult::empty();
    }

    postfilter::update_anchor(anchor, &filtered);
    let pending_scale =
        scale_tracker::compute_pending_val(&filtered, resized.target_w, resized.target_h, orientation);
    let ordered = postfilter::order_selection(filtered, orientation);
    let boxes = ordered
        .iter()
        .map(|c| postfilter::to_output_box(c, resized))
        .collect();

    CropResult {
        boxes,
        pending_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Heatmap;

    fn heatmap_with_rect(w: u32, h: u32, rx: u32, ry: u32, rw: u32, rh: u32) -> Heatmap {
        let mut data = vec![0.0f32; (w * h) as usize];
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                data[(y * w + x) as usize] = 1.0;
            }
        }
        Heatmap {
            width: w,
            height: h,
            data,
        }
    }

    #[test]
    fn s1_single_centered_dialogue_line() {
        let resized = ResizedFrame {
            target_w: 960,
            target_h: 544,
            scale_x: 1920.0 / 960.0,
            scale_y: 1080.0 / 544.0,
        };
        let hm = heatmap_with_rect(960, 544, 300, 450, 360, 30);
        let frame_pixels = RgbImage::new(960, 544);
        let mut anchor = AnchorPos::default();

        let result = compute(
            &hm,
            resized,
            &frame_pixels,
            Mode::Adv,
            Orientation::Horizontal,
            -1.0,
            &mut anchor,
        );

        assert_eq!(result.boxes.len(), 1);
        assert!(anchor.is_set());
    }

    #[test]
    fn empty_heatmap_returns_empty_and_leaves_anchor_unset() {
        let resized = ResizedFrame {
            target_w: 960,
            target_h: 544,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        let hm = heatmap_with_rect(960, 544, 0, 0, 0, 0);
        let frame_pixels = RgbImage::new(960, 544);
        let mut anchor = AnchorPos::default();

        let result = compute(
            &hm,
            resized,
            &frame_pixels,
            Mode::Adv,
            Orientation::Horizontal,
            -1.0,
            &mut anchor,
        );

        assert!(result.boxes.is_empty());
        assert!(!anchor.is_set());
    }

    #[test]
    fn s4_noise_singleton_far_from_anchor_is_suppressed() {
        let resized = ResizedFrame {
            target_w: 1920,
            target_h: 1080,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        let hm = heatmap_with_rect(1920, 1080, 1500, 40, 80, 40);
        let frame_pixels = RgbImage::new(1920, 1080);
        let mut anchor = AnchorPos { x: 300.0, y: 40.0 };

        let result = compute(
            &hm,
            resized,
            &frame_pixels,
            Mode::Adv,
            Orientation::Horizontal,
            40.0,
            &mut anchor,
        );

        assert!(result.boxes.is_empty());
        assert_eq!(anchor.x, 300.0);
    }
}
