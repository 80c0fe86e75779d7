//! Post-filter, anchor update, ordering, and coordinate mapping.

use crate::types::{AnchorPos, Candidate, Orientation, OutputBox, ResizedFrame};

/// Drops members whose primary metric falls below half the typical
/// character size, then re-derives the anchor from the survivors'
/// bounding rectangle. No-ops (keeps everything, leaves the anchor
/// untouched) when `typical_h <= 0`.
pub fn apply_final_size_filter(
    selected: Vec<Candidate>,
    typical_h: f64,
    orientation: Orientation,
) -> Vec<Candidate> {
    if typical_h <= 0.0 {
        return selected;
    }
    selected
        .into_iter()
        .filter(|c| {
            let metric = match orientation {
                Orientation::Vertical => c.w as f64,
                Orientation::Horizontal => c.h as f64,
            };
            metric >= 0.5 * typical_h
        })
        .collect()
}

/// Sets `anchor` to the top-left of `selected`'s bounding rectangle. No-op
/// on an empty set.
pub fn update_anchor(anchor: &mut AnchorPos, selected: &[Candidate]) {
    if selected.is_empty() {
        return;
    }
    let min_x = selected.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = selected.iter().map(|c| c.y).min().unwrap_or(0);
    anchor.x = min_x as f64;
    anchor.y = min_y as f64;
}

/// Orders the final selection: vertical mode by x descending (right-to-left
/// reading order); horizontal mode by `(y asc, x asc)`.
pub fn order_selection(mut selected: Vec<Candidate>, orientation: Orientation) -> Vec<Candidate> {
    match orientation {
        Orientation::Vertical => selected.sort_by(|a, b| b.x.cmp(&a.x)),
        Orientation::Horizontal => selected.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x))),
    }
    selected
}

/// Maps a resized-frame candidate back to the original frame's pixel
/// coordinates.
pub fn to_output_box(candidate: &Candidate, resized: ResizedFrame) -> OutputBox {
    OutputBox {
        x: (candidate.x as f64 * resized.scale_x).round().max(0.0) as u32,
        y: (candidate.y as f64 * resized.scale_y).round().max(0.0) as u32,
        w: (candidate.w as f64 * resized.scale_x).round().max(0.0) as u32,
        h: (candidate.h as f64 * resized.scale_y).round().max(0.0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(x: i32, y: i32, w: i32, h: i32) -> Candidate {
        Candidate {
            x,
            y,
            w,
            h,
            contour_points: vec![],
        }
    }

    #[test]
    fn final_size_filter_drops_undersized_members() {
        let selected = vec![cand(0, 0, 100, 10), cand(0, 0, 100, 50)];
        let kept = apply_final_size_filter(selected, 40.0, Orientation::Horizontal);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].h, 50);
    }

    #[test]
    fn anchor_updates_to_bounding_top_left() {
        let mut anchor = AnchorPos::default();
        let selected = vec![cand(50, 20, 10, 10), cand(10, 80, 10, 10)];
        update_anchor(&mut anchor, &selected);
        assert_eq!(anchor.x, 10.0);
        assert_eq!(anchor.y, 20.0);
    }

    #[test]
    fn vertical_ordering_is_non_increasing_in_x() {
        let selected = vec![cand(100, 0, 10, 10), cand(500, 0, 10, 10)];
        let ordered = order_selection(selected, Orientation::Vertical);
        assert!(ordered[0].x >= ordered[1].x);
    }

    #[test]
    fn round_trip_coordinates_are_within_one_pixel() {
        let resized = ResizedFrame {
            target_w: 960,
            target_h: 544,
            scale_x: 1920.0 / 960.0,
            scale_y: 1080.0 / 544.0,
        };
        let c = cand(100, 50, 20, 10);
        let b = to_output_box(&c, resized);
        assert!((b.x as f64 - c.x as f64 * resized.scale_x).abs() <= 1.0);
        assert!((b.y as f64 - c.y as f64 * resized.scale_y).abs() <= 1.0);
    }
}
