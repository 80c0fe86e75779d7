//! ADV group scorer and chain merger: scores candidate lines/columns and
//! expands the winner by absorbing adjacent groups on the same dialogue
//! surface.

use image::{Rgb, RgbImage};

use crate::types::{AnchorPos, Candidate, Group, Orientation};

fn union_rect(candidates: &[Candidate]) -> (i32, i32, i32, i32) {
    let min_x = candidates.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = candidates.iter().map(|c| c.y).min().unwrap_or(0);
    let max_x = candidates.iter().map(|c| c.right()).max().unwrap_or(0);
    let max_y = candidates.iter().map(|c| c.bottom()).max().unwrap_or(0);
    (min_x, min_y, max_x, max_y)
}

/// `1 - mean luminance / 255` over the union of `candidates`' rectangles.
/// Text is typically dark over a dialogue panel, so a darker union scores
/// higher.
fn darkness(image: &RgbImage, candidates: &[Candidate]) -> f64 {
    let (min_x, min_y, max_x, max_y) = union_rect(candidates);
    let (img_w, img_h) = image.dimensions();
    let x0 = min_x.clamp(0, img_w as i32 - 1) as u32;
    let y0 = min_y.clamp(0, img_h as i32 - 1) as u32;
    let x1 = max_x.clamp(1, img_w as i32) as u32;
    let y1 = max_y.clamp(1, img_h as i32) as u32;
    if x1 <= x0 || y1 <= y0 {
        return 0.5;
    }

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let Rgb([r, g, b]) = image.get_pixel(x, y);
            sum += (*r as u64 + *g as u64 + *b as u64) / 3;
            count += 1;
        }
    }
    if count == 0 {
        return 0.5;
    }
    let mean_luminance = sum as f64 / count as f64;
    1.0 - mean_luminance / 255.0
}

fn avg_aspect(candidates: &[Candidate], orientation: Orientation) -> f64 {
    let sum: f64 = candidates
        .iter()
        .map(|c| match orientation {
            Orientation::Horizontal => c.aspect(),
            Orientation::Vertical => c.h as f64 / c.w as f64,
        })
        .sum();
    sum / candidates.len() as f64
}

fn metric_dim(candidates: &[Candidate], orientation: Orientation) -> f64 {
    candidates
        .iter()
        .map(|c| match orientation {
            Orientation::Horizontal => c.w as f64,
            Orientation::Vertical => c.h as f64,
        })
        .sum()
}

fn center_bias(candidates: &[Candidate], target_w: u32) -> f64 {
    let mean_center_x =
        candidates.iter().map(|c| c.center_x()).sum::<f64>() / candidates.len() as f64;
    let half = target_w as f64 / 2.0;
    1.0 - (mean_center_x - half).abs() / half
}

fn pos_weight(candidates: &[Candidate], anchor: AnchorPos) -> f64 {
    if !anchor.is_set() {
        return 1.0;
    }
    let (min_x, min_y, _, _) = union_rect(candidates);
    let d = ((min_x as f64 - anchor.x).powi(2) + (min_y as f64 - anchor.y).powi(2)).sqrt();
    1.0 + 5.0 * (-d / 100.0).exp()
}

/// `score(G) = n^2 * metric_dim * avg_ar * center_bias * darkness * pos_weight`.
pub fn score_group(
    group: &Group,
    image: &RgbImage,
    target_w: u32,
    anchor: AnchorPos,
    orientation: Orientation,
) -> f64 {
    let candidates = &group.0;
    if candidates.is_empty() {
        return 0.0;
    }
    let n = candidates.len() as f64;
    n * n
        * metric_dim(candidates, orientation)
        * avg_aspect(candidates, orientation)
        * center_bias(candidates, target_w)
        * darkness(image, candidates)
        * pos_weight(candidates, anchor)
}

/// Selects the maximum-scoring group. Ties break toward the first group
/// achieving the maximum in iteration order.
pub fn select_best(
    groups: &[Group],
    image: &RgbImage,
    target_w: u32,
    anchor: AnchorPos,
    orientation: Orientation,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, g) in groups.iter().enumerate() {
        if g.0.is_empty() {
            continue;
        }
        let score = score_group(g, image, target_w, anchor, orientation);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

fn rect_overlap_and_gap_horizontal(
    merged: (i32, i32, i32, i32),
    other: (i32, i32, i32, i32),
) -> (f64, f64) {
    let overlap_x =
        (merged.2.min(other.2) - merged.0.max(other.0)).max(0) as f64;
    let gap_y = (merged.1.max(other.1) - merged.3.min(other.3)).max(0) as f64;
    (overlap_x, gap_y)
}

fn rect_overlap_and_gap_vertical(
    merged: (i32, i32, i32, i32),
    other: (i32, i32, i32, i32),
) -> (f64, f64) {
    let overlap_y =
        (merged.3.min(other.3) - merged.1.max(other.1)).max(0) as f64;
    let gap_x = (merged.0.max(other.0) - merged.2.min(other.2)).max(0) as f64;
    (overlap_y, gap_x)
}

/// Starting from `seed`, iteratively absorbs any remaining group whose
/// combined bounding rectangle satisfies both the overlap and proximity
/// test against the *current merged* bounding rectangle. Repeats until a
/// full pass over the remaining groups adds nothing.
pub fn chain_merge(
    seed: Group,
    mut remaining: Vec<Group>,
    typical_h: f64,
    target_w: u32,
    target_h: u32,
    orientation: Orientation,
) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = seed.0;

    loop {
        let merged_rect = union_rect(&merged);
        let mut absorbed_any = false;
        let mut still_remaining = Vec::new();

        for group in remaining {
            let other_rect = union_rect(&group.0);
            let min_widths_or_heights: f64 = match orientation {
                Orientation::Horizontal => (merged_rect.2 - merged_rect.0)
                    .min(other_rect.2 - other_rect.0) as f64,
                Orientation::Vertical => (merged_rect.3 - merged_rect.1)
                    .min(other_rect.3 - other_rect.1) as f64,
            };

            let gap_threshold = if typical_h > 0.0 {
                6.0 * typical_h
            } else {
                match orientation {
                    Orientation::Horizontal => 0.05 * target_h as f64,
                    Orientation::Vertical => 0.05 * target_w as f64,
                }
            };

            let (overlap, gap) = match orientation {
                Orientation::Horizontal => {
                    rect_overlap_and_gap_horizontal(merged_rect, other_rect)
                }
                Orientation::Vertical => rect_overlap_and_gap_vertical(merged_rect, other_rect),
            };

            if overlap > 0.15 * min_widths_or_heights && gap < gap_threshold {
                merged.extend(group.0);
                absorbed_any = true;
            } else {
                still_remaining.push(group);
            }
        }

        remaining = still_remaining;
        if !absorbed_any || remaining.is_empty() {
            break;
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

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
    fn select_best_is_deterministic_on_ties() {
        let image = RgbImage::new(960, 960);
        let groups = vec![
            Group(vec![cand(100, 100, 100, 40)]),
            Group(vec![cand(500, 100, 100, 40)]),
        ];
        let a = select_best(&groups, &image, 960, AnchorPos::default(), Orientation::Horizontal);
        let b = select_best(&groups, &image, 960, AnchorPos::default(), Orientation::Horizontal);
        assert_eq!(a, b);
    }

    #[test]
    fn chain_merge_absorbs_adjacent_group() {
        let seed = Group(vec![cand(640, 910, 900, 60)]);
        let other = Group(vec![cand(640, 860, 200, 40)]);
        let merged = chain_merge(seed, vec![other], 40.0, 1920, 1080, Orientation::Horizontal);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn chain_merge_leaves_distant_group_unabsorbed() {
        let seed = Group(vec![cand(640, 910, 900, 60)]);
        let other = Group(vec![cand(640, 10, 200, 40)]);
        let merged = chain_merge(seed, vec![other], 40.0, 1920, 1080, Orientation::Horizontal);
        assert_eq!(merged.len(), 1);
    }

    /// A merged set containing one narrow sliver must not lower the overlap
    /// bar for the whole set: the threshold is `0.15 * min(bounding-rect
    /// widths)`, not `0.15 * min(per-candidate widths)`.
    #[test]
    fn chain_merge_overlap_uses_bounding_rect_width_not_narrowest_member() {
        let sliver = cand(0, 500, 10, 60);
        let long = cand(50, 500, 850, 60);
        let seed = Group(vec![sliver, long]);
        let other = Group(vec![cand(890, 500, 200, 60)]);
        let merged = chain_merge(seed, vec![other], 0.0, 1920, 1080, Orientation::Horizontal);
        assert_eq!(merged.len(), 2);
    }
}
