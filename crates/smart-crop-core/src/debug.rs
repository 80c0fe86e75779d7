//! Debug visualization: draws every raw candidate in green and the final
//! selection in red. Gated behind the `debug` feature so ordinary builds
//! of the core carry no drawing dependency surface.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::types::Candidate;

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

fn rect_of(c: &Candidate) -> Rect {
    Rect::at(c.x, c.y).of_size(c.w.max(1) as u32, c.h.max(1) as u32)
}

/// Renders `raw_candidates` as green outlines and every group in `selected`
/// as red outlines over a copy of `frame`.
pub fn render_debug_overlay(
    frame: &RgbImage,
    raw_candidates: &[Candidate],
    selected: &[Vec<Candidate>],
) -> RgbImage {
    let mut canvas = frame.clone();
    for c in raw_candidates {
        draw_hollow_rect_mut(&mut canvas, rect_of(c), GREEN);
    }
    for group in selected {
        if group.is_empty() {
            continue;
        }
        let min_x = group.iter().map(|c| c.x).min().unwrap_or(0);
        let min_y = group.iter().map(|c| c.y).min().unwrap_or(0);
        let max_x = group.iter().map(|c| c.right()).max().unwrap_or(0);
        let max_y = group.iter().map(|c| c.bottom()).max().unwrap_or(0);
        let w = (max_x - min_x).max(1) as u32;
        let h = (max_y - min_y).max(1) as u32;
        draw_hollow_rect_mut(&mut canvas, Rect::at(min_x, min_y).of_size(w, h), RED);
    }
    canvas
}
