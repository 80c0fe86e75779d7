//! Scale tracker update: computing the pending scale value during
//! selection, and committing it once the recognizer confirms the region
//! held real text. The bounded-median state itself lives on
//! [`crate::types::ScaleTracker`]; this module is the gating logic around it.

use crate::types::{Candidate, Orientation, ScaleTracker};

/// Computes the candidate scale value to propose for commit, if the
/// selected set's primary metric falls within the plausible band for real
/// dialogue text. Returns `None` when learning should be skipped this frame.
pub fn compute_pending_val(
    selected: &[Candidate],
    target_w: u32,
    target_h: u32,
    orientation: Orientation,
) -> Option<f64> {
    if selected.is_empty() {
        return None;
    }

    let target_metric = match orientation {
        Orientation::Vertical => target_w as f64,
        Orientation::Horizontal => target_h as f64,
    };

    let metrics: Vec<f64> = selected
        .iter()
        .map(|c| match orientation {
            Orientation::Vertical => c.w as f64,
            Orientation::Horizontal => c.h as f64,
        })
        .collect();
    let mean = metrics.iter().sum::<f64>() / metrics.len() as f64;

    if !(0.01 * target_metric < mean && mean < 0.2 * target_metric) {
        return None;
    }

    if orientation == Orientation::Vertical {
        let sum_h: f64 = selected.iter().map(|c| c.h as f64).sum();
        let sum_w: f64 = selected.iter().map(|c| c.w as f64).sum();
        if sum_h < 2.0 * sum_w {
            return None;
        }
    }

    Some(mean)
}

/// Commits `pending_val` to `tracker` iff the recognizer produced at least
/// 5 characters of text. No-op otherwise, leaving history/typical_h intact.
pub fn commit_if_confirmed(
    tracker: &mut ScaleTracker,
    pending_val: Option<f64>,
    recognized_text_len: usize,
) {
    if recognized_text_len >= 5
        && let Some(val) = pending_val
    {
        tracker.commit(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(w: i32, h: i32) -> Candidate {
        Candidate {
            x: 0,
            y: 0,
            w,
            h,
            contour_points: vec![],
        }
    }

    #[test]
    fn commit_is_gated_on_recognized_length() {
        let mut tracker = ScaleTracker::new();
        commit_if_confirmed(&mut tracker, Some(48.0), 3);
        assert_eq!(tracker.history().len(), 0);
        assert_eq!(tracker.typical_h(), -1.0);

        commit_if_confirmed(&mut tracker, Some(48.0), 5);
        assert_eq!(tracker.history().len(), 1);
        assert_eq!(tracker.typical_h(), 48.0);
    }

    #[test]
    fn history_caps_at_ten_entries() {
        let mut tracker = ScaleTracker::new();
        for i in 0..15 {
            commit_if_confirmed(&mut tracker, Some(i as f64), 5);
        }
        assert_eq!(tracker.history().len(), 10);
    }

    #[test]
    fn horizontal_pending_val_requires_plausible_band() {
        let selected = vec![cand(100, 60)];
        let pending = compute_pending_val(&selected, 960, 960, Orientation::Horizontal);
        assert!(pending.is_some());

        let too_large = vec![cand(100, 500)];
        assert!(compute_pending_val(&too_large, 960, 960, Orientation::Horizontal).is_none());
    }

    #[test]
    fn vertical_pending_val_requires_tall_columns() {
        let wide_not_tall = vec![cand(80, 80)];
        assert!(compute_pending_val(&wide_not_tall, 960, 960, Orientation::Vertical).is_none());

        let tall_column = vec![cand(80, 400)];
        assert!(compute_pending_val(&tall_column, 960, 960, Orientation::Vertical).is_some());
    }
}
