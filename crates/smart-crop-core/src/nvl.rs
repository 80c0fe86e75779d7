//! NVL paragraph clusterer.
//!
//! `DBSCAN(eps=150, min_samples=1)` over candidate centers reduces to
//! single-linkage clustering with a fixed radius once `min_samples` is 1:
//! every point is a core point, so the clusters are exactly the connected
//! components of the "within eps" graph. A grid indexed by `eps`-sized
//! cells turns the neighbor search from O(n^2) into near-linear without a
//! clustering library dependency.

use std::collections::HashMap;

use crate::types::{Candidate, Paragraph};

const EPS: f64 = 150.0;

fn cell_of(cx: f64, cy: f64) -> (i64, i64) {
    ((cx / EPS).floor() as i64, (cy / EPS).floor() as i64)
}

/// Density-clusters candidate centers with a fixed radius of 150px,
/// returning one [`Paragraph`] per cluster, each sorted `(y asc, x asc)`,
/// and the paragraphs themselves ordered by their first member's y.
pub fn cluster_paragraphs(candidates: &[Candidate]) -> Vec<Paragraph> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let centers: Vec<(f64, f64)> = candidates.iter().map(|c| (c.center_x(), c.center_y())).collect();

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, &(cx, cy)) in centers.iter().enumerate() {
        grid.entry(cell_of(cx, cy)).or_default().push(i);
    }

    let mut visited = vec![false; candidates.len()];
    let mut labels = vec![usize::MAX; candidates.len()];
    let mut next_label = 0usize;

    for start in 0..candidates.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        labels[start] = next_label;

        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let (ccx, ccy) = centers[current];
            let (gx, gy) = cell_of(ccx, ccy);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(neighbors) = grid.get(&(gx + dx, gy + dy)) else {
                        continue;
                    };
                    for &n in neighbors {
                        if visited[n] {
                            continue;
                        }
                        let (ncx, ncy) = centers[n];
                        let dist = ((ncx - ccx).powi(2) + (ncy - ccy).powi(2)).sqrt();
                        if dist <= EPS {
                            visited[n] = true;
                            labels[n] = next_label;
                            stack.push(n);
                        }
                    }
                }
            }
        }

        next_label += 1;
    }

    let mut groups: HashMap<usize, Vec<Candidate>> = HashMap::new();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(candidates[i].clone());
    }

    let mut paragraphs: Vec<Paragraph> = groups
        .into_values()
        .map(|mut members| {
            members.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));
            Paragraph(members)
        })
        .collect();

    paragraphs.sort_by_key(|p| p.0.first().map(|c| c.y).unwrap_or(0));
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(x: i32, y: i32) -> Candidate {
        Candidate {
            x,
            y,
            w: 100,
            h: 40,
            contour_points: vec![],
        }
    }

    #[test]
    fn two_distant_clusters_yield_two_paragraphs() {
        let cands = vec![cand(100, 100), cand(100, 200), cand(100, 600), cand(100, 700)];
        let paragraphs = cluster_paragraphs(&cands);
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].0[0].y < paragraphs[1].0[0].y);
    }

    #[test]
    fn isolated_line_forms_its_own_paragraph() {
        let cands = vec![cand(0, 0)];
        let paragraphs = cluster_paragraphs(&cands);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].0.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_paragraphs() {
        assert!(cluster_paragraphs(&[]).is_empty());
    }
}
