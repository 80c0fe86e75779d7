//! Line/column grouper: a disjoint-set over the pairwise same-line /
//! stacked / same-column predicates, deterministic regardless of
//! encounter order.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{Candidate, Group, Orientation};

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i == root_j {
            return;
        }
        match self.rank[root_i].cmp(&self.rank[root_j]) {
            Ordering::Greater => self.parent[root_j] = root_i,
            Ordering::Less => self.parent[root_i] = root_j,
            Ordering::Equal => {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

fn horizontal_compatible(a: &Candidate, b: &Candidate) -> bool {
    let max_h = a.h.max(b.h) as f64;
    let center_dy = (a.center_y() - b.center_y()).abs();
    let gap_x = (a.x.max(b.x) - a.right().min(b.right())).max(0) as f64;

    let same_line = center_dy < 0.5 * max_h && gap_x < 2.5 * max_h;

    let gap_y = (a.y.max(b.y) - a.bottom().min(b.bottom())).max(0) as f64;
    let dx_left = (a.x - b.x).abs() as f64;
    let stacked = gap_y < 2.0 * max_h && (dx_left < 1.5 * max_h || gap_x < 1.5 * max_h);

    same_line || stacked
}

fn vertical_compatible(a: &Candidate, b: &Candidate) -> bool {
    let max_w = a.w.max(b.w) as f64;
    let center_dx = (a.center_x() - b.center_x()).abs();
    let gap_y = (a.y.max(b.y) - a.bottom().min(b.bottom())).max(0) as f64;
    center_dx < 0.5 * max_w && gap_y < 2.5 * max_w
}

/// Groups `candidates` into lines (horizontal) or columns (vertical).
///
/// Candidates are first sorted into the mode-specific scan order (this
/// order matters for determinism, not merely for efficiency): `(y asc,
/// x asc)` horizontal, `(x desc, y asc)` vertical.
/// Every pair within the sorted order is tested against the predicate and
/// unioned via disjoint-set, which is equivalent to "first compatible group"
/// but independent of encounter order.
pub fn group_candidates(candidates: &[Candidate], orientation: Orientation) -> Vec<Group> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    match orientation {
        Orientation::Horizontal => order.sort_by(|&i, &j| {
            let a = &candidates[i];
            let b = &candidates[j];
            a.y.cmp(&b.y).then(a.x.cmp(&b.x))
        }),
        Orientation::Vertical => order.sort_by(|&i, &j| {
            let a = &candidates[i];
            let b = &candidates[j];
            b.x.cmp(&a.x).then(a.y.cmp(&b.y))
        }),
    }

    let mut uf = UnionFind::new(order.len());
    for (pi, &i) in order.iter().enumerate() {
        for (pj, &j) in order.iter().enumerate().skip(pi + 1) {
            let compatible = match orientation {
                Orientation::Horizontal => horizontal_compatible(&candidates[i], &candidates[j]),
                Orientation::Vertical => vertical_compatible(&candidates[i], &candidates[j]),
            };
            if compatible {
                uf.union(pi, pj);
            }
        }
    }

    let mut buckets: HashMap<usize, Vec<usize>> = HashMap::new();
    for (pi, &i) in order.iter().enumerate() {
        let root = uf.find(pi);
        buckets.entry(root).or_default().push(i);
    }

    let mut roots: Vec<usize> = buckets.keys().copied().collect();
    roots.sort_by_key(|&r| buckets[&r].iter().copied().min().unwrap_or(usize::MAX));

    roots
        .into_iter()
        .map(|r| Group(buckets[&r].iter().map(|&i| candidates[i].clone()).collect()))
        .collect()
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
    fn same_line_candidates_are_grouped() {
        let cands = vec![cand(0, 100, 100, 40), cand(150, 100, 100, 40)];
        let groups = group_candidates(&cands, Orientation::Horizontal);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0.len(), 2);
    }

    #[test]
    fn stacked_nametag_over_dialogue_is_grouped() {
        let nametag = cand(640, 860, 200, 40);
        let dialogue = cand(640, 910, 900, 60);
        let groups = group_candidates(&[nametag, dialogue], Orientation::Horizontal);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn distant_lines_are_not_grouped() {
        let cands = vec![cand(0, 100, 100, 40), cand(0, 900, 100, 40)];
        let groups = group_candidates(&cands, Orientation::Horizontal);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn vertical_columns_group_top_to_bottom() {
        let cands = vec![cand(1800, 0, 36, 200), cand(1800, 220, 36, 200)];
        let groups = group_candidates(&cands, Orientation::Vertical);
        assert_eq!(groups.len(), 1);
    }
}
