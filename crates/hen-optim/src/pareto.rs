//! Dominance, non-dominated sorting and crowding distance (maximisation).

use hen_core::Real;
use std::cmp::Ordering;

/// `a` is at least as good everywhere and better somewhere.
pub fn dominates(a: &[Real], b: &[Real]) -> bool {
    let mut better = false;
    for (x, y) in a.iter().zip(b) {
        if x < y {
            return false;
        }
        if x > y {
            better = true;
        }
    }
    better
}

/// `a` is better than `b` in every objective.
pub fn strictly_dominates(a: &[Real], b: &[Real]) -> bool {
    !a.is_empty() && a.iter().zip(b).all(|(x, y)| x > y)
}

/// Fronts of indices into `points`, best front first.
pub fn non_dominated_sort(points: &[Vec<Real>]) -> Vec<Vec<usize>> {
    let n = points.len();
    let mut dominated_by = vec![0usize; n];
    let mut dominating: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&points[i], &points[j]) {
                dominating[i].push(j);
                dominated_by[j] += 1;
            } else if dominates(&points[j], &points[i]) {
                dominating[j].push(i);
                dominated_by[i] += 1;
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| dominated_by[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominating[i] {
                dominated_by[j] -= 1;
                if dominated_by[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Crowding distance of each member of `front`, in the order of `front`.
/// Boundary members get infinity.
pub fn crowding_distance(points: &[Vec<Real>], front: &[usize]) -> Vec<Real> {
    let m = front.len();
    let mut distance = vec![0.0; m];
    if m <= 2 {
        return vec![Real::INFINITY; m];
    }
    let objectives = points[front[0]].len();
    for k in 0..objectives {
        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by(|&a, &b| {
            points[front[a]][k]
                .partial_cmp(&points[front[b]][k])
                .unwrap_or(Ordering::Equal)
        });
        let lo = points[front[order[0]]][k];
        let hi = points[front[order[m - 1]]][k];
        distance[order[0]] = Real::INFINITY;
        distance[order[m - 1]] = Real::INFINITY;
        let span = hi - lo;
        if !(span > 0.0) {
            continue;
        }
        for w in 1..m - 1 {
            let next = points[front[order[w + 1]]][k];
            let prev = points[front[order[w - 1]]][k];
            distance[order[w]] += (next - prev) / span;
        }
    }
    distance
}

/// Members of `front` ordered by decreasing crowding distance, truncated to `k`.
pub fn truncate_by_crowding(points: &[Vec<Real>], front: &[usize], k: usize) -> Vec<usize> {
    let distance = crowding_distance(points, front);
    let mut order: Vec<usize> = (0..front.len()).collect();
    order.sort_by(|&a, &b| distance[b].partial_cmp(&distance[a]).unwrap_or(Ordering::Equal));
    order.into_iter().take(k).map(|i| front[i]).collect()
}

/// NSGA-II environmental selection of `k` indices.
pub fn select_nsga2(points: &[Vec<Real>], k: usize) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(k.min(points.len()));
    for front in non_dominated_sort(points) {
        let room = k - chosen.len();
        if room == 0 {
            break;
        }
        if front.len() <= room {
            chosen.extend(front);
        } else {
            chosen.extend(truncate_by_crowding(points, &front, room));
            break;
        }
    }
    chosen
}
