//! Hypervolume of a point set in minimisation space.
//!
//! Slicing over objectives (HSO): the last objective is cut into slabs
//! between consecutive point values and each slab contributes the
//! lower-dimensional hypervolume of the points inside it.

use hen_core::Real;
use std::cmp::Ordering;

/// Volume dominated by `points` and bounded by `reference`.
///
/// Points that do not strictly dominate the reference in every objective
/// contribute nothing.
pub fn hypervolume(points: &[Vec<Real>], reference: &[Real]) -> Real {
    let inside: Vec<&[Real]> = points
        .iter()
        .map(Vec::as_slice)
        .filter(|p| p.len() == reference.len() && p.iter().zip(reference).all(|(x, r)| x < r))
        .collect();
    if inside.is_empty() || reference.is_empty() {
        return 0.0;
    }
    slice_volume(inside, reference)
}

fn slice_volume(mut points: Vec<&[Real]>, reference: &[Real]) -> Real {
    let d = reference.len();
    if points.is_empty() {
        return 0.0;
    }
    if d == 1 {
        let best = points.iter().map(|p| p[0]).fold(Real::INFINITY, Real::min);
        return reference[0] - best;
    }
    if d == 2 {
        points.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap_or(Ordering::Equal));
        let mut volume = 0.0;
        let mut ceiling = reference[1];
        for p in points {
            if p[1] < ceiling {
                volume += (reference[0] - p[0]) * (ceiling - p[1]);
                ceiling = p[1];
            }
        }
        return volume;
    }

    let last = d - 1;
    points.sort_by(|a, b| a[last].partial_cmp(&b[last]).unwrap_or(Ordering::Equal));
    let mut volume = 0.0;
    for i in 0..points.len() {
        let upper = points.get(i + 1).map_or(reference[last], |p| p[last]);
        let depth = upper - points[i][last];
        if depth <= 0.0 {
            continue;
        }
        let slab: Vec<&[Real]> = points[..=i].iter().map(|p| &p[..last]).collect();
        volume += depth * slice_volume(slab, &reference[..last]);
    }
    volume
}
