//! Recursive median bisection of oversized clusters.

use std::cmp::Ordering;

use crate::element::Real;
use crate::spatial::BoundingBox;

/// Split every cluster holding more than `max_size` points.
///
/// Clusters are cut along the longest axis of their bounding box at the median
/// position. Each cut halves the point count, so splitting terminates even when
/// points coincide.
pub fn bisect_cluster<T: Real, const D: usize>(
    points: &[[T; D]],
    clusters: Vec<Vec<usize>>,
    max_size: usize,
) -> Vec<Vec<usize>> {
    let max_size = max_size.max(1);
    let mut out = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let mut stack = vec![cluster];
        while let Some(mut c) = stack.pop() {
            if c.len() <= max_size {
                out.push(c);
                continue;
            }
            let axis = BoundingBox::from_points(points, &c)
                .map(|b| b.longest_axis())
                .unwrap_or(0);
            let mid = c.len() / 2;
            c.select_nth_unstable_by(mid, |&a, &b| {
                points[a][axis]
                    .partial_cmp(&points[b][axis])
                    .unwrap_or(Ordering::Equal)
            });
            let upper = c.split_off(mid);
            // Lower half is processed first.
            stack.push(upper);
            stack.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bisect_respects_cap() {
        let points: Vec<[f64; 2]> = (0..37).map(|i| [i as f64, (i % 5) as f64]).collect();
        let clusters = bisect_cluster(&points, vec![(0..37).collect()], 4);
        assert!(clusters.iter().all(|c| c.len() <= 4));
        let mut all: Vec<usize> = clusters.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn test_bisect_splits_longest_axis() {
        let points = [[0.0f64, 0.0], [0.0, 10.0], [0.1, 20.0], [0.1, 30.0]];
        let clusters = bisect_cluster(&points, vec![vec![0, 1, 2, 3]], 2);
        assert_eq!(clusters.len(), 2);
        let mut lower = clusters[0].clone();
        lower.sort_unstable();
        assert_eq!(lower, vec![0, 1]);
    }

    #[test]
    fn test_bisect_coincident_points() {
        let points = vec![[1.0f32, 1.0]; 9];
        let clusters = bisect_cluster(&points, vec![(0..9).collect()], 2);
        assert!(clusters.iter().all(|c| c.len() <= 2));
        assert_eq!(clusters.iter().map(Vec::len).sum::<usize>(), 9);
    }
}
