//! Coarse grid bucketing of sample points.

use std::collections::BTreeMap;

use crate::element::Real;
use crate::spatial::BoundingBox;

/// Bucket the points selected by `indices` into a regular grid of cells of size `cell`.
///
/// Cells are anchored at the lower corner of the points' bounding box. Each
/// non-empty cell becomes one cluster; clusters are returned in cell order.
/// Non-finite cell sizes collapse the axis into a single cell.
pub fn grid_cluster<T: Real, const D: usize>(
    points: &[[T; D]],
    indices: &[usize],
    cell: &[f64; D],
) -> Vec<Vec<usize>> {
    let Some(bbox) = BoundingBox::from_points(points, indices) else {
        return Vec::new();
    };
    let origin = bbox.lower();

    let mut cells: BTreeMap<[i64; D], Vec<usize>> = BTreeMap::new();
    for &i in indices {
        let key: [i64; D] = std::array::from_fn(|d| {
            if cell[d].is_finite() && cell[d] > 0.0 {
                ((points[i][d].into_f64() - origin[d]) / cell[d]).floor() as i64
            } else {
                0
            }
        });
        cells.entry(key).or_default().push(i);
    }
    cells.into_values().collect()
}
