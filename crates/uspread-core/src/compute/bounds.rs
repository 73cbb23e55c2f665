//! Non-zero bounds of kernel weight rows.

use crate::element::Real;

/// Half-open range `[a, b)` holding every non-zero entry of `row`.
///
/// Scans inwards from both ends and stops as soon as both ends are found.
/// Returns `(n, n)` when the row is all zeros.
#[inline]
pub fn find_bounds<T: Real>(row: &[T]) -> (usize, usize) {
    let n = row.len();
    let (mut a, mut a_found) = (n, false);
    let (mut b, mut b_found) = (n, false);
    for i in 0..n {
        if !a_found && row[i] != T::zero() {
            a = i;
            a_found = true;
        }
        if !b_found && row[n - 1 - i] != T::zero() {
            b = n - i;
            b_found = true;
        }
        if a_found && b_found {
            return (a, b);
        }
    }
    (a, b)
}
