//! Traversal of a point's kernel support inside a cluster window.
//!
//! Spreading and interpolation both go through [`visit_support`], so the two
//! directions share their index arithmetic exactly. Ranks 1 to 3 use unrolled
//! nested loops; higher ranks fall back to an odometer over the support box.

use crate::element::Real;

/// Call `f(flat, weight)` for every node of the box `[lb, ub)`.
///
/// * `rows` - per-axis kernel weights of one point over the window
/// * `lb`, `ub` - per-axis non-zero bounds within the window
/// * `strides` - row-major strides of the window
///
/// `weight` is the product of the axis weights at that node.
#[inline(always)]
pub fn visit_support<T, F, const D: usize>(
    rows: &[&[T]; D],
    lb: &[usize; D],
    ub: &[usize; D],
    strides: &[usize; D],
    mut f: F,
) where
    T: Real,
    F: FnMut(usize, T),
{
    let rows: &[&[T]] = rows;
    let (lb, ub, st): (&[usize], &[usize], &[usize]) = (lb, ub, strides);
    match D {
        1 => {
            for i in lb[0]..ub[0] {
                f(i * st[0], rows[0][i]);
            }
        }
        2 => {
            for i in lb[0]..ub[0] {
                let k0 = rows[0][i];
                let o0 = i * st[0];
                for j in lb[1]..ub[1] {
                    f(o0 + j * st[1], k0 * rows[1][j]);
                }
            }
        }
        3 => {
            for i in lb[0]..ub[0] {
                let k0 = rows[0][i];
                let o0 = i * st[0];
                for j in lb[1]..ub[1] {
                    let k1 = k0 * rows[1][j];
                    let o1 = o0 + j * st[1];
                    for l in lb[2]..ub[2] {
                        f(o1 + l * st[2], k1 * rows[2][l]);
                    }
                }
            }
        }
        _ => visit_odometer(rows, lb, ub, st, f),
    }
}

fn visit_odometer<T, F>(rows: &[&[T]], lb: &[usize], ub: &[usize], st: &[usize], mut f: F)
where
    T: Real,
    F: FnMut(usize, T),
{
    let rank = rows.len();
    if (0..rank).any(|d| lb[d] >= ub[d]) {
        return;
    }
    let mut idx = lb.to_vec();
    loop {
        let mut flat = 0;
        let mut weight = T::one();
        for d in 0..rank {
            flat += idx[d] * st[d];
            weight = weight * rows[d][idx[d]];
        }
        f(flat, weight);

        // Advance the last axis first (row-major order).
        let mut d = rank;
        loop {
            if d == 0 {
                return;
            }
            d -= 1;
            idx[d] += 1;
            if idx[d] < ub[d] {
                break;
            }
            idx[d] = lb[d];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<const D: usize>(
        rows: &[&[f64]; D],
        lb: [usize; D],
        ub: [usize; D],
        strides: [usize; D],
    ) -> Vec<(usize, f64)> {
        let mut out = Vec::new();
        visit_support(rows, &lb, &ub, &strides, |i, k| out.push((i, k)));
        out
    }

    #[test]
    fn test_visit_2d() {
        let r0 = [0.0, 2.0, 3.0];
        let r1 = [1.0, 0.5];
        let out = collect(&[&r0[..], &r1[..]], [1, 0], [3, 2], [2, 1]);
        assert_eq!(out, vec![(2, 2.0), (3, 1.0), (4, 3.0), (5, 1.5)]);
    }

    #[test]
    fn test_odometer_matches_unrolled() {
        let r0 = [1.0, 2.0];
        let r1 = [3.0, 4.0, 5.0];
        let r2 = [0.5, 0.25];
        let unrolled = collect(&[&r0[..], &r1[..], &r2[..]], [0, 1, 0], [2, 3, 2], [6, 2, 1]);

        let mut odometer = Vec::new();
        visit_odometer(
            &[&r0[..], &r1[..], &r2[..]],
            &[0, 1, 0],
            &[2, 3, 2],
            &[6, 2, 1],
            |i, k| odometer.push((i, k)),
        );
        assert_eq!(unrolled, odometer);
        assert_eq!(unrolled.len(), 8);
    }

    #[test]
    fn test_visit_4d() {
        let r = [1.0, 2.0];
        let out = collect(&[&r[..], &r[..], &r[..], &r[..]], [1, 1, 1, 1], [2, 2, 2, 2], [8, 4, 2, 1]);
        assert_eq!(out, vec![(15, 16.0)]);
    }

    #[test]
    fn test_empty_box() {
        let r = [1.0, 2.0];
        assert!(collect(&[&r[..], &r[..], &r[..], &r[..]], [0, 2, 0, 0], [2, 2, 2, 2], [8, 4, 2, 1]).is_empty());
    }
}
