//! Closed-form 2×2 symmetric eigen-decomposition and regularized inversion.

use crate::foundation::fixed::Fx;

/// Added to both diagonal terms before solving or inverting.
pub const REGULARIZATION: Fx = Fx::EPSILON;

/// Largest magnitude kept before range reduction, so that squares stay representable.
const SCALE_LIMIT: Fx = Fx::from_int(128);

const IDENTITY: [Fx; 4] = [Fx::ONE, Fx::ZERO, Fx::ZERO, Fx::ONE];
// Major axis along y: column 0 = (0, 1), column 1 = (-1, 0).
const SWAPPED: [Fx; 4] = [Fx::ZERO, Fx(-(1 << 16)), Fx::ONE, Fx::ZERO];

/// Eigenpairs of a symmetric 2×2 matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eigen2 {
    /// Eigenvalues, largest first, clamped to be non-negative.
    pub values: [Fx; 2],
    /// Row-major rotation; column 0 belongs to `values[0]`.
    pub vectors: [Fx; 4],
    /// The discriminant was negative and the isotropic fallback was used.
    pub degenerate: bool,
}

/// Shift count that brings every input under [`SCALE_LIMIT`].
fn range_shift(vals: &[Fx]) -> u32 {
    let m = vals.iter().map(|v| v.abs()).max().unwrap_or(Fx::ZERO);
    let mut k = 0;
    while k < 16 && m.shr(k) > SCALE_LIMIT {
        k += 1;
    }
    k
}

/// Eigen-decomposition of `[[a, b], [b, c]]` from the trace and determinant.
///
/// A negative discriminant yields the isotropic matrix `trace/2 · I` with identity vectors.
pub fn solve_symmetric(a: Fx, b: Fx, c: Fx) -> Eigen2 {
    let a = a + REGULARIZATION;
    let c = c + REGULARIZATION;
    let k = range_shift(&[a, b, c]);
    let (a, b, c) = (a.shr(k), b.shr(k), c.shr(k));

    let half_tr = (a + c).shr(1);
    let det = a * c - b * b;
    let disc = half_tr * half_tr - det;
    if disc < Fx::ZERO {
        let iso = half_tr.max(Fx::ZERO).shl(k);
        return Eigen2 {
            values: [iso, iso],
            vectors: IDENTITY,
            degenerate: true,
        };
    }

    let root = disc.sqrt_refined();
    let l1 = (half_tr + root).max(Fx::ZERO);
    let l2 = (half_tr - root).max(Fx::ZERO);

    let vectors = if b.abs() > Fx::EPSILON {
        let (vx, vy) = (b, l1 - a);
        let len = (vx * vx + vy * vy).sqrt_refined();
        if len > Fx::EPSILON {
            let (vx, vy) = (vx / len, vy / len);
            [vx, -vy, vy, vx]
        } else {
            IDENTITY
        }
    } else if a >= c {
        IDENTITY
    } else {
        SWAPPED
    };

    Eigen2 {
        values: [l1.shl(k), l2.shl(k)],
        vectors,
        degenerate: false,
    }
}

/// Inverse of `[[a, b], [b, c]]` as `(xx, xy, yy)`, regularized on the diagonal.
///
/// Falls back to the identity when the determinant is below [`Fx::EPSILON`].
pub fn invert_symmetric(a: Fx, b: Fx, c: Fx) -> [Fx; 3] {
    let a = a + REGULARIZATION;
    let c = c + REGULARIZATION;
    let k = range_shift(&[a, b, c]);
    let (a, b, c) = (a.shr(k), b.shr(k), c.shr(k));
    let det = a * c - b * b;
    if det < Fx::EPSILON {
        return [Fx::ONE, Fx::ZERO, Fx::ONE];
    }
    [(c / det).shr(k), (-b / det).shr(k), (a / det).shr(k)]
}

#[cfg(test)]
#[path = "../../tests/unit/project/eigen.rs"]
mod tests;
