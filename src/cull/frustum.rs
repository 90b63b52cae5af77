use serde::{Deserialize, Serialize};

use crate::foundation::fixed::{FX_SHIFT, Fx, clamp_i32_wide};
use crate::foundation::matrix::{Mat4, Vec3, dot_fx};

/// Plane `normal · p + d = 0` with a unit normal pointing into the frustum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit inward normal.
    pub normal: Vec3,
    /// Offset along the normal.
    pub d: Fx,
}

impl Plane {
    /// Normalize raw plane coefficients `(a, b, c, d)`.
    ///
    /// The length is taken over the raw integers, so short normals such as the far plane's
    /// `(1 - a)` keep full precision. A zero-length normal yields a plane that accepts
    /// everything.
    pub fn from_coeffs(c: [Fx; 4]) -> Plane {
        let sq: u128 = c[..3]
            .iter()
            .map(|v| {
                let r = i128::from(v.raw());
                (r * r) as u128
            })
            .sum();
        let len = sq.isqrt() as i128;
        if len == 0 {
            return Plane {
                normal: Vec3::ZERO,
                d: Fx::MAX,
            };
        }
        let scale = |v: Fx| Fx(clamp_i32_wide((i128::from(v.raw()) << FX_SHIFT) / len));
        Plane {
            normal: Vec3::new(scale(c[0]), scale(c[1]), scale(c[2])),
            d: scale(c[3]),
        }
    }

    /// Signed distance of `p`, positive inside.
    #[inline]
    pub fn distance(&self, p: Vec3) -> Fx {
        dot_fx(
            &[self.normal.x, self.normal.y, self.normal.z, self.d],
            &[p.x, p.y, p.z, Fx::ONE],
        )
    }
}

/// Six inward planes in the order left, right, bottom, top, near, far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frustum {
    /// Normalized planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract planes from a `projection · view` matrix as `row3 ± row{0,1,2}`.
    pub fn from_view_projection(vp: &Mat4) -> Frustum {
        let r3 = vp.row(3);
        let mut planes = [Plane::default(); 6];
        for axis in 0..3 {
            let r = vp.row(axis);
            let plus: [Fx; 4] = std::array::from_fn(|i| r3[i] + r[i]);
            let minus: [Fx; 4] = std::array::from_fn(|i| r3[i] - r[i]);
            planes[axis * 2] = Plane::from_coeffs(plus);
            planes[axis * 2 + 1] = Plane::from_coeffs(minus);
        }
        Frustum { planes }
    }

    /// `false` only when the sphere lies entirely outside some plane.
    pub fn intersects_sphere(&self, center: Vec3, radius: Fx) -> bool {
        self.planes.iter().all(|p| p.distance(center) >= -radius)
    }

    /// Positive-vertex test of the box `[min, max]` grown by `inflate` on every side.
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3, inflate: Fx) -> bool {
        self.planes.iter().all(|p| {
            let v = Vec3::new(
                if p.normal.x >= Fx::ZERO { max.x } else { min.x },
                if p.normal.y >= Fx::ZERO { max.y } else { min.y },
                if p.normal.z >= Fx::ZERO { max.z } else { min.z },
            );
            p.distance(v) >= -inflate
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cull/frustum.rs"]
mod tests;
