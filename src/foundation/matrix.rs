use serde::{Deserialize, Serialize};

use super::fixed::{FX_SHIFT, Fx, clamp_i32_wide};

/// Squared lengths this close to one are treated as already normalized.
pub(crate) const UNIT_TOLERANCE: Fx = Fx(4);

/// Saturating dot product with a single rounding step.
pub fn dot_fx(a: &[Fx], b: &[Fx]) -> Fx {
    let acc: i128 = a
        .iter()
        .zip(b)
        .map(|(x, y)| i128::from(x.0) * i128::from(y.0))
        .sum();
    Fx(clamp_i32_wide(acc >> FX_SHIFT))
}

/// Three-component Q16.16 vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: Fx,
    /// Y component.
    pub y: Fx,
    /// Z component.
    pub z: Fx,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Vec3 = Vec3::new(Fx::ZERO, Fx::ZERO, Fx::ZERO);

    /// Build from components.
    pub const fn new(x: Fx, y: Fx, z: Fx) -> Self {
        Self { x, y, z }
    }

    /// Build from float components.
    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Self::new(Fx::from_f64(x), Fx::from_f64(y), Fx::from_f64(z))
    }

    /// Components as an array.
    pub fn to_array(self) -> [Fx; 3] {
        [self.x, self.y, self.z]
    }

    /// Float components.
    pub fn to_f64(self) -> [f64; 3] {
        [self.x.to_f64(), self.y.to_f64(), self.z.to_f64()]
    }

    /// Saturating dot product.
    pub fn dot(self, o: Vec3) -> Fx {
        dot_fx(&self.to_array(), &o.to_array())
    }

    /// Cross product.
    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            dot_fx(&[self.y, -self.z], &[o.z, o.y]),
            dot_fx(&[self.z, -self.x], &[o.x, o.z]),
            dot_fx(&[self.x, -self.y], &[o.y, o.x]),
        )
    }

    /// Uniform scale.
    pub fn scale(self, s: Fx) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    /// Squared length.
    pub fn length_sq(self) -> Fx {
        self.dot(self)
    }

    /// Length via the Newton-polished square root.
    pub fn length(self) -> Fx {
        self.length_sq().sqrt_refined()
    }

    /// Unit vector in the same direction; a zero vector stays zero.
    pub fn normalize(self) -> Vec3 {
        let len_sq = self.length_sq();
        if (len_sq - Fx::ONE).abs() <= UNIT_TOLERANCE {
            return self;
        }
        let len = len_sq.sqrt_refined();
        if len <= Fx::EPSILON {
            return Vec3::ZERO;
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }

    /// Extend with a homogeneous coordinate.
    pub fn extend(self, w: Fx) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Four-component Q16.16 vector (homogeneous coordinates).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec4 {
    /// X component.
    pub x: Fx,
    /// Y component.
    pub y: Fx,
    /// Z component.
    pub z: Fx,
    /// Homogeneous W component.
    pub w: Fx,
}

impl Vec4 {
    /// Build from components.
    pub const fn new(x: Fx, y: Fx, z: Fx, w: Fx) -> Self {
        Self { x, y, z, w }
    }

    /// Components as an array.
    pub fn to_array(self) -> [Fx; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Drop the homogeneous coordinate without dividing.
    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Row-major 4×4 Q16.16 matrix acting on column vectors (`M · v`).
///
/// Element `(row, col)` lives at `m[row * 4 + col]`, so a 16-element array handed in by a
/// camera system maps directly onto it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mat4 {
    /// Row-major elements.
    pub m: [Fx; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// Identity matrix.
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            Fx::ONE,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ONE,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ONE,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ZERO,
            Fx::ONE,
        ],
    };

    /// Build from row-major elements.
    pub const fn from_rows(m: [Fx; 16]) -> Self {
        Self { m }
    }

    /// Build from row-major float elements.
    pub fn from_f64_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = [Fx::ZERO; 16];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                m[r * 4 + c] = Fx::from_f64(*v);
            }
        }
        Self { m }
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Fx {
        self.m[row * 4 + col]
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> [Fx; 4] {
        let b = i * 4;
        [self.m[b], self.m[b + 1], self.m[b + 2], self.m[b + 3]]
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Mat4 {
        let mut m = [Fx::ZERO; 16];
        for r in 0..4 {
            for c in 0..4 {
                m[c * 4 + r] = self.m[r * 4 + c];
            }
        }
        Mat4 { m }
    }

    /// Matrix product `self · rhs`.
    pub fn mul_mat(&self, rhs: &Mat4) -> Mat4 {
        let mut m = [Fx::ZERO; 16];
        for r in 0..4 {
            let row = self.row(r);
            for c in 0..4 {
                let col = [rhs.at(0, c), rhs.at(1, c), rhs.at(2, c), rhs.at(3, c)];
                m[r * 4 + c] = dot_fx(&row, &col);
            }
        }
        Mat4 { m }
    }

    /// `self · v`.
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let v = v.to_array();
        Vec4::new(
            dot_fx(&self.row(0), &v),
            dot_fx(&self.row(1), &v),
            dot_fx(&self.row(2), &v),
            dot_fx(&self.row(3), &v),
        )
    }

    /// Transform a point (`w = 1`) and drop the resulting `w`.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform(p.extend(Fx::ONE)).truncate()
    }

    /// Upper-left 3×3 block applied to a direction.
    pub fn transform_dir(&self, d: Vec3) -> Vec3 {
        self.transform(d.extend(Fx::ZERO)).truncate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/matrix.rs"]
mod tests;
