use serde::{Deserialize, Serialize};

use crate::foundation::fixed::{FX_SHIFT, Fx, Q8, Q8_SHIFT, clamp_i32};
use crate::foundation::matrix::Vec3;

/// Quantized spherical-harmonics coefficients per splat (degree 0–2 plus padding).
pub const SH_COEFFS: usize = 16;

const COV_EXP_BIAS: i32 = 7;
const COV_EXP_MAX: u8 = 15;
const Q8_MAX_F64: f64 = i16::MAX as f64 / (1u32 << Q8_SHIFT) as f64;

/// Symmetric 3×3 covariance with a shared 4-bit exponent and nine Q8.8 mantissas.
///
/// Element value is `mantissa * 2^(exponent - 7)`; exponent 7 is unit scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedCov {
    /// Shared exponent, 0..=15. Higher bits are ignored.
    pub exponent: u8,
    /// Row-major mantissas.
    pub mantissa: [Q8; 9],
}

impl Default for CompressedCov {
    fn default() -> Self {
        Self::UNIT
    }
}

impl CompressedCov {
    /// Identity covariance (unit variance on every axis).
    pub const UNIT: CompressedCov = CompressedCov {
        exponent: COV_EXP_BIAS as u8,
        mantissa: [
            Q8::ONE,
            Q8::ZERO,
            Q8::ZERO,
            Q8::ZERO,
            Q8::ONE,
            Q8::ZERO,
            Q8::ZERO,
            Q8::ZERO,
            Q8::ONE,
        ],
    };

    /// Quantize a float covariance, symmetrizing it and picking the smallest exponent
    /// whose mantissas do not saturate.
    pub fn quantize(m: [[f64; 3]; 3]) -> Self {
        let mut sym = [[0.0f64; 3]; 3];
        let mut max_abs = 0.0f64;
        for r in 0..3 {
            for c in 0..3 {
                let v = 0.5 * (m[r][c] + m[c][r]);
                let v = if v.is_finite() { v } else { 0.0 };
                sym[r][c] = v;
                max_abs = max_abs.max(v.abs());
            }
        }

        let mut exponent = 0u8;
        while exponent < COV_EXP_MAX
            && max_abs / 2f64.powi(i32::from(exponent) - COV_EXP_BIAS) > Q8_MAX_F64
        {
            exponent += 1;
        }

        let scale = 2f64.powi(i32::from(exponent) - COV_EXP_BIAS);
        let mut mantissa = [Q8::ZERO; 9];
        for r in 0..3 {
            for c in 0..3 {
                mantissa[r * 3 + c] = Q8::from_f64(sym[r][c] / scale);
            }
        }
        Self { exponent, mantissa }
    }

    /// Isotropic covariance `variance · I`.
    pub fn isotropic(variance: f64) -> Self {
        Self::quantize([
            [variance, 0.0, 0.0],
            [0.0, variance, 0.0],
            [0.0, 0.0, variance],
        ])
    }

    /// `R · diag(scale²) · Rᵀ` for a `(w, x, y, z)` rotation quaternion.
    pub fn from_scale_rotation(scale: [f64; 3], rotation: [f64; 4]) -> Self {
        let [w, x, y, z] = rotation;
        let n = (w * w + x * x + y * y + z * z).sqrt();
        let (w, x, y, z) = if n > 1e-12 {
            (w / n, x / n, y / n, z / n)
        } else {
            (1.0, 0.0, 0.0, 0.0)
        };
        let r = [
            [1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - w * z), 2.0 * (x * z + w * y)],
            [2.0 * (x * y + w * z), 1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - w * x)],
            [2.0 * (x * z - w * y), 2.0 * (y * z + w * x), 1.0 - 2.0 * (x * x + y * y)],
        ];
        let s2 = scale.map(|s| s * s);
        let mut m = [[0.0f64; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] = (0..3).map(|k| r[i][k] * s2[k] * r[j][k]).sum();
            }
        }
        Self::quantize(m)
    }

    /// Element `(row, col)` in Q16.16, saturating.
    pub fn entry(&self, row: usize, col: usize) -> Fx {
        let exp = i32::from(self.exponent & COV_EXP_MAX);
        let shift = (FX_SHIFT - Q8_SHIFT) as i32 + exp - COV_EXP_BIAS;
        let mant = i64::from(self.mantissa[row * 3 + col].0);
        let raw = if shift >= 0 {
            mant << shift
        } else {
            mant >> -shift
        };
        Fx(clamp_i32(raw))
    }

    /// Full de-quantized matrix, row-major.
    pub fn dequantize(&self) -> [[Fx; 3]; 3] {
        let mut out = [[Fx::ZERO; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.entry(r, c);
            }
        }
        out
    }

    /// Upper bound on the largest eigenvalue: the largest Gershgorin row sum.
    ///
    /// It is never below the largest diagonal term.
    pub fn max_variance_bound(&self) -> Fx {
        let m = self.dequantize();
        m.iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .fold(Fx::ZERO, |acc, (c, v)| if c == r { acc + *v } else { acc + v.abs() })
            })
            .max()
            .unwrap_or(Fx::ZERO)
    }
}

/// Immutable per-scene 3D Gaussian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splat3D {
    /// World-space center.
    pub position: Vec3,
    /// Compressed world-space covariance.
    pub covariance: CompressedCov,
    /// RGB color.
    pub color: [u8; 3],
    /// Opacity, 0 = transparent.
    pub opacity: u8,
    /// Quantized spherical-harmonics coefficients, opaque to the pipeline.
    pub sh: [u16; SH_COEFFS],
    /// Level-of-detail importance, opaque to the pipeline.
    pub importance: u32,
}

impl Splat3D {
    /// White, opaque splat with no SH data.
    pub fn new(position: Vec3, covariance: CompressedCov) -> Self {
        Self {
            position,
            covariance,
            color: [255, 255, 255],
            opacity: 255,
            sh: [0; SH_COEFFS],
            importance: 0,
        }
    }

    /// Replace color and opacity.
    pub fn with_color(mut self, color: [u8; 3], opacity: u8) -> Self {
        self.color = color;
        self.opacity = opacity;
        self
    }

    /// Conservative 3σ bounding-sphere radius.
    pub fn bounding_radius(&self) -> Fx {
        self.covariance.max_variance_bound().sqrt() * Fx::from_int(3)
    }
}

/// Per-frame projected splat, indexable by the scheduler's sorted index array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splat2D {
    /// Index of the source [`Splat3D`].
    pub source: u32,
    /// Screen-space center in pixels.
    pub screen: [Fx; 2],
    /// Camera-space depth (larger is farther).
    pub depth: Fx,
    /// Conservative 3σ radius in pixels.
    pub radius: Fx,
    /// Screen covariance `(xx, xy, yy)` in px².
    pub cov: [Q8; 3],
    /// Inverse screen covariance `(xx, xy, yy)`.
    pub inv_cov: [Q8; 3],
    /// Eigenvalues, largest first, both non-negative.
    pub eigenvalues: [Fx; 2],
    /// Row-major 2×2 rotation; column 0 is the major axis.
    pub eigenvectors: [Fx; 4],
    /// RGBA color.
    pub color: [u8; 4],
    /// Screen regions touched, one bit per cell of a 4×4 split of the screen.
    pub tile_mask: u16,
    /// Footprint atlas coordinates.
    pub atlas_uv: [u8; 2],
}

impl Splat2D {
    /// Unit major axis `(cos θ, sin θ)`.
    pub fn major_axis(&self) -> (Fx, Fx) {
        (self.eigenvectors[0], self.eigenvectors[2])
    }

    /// 3σ semi-axes `(major, minor)` in pixels.
    pub fn semi_axes(&self) -> (Fx, Fx) {
        let three = Fx::from_int(3);
        (
            self.eigenvalues[0].sqrt() * three,
            self.eigenvalues[1].sqrt() * three,
        )
    }

    /// Float center, for CPU backends and debug views.
    pub fn center(&self) -> kurbo::Point {
        kurbo::Point::new(self.screen[0].to_f64(), self.screen[1].to_f64())
    }

    /// Float 3σ ellipse, for CPU backends and debug views.
    pub fn ellipse(&self) -> kurbo::Ellipse {
        let (a, b) = self.semi_axes();
        let (c, s) = self.major_axis();
        let angle = s.to_f64().atan2(c.to_f64());
        kurbo::Ellipse::new(self.center(), (a.to_f64(), b.to_f64()), angle)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/splat.rs"]
mod tests;
