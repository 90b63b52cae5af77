//! Saturating Q16.16 and Q8.8 fixed-point scalars.
//!
//! Every operation widens to a 64-bit (or 128-bit) intermediate and clamps to the
//! representable range instead of wrapping. Transcendentals are nearest-bucket table lookups.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::lut::{self, ATAN2_LUT_SIZE, LUT_SIZE};

/// Fractional bits of [`Fx`].
pub const FX_SHIFT: u32 = 16;
/// Fractional bits of [`Q8`].
pub const Q8_SHIFT: u32 = 8;

/// Operands with a raw magnitude below this use the reciprocal table.
const RECIP_LUT_LIMIT: i64 = LUT_SIZE as i64;
const NEWTON_ITERATIONS: usize = 4;
const TWO_PI_RAW: i64 = 411_775;

#[inline]
pub(crate) fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[inline]
pub(crate) fn clamp_i32_wide(v: i128) -> i32 {
    v.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

#[inline]
fn clamp_i16(v: i64) -> i16 {
    v.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Signed Q16.16 fixed-point scalar (range ±32767.99998).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fx(pub i32);

impl Fx {
    /// 0.0
    pub const ZERO: Fx = Fx(0);
    /// 1.0
    pub const ONE: Fx = Fx(1 << FX_SHIFT);
    /// 0.5
    pub const HALF: Fx = Fx(1 << (FX_SHIFT - 1));
    /// 2.0
    pub const TWO: Fx = Fx(2 << FX_SHIFT);
    /// Largest representable value.
    pub const MAX: Fx = Fx(i32::MAX);
    /// Smallest representable value.
    pub const MIN: Fx = Fx(i32::MIN);
    /// Near-zero threshold used by the projector and eigen solver (about 0.001).
    pub const EPSILON: Fx = Fx(65);
    /// π
    pub const PI: Fx = Fx(205_887);
    /// 2π
    pub const TWO_PI: Fx = Fx(TWO_PI_RAW as i32);
    /// π / 2
    pub const HALF_PI: Fx = Fx(102_944);

    /// Wrap a raw Q16.16 bit pattern.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw Q16.16 bit pattern.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Integer value, clamped to the Q16.16 integer range.
    pub const fn from_int(v: i32) -> Self {
        let v = if v > 32767 {
            32767
        } else if v < -32768 {
            -32768
        } else {
            v
        };
        Self(v << FX_SHIFT)
    }

    /// Round a float to the nearest representable value. NaN maps to zero.
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return Self::ZERO;
        }
        let scaled = (v * f64::from(1u32 << FX_SHIFT)).round();
        Self(scaled.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
    }

    /// Round a float to the nearest representable value. NaN maps to zero.
    pub fn from_f32(v: f32) -> Self {
        Self::from_f64(f64::from(v))
    }

    /// Float view, for host-side tooling and tests.
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1u32 << FX_SHIFT)
    }

    /// Float view, for host-side tooling and tests.
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Integer part, rounded toward negative infinity.
    pub const fn floor_int(self) -> i32 {
        self.0 >> FX_SHIFT
    }

    /// Saturating addition.
    #[inline]
    pub fn sat_add(self, rhs: Fx) -> Fx {
        Fx(clamp_i32(i64::from(self.0) + i64::from(rhs.0)))
    }

    /// Saturating subtraction.
    #[inline]
    pub fn sat_sub(self, rhs: Fx) -> Fx {
        Fx(clamp_i32(i64::from(self.0) - i64::from(rhs.0)))
    }

    /// Saturating multiplication.
    #[inline]
    pub fn sat_mul(self, rhs: Fx) -> Fx {
        Fx(clamp_i32((i64::from(self.0) * i64::from(rhs.0)) >> FX_SHIFT))
    }

    /// `self + a * b` with a single rounding step and saturation.
    #[inline]
    pub fn mad(self, a: Fx, b: Fx) -> Fx {
        let acc = (i64::from(self.0) << FX_SHIFT) + i64::from(a.0) * i64::from(b.0);
        Fx(clamp_i32(acc >> FX_SHIFT))
    }

    /// Saturating absolute value (`MIN.abs() == MAX`).
    #[inline]
    pub fn abs(self) -> Fx {
        Fx(self.0.saturating_abs())
    }

    /// Saturating left shift (multiply by `2^n`).
    pub fn shl(self, n: u32) -> Fx {
        Fx(clamp_i32(i64::from(self.0) << n.min(31)))
    }

    /// Arithmetic right shift (divide by `2^n`, rounding down).
    pub fn shr(self, n: u32) -> Fx {
        Fx(self.0 >> n.min(31))
    }

    /// Reciprocal via table fast path or Newton–Raphson. `recip(0)` saturates to `MAX`.
    pub fn recip(self) -> Fx {
        let d = i64::from(self.0);
        if d == 0 {
            return Fx::MAX;
        }
        let mag = d.abs();
        let r = if mag < RECIP_LUT_LIMIT {
            i128::from(lut::tables().recip[mag as usize])
        } else {
            let (x, e) = newton_recip(mag);
            shift_wide(x, e - 14)
        };
        Fx(clamp_i32_wide(if d < 0 { -r } else { r }))
    }

    /// Saturating division computed as `self * recip(rhs)`.
    ///
    /// Division by zero saturates toward the sign of `self` (zero stays zero).
    pub fn sat_div(self, rhs: Fx) -> Fx {
        let d = i64::from(rhs.0);
        if d == 0 {
            return match self.0.cmp(&0) {
                Ordering::Greater => Fx::MAX,
                Ordering::Less => Fx::MIN,
                Ordering::Equal => Fx::ZERO,
            };
        }
        let mag = d.abs();
        let q = if mag < RECIP_LUT_LIMIT {
            (i128::from(self.0) * i128::from(lut::tables().recip[mag as usize])) >> FX_SHIFT
        } else {
            let (x, e) = newton_recip(mag);
            shift_wide(i128::from(self.0) * x, e - 30)
        };
        Fx(clamp_i32_wide(if d < 0 { -q } else { q }))
    }

    /// Table square root. Non-positive input returns zero.
    pub fn sqrt(self) -> Fx {
        if self.0 <= 0 {
            return Fx::ZERO;
        }
        let one = 1i64 << FX_SHIFT;
        let mut m = i64::from(self.0);
        let mut e = 0i32;
        while m >= 4 * one {
            m >>= 2;
            e += 1;
        }
        while m < one {
            m <<= 2;
            e -= 1;
        }
        let idx = ((m - one) * LUT_SIZE as i64 / (3 * one)).clamp(0, LUT_SIZE as i64 - 1);
        let s = i128::from(lut::tables().sqrt[idx as usize]);
        Fx(clamp_i32_wide(shift_wide(s, e)))
    }

    /// Table square root polished by one Newton–Raphson step, `(s + x / s) / 2`.
    pub fn sqrt_refined(self) -> Fx {
        let s = self.sqrt();
        if s == Fx::ZERO {
            return s;
        }
        let q = self / s;
        Fx(clamp_i32((i64::from(s.0) + i64::from(q.0) + 1) >> 1))
    }

    /// Table sine; the argument is in radians and wraps to [0, 2π).
    pub fn sin(self) -> Fx {
        Fx(lut::tables().sin[angle_index(self)])
    }

    /// Table cosine; the argument is in radians and wraps to [0, 2π).
    pub fn cos(self) -> Fx {
        Fx(lut::tables().cos[angle_index(self)])
    }

    /// Table four-quadrant arctangent of `self / x`, in (-π, π].
    pub fn atan2(self, x: Fx) -> Fx {
        let (y, x) = (i64::from(self.0), i64::from(x.0));
        let m = y.abs().max(x.abs());
        if m == 0 {
            return Fx::ZERO;
        }
        let iy = atan2_index(y, m);
        let ix = atan2_index(x, m);
        Fx(lut::tables().atan2[iy * ATAN2_LUT_SIZE + ix])
    }

    /// Saturating conversion to Q8.8.
    pub fn to_q8(self) -> Q8 {
        Q8::from_fx(self)
    }
}

/// Normalized Newton–Raphson reciprocal of a raw magnitude (`mag >= 256`).
///
/// Returns `(x, e)` with `1 / (mag / 2^16) ≈ (x / 2^30) * 2^e`.
fn newton_recip(mag: i64) -> (i128, i32) {
    // Half-open at the bottom so powers of two land on the exact end of the range.
    let bits = 63 - (mag - 1).leading_zeros() as i32;
    // (1, 2] with seed 0.5 above 1.0, (0.25, 0.5] with seed 2.0 otherwise.
    let (e, seed) = if bits >= FX_SHIFT as i32 {
        (FX_SHIFT as i32 - bits, 1i128 << 29)
    } else {
        (FX_SHIFT as i32 - 2 - bits, 1i128 << 31)
    };
    let m = shift_wide(i128::from(mag), e + 14);
    let two = 2i128 << 30;
    let mut x = seed;
    for _ in 0..NEWTON_ITERATIONS {
        let dx = (m * x) >> 30;
        x = (x * (two - dx)) >> 30;
    }
    (x, e)
}

#[inline]
fn shift_wide(v: i128, s: i32) -> i128 {
    if s >= 0 {
        v << s.min(64)
    } else {
        v >> (-s).min(127)
    }
}

fn angle_index(a: Fx) -> usize {
    let a = i64::from(a.0).rem_euclid(TWO_PI_RAW);
    let n = LUT_SIZE as i64;
    (((a * n + TWO_PI_RAW / 2) / TWO_PI_RAW) % n) as usize
}

fn atan2_index(v: i64, m: i64) -> usize {
    let last = ATAN2_LUT_SIZE as i64 - 1;
    let t = v * last / m;
    ((t + last + 1) / 2).clamp(0, last) as usize
}

impl Add for Fx {
    type Output = Fx;
    fn add(self, rhs: Fx) -> Fx {
        self.sat_add(rhs)
    }
}

impl AddAssign for Fx {
    fn add_assign(&mut self, rhs: Fx) {
        *self = self.sat_add(rhs);
    }
}

impl Sub for Fx {
    type Output = Fx;
    fn sub(self, rhs: Fx) -> Fx {
        self.sat_sub(rhs)
    }
}

impl SubAssign for Fx {
    fn sub_assign(&mut self, rhs: Fx) {
        *self = self.sat_sub(rhs);
    }
}

impl Mul for Fx {
    type Output = Fx;
    fn mul(self, rhs: Fx) -> Fx {
        self.sat_mul(rhs)
    }
}

impl Div for Fx {
    type Output = Fx;
    fn div(self, rhs: Fx) -> Fx {
        self.sat_div(rhs)
    }
}

impl Neg for Fx {
    type Output = Fx;
    fn neg(self) -> Fx {
        Fx(self.0.saturating_neg())
    }
}

/// Signed Q8.8 fixed-point mantissa (range ±127.996), used for compressed covariance.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Q8(pub i16);

impl Q8 {
    /// 0.0
    pub const ZERO: Q8 = Q8(0);
    /// 1.0
    pub const ONE: Q8 = Q8(1 << Q8_SHIFT);
    /// Largest representable value.
    pub const MAX: Q8 = Q8(i16::MAX);
    /// Smallest representable value.
    pub const MIN: Q8 = Q8(i16::MIN);

    /// Raw Q8.8 bit pattern.
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// Round a float to the nearest representable value. NaN maps to zero.
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return Self::ZERO;
        }
        let scaled = (v * f64::from(1u32 << Q8_SHIFT)).round();
        Self(scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16)
    }

    /// Float view.
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1u32 << Q8_SHIFT)
    }

    /// Saturating narrowing from Q16.16 (truncates the low 8 fractional bits).
    pub fn from_fx(v: Fx) -> Self {
        Self(clamp_i16(i64::from(v.0) >> (FX_SHIFT - Q8_SHIFT)))
    }

    /// Exact widening to Q16.16.
    pub fn to_fx(self) -> Fx {
        Fx(i32::from(self.0) << (FX_SHIFT - Q8_SHIFT))
    }

    /// Saturating addition.
    pub fn sat_add(self, rhs: Q8) -> Q8 {
        Q8(clamp_i16(i64::from(self.0) + i64::from(rhs.0)))
    }

    /// Saturating subtraction.
    pub fn sat_sub(self, rhs: Q8) -> Q8 {
        Q8(clamp_i16(i64::from(self.0) - i64::from(rhs.0)))
    }

    /// Saturating multiplication.
    pub fn sat_mul(self, rhs: Q8) -> Q8 {
        Q8(clamp_i16((i64::from(self.0) * i64::from(rhs.0)) >> Q8_SHIFT))
    }
}

impl Add for Q8 {
    type Output = Q8;
    fn add(self, rhs: Q8) -> Q8 {
        self.sat_add(rhs)
    }
}

impl Sub for Q8 {
    type Output = Q8;
    fn sub(self, rhs: Q8) -> Q8 {
        self.sat_sub(rhs)
    }
}

impl Mul for Q8 {
    type Output = Q8;
    fn mul(self, rhs: Q8) -> Q8 {
        self.sat_mul(rhs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fixed.rs"]
mod tests;
