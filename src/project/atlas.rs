use crate::foundation::fixed::Fx;
use crate::scene::splat::Splat2D;

/// Buckets per atlas axis.
pub const ATLAS_BUCKETS: i64 = 8;
/// Atlas texels per bucket.
pub const ATLAS_CELL: i64 = 32;
/// Side length of the footprint atlas in texels.
pub const ATLAS_SIZE: u32 = (ATLAS_BUCKETS * ATLAS_CELL) as u32;
/// Squared Mahalanobis distance past which a footprint texel is zero (3σ).
const CUTOFF_SQ: f64 = 9.0;
/// Aspect ratio mapped to the last aspect bucket.
const LOG2_MAX_ASPECT: i64 = 3;
const LOG2_FRAC_BITS: u32 = 8;

/// `log2(x)` for `x >= 1` with 8 fractional bits, by repeated squaring.
fn log2_fx(x: Fx) -> Fx {
    if x <= Fx::ONE {
        return Fx::ZERO;
    }
    let int_part = 31 - x.raw().leading_zeros() as i32 - 16;
    let mut y = x.shr(int_part as u32);
    let mut frac = 0i32;
    for _ in 0..LOG2_FRAC_BITS {
        y = y * y;
        frac <<= 1;
        if y >= Fx::TWO {
            y = y.shr(1);
            frac |= 1;
        }
    }
    Fx::from_raw((int_part << 16) | (frac << (16 - LOG2_FRAC_BITS)))
}

/// Footprint atlas texel for an ellipse: column from orientation, row from aspect.
///
/// Aspect ratios `1..8` map onto 8 logarithmic rows; orientations `[0, π)` onto 8 columns.
/// Ellipses whose minor eigenvalue is near zero map to `(0, 0)`.
pub fn atlas_uv(values: [Fx; 2], vectors: [Fx; 4]) -> [u8; 2] {
    let [ev1, ev2] = values;
    if ev2 <= Fx::EPSILON {
        return [0, 0];
    }
    let aspect = if ev1 >= ev2 { ev1 / ev2 } else { ev2 / ev1 };
    let log = i64::from(log2_fx(aspect).raw());
    let aspect_idx =
        (log * (ATLAS_BUCKETS - 1) / (LOG2_MAX_ASPECT << 16)).clamp(0, ATLAS_BUCKETS - 1);

    // Eigenvectors are sign-ambiguous, so fold the angle into [0, π).
    let mut angle = vectors[2].atan2(vectors[0]);
    if angle < Fx::ZERO {
        angle += Fx::PI;
    }
    if angle >= Fx::PI {
        angle -= Fx::PI;
    }
    let angle_idx = (i64::from(angle.raw()) * ATLAS_BUCKETS / i64::from(Fx::PI.raw()))
        .clamp(0, ATLAS_BUCKETS - 1);

    [
        (angle_idx * ATLAS_CELL + ATLAS_CELL / 2) as u8,
        (aspect_idx * ATLAS_CELL + ATLAS_CELL / 2) as u8,
    ]
}

/// Grayscale footprint atlas matching [`atlas_uv`].
///
/// Row `r` holds ellipses with eigenvalue ratio `8^(r/7)`, column `c` ellipses whose major axis
/// points at the center of angle bucket `c`. Each cell is a 32×32 Gaussian whose 3σ major
/// semi-axis spans the cell, with alpha in 0..=255.
pub fn footprint_atlas() -> image::GrayImage {
    let mut atlas = image::GrayImage::new(ATLAS_SIZE, ATLAS_SIZE);
    let cell = ATLAS_CELL as u32;
    let last = (ATLAS_CELL - 1) as f64;
    for row in 0..ATLAS_BUCKETS as u32 {
        let aspect = 8f64.powf(f64::from(row) / (ATLAS_BUCKETS - 1) as f64);
        for col in 0..ATLAS_BUCKETS as u32 {
            let theta = (f64::from(col) + 0.5) * std::f64::consts::PI / ATLAS_BUCKETS as f64;
            let (sin, cos) = theta.sin_cos();
            for py in 0..cell {
                for px in 0..cell {
                    let nx = f64::from(px) / last * 2.0 - 1.0;
                    let ny = f64::from(py) / last * 2.0 - 1.0;
                    let along = nx * cos + ny * sin;
                    let across = ny * cos - nx * sin;
                    let d2 = CUTOFF_SQ * (along * along + aspect * across * across);
                    let alpha = if d2 > CUTOFF_SQ {
                        0
                    } else {
                        ((-0.5 * d2).exp() * 255.0).round() as u8
                    };
                    atlas.put_pixel(col * cell + px, row * cell + py, image::Luma([alpha]));
                }
            }
        }
    }
    tracing::debug!(size = ATLAS_SIZE, "footprint atlas generated");
    atlas
}

/// Footprint alpha of `splat` at pixel offset `(dx, dy)` from its center.
///
/// The offset is scaled so that the splat radius reaches the cell edge. Offsets outside the
/// radius, and splats with zero radius, sample as 0.
pub fn sample_footprint(atlas: &image::GrayImage, splat: &Splat2D, dx: Fx, dy: Fx) -> u8 {
    if splat.radius <= Fx::ZERO {
        return 0;
    }
    let (u, v) = (dx / splat.radius, dy / splat.radius);
    if u.abs() > Fx::ONE || v.abs() > Fx::ONE {
        return 0;
    }
    let half = Fx::from_int(ATLAS_CELL as i32 - 1).shr(1);
    let local = |t: Fx| {
        ((t + Fx::ONE) * half + Fx::HALF)
            .floor_int()
            .clamp(0, ATLAS_CELL as i32 - 1)
    };
    let cell = ATLAS_CELL as u32;
    let x = u32::from(splat.atlas_uv[0]) / cell * cell + local(u) as u32;
    let y = u32::from(splat.atlas_uv[1]) / cell * cell + local(v) as u32;
    atlas.get_pixel_checked(x, y).map_or(0, |p| p.0[0])
}

#[cfg(test)]
#[path = "../../tests/unit/project/atlas.rs"]
mod tests;
