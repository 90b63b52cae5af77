use std::sync::OnceLock;

/// Entry count of the one-dimensional tables (reciprocal, sqrt, sin, cos).
pub const LUT_SIZE: usize = 256;

/// Side length of the square atan2 table.
pub const ATAN2_LUT_SIZE: usize = 256;

/// Every transcendental table used by [`crate::Fx`], in raw Q16.16.
pub(crate) struct Tables {
    /// `recip[i] = 2^32 / i`, unclamped; callers saturate the final value. Entry 0 is unused.
    pub(crate) recip: [i64; LUT_SIZE],
    /// Square root at bucket centers of the normalized range [1, 4).
    pub(crate) sqrt: [i32; LUT_SIZE],
    /// `sin(i * 2π / 256)`.
    pub(crate) sin: [i32; LUT_SIZE],
    /// `cos(i * 2π / 256)`.
    pub(crate) cos: [i32; LUT_SIZE],
    /// Row-major `[y][x]` grid over the normalized square [-1, 1]².
    pub(crate) atan2: Box<[i32]>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

pub(crate) fn tables() -> &'static Tables {
    TABLES.get_or_init(Tables::generate)
}

/// Build every lookup table ahead of the first frame.
///
/// Generation happens once per process; later calls are no-ops. Calling this is optional since
/// the first table access builds them lazily, but it keeps the cost out of frame timing.
pub fn init_tables() {
    let _ = tables();
}

fn to_raw(v: f64) -> i32 {
    (v * 65536.0)
        .round()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Normalized coordinate at the center of atan2 bucket `i`.
fn atan2_bucket_center(i: usize) -> f64 {
    let last = (ATAN2_LUT_SIZE - 1) as f64;
    ((2.0 * i as f64 - last - 0.5) / last).clamp(-1.0, 1.0)
}

impl Tables {
    fn generate() -> Self {
        let mut recip = [0i64; LUT_SIZE];
        let mut sqrt = [0i32; LUT_SIZE];
        let mut sin = [0i32; LUT_SIZE];
        let mut cos = [0i32; LUT_SIZE];

        for (i, slot) in recip.iter_mut().enumerate().skip(1) {
            *slot = (1i64 << 32) / i as i64;
        }

        for (i, slot) in sqrt.iter_mut().enumerate() {
            let m = 1.0 + 3.0 * (i as f64 + 0.5) / LUT_SIZE as f64;
            *slot = to_raw(m.sqrt());
        }

        for i in 0..LUT_SIZE {
            let a = i as f64 * std::f64::consts::TAU / LUT_SIZE as f64;
            sin[i] = to_raw(a.sin());
            cos[i] = to_raw(a.cos());
        }

        let mut atan2 = vec![0i32; ATAN2_LUT_SIZE * ATAN2_LUT_SIZE];
        for iy in 0..ATAN2_LUT_SIZE {
            let y = atan2_bucket_center(iy);
            for ix in 0..ATAN2_LUT_SIZE {
                let x = atan2_bucket_center(ix);
                atan2[iy * ATAN2_LUT_SIZE + ix] = to_raw(y.atan2(x));
            }
        }

        tracing::debug!("fixed-point lookup tables generated");

        Self {
            recip,
            sqrt,
            sin,
            cos,
            atan2: atan2.into_boxed_slice(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/lut.rs"]
mod tests;
