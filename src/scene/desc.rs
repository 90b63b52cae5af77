//! JSON scene interchange and synthetic scene generation for host tooling.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::matrix::Vec3;
use crate::scene::splat::{CompressedCov, Splat3D};

const MAX_COORD: f32 = 30_000.0;

/// Deterministic SplitMix64 generator.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Seeded generator.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1) with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64_01()
    }
}

fn default_scale() -> [f32; 3] {
    [0.1, 0.1, 0.1]
}

fn default_rotation() -> [f32; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

fn default_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_opacity() -> u8 {
    255
}

/// One splat in float form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplatDesc {
    /// World-space center.
    pub position: [f32; 3],
    /// Standard deviation along each local axis.
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Local-to-world rotation as `(w, x, y, z)`.
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    /// RGB color.
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    /// Opacity.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
}

/// Float scene description, converted to [`Splat3D`] records at load time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    /// Splats in index order.
    pub splats: Vec<SplatDesc>,
}

impl SceneDesc {
    /// Parse a JSON scene.
    pub fn from_json_str(s: &str) -> SplatResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a JSON scene file.
    pub fn load(path: &Path) -> SplatResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            let context = format!("read scene '{}'", path.display());
            SplatError::Other(anyhow::Error::new(e).context(context))
        })?;
        Self::from_json_str(&s)
    }

    /// Random cloud of `count` splats inside a cube of half-size `extent` around the origin.
    pub fn synthetic(count: usize, extent: f32, seed: u64) -> Self {
        let mut rng = Rng64::new(seed);
        let e = f64::from(extent.abs());
        let splats = (0..count)
            .map(|_| {
                let position = [rng.range(-e, e), rng.range(-e, e), rng.range(-e, e)];
                let scale = [rng.range(0.03, 0.3), rng.range(0.03, 0.3), rng.range(0.03, 0.3)];
                let rotation = [
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                ];
                let color = [
                    (rng.next_u64() & 0xFF) as u8,
                    (rng.next_u64() & 0xFF) as u8,
                    (rng.next_u64() & 0xFF) as u8,
                ];
                SplatDesc {
                    position: position.map(|v| v as f32),
                    scale: scale.map(|v| v as f32),
                    rotation: rotation.map(|v| v as f32),
                    color,
                    opacity: 128 + (rng.next_u64() & 0x7F) as u8,
                }
            })
            .collect();
        Self { splats }
    }

    /// Quantize into pipeline records. Empty scenes and non-finite or out-of-range
    /// values are rejected.
    pub fn to_splats(&self) -> SplatResult<Vec<Splat3D>> {
        if self.splats.is_empty() {
            return Err(SplatError::invalid("scene has no splats"));
        }
        self.splats
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let finite = d
                    .position
                    .iter()
                    .chain(d.scale.iter())
                    .chain(d.rotation.iter())
                    .all(|v| v.is_finite());
                if !finite {
                    return Err(SplatError::invalid(format!("splat {i} has non-finite values")));
                }
                if d.position.iter().any(|v| v.abs() > MAX_COORD) {
                    return Err(SplatError::invalid(format!(
                        "splat {i} lies outside the fixed-point range"
                    )));
                }
                let [x, y, z] = d.position.map(f64::from);
                let cov = CompressedCov::from_scale_rotation(
                    d.scale.map(f64::from),
                    d.rotation.map(f64::from),
                );
                Ok(Splat3D::new(Vec3::from_f64(x, y, z), cov).with_color(d.color, d.opacity))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/desc.rs"]
mod tests;
