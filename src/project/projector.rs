use serde::{Deserialize, Serialize};

use crate::foundation::fixed::Fx;
use crate::foundation::matrix::{Vec3, dot_fx};
use crate::project::atlas::atlas_uv;
use crate::project::eigen::{invert_symmetric, solve_symmetric};
use crate::scene::camera::Camera;
use crate::scene::splat::{Splat2D, Splat3D};

/// Bound on each NDC Jacobian entry.
pub const JACOBIAN_LIMIT: Fx = Fx::from_int(1000);

/// Why a splat produced no 2D record this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullReason {
    /// Camera-space depth at or below [`Fx::EPSILON`].
    BehindCamera,
    /// Homogeneous `w` too close to zero to divide by.
    NumericalInstability,
    /// Center outside the NDC square.
    OutsideFrustum,
}

/// Projection outcome counts for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    /// Records written.
    pub projected: u32,
    /// Rejected with [`CullReason::BehindCamera`].
    pub behind_camera: u32,
    /// Rejected with [`CullReason::NumericalInstability`].
    pub unstable: u32,
    /// Rejected with [`CullReason::OutsideFrustum`].
    pub outside_frustum: u32,
    /// Splats whose covariance hit the isotropic fallback.
    pub degenerate_covariance: u32,
}

impl ProjectStats {
    fn record(&mut self, reason: CullReason) {
        match reason {
            CullReason::BehindCamera => self.behind_camera += 1,
            CullReason::NumericalInstability => self.unstable += 1,
            CullReason::OutsideFrustum => self.outside_frustum += 1,
        }
    }
}

/// Project one splat into screen space.
///
/// The returned record has `source == 0` and an empty tile mask; [`project_visible`] fills
/// the source index and the tile scheduler fills the mask.
pub fn project(splat: &Splat3D, camera: &Camera) -> Result<Splat2D, CullReason> {
    project_inner(splat, camera).map(|(s, _)| s)
}

fn project_inner(splat: &Splat3D, camera: &Camera) -> Result<(Splat2D, bool), CullReason> {
    let pc = camera.view.transform_point(splat.position);
    if pc.z <= Fx::EPSILON {
        return Err(CullReason::BehindCamera);
    }

    let p = &camera.projection;
    let clip = p.transform(pc.extend(Fx::ONE));
    let w = clip.w;
    if w.abs() < Fx::EPSILON {
        return Err(CullReason::NumericalInstability);
    }
    let ndc = Vec3::new(clip.x / w, clip.y / w, clip.z / w);
    if ndc.x.abs() > Fx::ONE || ndc.y.abs() > Fx::ONE {
        return Err(CullReason::OutsideFrustum);
    }
    let screen = camera.viewport.transform_point(ndc);

    // d(u/w)/dc = (P[r][c] * w - u * P[3][c]) / w², per NDC row, then scaled to pixels.
    let vp = &camera.viewport;
    let pixel_scale = [vp.at(0, 0), vp.at(1, 1)];
    let uv = [clip.x, clip.y];
    let mut jac = [[Fx::ZERO; 3]; 2];
    for r in 0..2 {
        for c in 0..3 {
            let num = dot_fx(&[p.at(r, c), -uv[r]], &[w, p.at(3, c)]);
            let d = (num / w / w).clamp(-JACOBIAN_LIMIT, JACOBIAN_LIMIT);
            jac[r][c] = d * pixel_scale[r];
        }
    }

    // Fold the view rotation in so the world-space covariance can be used directly.
    let v = &camera.view;
    let mut t = [[Fx::ZERO; 3]; 2];
    for r in 0..2 {
        for k in 0..3 {
            t[r][k] = dot_fx(&jac[r], &[v.at(0, k), v.at(1, k), v.at(2, k)]);
        }
    }

    let sigma = splat.covariance.dequantize();
    let mut m = [[Fx::ZERO; 3]; 2];
    for r in 0..2 {
        for k in 0..3 {
            m[r][k] = dot_fx(&t[r], &[sigma[0][k], sigma[1][k], sigma[2][k]]);
        }
    }
    let cxx = dot_fx(&m[0], &t[0]);
    let cxy = dot_fx(&m[0], &t[1]);
    let cyy = dot_fx(&m[1], &t[1]);

    let eig = solve_symmetric(cxx, cxy, cyy);
    let (cxx, cxy, cyy) = if eig.degenerate {
        (eig.values[0], Fx::ZERO, eig.values[0])
    } else {
        (cxx, cxy, cyy)
    };
    let radius = eig.values[0].sqrt() * Fx::from_int(3);
    let inv = invert_symmetric(cxx, cxy, cyy);

    let out = Splat2D {
        source: 0,
        screen: [screen.x, screen.y],
        depth: pc.z,
        radius,
        cov: [cxx.to_q8(), cxy.to_q8(), cyy.to_q8()],
        inv_cov: [inv[0].to_q8(), inv[1].to_q8(), inv[2].to_q8()],
        eigenvalues: eig.values,
        eigenvectors: eig.vectors,
        color: [splat.color[0], splat.color[1], splat.color[2], splat.opacity],
        tile_mask: 0,
        atlas_uv: atlas_uv(eig.values, eig.vectors),
    };
    Ok((out, eig.degenerate))
}

/// Project every splat listed in `visible` into `out`, which is cleared first.
///
/// Rejected splats are counted and skipped; a single bad splat never fails the batch.
#[tracing::instrument(level = "debug", skip_all, fields(visible = visible.len()))]
pub fn project_visible(
    splats: &[Splat3D],
    visible: &[u32],
    camera: &Camera,
    out: &mut Vec<Splat2D>,
) -> ProjectStats {
    out.clear();
    let mut stats = ProjectStats::default();
    for &idx in visible {
        let Some(splat) = splats.get(idx as usize) else {
            continue;
        };
        match project_inner(splat, camera) {
            Ok((mut s, degenerate)) => {
                s.source = idx;
                out.push(s);
                stats.projected += 1;
                if degenerate {
                    stats.degenerate_covariance += 1;
                }
            }
            Err(reason) => stats.record(reason),
        }
    }
    tracing::debug!(
        projected = stats.projected,
        rejected = stats.behind_camera + stats.unstable + stats.outside_frustum,
        "projection done"
    );
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/project/projector.rs"]
mod tests;
