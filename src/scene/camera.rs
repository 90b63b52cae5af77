//! Camera rig: orientation quaternions, view/projection/viewport matrices and motion tracking.
//!
//! Camera space looks down `+z` with `+y` up; screen `y` grows downward.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::fixed::Fx;
use crate::foundation::matrix::{Mat4, UNIT_TOLERANCE, Vec3, dot_fx};

/// Q16.16 rotation quaternion `w + xi + yj + zk`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quat {
    /// Scalar part.
    pub w: Fx,
    /// `i` component.
    pub x: Fx,
    /// `j` component.
    pub y: Fx,
    /// `k` component.
    pub z: Fx,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// No rotation.
    pub const IDENTITY: Quat = Quat {
        w: Fx::ONE,
        x: Fx::ZERO,
        y: Fx::ZERO,
        z: Fx::ZERO,
    };

    /// Rotation of `angle` radians about `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: Fx) -> Quat {
        let half = angle.shr(1);
        let (s, c) = (half.sin(), half.cos());
        let n = axis.normalize();
        Quat {
            w: c,
            x: n.x * s,
            y: n.y * s,
            z: n.z * s,
        }
        .normalize()
    }

    fn to_array(self) -> [Fx; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// Four-component dot product.
    pub fn dot(self, o: Quat) -> Fx {
        dot_fx(&self.to_array(), &o.to_array())
    }

    /// Inverse rotation for unit quaternions.
    pub fn conjugate(self) -> Quat {
        Quat {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Unit quaternion in the same direction; degenerate input becomes identity.
    pub fn normalize(self) -> Quat {
        let len_sq = self.dot(self);
        if (len_sq - Fx::ONE).abs() <= UNIT_TOLERANCE {
            return self;
        }
        let len = len_sq.sqrt_refined();
        if len <= Fx::EPSILON {
            return Quat::IDENTITY;
        }
        Quat {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    /// Rotation matrix, row-major.
    pub fn to_rotation(self) -> [[Fx; 3]; 3] {
        let Quat { w, x, y, z } = self;
        let two = Fx::TWO;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        [
            [Fx::ONE - two * (yy + zz), two * (xy - wz), two * (xz + wy)],
            [two * (xy + wz), Fx::ONE - two * (xx + zz), two * (yz - wx)],
            [two * (xz - wy), two * (yz + wx), Fx::ONE - two * (xx + yy)],
        ]
    }

    /// Quaternion of a row-major rotation matrix.
    pub fn from_rotation(m: [[Fx; 3]; 3]) -> Quat {
        let quarter = |s: Fx| s.shr(2);
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > Fx::ZERO {
            let s = (trace + Fx::ONE).sqrt_refined().shl(1);
            Quat {
                w: quarter(s),
                x: (m[2][1] - m[1][2]) / s,
                y: (m[0][2] - m[2][0]) / s,
                z: (m[1][0] - m[0][1]) / s,
            }
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (Fx::ONE + m[0][0] - m[1][1] - m[2][2]).sqrt_refined().shl(1);
            Quat {
                w: (m[2][1] - m[1][2]) / s,
                x: quarter(s),
                y: (m[0][1] + m[1][0]) / s,
                z: (m[0][2] + m[2][0]) / s,
            }
        } else if m[1][1] > m[2][2] {
            let s = (Fx::ONE + m[1][1] - m[0][0] - m[2][2]).sqrt_refined().shl(1);
            Quat {
                w: (m[0][2] - m[2][0]) / s,
                x: (m[0][1] + m[1][0]) / s,
                y: quarter(s),
                z: (m[1][2] + m[2][1]) / s,
            }
        } else {
            let s = (Fx::ONE + m[2][2] - m[0][0] - m[1][1]).sqrt_refined().shl(1);
            Quat {
                w: (m[1][0] - m[0][1]) / s,
                x: (m[0][2] + m[2][0]) / s,
                y: (m[1][2] + m[2][1]) / s,
                z: quarter(s),
            }
        };
        q.normalize()
    }

    /// Rotate a vector.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let r = self.to_rotation();
        let v = v.to_array();
        Vec3::new(dot_fx(&r[0], &v), dot_fx(&r[1], &v), dot_fx(&r[2], &v))
    }
}

impl std::ops::Mul for Quat {
    type Output = Quat;

    /// Hamilton product: `self * o` applies `o` first.
    fn mul(self, o: Quat) -> Quat {
        Quat {
            w: dot_fx(&[self.w, -self.x, -self.y, -self.z], &[o.w, o.x, o.y, o.z]),
            x: dot_fx(&[self.w, self.x, self.y, -self.z], &[o.x, o.w, o.z, o.y]),
            y: dot_fx(&[self.w, -self.x, self.y, self.z], &[o.y, o.z, o.w, o.x]),
            z: dot_fx(&[self.w, self.x, -self.y, self.z], &[o.z, o.y, o.x, o.w]),
        }
    }
}

/// Symmetric perspective lens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov_y: Fx,
    /// Width over height.
    pub aspect: Fx,
    /// Near plane distance.
    pub near: Fx,
    /// Far plane distance.
    pub far: Fx,
}

impl Lens {
    /// Build from float parameters (`fov_y` in degrees).
    pub fn from_degrees(fov_y_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self {
            fov_y: Fx::from_f64(fov_y_deg.to_radians()),
            aspect: Fx::from_f64(aspect),
            near: Fx::from_f64(near),
            far: Fx::from_f64(far),
        }
    }

    /// Reject lenses that cannot produce a finite projection.
    ///
    /// Out-of-range parameters are [`SplatError::InvalidParameter`]; in-range lenses whose
    /// projection terms saturate (a sliver of a field of view, nearly coincident planes) are
    /// [`SplatError::NumericalInstability`].
    pub fn validate(&self) -> SplatResult<()> {
        if self.fov_y <= Fx::ZERO || self.fov_y >= Fx::PI {
            return Err(SplatError::invalid("fov_y must be in (0, π)"));
        }
        if self.aspect <= Fx::EPSILON {
            return Err(SplatError::invalid("aspect must be positive"));
        }
        if self.near <= Fx::EPSILON || self.far <= self.near {
            return Err(SplatError::invalid("planes must satisfy 0 < near < far"));
        }
        let m = self.perspective();
        if [m.at(0, 0), m.at(1, 1), m.at(2, 2), m.at(2, 3)]
            .iter()
            .any(|v| v.abs() == Fx::MAX)
        {
            return Err(SplatError::numerical("lens projection saturates Q16.16"));
        }
        Ok(())
    }

    /// Projection matrix mapping camera depth `near..far` to NDC `-1..1`, with `w = z`.
    pub fn perspective(&self) -> Mat4 {
        let half = self.fov_y.shr(1);
        let f = half.cos() / half.sin();
        let depth = self.far - self.near;
        let a = (self.far + self.near) / depth;
        let b = -((self.far * self.near).shl(1) / depth);
        let z = Fx::ZERO;
        Mat4::from_rows([
            f / self.aspect,
            z,
            z,
            z,
            z,
            f,
            z,
            z,
            z,
            z,
            a,
            b,
            z,
            z,
            Fx::ONE,
            z,
        ])
    }
}

/// Screen rectangle that NDC maps onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: Fx,
    /// Top edge in pixels.
    pub y: Fx,
    /// Width in pixels.
    pub width: Fx,
    /// Height in pixels.
    pub height: Fx,
}

impl Viewport {
    /// Viewport at the origin covering `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: Fx::ZERO,
            y: Fx::ZERO,
            width: Fx::from_int(width.min(i32::MAX as u32) as i32),
            height: Fx::from_int(height.min(i32::MAX as u32) as i32),
        }
    }

    /// NDC to screen: `x' = (x + 1) · w/2 + x0`, `y' = (1 - y) · h/2 + y0`, `z' = (z + 1) / 2`.
    pub fn to_matrix(&self) -> Mat4 {
        let hw = self.width.shr(1);
        let hh = self.height.shr(1);
        let z = Fx::ZERO;
        Mat4::from_rows([
            hw,
            z,
            z,
            self.x + hw,
            z,
            -hh,
            z,
            self.y + hh,
            z,
            z,
            Fx::HALF,
            Fx::HALF,
            z,
            z,
            z,
            Fx::ONE,
        ])
    }
}

/// Camera state consumed by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// World-space eye position.
    pub position: Vec3,
    /// Camera-to-world rotation.
    pub orientation: Quat,
    /// World to camera.
    pub view: Mat4,
    /// Camera to clip.
    pub projection: Mat4,
    /// NDC to screen.
    pub viewport: Mat4,
}

impl Camera {
    /// Wrap matrices produced by an external camera system.
    pub fn from_matrices(
        view: Mat4,
        projection: Mat4,
        viewport: Mat4,
        position: Vec3,
        orientation: Quat,
    ) -> Self {
        Self {
            position,
            orientation,
            view,
            projection,
            viewport,
        }
    }

    /// Camera at `position` rotated by `orientation` (camera-to-world).
    pub fn new(
        position: Vec3,
        orientation: Quat,
        lens: Lens,
        viewport: Viewport,
    ) -> SplatResult<Self> {
        lens.validate()?;
        validate_viewport(&viewport)?;
        let orientation = orientation.normalize();
        let r = orientation.to_rotation();
        // Rows of the view rotation are the camera axes in world space (columns of r).
        let axes = [
            Vec3::new(r[0][0], r[1][0], r[2][0]),
            Vec3::new(r[0][1], r[1][1], r[2][1]),
            Vec3::new(r[0][2], r[1][2], r[2][2]),
        ];
        Ok(Self {
            position,
            orientation,
            view: view_from_axes(axes, position),
            projection: lens.perspective(),
            viewport: viewport.to_matrix(),
        })
    }

    /// Camera at `eye` looking at `target`.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        lens: Lens,
        viewport: Viewport,
    ) -> SplatResult<Self> {
        lens.validate()?;
        validate_viewport(&viewport)?;
        let forward = (target - eye).normalize();
        if forward == Vec3::ZERO {
            return Err(SplatError::invalid("look_at target coincides with eye"));
        }
        let right = up.cross(forward).normalize();
        if right == Vec3::ZERO {
            return Err(SplatError::invalid("look_at up vector is parallel to view direction"));
        }
        let true_up = forward.cross(right);
        let rot = [
            [right.x, true_up.x, forward.x],
            [right.y, true_up.y, forward.y],
            [right.z, true_up.z, forward.z],
        ];
        Ok(Self {
            position: eye,
            orientation: Quat::from_rotation(rot),
            view: view_from_axes([right, true_up, forward], eye),
            projection: lens.perspective(),
            viewport: viewport.to_matrix(),
        })
    }

    /// `projection · view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection.mul_mat(&self.view)
    }
}

fn validate_viewport(v: &Viewport) -> SplatResult<()> {
    if v.width <= Fx::ZERO || v.height <= Fx::ZERO {
        return Err(SplatError::invalid("viewport must have a positive size"));
    }
    Ok(())
}

fn view_from_axes(axes: [Vec3; 3], eye: Vec3) -> Mat4 {
    let mut m = Mat4::IDENTITY.m;
    for (i, a) in axes.iter().enumerate() {
        m[i * 4] = a.x;
        m[i * 4 + 1] = a.y;
        m[i * 4 + 2] = a.z;
        m[i * 4 + 3] = -a.dot(eye);
    }
    Mat4::from_rows(m)
}

/// Tracks the camera pose of the last depth sort and reports significant motion.
#[derive(Clone, Debug)]
pub struct CameraTracker {
    reference: Option<(Vec3, Quat)>,
    position_threshold_sq: Fx,
    min_rotation_dot: Fx,
}

impl CameraTracker {
    /// Thresholds in scene units and degrees.
    pub fn new(position_threshold: f32, rotation_threshold_deg: f32) -> Self {
        let p = f64::from(position_threshold);
        let half = f64::from(rotation_threshold_deg).to_radians() * 0.5;
        Self {
            reference: None,
            position_threshold_sq: Fx::from_f64(p * p),
            min_rotation_dot: Fx::from_f64(half.cos()),
        }
    }

    /// `true` before the first [`CameraTracker::mark`] or when the camera moved or turned
    /// past a threshold since then.
    pub fn moved_significantly(&self, camera: &Camera) -> bool {
        let Some((pos, rot)) = self.reference else {
            return true;
        };
        let d = camera.position - pos;
        if d.length_sq() > self.position_threshold_sq {
            return true;
        }
        // q and -q are the same rotation.
        camera.orientation.dot(rot).abs() < self.min_rotation_dot
    }

    /// Record `camera` as the new reference pose.
    pub fn mark(&mut self, camera: &Camera) {
        self.reference = Some((camera.position, camera.orientation));
    }

    /// Forget the reference pose.
    pub fn reset(&mut self) {
        self.reference = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/camera.rs"]
mod tests;
