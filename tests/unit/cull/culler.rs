use super::*;
use crate::foundation::matrix::Vec3;
use crate::scene::camera::{Lens, Quat, Viewport};
use crate::scene::splat::CompressedCov;

fn camera_at(x: f64, y: f64, z: f64) -> Camera {
    Camera::new(
        Vec3::from_f64(x, y, z),
        Quat::IDENTITY,
        Lens::from_degrees(60.0, 640.0 / 448.0, 0.1, 100.0),
        Viewport::new(640, 448),
    )
    .expect("valid camera")
}

fn splat(x: f64, y: f64, z: f64) -> Splat3D {
    Splat3D::new(Vec3::from_f64(x, y, z), CompressedCov::UNIT)
}

#[test]
fn zero_splats_is_invalid() {
    let mut culler = FrustumCuller::new(1.0, true);
    let mut out = Vec::new();
    let err = culler.cull(&[], &camera_at(0.0, 0.0, 0.0), &mut out).unwrap_err();
    assert!(matches!(err, SplatError::InvalidParameter(_)));
}

#[test]
fn splats_behind_the_camera_are_culled_with_their_cell() {
    let mut culler = FrustumCuller::new(1.0, true);
    let splats = [splat(0.0, 0.0, 10.0), splat(0.0, 0.0, -50.0)];
    let mut out = Vec::new();
    let stats = culler.cull(&splats, &camera_at(0.0, 0.0, 0.0), &mut out).unwrap();

    assert_eq!(out, vec![0]);
    assert_eq!(culler.states(), &[CullState::SplatVisible, CullState::CellRejected]);
    assert_eq!(culler.history(), &[1, 0]);
    assert_eq!(stats.cells_tested, 2);
    assert_eq!(stats.cells_rejected, 1);
    assert_eq!(stats.visible, 1);
    assert!(culler.grid().unwrap().cells().iter().any(|c| c.visible && c.last_visible_frame == 1));
}

#[test]
fn visible_indices_are_ascending() {
    let splats: Vec<Splat3D> = (0..200)
        .map(|i| {
            let t = f64::from(i);
            splat((t * 0.37).sin() * 6.0, (t * 0.11).cos() * 4.0, 5.0 + (t * 0.53).sin() * 30.0)
        })
        .collect();
    let mut culler = FrustumCuller::new(1.0, true);
    let mut out = Vec::new();
    culler.cull(&splats, &camera_at(0.0, 0.0, -5.0), &mut out).unwrap();
    assert!(!out.is_empty());
    assert!(out.windows(2).all(|w| w[0] < w[1]));
}

fn override_scene() -> (Vec<Splat3D>, Camera, Camera) {
    // Padding makes the single grid cell far larger than the splat, so the cell still
    // intersects the second frustum while the splat itself does not.
    let s = Splat3D::new(Vec3::from_f64(5.0, 5.0, 5.0), CompressedCov::isotropic(0.0001));
    (vec![s], camera_at(5.0, 5.0, -5.0), camera_at(25.0, 5.0, -5.0))
}

#[test]
fn stable_splats_survive_one_failed_frame() {
    let (splats, seen, away) = override_scene();
    let mut culler = FrustumCuller::new(40.0, true);
    let mut out = Vec::new();
    for _ in 0..HISTORY_DEPTH {
        culler.cull(&splats, &seen, &mut out).unwrap();
        assert_eq!(out, vec![0]);
    }
    assert_eq!(culler.history(), &[ALWAYS_VISIBLE]);

    let stats = culler.cull(&splats, &away, &mut out).unwrap();
    assert_eq!(out, vec![0]);
    assert_eq!(stats.temporal_kept, 1);
    assert_eq!(culler.states(), &[CullState::SplatRejected]);
    assert_eq!(culler.history(), &[0xFE]);

    let stats = culler.cull(&splats, &away, &mut out).unwrap();
    assert!(out.is_empty());
    assert_eq!(stats.temporal_kept, 0);
    assert_eq!(culler.history(), &[0xFC]);
}

#[test]
fn history_mask_spans_the_configured_depth() {
    assert_eq!(ALWAYS_VISIBLE.count_ones(), HISTORY_DEPTH);
    let (splats, seen, _) = override_scene();
    let mut culler = FrustumCuller::new(40.0, true);
    let mut out = Vec::new();
    for _ in 0..HISTORY_DEPTH - 1 {
        culler.cull(&splats, &seen, &mut out).unwrap();
    }
    assert_ne!(culler.history(), &[ALWAYS_VISIBLE]);
    culler.cull(&splats, &seen, &mut out).unwrap();
    culler.cull(&splats, &seen, &mut out).unwrap();
    assert_eq!(culler.history(), &[ALWAYS_VISIBLE]);
}

#[test]
fn override_can_be_disabled() {
    let (splats, seen, away) = override_scene();
    let mut culler = FrustumCuller::new(40.0, false);
    let mut out = Vec::new();
    for _ in 0..8 {
        culler.cull(&splats, &seen, &mut out).unwrap();
    }
    culler.cull(&splats, &away, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn reset_clears_history_and_grid() {
    let splats = [splat(0.0, 0.0, 10.0)];
    let mut culler = FrustumCuller::new(1.0, true);
    let mut out = Vec::new();
    culler.cull(&splats, &camera_at(0.0, 0.0, 0.0), &mut out).unwrap();
    culler.reset();
    assert!(culler.grid().is_none());
    assert!(culler.history().is_empty());

    culler.cull(&splats, &camera_at(0.0, 0.0, 0.0), &mut out).unwrap();
    assert_eq!(culler.history(), &[1]);
}

#[test]
fn scene_change_rebuilds_the_grid() {
    let mut culler = FrustumCuller::new(1.0, true);
    let mut out = Vec::new();
    let cam = camera_at(0.0, 0.0, 0.0);
    culler.cull(&[splat(0.0, 0.0, 10.0)], &cam, &mut out).unwrap();
    culler
        .cull(&[splat(0.0, 0.0, 10.0), splat(1.0, 0.0, 12.0)], &cam, &mut out)
        .unwrap();
    assert_eq!(out, vec![0, 1]);
    assert_eq!(culler.grid().unwrap().splat_count(), 2);
}
