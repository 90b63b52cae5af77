use super::*;

fn v3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::from_f64(x, y, z)
}

fn near(a: Vec3, b: [f64; 3], tol: f64) -> bool {
    let a = a.to_f64();
    (0..3).all(|i| (a[i] - b[i]).abs() <= tol)
}

fn lens() -> Lens {
    Lens::from_degrees(60.0, 640.0 / 448.0, 0.1, 100.0)
}

#[test]
fn identity_camera_keeps_world_axes() {
    let cam = Camera::new(Vec3::ZERO, Quat::IDENTITY, lens(), Viewport::new(640, 448)).unwrap();
    assert_eq!(cam.view, Mat4::IDENTITY);
    assert_eq!(cam.view.transform_point(v3(1.0, 2.0, 10.0)), v3(1.0, 2.0, 10.0));
}

#[test]
fn translated_camera_offsets_points() {
    let cam = Camera::new(
        v3(0.0, 0.0, -10.0),
        Quat::IDENTITY,
        lens(),
        Viewport::new(640, 448),
    )
    .unwrap();
    assert_eq!(cam.view.transform_point(Vec3::ZERO), v3(0.0, 0.0, 10.0));
}

#[test]
fn look_at_puts_target_on_the_optical_axis() {
    let cam = Camera::look_at(
        v3(3.0, 1.0, -8.0),
        v3(0.0, 0.0, 0.0),
        v3(0.0, 1.0, 0.0),
        lens(),
        Viewport::new(640, 448),
    )
    .unwrap();
    let dist = (9.0f64 + 1.0 + 64.0).sqrt();
    assert!(near(cam.view.transform_point(Vec3::ZERO), [0.0, 0.0, dist], 0.02));
    // The eye sits at the camera-space origin.
    assert!(near(cam.view.transform_point(cam.position), [0.0, 0.0, 0.0], 0.01));
}

#[test]
fn look_at_rejects_degenerate_setups() {
    let vp = Viewport::new(640, 448);
    let up = v3(0.0, 1.0, 0.0);
    assert!(Camera::look_at(Vec3::ZERO, Vec3::ZERO, up, lens(), vp).is_err());
    assert!(Camera::look_at(Vec3::ZERO, v3(0.0, 5.0, 0.0), up, lens(), vp).is_err());
}

#[test]
fn lens_validation_rejects_bad_planes() {
    let mut l = lens();
    l.far = l.near;
    assert!(matches!(l.validate(), Err(SplatError::InvalidParameter(_))));
    let mut l = lens();
    l.fov_y = Fx::ZERO;
    assert!(l.validate().is_err());
    let vp = Viewport::new(0, 448);
    assert!(Camera::new(Vec3::ZERO, Quat::IDENTITY, lens(), vp).is_err());
}

#[test]
fn lens_validation_flags_saturating_projections() {
    let mut l = lens();
    l.fov_y = Fx::from_raw(1);
    assert!(matches!(l.validate(), Err(SplatError::NumericalInstability(_))));
    let mut l = lens();
    l.near = Fx::from_int(1000);
    l.far = Fx::from_raw(l.near.raw() + 1);
    assert!(matches!(l.validate(), Err(SplatError::NumericalInstability(_))));
    let vp = Viewport::new(640, 448);
    assert!(Camera::new(Vec3::ZERO, Quat::IDENTITY, l, vp).is_err());
    assert!(lens().validate().is_ok());
}

#[test]
fn perspective_maps_near_and_far_to_ndc_bounds() {
    let p = lens().perspective();
    let f = p.at(1, 1).to_f64();
    let want = 1.0 / 30f64.to_radians().tan();
    assert!((f - want).abs() / want < 0.05);
    assert_eq!(p.at(3, 2), Fx::ONE);

    for (z, ndc) in [(0.1, -1.0), (100.0, 1.0), (10.0, 0.981)] {
        let clip = p.transform(v3(0.0, 0.0, z).extend(Fx::ONE));
        let got = (clip.z / clip.w).to_f64();
        assert!((got - ndc).abs() < 0.01, "z={z}: {got}");
    }
}

#[test]
fn viewport_maps_ndc_corners() {
    let m = Viewport::new(640, 448).to_matrix();
    assert_eq!(m.transform_point(v3(-1.0, 1.0, 0.0)), v3(0.0, 0.0, 0.5));
    assert_eq!(m.transform_point(v3(1.0, -1.0, 0.0)), v3(640.0, 448.0, 0.5));
    assert_eq!(m.transform_point(Vec3::ZERO), v3(320.0, 224.0, 0.5));
}

#[test]
fn quaternion_rotation_matches_right_hand_rule() {
    let q = Quat::from_axis_angle(v3(0.0, 1.0, 0.0), Fx::HALF_PI);
    assert!(near(q.rotate(v3(1.0, 0.0, 0.0)), [0.0, 0.0, -1.0], 0.01));
    assert_eq!(Quat::IDENTITY * q, q);
    let back = q * q.conjugate();
    assert!((back.w.to_f64() - 1.0).abs() < 0.01);
}

#[test]
fn rotation_matrix_round_trips_up_to_sign() {
    let q = Quat::from_axis_angle(v3(1.0, 2.0, 0.5), Fx::from_f64(1.2));
    let r = Quat::from_rotation(q.to_rotation());
    assert!(r.dot(q).abs().to_f64() > 0.995);
}

#[test]
fn tracker_flags_translation_and_rotation() {
    let vp = Viewport::new(640, 448);
    let base = Camera::new(Vec3::ZERO, Quat::IDENTITY, lens(), vp).unwrap();
    let mut t = CameraTracker::new(0.1, 5.0);
    assert!(t.moved_significantly(&base));
    t.mark(&base);
    assert!(!t.moved_significantly(&base));

    let nudged = Camera::new(v3(0.05, 0.0, 0.0), Quat::IDENTITY, lens(), vp).unwrap();
    assert!(!t.moved_significantly(&nudged));
    let moved = Camera::new(v3(0.2, 0.0, 0.0), Quat::IDENTITY, lens(), vp).unwrap();
    assert!(t.moved_significantly(&moved));

    let y = v3(0.0, 1.0, 0.0);
    let small = Quat::from_axis_angle(y, Fx::from_f64(2f64.to_radians()));
    let small = Camera::new(Vec3::ZERO, small, lens(), vp).unwrap();
    assert!(!t.moved_significantly(&small));
    let big = Quat::from_axis_angle(y, Fx::from_f64(10f64.to_radians()));
    let big = Camera::new(Vec3::ZERO, big, lens(), vp).unwrap();
    assert!(t.moved_significantly(&big));

    t.reset();
    assert!(t.moved_significantly(&base));
}
