use super::*;

fn v3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::from_f64(x, y, z)
}

#[test]
fn identity_is_neutral() {
    let a = Mat4::from_f64_rows([
        [1.0, 2.0, 3.0, 4.0],
        [0.5, -1.0, 0.0, 2.0],
        [0.0, 0.0, 1.0, -3.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    assert_eq!(a.mul_mat(&Mat4::IDENTITY), a);
    assert_eq!(Mat4::IDENTITY.mul_mat(&a), a);
    assert_eq!(a.transpose().transpose(), a);
}

#[test]
fn transform_point_applies_translation_column() {
    let t = Mat4::from_f64_rows([
        [1.0, 0.0, 0.0, 5.0],
        [0.0, 1.0, 0.0, -2.0],
        [0.0, 0.0, 1.0, 0.5],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    assert_eq!(t.transform_point(v3(1.0, 1.0, 1.0)), v3(6.0, -1.0, 1.5));
    assert_eq!(t.transform_dir(v3(1.0, 1.0, 1.0)), v3(1.0, 1.0, 1.0));
}

#[test]
fn product_composes_transforms() {
    let s = Mat4::from_f64_rows([
        [2.0, 0.0, 0.0, 0.0],
        [0.0, 2.0, 0.0, 0.0],
        [0.0, 0.0, 2.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    let t = Mat4::from_f64_rows([
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    // Scale after translate.
    let st = s.mul_mat(&t);
    assert_eq!(st.transform_point(v3(1.0, 1.0, 1.0)), v3(4.0, 2.0, 2.0));
}

#[test]
fn dot_saturates_instead_of_wrapping() {
    let big = [Fx::from_int(30_000); 4];
    assert_eq!(dot_fx(&big, &big), Fx::MAX);
}

#[test]
fn cross_and_normalize() {
    let x = v3(1.0, 0.0, 0.0);
    let y = v3(0.0, 1.0, 0.0);
    assert_eq!(x.cross(y), v3(0.0, 0.0, 1.0));
    let n = v3(3.0, 0.0, 4.0).normalize();
    assert!((n.x.to_f64() - 0.6).abs() < 0.005);
    assert!((n.z.to_f64() - 0.8).abs() < 0.005);
    assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
}
