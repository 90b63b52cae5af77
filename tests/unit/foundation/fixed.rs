use super::*;

fn close(a: Fx, b: f64, tol: f64) -> bool {
    (a.to_f64() - b).abs() <= tol
}

#[test]
fn add_and_sub_saturate_instead_of_wrapping() {
    assert_eq!(Fx::MAX + Fx::ONE, Fx::MAX);
    assert_eq!(Fx::MIN - Fx::ONE, Fx::MIN);
    assert_eq!(Fx::from_int(3) + Fx::from_int(4), Fx::from_int(7));
    assert_eq!(-Fx::MIN, Fx::MAX);
}

#[test]
fn mul_saturates_and_keeps_sign() {
    let big = Fx::from_int(20_000);
    assert_eq!(big * big, Fx::MAX);
    assert_eq!(big * -big, Fx::MIN);
    assert_eq!(Fx::from_f64(1.5) * Fx::from_f64(-2.0), Fx::from_f64(-3.0));
}

#[test]
fn mad_matches_separate_ops_in_range() {
    let acc = Fx::from_f64(0.25);
    let r = acc.mad(Fx::from_f64(2.0), Fx::from_f64(3.0));
    assert_eq!(r, Fx::from_f64(6.25));
    assert_eq!(Fx::MAX.mad(Fx::ONE, Fx::ONE), Fx::MAX);
}

#[test]
fn from_int_clamps_to_integer_range() {
    assert_eq!(Fx::from_int(40_000).floor_int(), 32767);
    assert_eq!(Fx::from_int(-40_000).floor_int(), -32768);
}

#[test]
fn reciprocal_converges_across_magnitudes() {
    for &v in &[0.004, 0.01, 0.3, 0.75, 1.0, 1.5, 3.0, 10.0, 100.0, 1000.0, 30000.0] {
        let r = Fx::from_f64(v).recip();
        let want = 1.0 / v;
        let tol = (want * 2e-3).max(2.0 / 65536.0);
        assert!(close(r, want, tol), "recip({v}) = {} want {want}", r.to_f64());
        let rn = Fx::from_f64(-v).recip();
        assert!(close(rn, -want, tol), "recip(-{v}) = {}", rn.to_f64());
    }
}

#[test]
fn reciprocal_of_tiny_values_uses_exact_table() {
    // raw 128 is 1/512; its reciprocal is exactly 512.0.
    assert_eq!(Fx::from_raw(128).recip(), Fx::from_int(512));
    assert_eq!(Fx::from_raw(64).recip(), Fx::from_int(1024));
    assert_eq!(Fx::from_raw(-64).recip(), Fx::from_int(-1024));
    assert_eq!(Fx::ZERO.recip(), Fx::MAX);
    // First operand past the table goes through Newton–Raphson.
    assert!(close(Fx::from_raw(256).recip(), 256.0, 0.01));
}

#[test]
fn division_by_smallest_raw_values_is_exact() {
    assert_eq!(Fx::from_raw(100) / Fx::from_raw(1), Fx::from_int(100));
    assert_eq!(Fx::from_raw(100) / Fx::from_raw(-1), Fx::from_int(-100));
    assert_eq!(Fx::from_raw(6) / Fx::from_raw(2), Fx::from_int(3));
    assert_eq!(Fx::ONE / Fx::from_raw(1), Fx::MAX);
    assert_eq!(-Fx::ONE / Fx::from_raw(1), Fx::MIN);
    assert_eq!(Fx::from_raw(1).recip(), Fx::MAX);
    assert_eq!(Fx::from_raw(-1).recip(), Fx::MIN);
}

#[test]
fn division_is_close_to_float_division() {
    let cases = [(5000.0, 1000.0), (1.0, 3.0), (-7.5, 2.5), (0.01, 0.02), (100.0, -0.5)];
    for (a, b) in cases {
        let q = Fx::from_f64(a) / Fx::from_f64(b);
        let want = a / b;
        assert!(
            close(q, want, (want.abs() * 2e-3).max(3.0 / 65536.0)),
            "{a}/{b} = {} want {want}",
            q.to_f64()
        );
    }
    assert_eq!(Fx::ONE / Fx::ZERO, Fx::MAX);
    assert_eq!(-Fx::ONE / Fx::ZERO, Fx::MIN);
    assert_eq!(Fx::ZERO / Fx::ZERO, Fx::ZERO);
    assert_eq!(Fx::from_int(30000) / Fx::from_f64(0.01), Fx::MAX);
}

#[test]
fn sqrt_is_within_one_bucket() {
    for &v in &[0.0001, 0.01, 0.5, 1.0, 2.0, 3.99, 9.0, 100.0, 30000.0] {
        let x = Fx::from_f64(v);
        let s = x.sqrt();
        let want = x.to_f64().sqrt();
        assert!(
            close(s, want, want * 4e-3 + 1.0 / 65536.0),
            "sqrt({v}) = {} want {want}",
            s.to_f64()
        );
    }
    assert_eq!(Fx::from_int(-4).sqrt(), Fx::ZERO);
    assert_eq!(Fx::ZERO.sqrt(), Fx::ZERO);
}

#[test]
fn sin_cos_use_nearest_bucket_and_wrap() {
    let step = std::f64::consts::TAU / 256.0;
    for i in -300..300 {
        let a = i as f64 * 0.037;
        let s = Fx::from_f64(a).sin();
        let c = Fx::from_f64(a).cos();
        assert!(close(s, a.sin(), step * 0.5 + 1e-3), "sin({a})");
        assert!(close(c, a.cos(), step * 0.5 + 1e-3), "cos({a})");
    }
    assert_eq!(Fx::ZERO.sin(), Fx::ZERO);
    assert_eq!(Fx::ZERO.cos(), Fx::ONE);
    assert_eq!(Fx::TWO_PI.cos(), Fx::ONE);
}

#[test]
fn atan2_covers_all_quadrants() {
    let cases = [
        (0.0, 1.0),
        (1.0, 1.0),
        (1.0, 0.0),
        (1.0, -1.0),
        (-1.0, -1.0),
        (-1.0, 0.0),
        (0.3, 2.0),
        (-5.0, 0.2),
    ];
    for (y, x) in cases {
        let a = Fx::from_f64(y).atan2(Fx::from_f64(x));
        let want = f64::atan2(y, x);
        assert!(close(a, want, 0.01), "atan2({y},{x}) = {} want {want}", a.to_f64());
    }
    assert_eq!(Fx::ZERO.atan2(Fx::ZERO), Fx::ZERO);
}

#[test]
fn q8_conversions_saturate() {
    assert_eq!(Q8::from_fx(Fx::from_int(1000)), Q8::MAX);
    assert_eq!(Q8::from_fx(Fx::from_int(-1000)), Q8::MIN);
    assert_eq!(Q8::from_fx(Fx::from_f64(1.5)).to_fx(), Fx::from_f64(1.5));
    assert_eq!(Q8::ONE * Q8::from_f64(2.5), Q8::from_f64(2.5));
    assert_eq!(Q8::MAX + Q8::ONE, Q8::MAX);
}
