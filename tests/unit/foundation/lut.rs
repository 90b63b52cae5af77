use super::*;

#[test]
fn init_is_idempotent_and_shares_storage() {
    init_tables();
    let a = tables() as *const Tables;
    init_tables();
    let b = tables() as *const Tables;
    assert_eq!(a, b);
}

#[test]
fn reciprocal_table_is_exact_and_unclamped() {
    let t = tables();
    assert_eq!(t.recip[0], 0);
    assert_eq!(t.recip[1], 1 << 32);
    assert_eq!(t.recip[2], 1 << 31);
    assert_eq!(t.recip[4], 1 << 30);
    assert_eq!(t.recip[255], (1i64 << 32) / 255);
}

#[test]
fn sqrt_table_spans_one_to_two() {
    let t = tables();
    assert!(t.sqrt[0] > 1 << 16);
    assert!(t.sqrt[LUT_SIZE - 1] < 2 << 16);
    assert!(t.sqrt.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn trig_tables_hit_cardinal_points() {
    let t = tables();
    assert_eq!(t.sin[0], 0);
    assert_eq!(t.cos[0], 1 << 16);
    assert_eq!(t.sin[64], 1 << 16);
    assert_eq!(t.cos[128], -(1 << 16));
}

#[test]
fn atan2_table_is_antisymmetric_in_y() {
    let t = tables();
    let n = ATAN2_LUT_SIZE;
    // Row 255 sits just below y = +1, row 0 at y = -1.
    let up = t.atan2[(n - 1) * n + n / 2];
    let down = t.atan2[n / 2];
    assert!(up > 0 && down < 0);
    assert!((f64::from(up) / 65536.0 - std::f64::consts::FRAC_PI_2).abs() < 0.01);
    assert!((f64::from(down) / 65536.0 + std::f64::consts::FRAC_PI_2).abs() < 0.01);
}
