use super::*;

fn f(v: f64) -> Fx {
    Fx::from_f64(v)
}

fn close(a: Fx, b: f64, rel: f64) -> bool {
    (a.to_f64() - b).abs() <= b.abs() * rel + 0.01
}

#[test]
fn diagonal_matrices_keep_axis_vectors() {
    let e = solve_symmetric(f(4.0), Fx::ZERO, f(1.0));
    assert!(close(e.values[0], 4.0, 0.01) && close(e.values[1], 1.0, 0.01));
    assert_eq!(e.vectors, [Fx::ONE, Fx::ZERO, Fx::ZERO, Fx::ONE]);
    assert!(!e.degenerate);

    let e = solve_symmetric(f(1.0), Fx::ZERO, f(4.0));
    assert!(close(e.values[0], 4.0, 0.01));
    // Major axis along y.
    assert_eq!((e.vectors[0], e.vectors[2]), (Fx::ZERO, Fx::ONE));
}

#[test]
fn coupled_matrix_has_diagonal_major_axis() {
    let e = solve_symmetric(f(2.0), f(1.0), f(2.0));
    assert!(close(e.values[0], 3.0, 0.01) && close(e.values[1], 1.0, 0.01));
    let h = std::f64::consts::FRAC_1_SQRT_2;
    assert!(close(e.vectors[0], h, 0.01) && close(e.vectors[2], h, 0.01));
    // Columns stay orthonormal.
    assert_eq!(e.vectors[1], -e.vectors[2]);
    assert_eq!(e.vectors[3], e.vectors[0]);
}

#[test]
fn large_values_are_range_reduced() {
    let e = solve_symmetric(f(1000.0), Fx::ZERO, f(10.0));
    assert!(close(e.values[0], 1000.0, 0.01), "{:?}", e.values);
    assert!(close(e.values[1], 10.0, 0.02), "{:?}", e.values);
}

#[test]
fn negative_discriminant_falls_back_to_isotropic() {
    // Truncation of the half trace makes the discriminant one ulp negative here.
    let e = solve_symmetric(Fx::from_raw(65_537), Fx::ZERO, Fx::from_raw(65_536));
    assert!(e.degenerate);
    assert_eq!(e.values[0], e.values[1]);
    assert_eq!(e.vectors, [Fx::ONE, Fx::ZERO, Fx::ZERO, Fx::ONE]);
}

#[test]
fn eigenvalues_are_never_negative() {
    let e = solve_symmetric(f(-3.0), f(0.5), f(-1.0));
    assert!(e.values.iter().all(|v| *v >= Fx::ZERO));
}

#[test]
fn inverse_matches_closed_form() {
    let inv = invert_symmetric(f(2.0), f(1.0), f(2.0));
    assert!(close(inv[0], 2.0 / 3.0, 0.01));
    assert!(close(inv[1], -1.0 / 3.0, 0.01));
    assert!(close(inv[2], 2.0 / 3.0, 0.01));

    let inv = invert_symmetric(f(1000.0), Fx::ZERO, f(10.0));
    assert!((inv[0].to_f64() - 0.001).abs() < 1e-4);
    assert!((inv[2].to_f64() - 0.1).abs() < 1e-3);
}

#[test]
fn singular_inverse_falls_back_to_identity() {
    assert_eq!(
        invert_symmetric(Fx::ZERO, Fx::ZERO, Fx::ZERO),
        [Fx::ONE, Fx::ZERO, Fx::ONE]
    );
}
