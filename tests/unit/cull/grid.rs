use super::*;
use crate::scene::splat::CompressedCov;

fn splat(x: f64, y: f64, z: f64) -> Splat3D {
    Splat3D::new(Vec3::from_f64(x, y, z), CompressedCov::UNIT)
}

#[test]
fn empty_scene_is_rejected() {
    assert!(matches!(
        SpatialGrid::build(&[], Fx::ONE),
        Err(SplatError::InvalidParameter(_))
    ));
}

#[test]
fn bounds_are_padded_and_cells_indexed_x_fastest() {
    let splats = [splat(0.0, 0.0, 0.0), splat(6.0, 6.0, 6.0)];
    let grid = SpatialGrid::build(&splats, Fx::ONE).unwrap();
    let (min, max) = grid.bounds();
    assert_eq!(min, Vec3::from_f64(-1.0, -1.0, -1.0));
    assert_eq!(max, Vec3::from_f64(7.0, 7.0, 7.0));
    assert_eq!(grid.cells().len(), 512);
    assert_eq!(grid.cell_index(splats[0].position), (8 + 1) * 8 + 1);
    assert_eq!(grid.cell_index(splats[1].position), 511);
    assert_eq!(grid.cell_index(Vec3::from_f64(2.5, -1.0, -1.0)), 3);

    let c = &grid.cells()[73];
    assert_eq!(c.members.as_slice(), &[0]);
    assert_eq!(c.max_radius, splats[0].bounding_radius());
    assert_eq!(c.min, Vec3::from_f64(0.0, 0.0, 0.0));
    assert_eq!(c.max, Vec3::from_f64(1.0, 1.0, 1.0));
}

#[test]
fn points_outside_the_grid_clamp_to_edge_cells() {
    let grid = SpatialGrid::build(&[splat(0.0, 0.0, 0.0)], Fx::ONE).unwrap();
    assert_eq!(grid.cell_index(Vec3::from_f64(-50.0, -50.0, -50.0)), 0);
    assert_eq!(grid.cell_index(Vec3::from_f64(50.0, 50.0, 50.0)), 511);
}

#[test]
fn full_cells_drop_and_count() {
    let splats = vec![splat(1.0, 1.0, 1.0); GRID_CELL_CAPACITY + 88];
    let grid = SpatialGrid::build(&splats, Fx::ONE).unwrap();
    assert_eq!(grid.dropped(), 88);
    let total: usize = grid.cells().iter().map(|c| c.members.len()).sum();
    assert_eq!(total, GRID_CELL_CAPACITY);
    assert_eq!(grid.splat_count(), splats.len());
}
