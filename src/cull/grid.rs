use crate::config::{GRID_CELL_CAPACITY, GRID_RESOLUTION};
use crate::foundation::bounded::BoundedList;
use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::fixed::Fx;
use crate::foundation::matrix::Vec3;
use crate::scene::splat::Splat3D;

/// One cell of the uniform scene grid.
#[derive(Clone, Debug)]
pub struct GridCell {
    /// Lower corner.
    pub min: Vec3,
    /// Upper corner.
    pub max: Vec3,
    /// Indices of the splats whose centers fall inside.
    pub members: BoundedList<u32>,
    /// Largest bounding radius among the members.
    pub max_radius: Fx,
    /// Passed the frustum test on the last culled frame.
    pub visible: bool,
    /// Frame counter value of the last pass.
    pub last_visible_frame: u32,
}

/// Uniform `GRID_RESOLUTION³` partition of the padded scene bounds.
///
/// Built once per scene. Splats that arrive at a full cell are counted in
/// [`SpatialGrid::dropped`] and never tested afterwards.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    min: Vec3,
    max: Vec3,
    cell_size: Vec3,
    cells: Vec<GridCell>,
    radii: Vec<Fx>,
    dropped: usize,
}

impl SpatialGrid {
    /// Bin `splats` by center. Fails on an empty scene.
    pub fn build(splats: &[Splat3D], padding: Fx) -> SplatResult<Self> {
        let first = splats
            .first()
            .ok_or_else(|| SplatError::invalid("cannot build a grid over zero splats"))?;
        let (mut lo, mut hi) = (first.position, first.position);
        for s in splats {
            let p = s.position;
            lo = Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z));
            hi = Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z));
        }
        let pad = Vec3::new(padding, padding, padding);
        let (min, max) = (lo - pad, hi + pad);

        let n = Fx::from_int(GRID_RESOLUTION as i32);
        let ext = max - min;
        let cell_size = Vec3::new(ext.x / n, ext.y / n, ext.z / n);

        let mut cells = Vec::with_capacity(GRID_RESOLUTION.pow(3));
        for iz in 0..GRID_RESOLUTION {
            for iy in 0..GRID_RESOLUTION {
                for ix in 0..GRID_RESOLUTION {
                    let lo = Vec3::new(
                        min.x + cell_size.x * Fx::from_int(ix as i32),
                        min.y + cell_size.y * Fx::from_int(iy as i32),
                        min.z + cell_size.z * Fx::from_int(iz as i32),
                    );
                    cells.push(GridCell {
                        min: lo,
                        max: lo + cell_size,
                        members: BoundedList::with_capacity(GRID_CELL_CAPACITY),
                        max_radius: Fx::ZERO,
                        visible: false,
                        last_visible_frame: 0,
                    });
                }
            }
        }

        let mut grid = Self {
            min,
            max,
            cell_size,
            cells,
            radii: splats.iter().map(Splat3D::bounding_radius).collect(),
            dropped: 0,
        };
        for (i, s) in splats.iter().enumerate() {
            let c = grid.cell_index(s.position);
            let cell = &mut grid.cells[c];
            if cell.members.push(i as u32).is_truncated() {
                grid.dropped += 1;
                continue;
            }
            cell.max_radius = cell.max_radius.max(grid.radii[i]);
        }
        if grid.dropped > 0 {
            tracing::warn!(dropped = grid.dropped, "grid cell capacity exceeded");
        }
        tracing::debug!(
            splats = splats.len(),
            occupied = grid.cells.iter().filter(|c| !c.members.is_empty()).count(),
            "spatial grid built"
        );
        Ok(grid)
    }

    fn axis_index(v: Fx, lo: Fx, size: Fx) -> usize {
        if size <= Fx::ZERO {
            return 0;
        }
        ((v - lo) / size)
            .floor_int()
            .clamp(0, GRID_RESOLUTION as i32 - 1) as usize
    }

    /// Flat index of the cell containing `p`, clamped to the grid.
    pub fn cell_index(&self, p: Vec3) -> usize {
        let ix = Self::axis_index(p.x, self.min.x, self.cell_size.x);
        let iy = Self::axis_index(p.y, self.min.y, self.cell_size.y);
        let iz = Self::axis_index(p.z, self.min.z, self.cell_size.z);
        (iz * GRID_RESOLUTION + iy) * GRID_RESOLUTION + ix
    }

    /// Padded bounds `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// All cells, x fastest.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [GridCell] {
        &mut self.cells
    }

    /// Culling radius of splat `i`.
    pub fn radius(&self, i: usize) -> Fx {
        self.radii.get(i).copied().unwrap_or(Fx::ZERO)
    }

    /// Number of splats the grid was built over.
    pub fn splat_count(&self) -> usize {
        self.radii.len()
    }

    /// Splats dropped because their cell was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cull/grid.rs"]
mod tests;
