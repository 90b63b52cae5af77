//! Elliptical footprint versus tile overlap.

use crate::config::FINE_TILE_SIZE;
use crate::foundation::fixed::Fx;
use crate::scene::splat::Splat2D;
use crate::tiles::grid::{TileGrid, TileSpan};

const HALF_TILE: Fx = Fx::from_int(FINE_TILE_SIZE as i32 / 2);

/// Screen footprint of one splat: circumscribed box plus the oriented 3σ box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    /// Center in pixels.
    pub center: [Fx; 2],
    /// `center - radius`.
    pub min: [Fx; 2],
    /// `center + radius`.
    pub max: [Fx; 2],
    /// Unit major axis `(cos θ, sin θ)`.
    pub axis: (Fx, Fx),
    /// 3σ semi-axes `(major, minor)`.
    pub semi: (Fx, Fx),
}

impl Footprint {
    /// Footprint of a projected splat.
    pub fn of(s: &Splat2D) -> Self {
        let r = s.radius.max(Fx::ZERO);
        let [cx, cy] = s.screen;
        Self {
            center: s.screen,
            min: [cx - r, cy - r],
            max: [cx + r, cy + r],
            axis: s.major_axis(),
            semi: s.semi_axes(),
        }
    }

    /// Half extents of the oriented box on the screen axes.
    pub fn obb_half_extents(&self) -> (Fx, Fx) {
        let (c, s) = (self.axis.0.abs(), self.axis.1.abs());
        let (a, b) = self.semi;
        (a * c + b * s, a * s + b * c)
    }

    /// Separating-axis test of the oriented box against fine tile `(tx, ty)`.
    ///
    /// Screen axes and both ellipse axes are tried; touching counts as overlap.
    pub fn overlaps_tile(&self, tx: u32, ty: u32) -> bool {
        let size = Fx::from_int(FINE_TILE_SIZE as i32);
        let tc = [
            Fx::from_int(tx as i32) * size + HALF_TILE,
            Fx::from_int(ty as i32) * size + HALF_TILE,
        ];
        let d = [tc[0] - self.center[0], tc[1] - self.center[1]];

        let (ex, ey) = self.obb_half_extents();
        if d[0].abs() > ex + HALF_TILE || d[1].abs() > ey + HALF_TILE {
            return false;
        }

        let (c, s) = self.axis;
        let tile_on_axis = HALF_TILE * (c.abs() + s.abs());
        let along_major = d[0] * c + d[1] * s;
        let along_minor = d[1] * c - d[0] * s;
        along_major.abs() <= self.semi.0 + tile_on_axis
            && along_minor.abs() <= self.semi.1 + tile_on_axis
    }

    /// Candidate tiles from the circumscribed box, or `None` off screen.
    pub fn span(&self, grid: &TileGrid) -> Option<TileSpan> {
        grid.fine_span(self.min, self.max)
    }
}

/// Visit every fine tile the splat overlaps, row-major.
pub fn for_each_overlapped_tile(fp: &Footprint, grid: &TileGrid, mut f: impl FnMut(usize)) {
    let Some((x0, y0, x1, y1)) = fp.span(grid) else {
        return;
    };
    for ty in y0..=y1 {
        for tx in x0..=x1 {
            if fp.overlaps_tile(tx, ty) {
                f(grid.fine_index(tx, ty));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/assign.rs"]
mod tests;
