use crate::config::{COARSE_TILE_SIZE, FINE_PER_COARSE, FINE_TILE_SIZE};
use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::fixed::Fx;

/// Regions per screen axis in [`crate::Splat2D::tile_mask`].
pub const MASK_REGIONS: u32 = 4;

/// Screen partition into fine and coarse tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    /// Screen width in pixels.
    pub width: u32,
    /// Screen height in pixels.
    pub height: u32,
    /// Fine tiles per row.
    pub tiles_x: u32,
    /// Fine tile rows.
    pub tiles_y: u32,
    /// Coarse tiles per row.
    pub coarse_x: u32,
    /// Coarse tile rows.
    pub coarse_y: u32,
}

/// Inclusive fine-tile span `(x0, y0, x1, y1)`.
pub type TileSpan = (u32, u32, u32, u32);

impl TileGrid {
    /// Grid for a `width × height` screen; partial edge tiles count as whole tiles.
    pub fn new(width: u32, height: u32) -> SplatResult<Self> {
        if width == 0 || height == 0 {
            return Err(SplatError::invalid("screen size must be non-zero"));
        }
        Ok(Self {
            width,
            height,
            tiles_x: width.div_ceil(FINE_TILE_SIZE),
            tiles_y: height.div_ceil(FINE_TILE_SIZE),
            coarse_x: width.div_ceil(COARSE_TILE_SIZE),
            coarse_y: height.div_ceil(COARSE_TILE_SIZE),
        })
    }

    /// Number of fine tiles.
    pub fn fine_count(&self) -> usize {
        (self.tiles_x * self.tiles_y) as usize
    }

    /// Number of coarse tiles.
    pub fn coarse_count(&self) -> usize {
        (self.coarse_x * self.coarse_y) as usize
    }

    /// Row-major index of fine tile `(tx, ty)`.
    #[inline]
    pub fn fine_index(&self, tx: u32, ty: u32) -> usize {
        (ty * self.tiles_x + tx) as usize
    }

    /// Row-major index of the coarse tile holding fine tile `(tx, ty)`.
    #[inline]
    pub fn coarse_of(&self, tx: u32, ty: u32) -> usize {
        ((ty / FINE_PER_COARSE) * self.coarse_x + tx / FINE_PER_COARSE) as usize
    }

    /// Pixel rectangle of fine tile `index`.
    pub fn tile_rect(&self, index: usize) -> kurbo::Rect {
        let tx = index as u32 % self.tiles_x;
        let ty = index as u32 / self.tiles_x;
        let s = f64::from(FINE_TILE_SIZE);
        kurbo::Rect::new(
            f64::from(tx) * s,
            f64::from(ty) * s,
            f64::from(tx + 1) * s,
            f64::from(ty + 1) * s,
        )
    }

    /// Fine tiles whose half-open pixel area `[x0, x0 + 16)` strictly overlaps the box.
    ///
    /// `None` when the box misses the screen.
    pub fn fine_span(&self, min: [Fx; 2], max: [Fx; 2]) -> Option<TileSpan> {
        let (x0, x1) = axis_span(min[0], max[0], self.tiles_x)?;
        let (y0, y1) = axis_span(min[1], max[1], self.tiles_y)?;
        Some((x0, y0, x1, y1))
    }

    /// One bit per region of a 4×4 split of the screen touched by the box, row-major.
    pub fn region_mask(&self, min: [Fx; 2], max: [Fx; 2]) -> u16 {
        let span = |lo: Fx, hi: Fx, extent: u32| -> Option<(u32, u32)> {
            let e = i64::from(extent);
            let (lo, hi) = (i64::from(lo.floor_int()), i64::from(hi.floor_int()));
            if hi < 0 || lo >= e || hi < lo {
                return None;
            }
            let (lo, hi) = (lo.max(0), hi.min(e - 1));
            let r = i64::from(MASK_REGIONS);
            Some(((lo * r / e) as u32, (hi * r / e) as u32))
        };
        let (Some((x0, x1)), Some((y0, y1))) = (
            span(min[0], max[0], self.width),
            span(min[1], max[1], self.height),
        ) else {
            return 0;
        };
        let mut mask = 0u16;
        for ry in y0..=y1 {
            for rx in x0..=x1 {
                mask |= 1 << (ry * MASK_REGIONS + rx);
            }
        }
        mask
    }
}

fn axis_span(lo: Fx, hi: Fx, tiles: u32) -> Option<(u32, u32)> {
    let size = i64::from(FINE_TILE_SIZE) << 16;
    let (lo, hi) = (i64::from(lo.raw()), i64::from(hi.raw()));
    if hi < lo || hi < 0 || (hi == 0 && lo < 0) {
        return None;
    }
    let first = lo.max(0) / size;
    // Strict overlap: a box ending exactly on a tile edge does not reach the next tile.
    let last = if hi > lo { (hi - 1) / size } else { hi / size };
    if first >= i64::from(tiles) {
        return None;
    }
    Some((first as u32, last.min(i64::from(tiles) - 1) as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/grid.rs"]
mod tests;
