//! Debug views of a scheduled frame.

use std::path::Path;

use anyhow::Context;

use crate::config::FINE_TILE_SIZE;
use crate::foundation::error::SplatResult;
use crate::foundation::fixed::Fx;
use crate::project::atlas::sample_footprint;
use crate::scene::splat::Splat2D;
use crate::tiles::grid::TileGrid;
use crate::tiles::scheduler::TileOutput;

const EMPTY_TILE: [u8; 4] = [16, 16, 20, 255];
const CENTER_MARK: [u8; 4] = [255, 255, 255, 255];
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Black, blue, red, yellow as load rises from zero to the busiest tile.
fn heat(t: f64) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let (r, g, b) = if t < 0.5 {
        let u = t * 2.0;
        (u * 0.9, 0.0, 0.4 + 0.6 * (1.0 - u))
    } else {
        let u = (t - 0.5) * 2.0;
        (0.9 + 0.1 * u, u, 0.0)
    };
    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        255,
    ]
}

/// Screen-sized image where each fine tile is shaded by its list length.
///
/// Splat centers are marked with single white pixels.
pub fn tile_heatmap(grid: &TileGrid, tiles: &TileOutput, splats: &[Splat2D]) -> image::RgbaImage {
    let max = tiles.fine.iter().map(|r| r.count).max().unwrap_or(0).max(1);
    let mut img = image::RgbaImage::new(grid.width, grid.height);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let idx = grid.fine_index(x / FINE_TILE_SIZE, y / FINE_TILE_SIZE);
        let count = tiles.fine.get(idx).map(|r| r.count).unwrap_or(0);
        px.0 = if count == 0 {
            EMPTY_TILE
        } else {
            heat(f64::from(count) / f64::from(max))
        };
    }
    for s in splats {
        let (x, y) = (s.screen[0].floor_int(), s.screen[1].floor_int());
        if x >= 0 && y >= 0 && (x as u32) < grid.width && (y as u32) < grid.height {
            img.put_pixel(x as u32, y as u32, image::Rgba(CENTER_MARK));
        }
    }
    img
}

/// Composite each fine tile's list back to front with footprints from the atlas.
///
/// Pixels are sampled at their centers; alpha is footprint times splat opacity.
pub fn splat_preview(
    grid: &TileGrid,
    tiles: &TileOutput,
    splats: &[Splat2D],
    atlas: &image::GrayImage,
) -> image::RgbaImage {
    let mut img = image::RgbaImage::from_pixel(grid.width, grid.height, image::Rgba(BACKGROUND));
    for ty in 0..grid.tiles_y {
        for tx in 0..grid.tiles_x {
            let Some(r) = tiles.fine.get(grid.fine_index(tx, ty)) else {
                continue;
            };
            let range = r.start as usize..(r.start + r.count) as usize;
            let Some(list) = tiles.sorted_indices.get(range) else {
                continue;
            };
            let (x0, y0) = (tx * FINE_TILE_SIZE, ty * FINE_TILE_SIZE);
            let x1 = (x0 + FINE_TILE_SIZE).min(grid.width);
            let y1 = (y0 + FINE_TILE_SIZE).min(grid.height);
            for s in list.iter().filter_map(|&i| splats.get(i as usize)) {
                for y in y0..y1 {
                    let dy = Fx::from_int(y as i32) + Fx::HALF - s.screen[1];
                    for x in x0..x1 {
                        let dx = Fx::from_int(x as i32) + Fx::HALF - s.screen[0];
                        let alpha = sample_footprint(atlas, s, dx, dy);
                        let a = u32::from(alpha) * u32::from(s.color[3]) / 255;
                        if a == 0 {
                            continue;
                        }
                        let px = img.get_pixel_mut(x, y);
                        for c in 0..3 {
                            let blended =
                                u32::from(px.0[c]) * (255 - a) + u32::from(s.color[c]) * a;
                            px.0[c] = (blended / 255) as u8;
                        }
                    }
                }
            }
        }
    }
    img
}

/// Write `img` as PNG, creating parent directories.
pub fn save_png<P>(img: &image::ImageBuffer<P, Vec<P::Subpixel>>, path: &Path) -> SplatResult<()>
where
    P: image::Pixel + image::PixelWithColorType,
    [P::Subpixel]: image::EncodableLayout,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/debug.rs"]
mod tests;
