//! # Image Tiler
//!
//! Splits an oversized basic image into tiles in row-major order, the order
//! the game shows them in. Edge tiles keep whatever size is left over; padding
//! happens later, in the tile codec.

use image::imageops;

use crate::formats::{HEIGHT, MAX_DESIGN_TILES, WIDTH};
use crate::{DesignError, PixelBuffer, Result};

/// Lazy iterator over the tiles of one image
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    image: &'a PixelBuffer,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
    next: u32,
}

impl<'a> Tiles<'a> {
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }
}

impl Iterator for Tiles<'_> {
    type Item = PixelBuffer;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.columns * self.rows {
            return None;
        }

        let x = (self.next % self.columns) * self.tile_width;
        let y = (self.next / self.columns) * self.tile_height;
        self.next += 1;

        let width = self.tile_width.min(self.image.width() - x);
        let height = self.tile_height.min(self.image.height() - y);
        Some(imageops::crop_imm(self.image, x, y, width, height).to_image())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.columns * self.rows - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Tiles<'_> {}

/// Splits `image` into 32x32 tiles
pub fn tile(image: &PixelBuffer) -> Tiles<'_> {
    tile_with(image, WIDTH, HEIGHT)
}

/// Splits `image` into tiles of the given size. A zero dimension is treated as 1.
pub fn tile_with(image: &PixelBuffer, tile_width: u32, tile_height: u32) -> Tiles<'_> {
    let tile_width = tile_width.max(1);
    let tile_height = tile_height.max(1);
    Tiles {
        image,
        tile_width,
        tile_height,
        columns: image.width().div_ceil(tile_width),
        rows: image.height().div_ceil(tile_height),
        next: 0,
    }
}

/// Number of 32x32 tiles an image of this size is split into
pub fn tile_count(width: u32, height: u32) -> usize {
    width.div_ceil(WIDTH) as usize * height.div_ceil(HEIGHT) as usize
}

/// Rejects images that would need more than [`MAX_DESIGN_TILES`] tiles
pub fn check_tile_count(width: u32, height: u32) -> Result<usize> {
    let tiles = tile_count(width, height);
    if tiles > MAX_DESIGN_TILES {
        return Err(DesignError::TiledImageTooBig {
            tiles,
            max: MAX_DESIGN_TILES,
        });
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_two_tiles_left_then_right() {
        let img = RgbaImage::from_fn(64, 32, |x, _| {
            if x < 32 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let tiles: Vec<_> = tile(&img).collect();
        assert_eq!(tiles.len(), 2);
        assert!(tiles[0].pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
        assert!(tiles[1].pixels().all(|p| *p == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_row_major_order() {
        let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x / 32) as u8, (y / 32) as u8, 0, 255]));
        let origins: Vec<_> = tile(&img).map(|t| (t.get_pixel(0, 0)[0], t.get_pixel(0, 0)[1])).collect();
        assert_eq!(origins, [(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_edge_tiles_not_padded() {
        let img = RgbaImage::new(40, 33);
        let sizes: Vec<_> = tile(&img).map(|t| t.dimensions()).collect();
        assert_eq!(sizes, [(32, 32), (8, 32), (32, 1), (8, 1)]);
        assert_eq!(tile(&img).len(), 4);
    }

    #[test]
    fn test_tile_count_limit() {
        assert_eq!(tile_count(128, 128), 16);
        assert_eq!(tile_count(129, 128), 20);
        assert_eq!(check_tile_count(128, 128).unwrap(), 16);
        assert!(matches!(
            check_tile_count(160, 128),
            Err(DesignError::TiledImageTooBig { tiles: 20, max: 16 })
        ));
    }

    #[test]
    fn test_empty_image() {
        let img = RgbaImage::new(0, 0);
        assert_eq!(tile(&img).count(), 0);
    }
}
