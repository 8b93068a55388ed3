//! # Tile Pixel Codec
//!
//! One tile is 32x32 pixels at 4 bits per pixel, 512 bytes. Pixels are stored
//! in row-major order, two per byte: the even pixel in the low nibble and the
//! odd pixel in the high nibble.

use image::{imageops, Rgba, RgbaImage};

use super::colour::Colour;
use super::{HEIGHT, TILE_BYTES, WIDTH};
use crate::graphics::palette::{InversePalette, Palette};
use crate::{DesignError, PixelBuffer, Result};

/// Packs a 32x32 buffer into nibbles.
///
/// Every colour must already be in `palette`; the palette builder has to run
/// over the same buffers first.
pub fn encode_tile(palette: &Palette, pixels: &PixelBuffer) -> Result<[u8; TILE_BYTES]> {
    if pixels.dimensions() != (WIDTH, HEIGHT) {
        return Err(DesignError::InvalidTileSize {
            width: pixels.width(),
            height: pixels.height(),
        });
    }

    let mut out = [0u8; TILE_BYTES];
    for (byte, pair) in out.iter_mut().zip(pixels.as_raw().chunks_exact(8)) {
        let low = palette.require_index(colour_at(&pair[0..4]))?;
        let high = palette.require_index(colour_at(&pair[4..8]))?;
        *byte = (high << 4) | low;
    }

    Ok(out)
}

/// Unpacks one tile into a 32x32 RGBA buffer
pub fn decode_tile(palette: &InversePalette, bytes: &[u8; TILE_BYTES]) -> Result<PixelBuffer> {
    let mut raw = Vec::with_capacity(TILE_BYTES * 2 * 4);

    for &byte in bytes.iter() {
        // Low nibble renders first
        for index in [byte & 0xF, (byte >> 4) & 0xF] {
            let colour = palette
                .colour(index)
                .ok_or(DesignError::UnknownPaletteIndex(index))?;
            raw.extend_from_slice(&colour.to_bytes());
        }
    }

    RgbaImage::from_raw(WIDTH, HEIGHT, raw).ok_or_else(|| {
        DesignError::InvalidTileLength {
            index: 0,
            length: bytes.len(),
        }
    })
}

/// Places a buffer of at most 32x32 at the top-left of a blank transparent tile.
///
/// Buffers that are already tile sized are returned unchanged. Anything past
/// the tile edge is dropped.
pub fn pad_to_tile(pixels: PixelBuffer) -> PixelBuffer {
    if pixels.dimensions() == (WIDTH, HEIGHT) {
        return pixels;
    }
    let mut canvas = RgbaImage::from_pixel(WIDTH, HEIGHT, Rgba([0, 0, 0, 0]));
    imageops::replace(&mut canvas, &pixels, 0, 0);
    canvas
}

fn colour_at(px: &[u8]) -> Colour {
    Colour(u32::from_be_bytes([px[0], px[1], px[2], px[3]]))
}
