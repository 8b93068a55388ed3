//! Wire formats used by the game's custom design service.

pub mod colour;
pub mod envelope;
pub mod tile;

/// Width of one internal tile in pixels
pub const WIDTH: u32 = 32;
/// Height of one internal tile in pixels
pub const HEIGHT: u32 = 32;
pub const SIZE: (u32, u32) = (WIDTH, HEIGHT);

pub const BYTES_PER_PIXEL: usize = 4;

/// Two pixels share each byte, one per nibble
pub const TILE_BYTES: usize = (WIDTH * HEIGHT) as usize / 2;

/// Usable palette entries, shared by every tile of a design
pub const PALETTE_SIZE: usize = 15;

/// Palette index that always decodes to fully transparent
pub const TRANSPARENT_INDEX: u8 = 15;

/// Largest number of tiles a single basic image may be split into
pub const MAX_DESIGN_TILES: usize = 16;

/// Internal tile count of every pro design
pub const PRO_LAYER_COUNT: usize = 4;
