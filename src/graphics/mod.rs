//! Pixel-level processing shared by the encoder: palettes, quantization and
//! tiling of oversized images.

pub mod palette;
pub mod quantize;
pub mod tiler;
