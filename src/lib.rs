//! Custom design codec
//!
//! Converts RGBA layer images into the game's tile-based, palette-indexed
//! custom design format and back. Garment panels are spliced into and out of
//! the four 32x32 internal tiles through a static correspondence table per
//! design type.

pub mod config;
pub mod data;
pub mod formats;
pub mod graphics;

use std::io;

use formats::colour::Colour;

pub use config::{BasicFit, EncodeConfig};
pub use data::design::{Design, DesignMeta};
pub use data::registry::{DesignType, Layer, LayerCorrespondence};
pub use formats::envelope::{decode_body, encode, encode_basic_image, render_layer, EncodedDesign};
pub use graphics::palette::{build_palette, Palette, PaletteError, PaletteMode};
pub use graphics::tiler::tile;

/// Pixel grid shared by every stage of the codec.
pub type PixelBuffer = image::RgbaImage;

pub type Result<T> = std::result::Result<T, DesignError>;

/// Error type for design encoding and decoding
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error("the combined palette of all layers has {colours} colours, more than {max}")]
    PaletteOverflow { colours: usize, max: usize },

    #[error("payload was missing one or more layers, first missing layer: \"{name}\"")]
    MissingLayer {
        name: String,
        width: u32,
        height: u32,
    },

    #[error(
        "layer {name} was not {}x{} (got {}x{})",
        expected.0,
        expected.1,
        actual.0,
        actual.1
    )]
    InvalidLayerSize {
        name: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid layer name \"{name}\", expected one of {valid:?}")]
    InvalidLayerName { name: String, valid: Vec<String> },

    #[error("layer \"{0}\" was given more than once")]
    DuplicateLayer(String),

    #[error("the uploaded image would need {tiles} tiles, more than {max}")]
    TiledImageTooBig { tiles: usize, max: usize },

    #[error("unknown design type {0}")]
    UnknownDesignType(String),

    #[error("invalid layer index {index} (design has {num_layers} layers)")]
    InvalidLayerIndex { index: usize, num_layers: usize },

    #[error("tile buffer was {width}x{height}, tiles are 32x32")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("tile {index} is {length} bytes long")]
    InvalidTileLength { index: usize, length: usize },

    #[error("colour {0} is not in the palette")]
    ColourNotInPalette(Colour),

    #[error("palette index {0} is not defined")]
    UnknownPaletteIndex(u8),

    #[error("invalid palette key \"{0}\"")]
    InvalidPaletteKey(String),

    #[error("invalid design code \"{0}\"")]
    InvalidDesignCode(String),

    #[error("failed to serialise design: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to deserialise design: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DesignError {
    /// Numeric error code reported to API clients.
    pub fn code(&self) -> Option<u16> {
        match self {
            DesignError::InvalidDesignCode(_) => Some(202),
            DesignError::InvalidLayerIndex { .. } => Some(206),
            DesignError::InvalidLayerName { .. } => Some(207),
            DesignError::PaletteOverflow { .. } => Some(211),
            DesignError::InvalidLayerSize { .. } => Some(305),
            DesignError::TiledImageTooBig { .. } => Some(306),
            DesignError::MissingLayer { .. } => Some(309),
            DesignError::Image(_) => Some(310),
            _ => None,
        }
    }

    /// Byte length of the RGBA payload the offending layer should have had.
    pub fn expected_byte_length(&self) -> Option<usize> {
        match self {
            DesignError::InvalidLayerSize { expected, .. } => {
                Some(expected.0 as usize * expected.1 as usize * formats::BYTES_PER_PIXEL)
            }
            _ => None,
        }
    }
}
