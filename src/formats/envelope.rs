//! # Design Envelope
//!
//! Assembles the message the game service accepts for a new design, and
//! parses the body it hands back for an existing one. Both `meta` and `body`
//! are MessagePack maps keyed by the game's own field names:
//!
//! ```text
//! meta = { mMtVNm, mMtDNm, mMtUse, mMtPro, mMtNsaId, mMtVer, ... }
//! body = { mMeta: meta, mData: { mPalette: {"0": rgba, ...},
//!                                mData: {"0": <512 bytes>, ...},
//!                                mAuthor, mFlg, mClSet } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use super::tile::{decode_tile, encode_tile};
use super::{HEIGHT, TILE_BYTES, WIDTH};
use crate::config::{BasicFit, EncodeConfig};
use crate::data::design::{self, Design, DesignMeta};
use crate::data::registry::DesignType;
use crate::graphics::palette::{build_palette, InversePalette, Palette, PaletteError, PaletteMode};
use crate::graphics::quantize::{MedianCut, Quantizer};
use crate::graphics::tiler::{check_tile_count, tile};
use crate::{DesignError, PixelBuffer, Result};

/// The four blobs sent when creating a design
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedDesign {
    pub meta: Vec<u8>,
    pub body: Vec<u8>,
    /// Small rendered preview, opaque to the codec
    pub net_image: Vec<u8>,
    /// Larger mock-up preview, opaque to the codec
    pub preview_image: Vec<u8>,
}

impl EncodedDesign {
    pub fn with_previews(mut self, net_image: Vec<u8>, preview_image: Vec<u8>) -> Self {
        self.net_image = net_image;
        self.preview_image = preview_image;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMeta {
    #[serde(rename = "mMtVNm", default)]
    pub island_name: String,
    #[serde(rename = "mMtDNm", default)]
    pub design_name: String,
    #[serde(rename = "mMtUse")]
    pub type_code: u16,
    #[serde(rename = "mMtPro", default)]
    pub pro: bool,
    #[serde(rename = "mMtNsaId", default)]
    pub session_id: u64,
    #[serde(rename = "mMtVer", default)]
    pub version: u32,
    #[serde(rename = "mAppReleaseVersion", default)]
    pub app_release_version: u32,
    #[serde(rename = "mMtVRuby", default)]
    pub ruby_version: u32,
    #[serde(rename = "mMtTag", default)]
    pub tags: Vec<u32>,
    #[serde(rename = "mMtLang", default)]
    pub language: String,
    #[serde(rename = "mPHash", default)]
    pub p_hash: u64,
    #[serde(rename = "mShareUrl", default)]
    pub share_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAuthor {
    #[serde(rename = "mVId")]
    pub vid: u32,
    #[serde(rename = "mPId")]
    pub pid: u32,
    #[serde(rename = "mGender")]
    pub gender: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireImageData {
    #[serde(rename = "mPalette")]
    pub palette: BTreeMap<String, u32>,
    #[serde(rename = "mData")]
    pub layers: BTreeMap<String, ByteBuf>,
    #[serde(rename = "mAuthor", default)]
    pub author: WireAuthor,
    #[serde(rename = "mFlg", default)]
    pub flags: u32,
    #[serde(rename = "mClSet", default)]
    pub clothing_set: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBody {
    #[serde(rename = "mMeta")]
    pub meta: WireMeta,
    #[serde(rename = "mData")]
    pub data: WireImageData,
}

/// Encodes a design, quantizing with [`MedianCut`] if the palette overflows.
///
/// Returns whether quantization happened alongside the envelope. The preview
/// images are left empty; attach them with [`EncodedDesign::with_previews`].
pub fn encode(design: &Design, config: &EncodeConfig) -> Result<(bool, EncodedDesign)> {
    encode_with(design, config, &MedianCut)
}

pub fn encode_with(
    design: &Design,
    config: &EncodeConfig,
    quantizer: &dyn Quantizer,
) -> Result<(bool, EncodedDesign)> {
    let design_type = design.design_type();
    design::validate(design_type, design.layers())?;

    let mut tiles = design.internalize()?;
    let mode = PaletteMode::for_design(design_type.is_pro());
    let (was_quantized, palette) = match build_palette(&tiles, mode) {
        Ok(palette) => (false, palette),
        Err(PaletteError::Overflow { .. }) if config.quantize => {
            quantizer.quantize(&mut tiles, mode.capacity());
            (true, build_palette(&tiles, mode)?)
        }
        Err(err) => return Err(err.into()),
    };

    let data = encode_image_data(&palette, &tiles, config)?;
    let meta = WireMeta {
        island_name: design.meta.island_name.clone(),
        design_name: design.meta.design_name.clone(),
        type_code: design_type.code,
        pro: design_type.is_pro(),
        session_id: config.session_id(),
        version: config.version,
        app_release_version: config.app_release_version,
        ruby_version: config.ruby_version,
        tags: vec![0, 0, 0],
        language: config.language.clone(),
        p_hash: 0,
        share_url: String::new(),
    };

    let encoded_meta = rmp_serde::to_vec_named(&meta)?;
    let body = rmp_serde::to_vec_named(&WireBody { meta, data })?;

    Ok((
        was_quantized,
        EncodedDesign {
            meta: encoded_meta,
            body,
            ..Default::default()
        },
    ))
}

fn encode_image_data(palette: &Palette, tiles: &[PixelBuffer], config: &EncodeConfig) -> Result<WireImageData> {
    let mut layers = BTreeMap::new();
    for (i, tile) in tiles.iter().enumerate() {
        let bytes = encode_tile(palette, tile)?;
        layers.insert(i.to_string(), ByteBuf::from(bytes.to_vec()));
    }

    Ok(WireImageData {
        palette: palette.to_wire(),
        layers,
        author: WireAuthor {
            vid: config.author_vid,
            pid: config.author_pid,
            gender: config.author_gender,
        },
        flags: config.flags,
        clothing_set: config.clothing_set,
    })
}

/// Encodes an uploaded basic image of any size.
///
/// With [`BasicFit::Tile`] an image larger than one tile becomes one design
/// per tile, in row-major order, named `"<name> 1"`, `"<name> 2"`, and so on.
/// Otherwise the image is scaled into a single design.
pub fn encode_basic_image(
    image: PixelBuffer,
    meta: DesignMeta,
    config: &EncodeConfig,
) -> Result<Vec<(bool, EncodedDesign)>> {
    let oversized = image.width() > WIDTH || image.height() > HEIGHT;
    if config.basic_fit != BasicFit::Tile || !oversized {
        let design = Design::basic(meta, image)?;
        return Ok(vec![encode(&design, config)?]);
    }

    let count = check_tile_count(image.width(), image.height())?;
    let designs = tile(&image)
        .enumerate()
        .map(|(i, piece)| {
            let mut meta = meta.clone();
            if count > 1 {
                meta.design_name = format!("{} {}", meta.design_name, i + 1);
            }
            Design::basic(meta, piece)
        })
        .collect::<Result<Vec<_>>>()?;

    designs.iter().map(|design| encode(design, config)).collect()
}

pub fn parse_body(body: &[u8]) -> Result<WireBody> {
    Ok(rmp_serde::from_slice(body)?)
}

/// Decodes a design body back into its external layers
pub fn decode_body(body: &[u8]) -> Result<Design> {
    let body = parse_body(body)?;
    let design_type = DesignType::from_code(body.meta.type_code)
        .ok_or_else(|| DesignError::UnknownDesignType(body.meta.type_code.to_string()))?;

    let palette = InversePalette::from_wire(&body.data.palette)?;
    let tiles = (0..design_type.internal_layers.len())
        .map(|i| decode_layer(&body.data, &palette, i))
        .collect::<Result<Vec<_>>>()?;

    let meta = DesignMeta::new(body.meta.island_name, body.meta.design_name);
    Design::from_internal(design_type, meta, tiles)
}

/// Decodes a single internal tile of a design body
pub fn render_layer(body: &[u8], index: usize) -> Result<PixelBuffer> {
    let body = parse_body(body)?;
    let palette = InversePalette::from_wire(&body.data.palette)?;
    decode_layer(&body.data, &palette, index)
}

fn decode_layer(data: &WireImageData, palette: &InversePalette, index: usize) -> Result<PixelBuffer> {
    let bytes = data
        .layers
        .get(&index.to_string())
        .ok_or(DesignError::InvalidLayerIndex {
            index,
            num_layers: data.layers.len(),
        })?;
    let bytes: &[u8; TILE_BYTES] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| DesignError::InvalidTileLength {
            index,
            length: bytes.len(),
        })?;
    decode_tile(palette, bytes)
}
