//! A single custom design: a design type plus one image per external layer.

use std::collections::BTreeMap;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use super::correspondence;
use super::registry::DesignType;
use crate::formats::tile::pad_to_tile;
use crate::formats::{HEIGHT, WIDTH};
use crate::{DesignError, PixelBuffer, Result};

/// Descriptive fields carried alongside the pixels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignMeta {
    pub island_name: String,
    pub design_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
}

impl DesignMeta {
    pub fn new(island_name: impl Into<String>, design_name: impl Into<String>) -> Self {
        DesignMeta {
            island_name: island_name.into(),
            design_name: design_name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    design_type: &'static DesignType,
    pub meta: DesignMeta,
    layers: BTreeMap<String, PixelBuffer>,
}

impl Design {
    /// Builds a design, checking that `layers` matches the type exactly.
    pub fn new(
        design_type: &'static DesignType,
        meta: DesignMeta,
        layers: BTreeMap<String, PixelBuffer>,
    ) -> Result<Self> {
        validate(design_type, &layers)?;
        Ok(Design {
            design_type,
            meta,
            layers,
        })
    }

    /// Builds a basic design from an image of any size.
    ///
    /// Larger images are scaled down to fit 32x32, keeping the aspect ratio.
    /// The game format has no size field, so anything smaller than a tile is
    /// placed at the top-left of a transparent tile.
    pub fn basic(meta: DesignMeta, image: PixelBuffer) -> Result<Self> {
        let design_type = DesignType::basic();
        let image = fit_to_tile(image);
        let mut layers = BTreeMap::new();
        layers.insert(design_type.external_layers[0].name.to_string(), image);
        Design::new(design_type, meta, layers)
    }

    /// Builds a basic design from a named layer map.
    ///
    /// The map must hold exactly the basic layer `"0"`; any other name is
    /// rejected before the image is fitted.
    pub fn basic_from_layers(meta: DesignMeta, mut layers: BTreeMap<String, PixelBuffer>) -> Result<Self> {
        let design_type = DesignType::basic();
        if let Some(name) = layers.keys().find(|name| design_type.external_layer(name).is_none()) {
            return Err(DesignError::InvalidLayerName {
                name: name.clone(),
                valid: design_type.layer_names(),
            });
        }

        let layer = &design_type.external_layers[0];
        let image = layers.remove(layer.name).ok_or_else(|| DesignError::MissingLayer {
            name: layer.name.to_string(),
            width: layer.width,
            height: layer.height,
        })?;
        Design::basic(meta, image)
    }

    /// Reassembles a design from decoded internal tiles
    pub fn from_internal(
        design_type: &'static DesignType,
        meta: DesignMeta,
        internal_layers: Vec<PixelBuffer>,
    ) -> Result<Self> {
        let layers = correspondence::externalize(design_type, internal_layers)?;
        Design::new(design_type, meta, layers)
    }

    pub fn design_type(&self) -> &'static DesignType {
        self.design_type
    }

    pub fn is_pro(&self) -> bool {
        self.design_type.is_pro()
    }

    pub fn layer(&self, name: &str) -> Option<&PixelBuffer> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> &BTreeMap<String, PixelBuffer> {
        &self.layers
    }

    pub fn into_layers(self) -> BTreeMap<String, PixelBuffer> {
        self.layers
    }

    /// Internal layers in wire order, each padded to a full tile
    pub fn internalize(&self) -> Result<Vec<PixelBuffer>> {
        let internal = correspondence::internalize(self.design_type, self.layers.clone())?;
        Ok(internal.into_iter().map(pad_to_tile).collect())
    }
}

/// Checks every declared layer is present with its declared size, then that no
/// unknown layer names were supplied.
pub fn validate(design_type: &DesignType, layers: &BTreeMap<String, PixelBuffer>) -> Result<()> {
    for layer in design_type.external_layers {
        let image = layers.get(layer.name).ok_or_else(|| DesignError::MissingLayer {
            name: layer.name.to_string(),
            width: layer.width,
            height: layer.height,
        })?;
        if image.dimensions() != layer.size() {
            return Err(DesignError::InvalidLayerSize {
                name: layer.name.to_string(),
                expected: layer.size(),
                actual: image.dimensions(),
            });
        }
    }

    if let Some(name) = layers.keys().find(|name| design_type.external_layer(name).is_none()) {
        return Err(DesignError::InvalidLayerName {
            name: name.clone(),
            valid: design_type.layer_names(),
        });
    }

    Ok(())
}

fn fit_to_tile(image: PixelBuffer) -> PixelBuffer {
    let (width, height) = image.dimensions();
    if width <= WIDTH && height <= HEIGHT {
        return pad_to_tile(image);
    }

    let scale = f64::min(WIDTH as f64 / width as f64, HEIGHT as f64 / height as f64);
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, WIDTH);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, HEIGHT);
    pad_to_tile(imageops::resize(&image, new_width, new_height, FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn tee_layers() -> BTreeMap<String, PixelBuffer> {
        let tee = DesignType::from_name("short-sleeve-tee").unwrap();
        tee.external_layers
            .iter()
            .map(|l| (l.name.to_string(), RgbaImage::from_pixel(l.width, l.height, Rgba([1, 2, 3, 255]))))
            .collect()
    }

    #[test]
    fn test_missing_layer_named() {
        let tee = DesignType::from_name("short-sleeve-tee").unwrap();
        let mut layers = tee_layers();
        layers.remove("left-sleeve");
        match Design::new(tee, DesignMeta::default(), layers) {
            Err(DesignError::MissingLayer { name, width, height }) => {
                assert_eq!(name, "left-sleeve");
                assert_eq!((width, height), (22, 13));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wrong_size() {
        let tee = DesignType::from_name("short-sleeve-tee").unwrap();
        let mut layers = tee_layers();
        layers.insert("front".to_string(), RgbaImage::new(32, 40));
        let err = Design::new(tee, DesignMeta::default(), layers).unwrap_err();
        assert_eq!(err.code(), Some(305));
        assert_eq!(err.expected_byte_length(), Some(32 * 32 * 4));
        assert!(matches!(
            err,
            DesignError::InvalidLayerSize { expected: (32, 32), actual: (32, 40), .. }
        ));
    }

    #[test]
    fn test_unknown_layer_name() {
        let tee = DesignType::from_name("short-sleeve-tee").unwrap();
        let mut layers = tee_layers();
        layers.insert("hood".to_string(), RgbaImage::new(32, 32));
        match Design::new(tee, DesignMeta::default(), layers) {
            Err(DesignError::InvalidLayerName { name, valid }) => {
                assert_eq!(name, "hood");
                assert_eq!(valid, ["back", "front", "right-sleeve", "left-sleeve"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_basic_small_image_padded() {
        let design = Design::basic(DesignMeta::default(), RgbaImage::from_pixel(10, 5, Rgba([7, 7, 7, 255]))).unwrap();
        let layer = design.layer("0").unwrap();
        assert_eq!(layer.dimensions(), (32, 32));
        assert_eq!(*layer.get_pixel(9, 4), Rgba([7, 7, 7, 255]));
        assert_eq!(*layer.get_pixel(10, 4), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_basic_large_image_scaled() {
        let design = Design::basic(DesignMeta::default(), RgbaImage::from_pixel(128, 64, Rgba([7, 7, 7, 255]))).unwrap();
        let layer = design.layer("0").unwrap();
        assert_eq!(layer.dimensions(), (32, 32));
        // 128x64 scales to 32x16
        assert_eq!(layer.get_pixel(16, 8).0[3], 255);
        assert_eq!(*layer.get_pixel(16, 20), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_basic_from_layers_rejects_extra_names() {
        let mut layers = BTreeMap::new();
        layers.insert("0".to_string(), RgbaImage::new(32, 32));
        layers.insert("front".to_string(), RgbaImage::new(32, 32));
        let err = Design::basic_from_layers(DesignMeta::default(), layers).unwrap_err();
        assert_eq!(err.code(), Some(207));
        assert!(matches!(err, DesignError::InvalidLayerName { ref name, .. } if name == "front"));
    }

    #[test]
    fn test_basic_from_layers_needs_layer_zero() {
        let err = Design::basic_from_layers(DesignMeta::default(), BTreeMap::new()).unwrap_err();
        assert!(matches!(err, DesignError::MissingLayer { ref name, .. } if name == "0"));
    }

    #[test]
    fn test_basic_from_layers_fits_image() {
        let mut layers = BTreeMap::new();
        layers.insert("0".to_string(), RgbaImage::from_pixel(64, 64, Rgba([3, 3, 3, 255])));
        let design = Design::basic_from_layers(DesignMeta::default(), layers).unwrap();
        assert_eq!(design.layer("0").unwrap().dimensions(), (32, 32));
    }

    #[test]
    fn test_internalize_pads_knit_cap() {
        let cap = DesignType::from_name("knit-cap").unwrap();
        let mut layers = BTreeMap::new();
        layers.insert("cap".to_string(), RgbaImage::from_pixel(64, 53, Rgba([4, 4, 4, 255])));
        let design = Design::new(cap, DesignMeta::default(), layers).unwrap();
        let internal = design.internalize().unwrap();
        assert!(internal.iter().all(|t| t.dimensions() == (32, 32)));
        assert_eq!(*internal[3].get_pixel(0, 20), Rgba([4, 4, 4, 255]));
        assert_eq!(*internal[3].get_pixel(0, 21), Rgba([0, 0, 0, 0]));
    }
}
