//! # Correspondence Engine
//!
//! Moves pixel rectangles between external layer space and internal tile
//! space, driven by a design type's correspondence table. Entries are applied
//! in table order and later writes replace earlier ones (no blending).

use std::collections::BTreeMap;

use super::registry::DesignType;
use crate::{DesignError, PixelBuffer, Result};

/// Splits external layers into the type's internal layers.
///
/// `layers` must already have passed validation against `design_type`.
pub fn internalize(
    design_type: &DesignType,
    mut layers: BTreeMap<String, PixelBuffer>,
) -> Result<Vec<PixelBuffer>> {
    let Some(correspondence) = design_type.correspondence else {
        // One-to-one: adopt the buffers in declaration order
        return design_type
            .external_layers
            .iter()
            .map(|layer| {
                layers.remove(layer.name).ok_or_else(|| DesignError::MissingLayer {
                    name: layer.name.to_string(),
                    width: layer.width,
                    height: layer.height,
                })
            })
            .collect();
    };

    let mut out: Vec<PixelBuffer> = design_type.internal_layers.iter().map(|l| l.blank()).collect();
    for c in correspondence {
        let src = layers.get(c.external_name).ok_or_else(|| missing(design_type, c.external_name))?;
        copy_region(&mut out[c.internal_index], src, c.internal_pos, c.external_pos, c.dimensions);
    }

    Ok(out)
}

/// Reassembles external layers from internal layers
pub fn externalize(
    design_type: &DesignType,
    internal_layers: Vec<PixelBuffer>,
) -> Result<BTreeMap<String, PixelBuffer>> {
    let needed = design_type.internal_layers.len();
    if internal_layers.len() < needed {
        return Err(DesignError::InvalidLayerIndex {
            index: needed - 1,
            num_layers: internal_layers.len(),
        });
    }

    let Some(correspondence) = design_type.correspondence else {
        return Ok(design_type
            .external_layers
            .iter()
            .zip(internal_layers)
            .map(|(layer, image)| (layer.name.to_string(), image))
            .collect());
    };

    let mut out: BTreeMap<String, PixelBuffer> = design_type
        .external_layers
        .iter()
        .map(|layer| (layer.name.to_string(), layer.blank()))
        .collect();
    for c in correspondence {
        let dst = out
            .get_mut(c.external_name)
            .ok_or_else(|| missing(design_type, c.external_name))?;
        copy_region(dst, &internal_layers[c.internal_index], c.external_pos, c.internal_pos, c.dimensions);
    }

    Ok(out)
}

/// Copies a `dimensions` rectangle from `src` at `src_pos` to `dst` at `dst_pos`.
/// Pixels falling outside either buffer are skipped.
pub fn copy_region(
    dst: &mut PixelBuffer,
    src: &PixelBuffer,
    dst_pos: (u32, u32),
    src_pos: (u32, u32),
    dimensions: (u32, u32),
) {
    let (width, height) = dimensions;
    for dy in 0..height {
        for dx in 0..width {
            let (sx, sy) = (src_pos.0 + dx, src_pos.1 + dy);
            let (tx, ty) = (dst_pos.0 + dx, dst_pos.1 + dy);
            if sx < src.width() && sy < src.height() && tx < dst.width() && ty < dst.height() {
                dst.put_pixel(tx, ty, *src.get_pixel(sx, sy));
            }
        }
    }
}

fn missing(design_type: &DesignType, name: &str) -> DesignError {
    let (width, height) = design_type.external_layer(name).map(|l| l.size()).unwrap_or((0, 0));
    DesignError::MissingLayer {
        name: name.to_string(),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn filled(design_type: &DesignType) -> BTreeMap<String, PixelBuffer> {
        design_type
            .external_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let image = RgbaImage::from_fn(layer.width, layer.height, |x, y| {
                    Rgba([i as u8 * 40, x as u8, y as u8, 255])
                });
                (layer.name.to_string(), image)
            })
            .collect()
    }

    #[test]
    fn test_short_sleeve_tee_layout() {
        let tee = DesignType::from_name("short-sleeve-tee").unwrap();
        let layers = filled(tee);
        let internal = internalize(tee, layers.clone()).unwrap();

        assert_eq!(internal.len(), 4);
        assert!(internal.iter().all(|img| img.dimensions() == (32, 32)));
        assert_eq!(internal[0], layers["back"]);
        assert_eq!(internal[1], layers["front"]);
        // Sleeve origin lands at (5, 10) of tile 2
        assert_eq!(internal[2].get_pixel(5, 10), layers["right-sleeve"].get_pixel(0, 0));
        assert_eq!(*internal[2].get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*internal[3].get_pixel(26, 22), *layers["left-sleeve"].get_pixel(21, 12));
    }

    #[test]
    fn test_long_body_overflow_rows() {
        let dress = DesignType::from_name("sleeveless-dress").unwrap();
        let layers = filled(dress);
        let internal = internalize(dress, layers.clone()).unwrap();
        assert_eq!(internal[2].get_pixel(3, 8), layers["front"].get_pixel(3, 40));
        assert_eq!(internal[3].get_pixel(3, 0), layers["back"].get_pixel(3, 32));
    }

    #[test]
    fn test_every_type_round_trips() {
        for design_type in DesignType::all() {
            let layers = filled(design_type);
            let internal = internalize(design_type, layers.clone()).unwrap();
            let external = externalize(design_type, internal).unwrap();
            assert_eq!(external, layers, "{}", design_type);
        }
    }

    #[test]
    fn test_later_entries_overwrite() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let half_blue = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 128]));
        copy_region(&mut dst, &red, (0, 0), (0, 0), (4, 4));
        copy_region(&mut dst, &half_blue, (2, 0), (0, 0), (2, 4));
        assert_eq!(*dst.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(2, 0), Rgba([0, 0, 255, 128]));
    }

    #[test]
    fn test_copy_region_clips() {
        let mut dst = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        copy_region(&mut dst, &src, (1, 1), (2, 2), (4, 4));
        assert_eq!(*dst.get_pixel(1, 1), Rgba([9, 9, 9, 255]));
        assert_eq!(*dst.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_externalize_needs_all_tiles() {
        let hat = DesignType::from_name("brimmed-hat").unwrap();
        let tiles = vec![RgbaImage::new(32, 32); 2];
        assert!(matches!(
            externalize(hat, tiles),
            Err(DesignError::InvalidLayerIndex { index: 3, num_layers: 2 })
        ));
    }
}
