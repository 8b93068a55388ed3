use std::collections::BTreeMap;

use design_codec::formats::envelope::parse_body;
use design_codec::{
    decode_body, encode, encode_basic_image, BasicFit, Design, DesignError, DesignMeta, DesignType, EncodeConfig,
    PixelBuffer,
};
use image::{Rgba, RgbaImage};

fn config() -> EncodeConfig {
    EncodeConfig {
        session_id: Some(1),
        ..Default::default()
    }
}

/// Two shades per layer, striped every 8 columns
fn striped_layers(design_type: &DesignType) -> BTreeMap<String, PixelBuffer> {
    design_type
        .external_layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let base = 40 * (i as u8 + 1);
            let image = RgbaImage::from_fn(layer.width, layer.height, |x, _| {
                if (x / 8) % 2 == 0 {
                    Rgba([base, 0, 255 - base, 255])
                } else {
                    Rgba([0, base, 0, 255])
                }
            });
            (layer.name.to_string(), image)
        })
        .collect()
}

#[test]
fn every_type_survives_encode_and_decode() {
    for design_type in DesignType::all() {
        let layers = striped_layers(design_type);
        let design = Design::new(design_type, DesignMeta::new("Isle", design_type.name), layers.clone()).unwrap();

        let (was_quantized, encoded) = encode(&design, &config()).unwrap();
        assert!(!was_quantized, "{} was quantized", design_type.name);

        let body = parse_body(&encoded.body).unwrap();
        assert_eq!(body.data.layers.len(), design_type.internal_layers.len());
        assert!(body.data.layers.values().all(|tile| tile.len() == 512));
        assert_eq!(body.meta.pro, design_type.is_pro());

        let decoded = decode_body(&encoded.body).unwrap();
        assert_eq!(decoded.design_type().code, design_type.code);
        assert_eq!(decoded.meta.island_name, "Isle");
        assert_eq!(decoded.layers(), &layers, "{} layers differ", design_type.name);
    }
}

#[test]
fn seventeen_colours_are_quantized_then_encoded() {
    let tee = DesignType::lookup("101").unwrap();
    let mut layers = striped_layers(tee);
    let front = layers.get_mut("front").unwrap();
    for x in 0..17u32 {
        front.put_pixel(x, 0, Rgba([x as u8 * 15, 200, 7, 255]));
    }

    let (was_quantized, encoded) = encode(&Design::new(tee, DesignMeta::default(), layers).unwrap(), &config()).unwrap();
    assert!(was_quantized);
    let palette = parse_body(&encoded.body).unwrap().data.palette;
    assert!(palette.keys().filter(|k| k.as_str() != "15").count() <= 15);
    assert!(decode_body(&encoded.body).is_ok());
}

#[test]
fn fifteen_colour_pro_designs_are_never_quantized() {
    let strict = EncodeConfig {
        quantize: false,
        ..config()
    };
    for design_type in DesignType::all().iter().filter(|t| t.is_pro()) {
        // Every layer is wide enough to show all 15 shades
        let layers: BTreeMap<String, PixelBuffer> = design_type
            .external_layers
            .iter()
            .map(|layer| {
                let image = RgbaImage::from_fn(layer.width, layer.height, |x, _| Rgba([(x % 15) as u8 * 17, 60, 120, 255]));
                (layer.name.to_string(), image)
            })
            .collect();
        let design = Design::new(design_type, DesignMeta::default(), layers.clone()).unwrap();

        let (was_quantized, encoded) = encode(&design, &strict).unwrap();
        assert!(!was_quantized, "{} was quantized", design_type.name);
        assert_eq!(decode_body(&encoded.body).unwrap().layers(), &layers, "{} layers differ", design_type.name);
    }
}

#[test]
fn basic_overflow_is_quantized_to_fifteen_plus_transparent() {
    let mut image = RgbaImage::from_fn(32, 32, |x, y| Rgba([(x * 8) as u8, (y * 8) as u8, 90, 255]));
    for x in 0..32 {
        image.put_pixel(x, 31, Rgba([0, 0, 0, 0]));
    }
    let design = Design::basic(DesignMeta::default(), image).unwrap();

    let (was_quantized, encoded) = encode(&design, &config()).unwrap();
    assert!(was_quantized);

    let palette = parse_body(&encoded.body).unwrap().data.palette;
    assert!(palette.len() <= 16);
    assert_eq!(palette["15"], 0);

    let decoded = decode_body(&encoded.body).unwrap();
    let layer = decoded.layer("0").unwrap();
    assert!((0..32).all(|x| *layer.get_pixel(x, 31) == Rgba([0, 0, 0, 0])));
    assert!((0..32).all(|x| layer.get_pixel(x, 0).0[3] == 255));
}

#[test]
fn missing_sleeve_is_reported_before_encoding() {
    let tee = DesignType::from_name("short-sleeve-tee").unwrap();
    let mut layers = striped_layers(tee);
    layers.remove("left-sleeve");

    let err = Design::new(tee, DesignMeta::default(), layers).unwrap_err();
    assert_eq!(err.code(), Some(309));
    assert!(matches!(err, DesignError::MissingLayer { ref name, .. } if name == "left-sleeve"));
}

#[test]
fn oversized_upload_becomes_row_major_designs() {
    let image = RgbaImage::from_fn(96, 64, |x, y| Rgba([(x / 32) as u8 * 80, (y / 32) as u8 * 80, 0, 255]));
    let config = EncodeConfig {
        basic_fit: BasicFit::Tile,
        ..config()
    };

    let designs = encode_basic_image(image, DesignMeta::new("Isle", "Mural"), &config).unwrap();
    assert_eq!(designs.len(), 6);

    for (i, (_, encoded)) in designs.iter().enumerate() {
        let design = decode_body(&encoded.body).unwrap();
        assert_eq!(design.meta.design_name, format!("Mural {}", i + 1));
        let expected = Rgba([(i % 3) as u8 * 80, (i / 3) as u8 * 80, 0, 255]);
        assert!(design.layer("0").unwrap().pixels().all(|p| *p == expected));
    }
}

#[test]
fn partial_edge_tiles_are_padded_transparent() {
    let image = RgbaImage::from_pixel(40, 32, Rgba([5, 5, 5, 255]));
    let config = EncodeConfig {
        basic_fit: BasicFit::Tile,
        ..config()
    };

    let designs = encode_basic_image(image, DesignMeta::new("Isle", "Edge"), &config).unwrap();
    let edge = decode_body(&designs[1].1.body).unwrap();
    let layer = edge.layer("0").unwrap();
    assert_eq!(*layer.get_pixel(7, 31), Rgba([5, 5, 5, 255]));
    assert_eq!(*layer.get_pixel(8, 0), Rgba([0, 0, 0, 0]));
}

#[test]
fn random_session_ids_differ() {
    let design = Design::basic(DesignMeta::default(), RgbaImage::new(32, 32)).unwrap();
    let config = EncodeConfig::default();
    let a = parse_body(&encode(&design, &config).unwrap().1.body).unwrap();
    let b = parse_body(&encode(&design, &config).unwrap().1.body).unwrap();
    assert_ne!(a.meta.session_id, b.meta.session_id);
}
