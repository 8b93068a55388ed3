//! # Layer Geometry Registry
//!
//! Every design type the game accepts, with the layers shown to users
//! (external), the tiles sent over the wire (internal) and the rectangles that
//! map one onto the other. The coordinates mirror the game's own tile layout
//! and must not drift.

use std::fmt;

use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::formats::{PRO_LAYER_COUNT, SIZE as STANDARD};
use crate::{DesignError, Result};

type Xy = (u32, u32);

/// A named pixel layer with a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Layer {
    pub const fn new(name: &'static str, size: Xy) -> Self {
        Layer {
            name,
            width: size.0,
            height: size.1,
        }
    }

    pub fn size(&self) -> Xy {
        (self.width, self.height)
    }

    /// "left-sleeve" -> "Left sleeve"
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('-', " "),
            None => String::new(),
        }
    }

    /// A fully transparent buffer of this layer's size
    pub fn blank(&self) -> RgbaImage {
        RgbaImage::from_pixel(self.width, self.height, Rgba([0, 0, 0, 0]))
    }
}

/// Declares that `dimensions` pixels at `external_pos` of the named external
/// layer live at `internal_pos` of internal tile `internal_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerCorrespondence {
    pub internal_index: usize,
    pub external_name: &'static str,
    pub internal_pos: Xy,
    pub external_pos: Xy,
    pub dimensions: Xy,
}

const fn corr(
    internal_index: usize,
    external_name: &'static str,
    internal_pos: Xy,
    external_pos: Xy,
    dimensions: Xy,
) -> LayerCorrespondence {
    LayerCorrespondence {
        internal_index,
        external_name,
        internal_pos,
        external_pos,
        dimensions,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Tops,
    #[serde(rename = "Dress-up")]
    DressUp,
    Headwear,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Tops => write!(f, "Tops"),
            Category::DressUp => write!(f, "Dress-up"),
            Category::Headwear => write!(f, "Headwear"),
        }
    }
}

/// A registered design type. All instances live in [`DESIGN_TYPES`].
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DesignType {
    pub code: u16,
    /// Kebab-case identifier used by the public API
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: Option<Category>,
    pub external_layers: &'static [Layer],
    pub internal_layers: &'static [Layer],
    /// `None` means each external layer is its own internal layer
    pub correspondence: Option<&'static [LayerCorrespondence]>,
}

impl DesignType {
    pub fn all() -> &'static [DesignType] {
        DESIGN_TYPES
    }

    pub fn basic() -> &'static DesignType {
        &DESIGN_TYPES[0]
    }

    pub fn from_code(code: u16) -> Option<&'static DesignType> {
        DESIGN_TYPES.iter().find(|t| t.code == code)
    }

    pub fn from_name(name: &str) -> Option<&'static DesignType> {
        DESIGN_TYPES.iter().find(|t| t.name == name)
    }

    /// Looks a type up by numeric code or canonical name
    pub fn lookup(key: &str) -> Result<&'static DesignType> {
        let found = match key.parse::<u16>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::from_name(key),
        };
        found.ok_or_else(|| DesignError::UnknownDesignType(key.to_string()))
    }

    pub fn is_one_to_one(&self) -> bool {
        self.correspondence.is_none()
    }

    pub fn is_pro(&self) -> bool {
        self.internal_layers.len() > 1
    }

    pub fn external_layer(&self, name: &str) -> Option<&'static Layer> {
        self.external_layers.iter().find(|l| l.name == name)
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.external_layers.iter().map(|l| l.name.to_string()).collect()
    }
}

impl fmt::Display for DesignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.code)
    }
}

/// Design types grouped by category, in registry order
pub fn categories() -> Vec<(Category, Vec<&'static DesignType>)> {
    let mut grouped: Vec<(Category, Vec<&'static DesignType>)> = Vec::new();
    for design_type in DESIGN_TYPES {
        let Some(category) = design_type.category else {
            continue;
        };
        match grouped.iter_mut().find(|(c, _)| *c == category) {
            Some((_, types)) => types.push(design_type),
            None => grouped.push((category, vec![design_type])),
        }
    }
    grouped
}

// Layer sizes
pub const SHORT_SLEEVE: Xy = (22, 13);
pub const LONG_SLEEVE: Xy = (22, 22);
pub const WIDE_SLEEVE: Xy = (30, 22);
pub const LONG_BODY: Xy = (32, 41);

const BASIC_LAYERS: [Layer; 1] = [Layer::new("0", STANDARD)];

const PRO_INTERNAL_LAYERS: [Layer; PRO_LAYER_COUNT] = [
    Layer::new("0", STANDARD),
    Layer::new("1", STANDARD),
    Layer::new("2", STANDARD),
    Layer::new("3", STANDARD),
];

const STANDARD_BODY_LAYERS: [Layer; 2] = [Layer::new("back", STANDARD), Layer::new("front", STANDARD)];

const LONG_BODY_LAYERS: [Layer; 2] = [Layer::new("back", LONG_BODY), Layer::new("front", LONG_BODY)];

const SHORT_SLEEVE_TOP_LAYERS: [Layer; 4] = [
    Layer::new("back", STANDARD),
    Layer::new("front", STANDARD),
    Layer::new("right-sleeve", SHORT_SLEEVE),
    Layer::new("left-sleeve", SHORT_SLEEVE),
];

const LONG_SLEEVE_TOP_LAYERS: [Layer; 4] = [
    Layer::new("back", STANDARD),
    Layer::new("front", STANDARD),
    Layer::new("right-sleeve", LONG_SLEEVE),
    Layer::new("left-sleeve", LONG_SLEEVE),
];

const LONG_BODY_SHORT_SLEEVE_LAYERS: [Layer; 4] = [
    Layer::new("back", LONG_BODY),
    Layer::new("front", LONG_BODY),
    Layer::new("right-sleeve", SHORT_SLEEVE),
    Layer::new("left-sleeve", SHORT_SLEEVE),
];

const LONG_BODY_LONG_SLEEVE_LAYERS: [Layer; 4] = [
    Layer::new("back", LONG_BODY),
    Layer::new("front", LONG_BODY),
    Layer::new("right-sleeve", LONG_SLEEVE),
    Layer::new("left-sleeve", LONG_SLEEVE),
];

const LONG_BODY_WIDE_SLEEVE_LAYERS: [Layer; 4] = [
    Layer::new("back", LONG_BODY),
    Layer::new("front", LONG_BODY),
    Layer::new("right-sleeve", WIDE_SLEEVE),
    Layer::new("left-sleeve", WIDE_SLEEVE),
];

const STANDARD_BODY_CORRESPONDENCE: [LayerCorrespondence; 2] = [
    corr(0, "back", (0, 0), (0, 0), STANDARD),
    corr(1, "front", (0, 0), (0, 0), STANDARD),
];

const SHORT_SLEEVE_TOP_CORRESPONDENCE: [LayerCorrespondence; 4] = [
    corr(0, "back", (0, 0), (0, 0), STANDARD),
    corr(1, "front", (0, 0), (0, 0), STANDARD),
    corr(2, "right-sleeve", (5, 10), (0, 0), SHORT_SLEEVE),
    corr(3, "left-sleeve", (5, 10), (0, 0), SHORT_SLEEVE),
];

const LONG_SLEEVE_TOP_CORRESPONDENCE: [LayerCorrespondence; 4] = [
    corr(0, "back", (0, 0), (0, 0), STANDARD),
    corr(1, "front", (0, 0), (0, 0), STANDARD),
    corr(2, "right-sleeve", (5, 10), (0, 0), LONG_SLEEVE),
    corr(3, "left-sleeve", (5, 10), (0, 0), LONG_SLEEVE),
];

const LONG_BODY_CORRESPONDENCE: [LayerCorrespondence; 4] = [
    corr(0, "front", (0, 0), (0, 0), STANDARD),
    corr(2, "front", (0, 0), (0, 32), (32, 9)),
    corr(1, "back", (0, 0), (0, 0), STANDARD),
    corr(3, "back", (0, 0), (0, 32), (32, 9)),
];

// Sleeves sit below the body overflow rows of tiles 2 and 3
const LONG_BODY_SHORT_SLEEVE_CORRESPONDENCE: [LayerCorrespondence; 6] = [
    corr(0, "front", (0, 0), (0, 0), STANDARD),
    corr(2, "front", (0, 0), (0, 32), (32, 9)),
    corr(1, "back", (0, 0), (0, 0), STANDARD),
    corr(3, "back", (0, 0), (0, 32), (32, 9)),
    corr(2, "right-sleeve", (5, 10), (0, 0), SHORT_SLEEVE),
    corr(3, "left-sleeve", (5, 10), (0, 0), SHORT_SLEEVE),
];

const LONG_BODY_LONG_SLEEVE_CORRESPONDENCE: [LayerCorrespondence; 6] = [
    corr(0, "front", (0, 0), (0, 0), STANDARD),
    corr(2, "front", (0, 0), (0, 32), (32, 9)),
    corr(1, "back", (0, 0), (0, 0), STANDARD),
    corr(3, "back", (0, 0), (0, 32), (32, 9)),
    corr(2, "right-sleeve", (5, 10), (0, 0), LONG_SLEEVE),
    corr(3, "left-sleeve", (5, 10), (0, 0), LONG_SLEEVE),
];

const LONG_BODY_WIDE_SLEEVE_CORRESPONDENCE: [LayerCorrespondence; 6] = [
    corr(0, "front", (0, 0), (0, 0), STANDARD),
    corr(2, "front", (0, 0), (0, 32), (32, 9)),
    corr(1, "back", (0, 0), (0, 0), STANDARD),
    corr(3, "back", (0, 0), (0, 32), (32, 9)),
    corr(2, "right-sleeve", (1, 10), (0, 0), WIDE_SLEEVE),
    corr(3, "left-sleeve", (1, 10), (0, 0), WIDE_SLEEVE),
];

const BRIMMED_CAP_LAYERS: [Layer; 3] = [
    Layer::new("front", (44, 41)),
    Layer::new("back", (20, 44)),
    Layer::new("brim", (44, 21)),
];

const BRIMMED_CAP_CORRESPONDENCE: [LayerCorrespondence; 8] = [
    corr(0, "front", (0, 0), (0, 0), STANDARD),
    corr(1, "front", (0, 0), (32, 0), (12, 32)),
    corr(2, "front", (0, 0), (0, 32), (32, 9)),
    corr(3, "front", (0, 0), (32, 32), (12, 9)),
    corr(1, "back", (12, 0), (0, 0), (20, 32)),
    corr(3, "back", (12, 0), (0, 32), (20, 12)),
    corr(2, "brim", (0, 11), (0, 0), (32, 21)),
    corr(3, "brim", (0, 11), (32, 0), (12, 21)),
];

const KNIT_CAP_LAYERS: [Layer; 1] = [Layer::new("cap", (64, 53))];

// Tiles 2 and 3 are nominally 32x32; the game ignores the rows past the cap.
const KNIT_CAP_INTERNAL_LAYERS: [Layer; 4] = [
    Layer::new("0", STANDARD),
    Layer::new("1", STANDARD),
    Layer::new("2", (32, 21)),
    Layer::new("3", (32, 21)),
];

const KNIT_CAP_CORRESPONDENCE: [LayerCorrespondence; 4] = [
    corr(0, "cap", (0, 0), (0, 0), STANDARD),
    corr(1, "cap", (0, 0), (32, 0), STANDARD),
    corr(2, "cap", (0, 0), (0, 32), (32, 21)),
    corr(3, "cap", (0, 0), (32, 32), (32, 21)),
];

const BRIMMED_HAT_LAYERS: [Layer; 3] = [
    Layer::new("top", (36, 36)),
    Layer::new("middle", (64, 19)),
    Layer::new("bottom", (64, 9)),
];

const BRIMMED_HAT_CORRESPONDENCE: [LayerCorrespondence; 8] = [
    corr(0, "top", (14, 0), (0, 0), (18, 32)),
    corr(1, "top", (0, 0), (18, 0), (18, 32)),
    corr(2, "top", (14, 0), (0, 32), (18, 4)),
    corr(3, "top", (0, 0), (18, 32), (18, 4)),
    corr(2, "middle", (0, 4), (0, 0), (32, 19)),
    corr(3, "middle", (0, 4), (32, 0), (32, 19)),
    corr(2, "bottom", (0, 23), (0, 0), (32, 9)),
    corr(3, "bottom", (0, 23), (32, 0), (32, 9)),
];

pub static DESIGN_TYPES: &[DesignType] = &[
    DesignType {
        code: 99,
        name: "basic-design",
        display_name: "Basic design",
        category: None,
        external_layers: &BASIC_LAYERS,
        internal_layers: &BASIC_LAYERS,
        correspondence: None,
    },
    DesignType {
        code: 100,
        name: "long-sleeve-dress-shirt",
        display_name: "Long-sleeve dress shirt",
        category: Some(Category::Tops),
        external_layers: &LONG_SLEEVE_TOP_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_SLEEVE_TOP_CORRESPONDENCE),
    },
    DesignType {
        code: 101,
        name: "short-sleeve-tee",
        display_name: "Short-sleeve tee",
        category: Some(Category::Tops),
        external_layers: &SHORT_SLEEVE_TOP_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&SHORT_SLEEVE_TOP_CORRESPONDENCE),
    },
    DesignType {
        code: 102,
        name: "tank-top",
        display_name: "Tank top",
        category: Some(Category::Tops),
        external_layers: &STANDARD_BODY_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&STANDARD_BODY_CORRESPONDENCE),
    },
    DesignType {
        code: 103,
        name: "sweater",
        display_name: "Sweater",
        category: Some(Category::Tops),
        external_layers: &LONG_SLEEVE_TOP_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_SLEEVE_TOP_CORRESPONDENCE),
    },
    DesignType {
        code: 104,
        name: "hoodie",
        display_name: "Hoodie",
        category: Some(Category::Tops),
        external_layers: &LONG_SLEEVE_TOP_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_SLEEVE_TOP_CORRESPONDENCE),
    },
    DesignType {
        code: 105,
        name: "coat",
        display_name: "Coat",
        category: Some(Category::Tops),
        external_layers: &LONG_BODY_LONG_SLEEVE_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_LONG_SLEEVE_CORRESPONDENCE),
    },
    DesignType {
        code: 106,
        name: "short-sleeve-dress",
        display_name: "Short-sleeve dress",
        category: Some(Category::DressUp),
        external_layers: &LONG_BODY_SHORT_SLEEVE_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_SHORT_SLEEVE_CORRESPONDENCE),
    },
    DesignType {
        code: 107,
        name: "sleeveless-dress",
        display_name: "Sleeveless dress",
        category: Some(Category::DressUp),
        external_layers: &LONG_BODY_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_CORRESPONDENCE),
    },
    DesignType {
        code: 108,
        name: "long-sleeve-dress",
        display_name: "Long-sleeve dress",
        category: Some(Category::DressUp),
        external_layers: &LONG_BODY_LONG_SLEEVE_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_LONG_SLEEVE_CORRESPONDENCE),
    },
    DesignType {
        code: 109,
        name: "balloon-hem-dress",
        display_name: "Balloon-hem dress",
        category: Some(Category::DressUp),
        external_layers: &LONG_BODY_SHORT_SLEEVE_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_SHORT_SLEEVE_CORRESPONDENCE),
    },
    DesignType {
        code: 110,
        name: "round-dress",
        display_name: "Round dress",
        category: Some(Category::DressUp),
        external_layers: &LONG_BODY_SHORT_SLEEVE_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_SHORT_SLEEVE_CORRESPONDENCE),
    },
    DesignType {
        code: 111,
        name: "robe",
        display_name: "Robe",
        category: Some(Category::DressUp),
        external_layers: &LONG_BODY_WIDE_SLEEVE_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&LONG_BODY_WIDE_SLEEVE_CORRESPONDENCE),
    },
    DesignType {
        code: 112,
        name: "brimmed-cap",
        display_name: "Brimmed cap",
        category: Some(Category::Headwear),
        external_layers: &BRIMMED_CAP_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&BRIMMED_CAP_CORRESPONDENCE),
    },
    DesignType {
        code: 113,
        name: "knit-cap",
        display_name: "Knit cap",
        category: Some(Category::Headwear),
        external_layers: &KNIT_CAP_LAYERS,
        internal_layers: &KNIT_CAP_INTERNAL_LAYERS,
        correspondence: Some(&KNIT_CAP_CORRESPONDENCE),
    },
    DesignType {
        code: 114,
        name: "brimmed-hat",
        display_name: "Brimmed hat",
        category: Some(Category::Headwear),
        external_layers: &BRIMMED_HAT_LAYERS,
        internal_layers: &PRO_INTERNAL_LAYERS,
        correspondence: Some(&BRIMMED_HAT_CORRESPONDENCE),
    },
];
