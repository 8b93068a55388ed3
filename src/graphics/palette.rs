//! # Palette Builder
//!
//! Derives the colour table shared by every tile of a design. Colours are
//! numbered in order of first appearance: buffers in the order given, pixels
//! in row-major order within each buffer. Colours are keyed on the full packed
//! value, so RGB under alpha 0 is kept.
//!
//! Both modes hold 15 user colours at indices 0-14. Pure transparent
//! (`0x00000000`) always takes the fixed index 15 and never uses a user slot.
//! Basic palettes list that entry whether or not it is used; pro palettes list
//! it only when some pixel needs it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::formats::colour::Colour;
use crate::formats::{PALETTE_SIZE, TRANSPARENT_INDEX};
use crate::{DesignError, PixelBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteMode {
    Basic,
    Pro,
}

impl PaletteMode {
    pub fn for_design(pro: bool) -> Self {
        if pro {
            PaletteMode::Pro
        } else {
            PaletteMode::Basic
        }
    }

    /// Number of user colours, not counting the fixed transparent entry
    pub fn capacity(self) -> usize {
        PALETTE_SIZE
    }

    /// Whether the fixed transparent entry is listed even when unused
    pub fn always_lists_transparent(self) -> bool {
        matches!(self, PaletteMode::Basic)
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteMode::Basic => write!(f, "Basic"),
            PaletteMode::Pro => write!(f, "Pro"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaletteError {
    #[error("{colours} colours found, the palette holds at most {max}")]
    Overflow { colours: usize, max: usize },
    #[error("colour {0} is not in the palette")]
    UnknownColour(Colour),
}

impl From<PaletteError> for DesignError {
    fn from(err: PaletteError) -> Self {
        match err {
            PaletteError::Overflow { colours, max } => DesignError::PaletteOverflow { colours, max },
            PaletteError::UnknownColour(colour) => DesignError::ColourNotInPalette(colour),
        }
    }
}

/// Colour to 4-bit index mapping for one design
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    mode: PaletteMode,
    // User colours, position == palette index
    colours: Vec<Colour>,
    indices: HashMap<Colour, u8>,
    uses_transparent: bool,
}

impl Palette {
    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    /// User colours in index order
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    fn lists_transparent(&self) -> bool {
        self.uses_transparent || self.mode.always_lists_transparent()
    }

    /// Total entries, counting the fixed transparent entry when listed
    pub fn len(&self) -> usize {
        self.colours.len() + usize::from(self.lists_transparent())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_of(&self, colour: Colour) -> Option<u8> {
        if colour == Colour::TRANSPARENT {
            return Some(TRANSPARENT_INDEX);
        }
        self.indices.get(&colour).copied()
    }

    /// Looks up a colour, failing for colours the palette was not built from
    pub fn require_index(&self, colour: Colour) -> Result<u8, PaletteError> {
        self.index_of(colour).ok_or(PaletteError::UnknownColour(colour))
    }

    /// `mPalette` map: decimal index string to packed colour
    pub fn to_wire(&self) -> BTreeMap<String, u32> {
        let mut wire: BTreeMap<String, u32> = self
            .colours
            .iter()
            .enumerate()
            .map(|(i, colour)| (i.to_string(), colour.0))
            .collect();
        if self.lists_transparent() {
            wire.insert(TRANSPARENT_INDEX.to_string(), Colour::TRANSPARENT.0);
        }
        wire
    }

    pub fn inverse(&self) -> InversePalette {
        let mut inverse = InversePalette::empty();
        for (i, colour) in self.colours.iter().enumerate() {
            inverse.colours[i] = Some(*colour);
        }
        inverse
    }
}

/// Index to colour table used when decoding tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InversePalette {
    colours: [Option<Colour>; 16],
}

impl InversePalette {
    /// A table where only the implicit transparent entry is defined
    pub fn empty() -> Self {
        let mut colours = [None; 16];
        colours[TRANSPARENT_INDEX as usize] = Some(Colour::TRANSPARENT);
        InversePalette { colours }
    }

    /// Parses an `mPalette` map. Index 15 always decodes as transparent.
    pub fn from_wire(wire: &BTreeMap<String, u32>) -> Result<Self, DesignError> {
        let mut inverse = InversePalette::empty();
        for (key, value) in wire {
            let index: u8 = key
                .parse()
                .map_err(|_| DesignError::InvalidPaletteKey(key.clone()))?;
            if index > TRANSPARENT_INDEX {
                return Err(DesignError::InvalidPaletteKey(key.clone()));
            }
            if index != TRANSPARENT_INDEX {
                inverse.colours[index as usize] = Some(Colour(*value));
            }
        }
        Ok(inverse)
    }

    pub fn colour(&self, index: u8) -> Option<Colour> {
        self.colours.get(index as usize).copied().flatten()
    }
}

/// Builds the shared palette over `buffers`.
///
/// Fails with [`PaletteError::Overflow`] when the distinct user colour count
/// exceeds the mode's capacity. The reported count covers every buffer, so
/// callers can tell the user how far over the limit the design is.
pub fn build_palette<'a, I>(buffers: I, mode: PaletteMode) -> Result<Palette, PaletteError>
where
    I: IntoIterator<Item = &'a PixelBuffer>,
{
    let max = mode.capacity();
    let mut colours = Vec::with_capacity(max);
    let mut indices = HashMap::new();
    let mut uses_transparent = false;

    for buffer in buffers {
        for pixel in buffer.pixels() {
            let colour = Colour::from(pixel);
            if colour == Colour::TRANSPARENT {
                uses_transparent = true;
                continue;
            }
            if !indices.contains_key(&colour) {
                indices.insert(colour, colours.len() as u8);
                colours.push(colour);
            }
        }
    }

    if colours.len() > max {
        return Err(PaletteError::Overflow {
            colours: colours.len(),
            max,
        });
    }

    Ok(Palette {
        mode,
        colours,
        indices,
        uses_transparent,
    })
}
