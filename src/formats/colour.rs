//! # Colour
//!
//! A packed RGBA colour as the palette stores it: the four channel bytes read as
//! a big-endian `u32`, so the value is `R<<24 | G<<16 | B<<8 | A`.

use std::fmt;

use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Colour(pub u32);

impl Colour {
    pub const TRANSPARENT: Colour = Colour(0);

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Colour(u32::from_be_bytes([r, g, b, a]))
    }

    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn alpha(self) -> u8 {
        self.to_bytes()[3]
    }

    pub fn is_transparent(self) -> bool {
        self.alpha() == 0
    }
}

impl From<Rgba<u8>> for Colour {
    fn from(pixel: Rgba<u8>) -> Self {
        Colour(u32::from_be_bytes(pixel.0))
    }
}

impl From<&Rgba<u8>> for Colour {
    fn from(pixel: &Rgba<u8>) -> Self {
        Colour(u32::from_be_bytes(pixel.0))
    }
}

impl From<Colour> for Rgba<u8> {
    fn from(colour: Colour) -> Self {
        Rgba(colour.to_bytes())
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}
