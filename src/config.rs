//! Encoder configuration
//!
//! The protocol constants the service has always sent, plus the knobs for
//! quantization and oversized basic images. Loadable from JSON.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::Result;

/// What to do with a basic image larger than one tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicFit {
    /// Scale down to 32x32, keeping the aspect ratio
    #[default]
    Scale,
    /// Split into one design per 32x32 tile
    Tile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub version: u32,
    pub app_release_version: u32,
    pub ruby_version: u32,
    pub language: String,
    pub author_vid: u32,
    pub author_pid: u32,
    pub author_gender: u8,
    pub flags: u32,
    pub clothing_set: u32,
    /// Allow one quantization pass when the palette overflows
    pub quantize: bool,
    pub basic_fit: BasicFit,
    /// Fixed `mMtNsaId`; a random one is drawn per design when unset
    pub session_id: Option<u64>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            version: 2306,
            app_release_version: 7,
            ruby_version: 2,
            language: "en-US".to_string(),
            author_vid: 4255292630,
            author_pid: 2422107098,
            author_gender: 0,
            flags: 2,
            clothing_set: 238,
            quantize: true,
            basic_fit: BasicFit::Scale,
            session_id: None,
        }
    }
}

impl EncodeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn session_id(&self) -> u64 {
        self.session_id.unwrap_or_else(rand::random)
    }
}
