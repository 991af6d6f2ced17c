//! Caption and style value types.
//!
//! Everything the user picks (color, font, caption text) is parsed into one of
//! these types at the edge of the program. The compositor only ever sees
//! closed enums and resolved paths, never free-form selector strings.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("unknown color '{0}' (expected black or white)")]
    UnknownColor(String),
    #[error("unknown font '{name}' (available: {available})")]
    UnknownFont { name: String, available: String },
}

/// One of the two fixed caption placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionSlot {
    Top,
    Bottom,
}

impl CaptionSlot {
    /// Baseline y coordinate for an image of the given height.
    ///
    /// Top sits at one fifth of the height, Bottom at `height / 1.1`.
    pub fn anchor_y(self, height: u32) -> f32 {
        let h = height as f32;
        match self {
            CaptionSlot::Top => h / 5.0,
            CaptionSlot::Bottom => h / 1.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptionSlot::Top => "Top",
            CaptionSlot::Bottom => "Bottom",
        }
    }
}

/// Caption text bound to a slot. Empty text means "skip this slot".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub slot: CaptionSlot,
    pub text: String,
}

impl Caption {
    pub fn top(text: impl Into<String>) -> Self {
        Self {
            slot: CaptionSlot::Top,
            text: text.into(),
        }
    }

    pub fn bottom(text: impl Into<String>) -> Self {
        Self {
            slot: CaptionSlot::Bottom,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Caption foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn rgba(self) -> Rgba<u8> {
        match self {
            TextColor::Black => Rgba([0x00, 0x00, 0x00, 0xff]),
            TextColor::White => Rgba([0xff, 0xff, 0xff, 0xff]),
        }
    }
}

impl FromStr for TextColor {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(TextColor::Black),
            "white" => Ok(TextColor::White),
            _ => Err(StyleError::UnknownColor(s.to_string())),
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextColor::Black => f.write_str("Black"),
            TextColor::White => f.write_str("White"),
        }
    }
}

/// A resolved font file. Loading (and therefore real validation) happens in
/// the text engine; this only records which file to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRef(PathBuf);

impl FontRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File stem for display (`fonts/creamy.ttf` → `creamy`).
    pub fn name(&self) -> String {
        self.0
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

/// Named fonts offered to the user, each backed by `<dir>/<name>.ttf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontPalette {
    dir: PathBuf,
    names: Vec<String>,
}

impl FontPalette {
    pub fn new(dir: impl Into<PathBuf>, names: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    /// All palette entries with their resolved font references.
    pub fn entries(&self) -> Vec<(&str, FontRef)> {
        self.names
            .iter()
            .map(|n| (n.as_str(), FontRef::new(self.dir.join(format!("{n}.ttf")))))
            .collect()
    }

    /// Resolve a user selection: a palette name, or an explicit path to a
    /// `.ttf`/`.otf` file.
    pub fn resolve(&self, selection: &str) -> Result<FontRef, StyleError> {
        let selection = selection.trim();
        if let Some(name) = self.names.iter().find(|n| n.eq_ignore_ascii_case(selection)) {
            return Ok(FontRef::new(self.dir.join(format!("{name}.ttf"))));
        }
        let is_font_file = Path::new(selection)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
        if is_font_file {
            return Ok(FontRef::new(selection));
        }
        Err(StyleError::UnknownFont {
            name: selection.to_string(),
            available: self.names.join(", "),
        })
    }
}

/// Font and color chosen for a compose call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub font: FontRef,
    pub color: TextColor,
}
