//! Text engine trait and shared types.
//!
//! The [`TextEngine`] trait is the drawing context of a render surface: it can
//! load a font at a given size, measure a string with that face, and draw the
//! string onto an RGBA canvas. Fitting and compositing are written against the
//! trait so they can be tested with a recording mock.
//!
//! The production implementation is
//! [`RustTypeEngine`](super::rusttype_engine::RustTypeEngine).

use crate::style::FontRef;
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a usable font file")]
    Invalid { path: PathBuf },
    #[error("font size must be positive, got {0}")]
    InvalidSize(f32),
}

/// Rendered extent of a string at a given face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Horizontal advance from the origin to the end of the last glyph.
    pub width: f32,
    /// Line height (ascent minus descent).
    pub height: f32,
}

impl TextExtent {
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width <= width as f32 && self.height <= height as f32
    }
}

/// Drawing context for caption text.
pub trait TextEngine {
    /// A font loaded at one specific size.
    type Face;

    /// Load `font` at `size`. Fails if the file cannot be read or parsed.
    fn load_face(&self, font: &FontRef, size: f32) -> Result<Self::Face, FontError>;

    /// Measure `text` as it would be drawn with `face`.
    fn measure(&self, face: &Self::Face, text: &str) -> TextExtent;

    /// Draw `text` with its left-baseline point at `origin`.
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        face: &Self::Face,
        text: &str,
        origin: (f32, f32),
        color: Rgba<u8>,
    );
}
