//! Caption compositor.
//!
//! Draws the Top and Bottom captions onto a fresh copy of the source image.
//! Each slot with text gets its own solved font size, is centered
//! horizontally, and has its baseline at the slot's anchor. The result is a
//! new [`CompositedImage`]; the source is only read.

use super::engine::{FontError, TextEngine};
use super::fit::{FitError, solve_font_size};
use crate::imaging::SourceImage;
use crate::style::{Caption, CaptionSlot, Style};
use image::RgbaImage;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("{slot:?} caption: {source}")]
    Fit {
        slot: CaptionSlot,
        #[source]
        source: FitError,
    },
    #[error("{slot:?} caption: font reload at solved size failed: {source}")]
    Font {
        slot: CaptionSlot,
        #[source]
        source: FontError,
    },
}

/// Where and how one caption was drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub slot: CaptionSlot,
    pub text: String,
    pub font_size: f32,
    /// Left-baseline draw origin.
    pub x: f32,
    pub y: f32,
    /// Measured advance width at `font_size`.
    pub width: f32,
}

/// Output of one compose call. Replaced wholesale by the next call.
#[derive(Debug, Clone)]
pub struct CompositedImage {
    pixels: RgbaImage,
    placements: Vec<Placement>,
}

impl CompositedImage {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Captions actually drawn, in draw order. Empty slots are absent.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Hex SHA-256 of the raw RGBA pixel data.
    pub fn digest(&self) -> String {
        pixel_digest(&self.pixels)
    }
}

/// Hex SHA-256 of an RGBA buffer's raw bytes.
pub fn pixel_digest(pixels: &RgbaImage) -> String {
    let hash = Sha256::digest(pixels.as_raw());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Composite `top` and `bottom` onto a copy of `source` with `style`.
///
/// Slots are drawn Top then Bottom. Empty captions are skipped without
/// touching the engine. Overlapping captions are not detected.
pub fn compose<E: TextEngine>(
    engine: &E,
    source: &SourceImage,
    top: &Caption,
    bottom: &Caption,
    style: &Style,
    max_font_size: f32,
) -> Result<CompositedImage, ComposeError> {
    let mut canvas = source.to_rgba();
    let (width, height) = canvas.dimensions();
    let color = style.color.rgba();
    let mut placements = Vec::new();

    for caption in [top, bottom] {
        if caption.is_empty() {
            continue;
        }
        let slot = caption.slot;
        let size = solve_font_size(
            engine,
            (width, height),
            &style.font,
            &caption.text,
            max_font_size,
        )
        .map_err(|source| ComposeError::Fit { slot, source })?;
        let face = engine
            .load_face(&style.font, size)
            .map_err(|source| ComposeError::Font { slot, source })?;

        let text_width = engine.measure(&face, &caption.text).width;
        let x = (width as f32 - text_width) / 2.0;
        let y = slot.anchor_y(height);
        engine.draw(&mut canvas, &face, &caption.text, (x, y), color);

        debug!(
            slot = slot.label(),
            font_size = size,
            x,
            y,
            "caption drawn"
        );
        placements.push(Placement {
            slot,
            text: caption.text.clone(),
            font_size: size,
            x,
            y,
            width: text_width,
        });
    }

    Ok(CompositedImage {
        pixels: canvas,
        placements,
    })
}
