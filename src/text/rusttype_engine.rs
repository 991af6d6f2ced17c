//! `rusttype` text engine.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Parse TTF/OTF | `rusttype::Font::try_from_vec` |
//! | Measure | `Font::layout` advance + `v_metrics` ascent/descent |
//! | Rasterize | `PositionedGlyph::draw` coverage, source-over blend |
//!
//! Parsed fonts are kept per path for the lifetime of the engine, so the
//! solver's size probing reads each font file once. The face itself (font at a
//! size) is rebuilt on every `load_face` call.

use super::engine::{FontError, TextEngine, TextExtent};
use crate::style::FontRef;
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A parsed font at one pixel size.
#[derive(Clone)]
pub struct RustTypeFace {
    font: Rc<Font<'static>>,
    scale: Scale,
}

impl RustTypeFace {
    pub fn size(&self) -> f32 {
        self.scale.y
    }
}

#[derive(Default)]
pub struct RustTypeEngine {
    fonts: RefCell<HashMap<PathBuf, Rc<Font<'static>>>>,
}

impl RustTypeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn font(&self, path: &Path) -> Result<Rc<Font<'static>>, FontError> {
        if let Some(font) = self.fonts.borrow().get(path) {
            return Ok(Rc::clone(font));
        }
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| FontError::Invalid {
            path: path.to_path_buf(),
        })?;
        let font = Rc::new(font);
        self.fonts
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&font));
        Ok(font)
    }
}

impl TextEngine for RustTypeEngine {
    type Face = RustTypeFace;

    fn load_face(&self, font: &FontRef, size: f32) -> Result<RustTypeFace, FontError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(FontError::InvalidSize(size));
        }
        Ok(RustTypeFace {
            font: self.font(font.path())?,
            scale: Scale::uniform(size),
        })
    }

    fn measure(&self, face: &RustTypeFace, text: &str) -> TextExtent {
        let v_metrics = face.font.v_metrics(face.scale);
        let width = face
            .font
            .layout(text, face.scale, point(0.0, v_metrics.ascent))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        TextExtent {
            width,
            height: v_metrics.ascent - v_metrics.descent,
        }
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        face: &RustTypeFace,
        text: &str,
        origin: (f32, f32),
        color: Rgba<u8>,
    ) {
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        for glyph in face
            .font
            .layout(text, face.scale, point(origin.0, origin.1))
        {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` (0.0–1.0) onto `dst`.
fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0) * (color.0[3] as f32 / 255.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((a + dst_a * inv) * 255.0).round() as u8;
}
