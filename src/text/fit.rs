//! Font-fit solver.
//!
//! Finds the largest integral font size at which a string's rendered extent
//! fits inside the surface bounds. The search walks down one unit at a time
//! from the maximum and keeps no state between calls.

use super::engine::{FontError, TextEngine};
use crate::style::FontRef;
use thiserror::Error;

/// Default starting size for the search.
pub const DEFAULT_MAX_FONT_SIZE: f32 = 200.0;

#[derive(Error, Debug)]
pub enum FitError {
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("text {text:?} does not fit in {width}x{height} at any font size")]
    TextTooLarge {
        text: String,
        width: u32,
        height: u32,
    },
    #[error("cannot fit text on an empty {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },
    #[error("cannot fit empty text")]
    EmptyText,
}

/// Solve the font size for `text` on a `bounds.0 × bounds.1` surface.
///
/// Returns a size `S` with `0 < S ≤ max_size` whose measured extent is within
/// the bounds. The first size that fits is returned, so `max_size` itself is
/// returned when the text already fits there. A load failure at any size ends
/// the search with [`FitError::Font`].
pub fn solve_font_size<E: TextEngine>(
    engine: &E,
    bounds: (u32, u32),
    font: &FontRef,
    text: &str,
    max_size: f32,
) -> Result<f32, FitError> {
    let (width, height) = bounds;
    if width == 0 || height == 0 {
        return Err(FitError::EmptySurface { width, height });
    }
    if text.is_empty() {
        return Err(FitError::EmptyText);
    }

    let mut size = max_size.floor();
    while size > 0.0 {
        let face = engine.load_face(font, size)?;
        if engine.measure(&face, text).fits_within(width, height) {
            return Ok(size);
        }
        size -= 1.0;
    }

    Err(FitError::TextTooLarge {
        text: text.to_string(),
        width,
        height,
    })
}
