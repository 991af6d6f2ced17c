//! Shared test utilities for the caption-press test suite.
//!
//! Provides the bundled fixture font, synthetic images, and small file
//! writers so tests never depend on system fonts or pre-made image files.

use crate::imaging::SourceImage;
use crate::style::FontRef;
use image::{DynamicImage, ImageFormat, Rgba, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Fonts
// =========================================================================

/// Path to `fixtures/fonts/DejaVuSans.ttf`.
pub fn bundled_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/fonts/DejaVuSans.ttf")
}

pub fn bundled_font() -> FontRef {
    FontRef::new(bundled_font_path())
}

// =========================================================================
// Synthetic images
// =========================================================================

pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Opaque RGBA gradient. Blue is fixed at 128 so no pixel is pure black or
/// pure white, which keeps caption ink distinguishable.
pub fn opaque_gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

/// A [`SourceImage`] over [`opaque_gradient`], not normalized.
pub fn gradient_source(width: u32, height: u32) -> SourceImage {
    SourceImage::from_image(
        "gradient.png",
        DynamicImage::ImageRgba8(opaque_gradient(width, height)),
    )
}

/// Write an RGB gradient of the given size and format to `path`.
pub fn write_test_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, format).unwrap();
}
