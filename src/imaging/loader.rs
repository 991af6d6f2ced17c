//! Source image loading and normalization.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, BMP) | `image::ImageReader` with guessed format |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |

use super::calculations::{ResizePlan, plan_resize};
use super::params::ResolutionBand;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A decoded, normalized image. Never modified after construction.
#[derive(Debug, Clone)]
pub struct SourceImage {
    path: PathBuf,
    image: DynamicImage,
    original_dimensions: (u32, u32),
}

impl SourceImage {
    /// Wrap an already-decoded image as-is, without normalization.
    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        let original_dimensions = image.dimensions();
        Self {
            path: path.into(),
            image,
            original_dimensions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Size of the file before normalization.
    pub fn original_dimensions(&self) -> (u32, u32) {
        self.original_dimensions
    }

    pub fn was_resized(&self) -> bool {
        self.dimensions() != self.original_dimensions
    }

    /// A fresh RGBA copy of the pixels.
    pub fn to_rgba(&self) -> RgbaImage {
        self.image.to_rgba8()
    }
}

/// Decode an image from disk. The format comes from the file's magic bytes,
/// with the extension as fallback.
pub fn decode(path: &Path) -> Result<DynamicImage, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Resize `image` into `band` according to [`plan_resize`].
pub fn normalize(image: DynamicImage, band: &ResolutionBand) -> DynamicImage {
    let original = image.dimensions();
    match plan_resize(original, band) {
        ResizePlan::Keep => image,
        plan => {
            let (width, height) = plan.target(original);
            debug!(?plan, from = ?original, "resampling with Lanczos3");
            image.resize_exact(width, height, FilterType::Lanczos3)
        }
    }
}

/// Load and normalize a source image.
pub fn load(path: &Path, band: &ResolutionBand) -> Result<SourceImage, LoadError> {
    let decoded = decode(path)?;
    let original_dimensions = decoded.dimensions();
    let image = normalize(decoded, band);
    let (w, h) = image.dimensions();
    info!(
        path = %path.display(),
        original = ?original_dimensions,
        width = w,
        height = h,
        "image loaded"
    );
    Ok(SourceImage {
        path: path.to_path_buf(),
        image,
        original_dimensions,
    })
}
