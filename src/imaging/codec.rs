//! Output encoding and file saving.
//!
//! | Format | Encoder | Pixels written |
//! |---|---|---|
//! | PNG | `image::codecs::png::PngEncoder` | RGBA8 |
//! | JPEG | `image::codecs::jpeg::JpegEncoder` | RGB8, alpha dropped |
//! | TIFF | `image::codecs::tiff::TiffEncoder` | RGBA8 |
//! | BMP | `image::codecs::bmp::BmpEncoder` | RGBA8 |
//!
//! Encoding always happens in memory first, so an encoder failure never leaves
//! a partial file behind. [`save`] then writes through a sibling temporary
//! file and renames it over the destination.

use super::params::Quality;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported image format '{0}' (expected png, jpeg, tiff or bmp)")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to encode {format}: {source}")]
    Image {
        format: OutputFormat,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raster formats the composite can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Tiff,
    Bmp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Tiff,
        OutputFormat::Bmp,
    ];

    /// Canonical extension, also used for attachment names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Bmp => "bmp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Bmp => "image/bmp",
        }
    }

    pub fn is_lossless(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }

    /// `<stem>.<extension>`
    pub fn file_name(self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            "bmp" => Ok(OutputFormat::Bmp),
            _ => Err(FormatError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An encoded image ready to be written or attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// Encode `pixels` as `format`. `quality` only affects JPEG.
pub fn encode(
    pixels: &RgbaImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<EncodedImage, EncodeError> {
    let mut buf = Cursor::new(Vec::new());
    let (w, h) = pixels.dimensions();
    let result = match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut buf).write_image(pixels.as_raw(), w, h, ExtendedColorType::Rgba8)
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, quality.value()).write_image(
                rgb.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Tiff => {
            TiffEncoder::new(&mut buf).write_image(pixels.as_raw(), w, h, ExtendedColorType::Rgba8)
        }
        OutputFormat::Bmp => {
            BmpEncoder::new(&mut buf).write_image(pixels.as_raw(), w, h, ExtendedColorType::Rgba8)
        }
    };
    result.map_err(|source| EncodeError::Image { format, source })?;
    Ok(EncodedImage {
        format,
        bytes: buf.into_inner(),
    })
}

/// Encode and write to `path`, replacing any existing file.
///
/// Nothing is created when encoding fails. On a write or rename failure the
/// temporary file is removed and the destination is left as it was.
pub fn save(
    pixels: &RgbaImage,
    path: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<EncodedImage, SaveError> {
    let encoded = encode(pixels, format, quality)?;
    let tmp = temp_path(path);

    let written = write_file(&tmp, &encoded.bytes).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(source) = written {
        remove_temp(&tmp);
        return Err(SaveError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(path = %path.display(), %format, bytes = encoded.bytes.len(), "image saved");
    Ok(encoded)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Best-effort removal of a leftover temporary file.
fn remove_temp(tmp: &Path) {
    match std::fs::remove_file(tmp) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %tmp.display(), error = %e, "could not remove temporary file");
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    // Data is already handed to the OS; a failed sync is reported, not fatal
    if let Err(e) = file.sync_all() {
        warn!(path = %path.display(), error = %e, "sync after write failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::opaque_gradient;

    #[test]
    fn parses_format_tokens_and_aliases() {
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("JPEG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("tif".parse::<OutputFormat>(), Ok(OutputFormat::Tiff));
        assert_eq!(" bmp ".parse::<OutputFormat>(), Ok(OutputFormat::Bmp));
    }

    #[test]
    fn gif_is_unsupported() {
        assert_eq!(
            "gif".parse::<OutputFormat>(),
            Err(FormatError::Unsupported("gif".into()))
        );
    }

    #[test]
    fn file_names_use_canonical_extension() {
        assert_eq!(OutputFormat::Jpeg.file_name("cat"), "cat.jpeg");
        assert_eq!(OutputFormat::Tiff.file_name("cat"), "cat.tiff");
    }

    #[test]
    fn mime_types_are_image_types() {
        for format in OutputFormat::ALL {
            assert!(format.mime_type().starts_with("image/"));
        }
    }

    #[test]
    fn lossless_formats_round_trip_pixels_exactly() {
        let pixels = opaque_gradient(37, 23);
        for format in OutputFormat::ALL.into_iter().filter(|f| f.is_lossless()) {
            let encoded = encode(&pixels, format, Quality::default()).unwrap();
            let decoded = image::load_from_memory(&encoded.bytes).unwrap().to_rgba8();
            assert_eq!(decoded, pixels, "{format} changed pixel data");
        }
    }

    #[test]
    fn jpeg_round_trip_preserves_dimensions() {
        let pixels = opaque_gradient(64, 40);
        let encoded = encode(&pixels, OutputFormat::Jpeg, Quality::new(90)).unwrap();
        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 40));
    }

    #[test]
    fn jpeg_quality_changes_output_size() {
        let pixels = opaque_gradient(128, 128);
        let low = encode(&pixels, OutputFormat::Jpeg, Quality::new(10)).unwrap();
        let high = encode(&pixels, OutputFormat::Jpeg, Quality::new(100)).unwrap();
        assert!(low.bytes.len() < high.bytes.len());
    }

    #[test]
    fn save_writes_and_overwrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        std::fs::write(&path, b"old contents").unwrap();

        let pixels = opaque_gradient(16, 16);
        save(&pixels, &path, OutputFormat::Png, Quality::default()).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded, pixels);
        // No temporary file left behind
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("out.png");

        let result = save(&opaque_gradient(4, 4), &path, OutputFormat::Png, Quality::default());
        assert!(matches!(result, Err(SaveError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_temporary_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        // A non-empty directory occupies the destination, so the rename fails
        let path = tmp.path().join("meme.png");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep.txt"), b"x").unwrap();

        let result = save(&opaque_gradient(4, 4), &path, OutputFormat::Png, Quality::default());
        assert!(matches!(result, Err(SaveError::Io { .. })));

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["meme.png"]);
        assert!(path.join("keep.txt").exists());
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("/out/cat.png")),
            PathBuf::from("/out/.cat.png.partial")
        );
    }
}
