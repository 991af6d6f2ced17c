//! Image loading, normalization, and encoding in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (magic bytes, then extension) |
//! | **Normalize** | [`plan_resize`] + Lanczos3 `resize_exact` |
//! | **Encode** | PNG, JPEG, TIFF, BMP encoders from `image::codecs` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for the resolution band (unit testable)
//! - **Parameters**: Band and quality settings
//! - **Loader**: [`SourceImage`] decode + normalize
//! - **Codec**: [`OutputFormat`], in-memory encode, file save

mod calculations;
pub mod codec;
pub mod loader;
mod params;

pub use calculations::{ResizePlan, plan_resize};
pub use codec::{
    EncodeError, EncodedImage, FormatError, OutputFormat, SaveError, encode, save,
};
pub use loader::{LoadError, SourceImage, load};
pub use params::{Quality, ResolutionBand};
