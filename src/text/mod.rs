//! Caption text: font fitting and compositing.
//!
//! | Piece | Role |
//! |---|---|
//! | [`TextEngine`] | load a face at a size, measure, draw |
//! | [`RustTypeEngine`] | production engine on `rusttype` |
//! | [`solve_font_size`] | largest size whose extent fits the surface |
//! | [`compose`] | Top and Bottom captions onto a copy of the source |

pub mod compose;
pub mod engine;
pub mod fit;
pub mod rusttype_engine;

pub use compose::{ComposeError, CompositedImage, Placement, compose, pixel_digest};
pub use engine::{FontError, TextEngine, TextExtent};
pub use fit::{DEFAULT_MAX_FONT_SIZE, FitError, solve_font_size};
pub use rusttype_engine::{RustTypeEngine, RustTypeFace};
