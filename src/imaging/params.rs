//! Parameter types for image operations.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 75). Clamped on construction.
//! - [`ResolutionBand`]: min and max boxes that loaded images are normalized into.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Acceptable size range for a loaded image.
///
/// The min and max boxes are independent: the stock band has a minimum height
/// (1200) above its maximum height (1080), so every stock-band image is
/// resized one way or the other. See
/// [`plan_resize`](super::calculations::plan_resize) for the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionBand {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl ResolutionBand {
    /// Smallest box containing both the min and the max box.
    pub fn outer_box(&self) -> (u32, u32) {
        (
            self.max_width.max(self.min_width),
            self.max_height.max(self.min_height),
        )
    }
}

impl Default for ResolutionBand {
    fn default() -> Self {
        Self {
            min_width: 1200,
            min_height: 1200,
            max_width: 1920,
            max_height: 1080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_75() {
        assert_eq!(Quality::default().value(), 75);
    }

    #[test]
    fn default_band_values() {
        let band = ResolutionBand::default();
        assert_eq!((band.min_width, band.min_height), (1200, 1200));
        assert_eq!((band.max_width, band.max_height), (1920, 1080));
    }

    #[test]
    fn outer_box_takes_larger_bound_per_axis() {
        assert_eq!(ResolutionBand::default().outer_box(), (1920, 1200));
    }
}
