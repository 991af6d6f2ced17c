//! Pure calculation functions for the normalization band.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::ResolutionBand;

/// What normalization will do to an image of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// Already inside the band; use as-is.
    Keep,
    /// Too large on some axis; shrink to fit the max box.
    ScaleDown { width: u32, height: u32 },
    /// Too small on some axis; grow to cover the min box.
    ScaleUp { width: u32, height: u32 },
}

impl ResizePlan {
    pub fn target(&self, original: (u32, u32)) -> (u32, u32) {
        match *self {
            ResizePlan::Keep => original,
            ResizePlan::ScaleDown { width, height } | ResizePlan::ScaleUp { width, height } => {
                (width, height)
            }
        }
    }
}

/// Decide how to bring `source` into `band`, preserving aspect ratio.
///
/// - **Oversized** (either axis above its max): scale by
///   `min(max_w / w, max_h / h)` so the image fits inside the max box. This
///   case wins when an image is over one bound and under another.
/// - **Undersized** (either axis below its min): scale by
///   `max(min_w / w, min_h / h)` so both axes reach the min box, capped so
///   neither axis passes the outer box `(max(max_w, min_w), max(max_h, min_h))`.
///
/// # Examples
/// ```
/// # use caption_press::imaging::{ResizePlan, ResolutionBand, plan_resize};
/// let band = ResolutionBand::default();
/// assert_eq!(
///     plan_resize((500, 500), &band),
///     ResizePlan::ScaleUp { width: 1200, height: 1200 }
/// );
/// assert_eq!(
///     plan_resize((3000, 1000), &band),
///     ResizePlan::ScaleDown { width: 1920, height: 640 }
/// );
/// ```
pub fn plan_resize(source: (u32, u32), band: &ResolutionBand) -> ResizePlan {
    let (w, h) = source;
    if w == 0 || h == 0 {
        return ResizePlan::Keep;
    }
    let (wf, hf) = (w as f64, h as f64);

    let oversized = w > band.max_width || h > band.max_height;
    let undersized = w < band.min_width || h < band.min_height;

    let plan = if oversized {
        let scale = (band.max_width as f64 / wf).min(band.max_height as f64 / hf);
        let (width, height) = scaled(source, scale);
        ResizePlan::ScaleDown { width, height }
    } else if undersized {
        let cover = (band.min_width as f64 / wf).max(band.min_height as f64 / hf);
        let (outer_w, outer_h) = band.outer_box();
        let limit = (outer_w as f64 / wf).min(outer_h as f64 / hf);
        let (width, height) = scaled(source, cover.min(limit));
        ResizePlan::ScaleUp { width, height }
    } else {
        ResizePlan::Keep
    };

    // A capped scale-up can land exactly on the source size
    if plan.target(source) == source {
        ResizePlan::Keep
    } else {
        plan
    }
}

fn scaled((w, h): (u32, u32), scale: f64) -> (u32, u32) {
    let width = ((w as f64 * scale).round() as u32).max(1);
    let height = ((h as f64 * scale).round() as u32).max(1);
    (width, height)
}
